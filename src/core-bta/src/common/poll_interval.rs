use std::{num::ParseIntError, time::Duration};

use super::env::env_or_default;

#[derive(Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
}

/// Retrieves the value of the environment variable as a duration, using `default` when it is unset or blank.
pub fn get_poll_interval(units: TimeUnit, env_var_name: &str, default: u64) -> Result<Duration, ParseIntError> {
    let polling = match env_or_default(env_var_name, "").as_str() {
        "" => default,
        v => v.parse::<u64>()?,
    };

    let interval = match units {
        TimeUnit::Seconds => Duration::from_secs(polling),
        TimeUnit::Milliseconds => Duration::from_millis(polling),
    };
    Ok(interval)
}
