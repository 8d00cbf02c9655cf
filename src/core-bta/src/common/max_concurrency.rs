use std::num::ParseIntError;

use super::env::env_or_default;

/// The default maximum number of jobs a worker processes at once.
pub const DEFAULT: usize = 4;

/// Retrieves WORKER_MAX_CONCURRENCY as a usize, falling back to `default` (or `DEFAULT`) when it is unset or blank.
/// Uses `usize` because the intended use of this value is in a semaphore, which requires a usize.
pub fn get_max_concurrency(override_default: Option<usize>) -> Result<usize, MaxConcurrencyError> {
    let value = match env_or_default("WORKER_MAX_CONCURRENCY", "").as_str() {
        "" => override_default.unwrap_or(DEFAULT),
        v => v.parse::<usize>()?,
    };
    if value == 0 {
        Err(MaxConcurrencyError::NonPositive)
    } else {
        Ok(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MaxConcurrencyError {
    #[error("Failed to parse WORKER_MAX_CONCURRENCY as an integer: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("WORKER_MAX_CONCURRENCY must be a positive number")]
    NonPositive,
}
