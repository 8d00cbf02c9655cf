/// True if the environment variable is set and not empty. False otherwise.
pub fn is_env_set(env_var: &str) -> bool {
    match std::env::var(env_var) {
        Ok(val) => !val.is_empty(),
        Err(_) => false,
    }
}

/// The value of the environment variable, or `default` if it is unset or empty.
pub fn env_or_default(env_var: &str, default: &str) -> String {
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}
