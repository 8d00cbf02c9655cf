use std::net::{AddrParseError, SocketAddr};
use std::num::ParseIntError;

use super::env::env_or_default;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, thiserror::Error)]
pub enum HostPortError {
    #[error("Invalid PORT: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Invalid HOST: {0}")]
    InvalidHostname(#[from] AddrParseError),
}

/// Address the API listens on, from HOST and PORT. Unset or blank values fall back to `127.0.0.1:8000`.
pub fn get_api_base_url() -> Result<SocketAddr, HostPortError> {
    let host = env_or_default("HOST", DEFAULT_HOST);
    let port = match env_or_default("PORT", "").as_str() {
        "" => DEFAULT_PORT,
        p => p.parse::<u16>()?,
    };
    Ok(format!("{}:{}", host, port).parse::<SocketAddr>()?)
}
