use axum_server::tls_rustls::RustlsConfig;
use std::path::PathBuf;

use super::env::is_env_set;

#[derive(Debug, thiserror::Error)]
pub enum TlsConfigError {
    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    Incomplete,
    #[error("Certificate file does not exist: {}", .0.display())]
    MissingCertificate(PathBuf),
    #[error("Private key file does not exist: {}", .0.display())]
    MissingKey(PathBuf),
    #[error("Failed to load TLS certificate and key: {0}")]
    Load(#[from] std::io::Error),
}

/// TLS configuration from TLS_CERT_PATH and TLS_KEY_PATH.
/// `None` when neither is set, which means the server speaks plain HTTP.
pub async fn get_tls_config() -> Result<Option<RustlsConfig>, TlsConfigError> {
    let (cert_path, key_path) = match (tls_path("TLS_CERT_PATH"), tls_path("TLS_KEY_PATH")) {
        (None, None) => return Ok(None),
        (Some(cert), Some(key)) => (cert, key),
        _ => return Err(TlsConfigError::Incomplete),
    };

    // Validate files exist before loading
    if !cert_path.exists() {
        return Err(TlsConfigError::MissingCertificate(cert_path));
    }
    if !key_path.exists() {
        return Err(TlsConfigError::MissingKey(key_path));
    }

    let config = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    Ok(Some(config))
}

fn tls_path(env_var: &str) -> Option<PathBuf> {
    if is_env_set(env_var) {
        std::env::var(env_var).ok().map(PathBuf::from)
    } else {
        None
    }
}
