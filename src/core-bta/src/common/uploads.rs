use std::{num::ParseIntError, path::PathBuf};

use super::env::env_or_default;

pub const DEFAULT_UPLOAD_DIR: &str = "data";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Where uploaded reports are written and how large they may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadConfigError {
    #[error("MAX_UPLOAD_BYTES must be a whole number of bytes: {0}")]
    InvalidMaxBytes(#[from] ParseIntError),
    #[error("MAX_UPLOAD_BYTES must be greater than zero")]
    ZeroMaxBytes,
}

/// Reads UPLOAD_DIR and MAX_UPLOAD_BYTES.
pub fn get_upload_config() -> Result<UploadConfig, UploadConfigError> {
    let dir = PathBuf::from(env_or_default("UPLOAD_DIR", DEFAULT_UPLOAD_DIR));
    let max_bytes = match env_or_default("MAX_UPLOAD_BYTES", "").as_str() {
        "" => DEFAULT_MAX_UPLOAD_BYTES,
        v => v.parse::<usize>()?,
    };
    if max_bytes == 0 {
        return Err(UploadConfigError::ZeroMaxBytes);
    }
    Ok(UploadConfig { dir, max_bytes })
}
