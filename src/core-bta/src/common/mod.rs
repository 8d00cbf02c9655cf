pub mod db_env;
pub mod env;
pub mod health;
pub mod hostname;
pub mod llm_config;
pub mod logging;
pub mod max_concurrency;
pub mod poll_interval;
pub mod tls_config;
pub mod uploads;

pub use db_env::{DbEnvError, get_database_url, get_db_pool};
pub use env::{env_or_default, is_env_set};
pub use health::health_check;
pub use hostname::{HostPortError, get_api_base_url};
pub use llm_config::{LlmConfig, get_llm_config};
pub use logging::setup_logging;
pub use max_concurrency::{MaxConcurrencyError, get_max_concurrency};
pub use poll_interval::{TimeUnit, get_poll_interval};
pub use tls_config::{TlsConfigError, get_tls_config};
pub use uploads::{UploadConfig, UploadConfigError, get_upload_config};

/// Serializes tests that mutate process-wide environment variables.
#[cfg(test)]
pub(crate) static ENV_TEST_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
