use std::env::VarError;

use data_model_bta::db::{ConnectionPoolError, DbPool, establish_connection_pool};

#[derive(Debug, thiserror::Error)]
pub enum DbEnvError {
    #[error("DATABASE_URL must be set in .env file or present as an env var: {0}")]
    MissingDatabaseUrl(#[from] VarError),
    #[error("Couldn't connect to the database: {0}")]
    Connection(#[from] ConnectionPoolError),
}

/// Uses the env var DATABASE_URL to establish a database connection pool using diesel.
pub async fn get_db_pool() -> Result<DbPool, DbEnvError> {
    let database_url = get_database_url()?;
    let pool = establish_connection_pool(&database_url).await?;
    Ok(pool)
}

/// Retrieves the value for the env var DATABASE_URL.
pub fn get_database_url() -> Result<String, VarError> {
    std::env::var("DATABASE_URL")
}
