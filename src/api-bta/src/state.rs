use std::sync::Arc;

use core_bta::{Crew, UploadConfig, llms::LlmProvider};
use data_model_bta::db::DbPool;

/// Everything a request handler needs.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub llm: Arc<dyn LlmProvider>,
    pub crew: Arc<Crew>,
    pub uploads: UploadConfig,
}

impl AppState {
    /// State running the medical crew.
    pub fn new(pool: DbPool, llm: Arc<dyn LlmProvider>, uploads: UploadConfig) -> Self {
        Self {
            pool,
            llm,
            crew: Arc::new(Crew::medical()),
            uploads,
        }
    }
}
