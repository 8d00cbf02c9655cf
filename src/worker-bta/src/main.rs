use std::sync::Arc;

use anyhow::Context;
use core_bta::{
    Crew, TimeUnit, get_db_pool, get_llm_config, get_max_concurrency, get_poll_interval, llms::OpenAiProvider,
    setup_logging,
};
use tokio::sync::Semaphore;

use worker_bta::{Error, next_job_in_queue, process_job};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if it exists
    dotenvy::dotenv().ok();

    setup_logging("worker_bta=debug,core_bta=debug")?;

    let llm_config = get_llm_config();
    let provider = Arc::new(OpenAiProvider::new(&llm_config));
    tracing::info!("Using model '{}' at {}", provider.model(), llm_config.api_base);
    let crew = Arc::new(Crew::medical());

    let pool = get_db_pool().await?;

    let poll_interval = get_poll_interval(TimeUnit::Milliseconds, "WORKER_POLL_INTERVAL_MS", 600)
        .context("WORKER_POLL_INTERVAL_MS must be a valid number")?;
    let max_concurrency = get_max_concurrency(None)?;
    let semaphore = Arc::new(Semaphore::new(max_concurrency));
    tracing::info!(
        "Polling every {}ms with up to {} concurrent jobs",
        poll_interval.as_millis(),
        max_concurrency
    );

    // Worker polling loop
    loop {
        match next_job_in_queue(&pool, semaphore.clone()).await {
            Ok((job, permit)) => {
                tokio::spawn({
                    let pool = pool.clone();
                    let provider = provider.clone();
                    let crew = crew.clone();
                    async move {
                        // released when the job is done
                        let _permit = permit;
                        tracing::info!("[job: {}] Received '{}' with query '{}'", job.job_id, job.filename, job.query);
                        if let Err(error) = process_job(&pool, provider.as_ref(), &crew, &job).await {
                            tracing::error!(
                                "[SKIP] Failed to record result for job {} ('{}'). ERROR: {}",
                                job.job_id,
                                job.filename,
                                error
                            );
                        }
                    }
                });
            }
            Err(Error::RecordNotFound) => {}
            Err(error) => {
                tracing::error!("[SKIP] Error getting next job from DB queue: {}", error);
            }
        }
        tracing::debug!("Waiting to poll for next job");
        tokio::time::sleep(poll_interval).await;
    }
}
