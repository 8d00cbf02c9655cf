use std::{path::Path, sync::Arc, time::Instant};

use chrono::Utc;
use core_bta::{Crew, KickoffInputs, llms::LlmProvider, read_report};
use data_model_bta::{
    cache::find_cached_result,
    db::DbPool,
    models::{AnalysisJob, AnalysisResult, JobStatus, NewAnalysisResult},
    schema,
};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::errors::Error;

/// Outcome of working on one job, before it is recorded.
#[derive(Debug)]
pub enum JobResult {
    /// The crew produced an analysis.
    Success { analysis: String, processing_time_secs: u64 },
    /// An earlier analysis of the same file for the same user already exists.
    Cached { result_id: i32 },
    /// The uploaded PDF could not be read (no analysis to store)
    ReadFailed { error: Error },
    /// The report was read but the crew failed
    AnalysisFailed { error: Error },
}

/// Query the DB for a job to be performed.
/// The semaphore controls the maximum number of concurrent jobs that the worker can handle.
pub async fn next_job_in_queue(
    pool: &DbPool,
    semaphore: Arc<Semaphore>,
) -> Result<(AnalysisJob, OwnedSemaphorePermit), Error> {
    // Acquire a permit before touching the DB.
    // This will block if we've reached max_concurrency, effectively queuing tasks.
    // If no job is claimed the permit is dropped on return.
    tracing::debug!("Acquiring semaphore before checking for new job to acquire.");
    let permit = semaphore.acquire_owned().await?;
    tracing::debug!("Semaphore permit acquired. Querying DB for jobs.");

    let mut conn = pool.get().await?;

    let job = conn
        .transaction::<_, Error, _>(|conn| {
            Box::pin(async move {
                // FOR UPDATE SKIP LOCKED lets several workers claim jobs without conflicts.
                // Oldest first, ties broken by job_id.
                let mut job: AnalysisJob = schema::analysis_jobs::table
                    .filter(schema::analysis_jobs::status.eq(JobStatus::Queued))
                    .for_update()
                    .skip_locked()
                    .order((
                        schema::analysis_jobs::created_at.asc(),
                        schema::analysis_jobs::job_id.asc(),
                    ))
                    .first::<AnalysisJob>(conn)
                    .await?;

                diesel::update(schema::analysis_jobs::table.find(job.job_id))
                    .set(schema::analysis_jobs::status.eq(JobStatus::Running))
                    .execute(conn)
                    .await?;
                job.status = JobStatus::Running;

                Ok(job)
            })
        })
        .await?;

    Ok((job, permit))
}

/// Reads the job's report and runs the crew on it.
pub async fn handle_job<P: LlmProvider + ?Sized>(provider: &P, crew: &Crew, job: &AnalysisJob) -> JobResult {
    let start = Instant::now();

    let report = match read_report(&job.file_path).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("[job: {}] Failed to read '{}': {}", job.job_id, job.file_path, e);
            return JobResult::ReadFailed { error: e.into() };
        }
    };
    tracing::debug!("[job: {}] Read report ({} characters)", job.job_id, report.len());

    let inputs = KickoffInputs {
        query: job.query.clone(),
        report,
    };
    match crew.kickoff(provider, &inputs).await {
        Ok(output) => {
            let processing_time_secs = start.elapsed().as_secs();
            tracing::debug!("[job: {}] Crew finished in {}s", job.job_id, processing_time_secs);
            JobResult::Success {
                analysis: output.report(),
                processing_time_secs,
            }
        }
        Err(e) => {
            tracing::warn!("[job: {}] Crew failed: {}", job.job_id, e);
            JobResult::AnalysisFailed { error: e.into() }
        }
    }
}

/// Records the result: stores the analysis (if any) and completes the job in one transaction.
pub async fn handle_result(pool: &DbPool, job: &AnalysisJob, result: JobResult) -> Result<(), Error> {
    let mut conn = pool.get().await?;

    match result {
        JobResult::Success {
            analysis,
            processing_time_secs,
        } => {
            let new_result = NewAnalysisResult::new(
                job.user_id,
                job.filename.clone(),
                job.file_hash.clone(),
                job.query.clone(),
                analysis,
                processing_time_secs,
            );

            let result_id = conn
                .transaction::<_, diesel::result::Error, _>(|conn| {
                    Box::pin(async move {
                        let stored: AnalysisResult = diesel::insert_into(schema::analysis_results::table)
                            .values(&new_result)
                            .returning(AnalysisResult::as_returning())
                            .get_result(conn)
                            .await?;

                        diesel::update(schema::analysis_jobs::table.find(job.job_id))
                            .set((
                                schema::analysis_jobs::status.eq(JobStatus::Success),
                                schema::analysis_jobs::result_id.eq(stored.id),
                                schema::analysis_jobs::completed_at.eq(Utc::now()),
                            ))
                            .execute(conn)
                            .await?;

                        Ok(stored.id)
                    })
                })
                .await?;

            tracing::info!(
                "[job: {}] Stored analysis of '{}' as result {}",
                job.job_id,
                job.filename,
                result_id
            );
            Ok(())
        }

        JobResult::Cached { result_id } => {
            complete_job(&mut conn, job, JobStatus::Success, Some(result_id), None).await?;
            tracing::info!(
                "[job: {}] '{}' was already analysed: result {}",
                job.job_id,
                job.filename,
                result_id
            );
            Ok(())
        }

        JobResult::ReadFailed { error } | JobResult::AnalysisFailed { error } => {
            tracing::error!(
                "[job: {}] Failed to analyse '{}' Error: {}",
                job.job_id,
                job.filename,
                error
            );
            complete_job(&mut conn, job, JobStatus::Failure, None, Some(error.to_string())).await?;
            tracing::debug!("[job: {}] Marked job as failed", job.job_id);
            Ok(())
        }
    }
}

async fn complete_job(
    conn: &mut diesel_async::AsyncPgConnection,
    job: &AnalysisJob,
    status: JobStatus,
    result_id: Option<i32>,
    error_message: Option<String>,
) -> Result<(), diesel::result::Error> {
    diesel::update(schema::analysis_jobs::table.find(job.job_id))
        .set((
            schema::analysis_jobs::status.eq(status),
            schema::analysis_jobs::result_id.eq(result_id),
            schema::analysis_jobs::error_message.eq(error_message),
            schema::analysis_jobs::completed_at.eq(Utc::now()),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

/// Works a claimed job from start to finish: cache check, analysis, recording, upload cleanup.
///
/// The upload is only deleted once the outcome is recorded, so a job whose result could not be
/// written still has its file.
pub async fn process_job<P: LlmProvider + ?Sized>(
    pool: &DbPool,
    provider: &P,
    crew: &Crew,
    job: &AnalysisJob,
) -> Result<(), Error> {
    let result = match cached_result_id(pool, job).await {
        Ok(Some(result_id)) => JobResult::Cached { result_id },
        Ok(None) => handle_job(provider, crew, job).await,
        Err(e) => {
            tracing::warn!("[job: {}] Cache lookup failed, analysing anyway: {}", job.job_id, e);
            handle_job(provider, crew, job).await
        }
    };

    handle_result(pool, job, result).await?;
    remove_job_file(job).await;
    Ok(())
}

async fn cached_result_id(pool: &DbPool, job: &AnalysisJob) -> Result<Option<i32>, Error> {
    let mut conn = pool.get().await?;
    let cached = find_cached_result(&mut conn, &job.file_hash, job.user_id).await?;
    Ok(cached.map(|r| r.id))
}

async fn remove_job_file(job: &AnalysisJob) {
    let path = Path::new(&job.file_path);
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("[job: {}] Removed {:?}", job.job_id, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("[job: {}] Could not remove {:?}: {}", job.job_id, path, e),
    }
}
