use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use data_model_bta::api::{JobDetailsResponse, JobError};
use data_model_bta::models::{AnalysisJob, AnalysisResult, JobStatus};
use data_model_bta::schema::{analysis_jobs, analysis_results};

use crate::state::AppState;

// GET /api/jobs/in_progress - List all queued or running jobs, oldest first
pub async fn get_in_progress_jobs(State(state): State<AppState>) -> Result<impl IntoResponse, JobError> {
    let mut conn = state.pool.get().await?;

    let jobs: Vec<JobDetailsResponse> = analysis_jobs::table
        .filter(
            analysis_jobs::status
                .eq(JobStatus::Queued)
                .or(analysis_jobs::status.eq(JobStatus::Running)),
        )
        .order((analysis_jobs::created_at.asc(), analysis_jobs::job_id.asc()))
        .select(AnalysisJob::as_select())
        .load(&mut conn)
        .await?
        .into_iter()
        .map(JobDetailsResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(jobs)))
}

// GET /api/jobs/{job_id} - Get full job details by job_id
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, JobError> {
    let mut conn = state.pool.get().await?;
    let job = analysis_jobs::table
        .find(job_id)
        .select(AnalysisJob::as_select())
        .first(&mut conn)
        .await?;

    Ok((StatusCode::OK, Json(JobDetailsResponse::from(job))))
}

// GET /api/jobs/{job_id}/result - The stored analysis of a successful job
pub async fn get_job_result(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, JobError> {
    let mut conn = state.pool.get().await?;
    let job = analysis_jobs::table
        .find(job_id)
        .select(AnalysisJob::as_select())
        .first(&mut conn)
        .await?;

    let result_id = match job.status {
        JobStatus::Queued | JobStatus::Running => return Err(JobError::NotFinished(job.status)),
        JobStatus::Failure => {
            return Err(JobError::JobFailed(
                job.error_message.unwrap_or_else(|| "unknown failure".to_string()),
            ));
        }
        JobStatus::Success => job
            .result_id
            .ok_or_else(|| JobError::Unknown(format!("job {} succeeded without a result", job_id)))?,
    };

    let result = analysis_results::table
        .find(result_id)
        .select(AnalysisResult::as_select())
        .first(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                JobError::Unknown(format!("result {} of job {} is missing", result_id, job_id))
            }
            _ => e.into(),
        })?;

    Ok((StatusCode::OK, Json(result)))
}
