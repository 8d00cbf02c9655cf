use axum::{
    extract::{Json, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel_async::RunQueryDsl;

use core_bta::analyze_report;
use data_model_bta::api::{AnalysisResponse, AnalyzeError, JobQueuedResponse};
use data_model_bta::cache::{find_cached_result, store_analysis_result};
use data_model_bta::db::DbPool;
use data_model_bta::models::{AnalysisJob, NewAnalysisResult};
use data_model_bta::schema::analysis_jobs;

use crate::state::AppState;
use crate::upload::{ReportUpload, receive_report, remove_upload};

/// POST /api/analyze - Analyse an uploaded report and wait for the result
///
/// A report this user already had analysed is answered from the cache. The upload is
/// deleted afterwards either way.
pub async fn post_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AnalyzeError> {
    let upload = receive_report(multipart, &state.uploads.dir).await?;
    let response = analyze_upload(&state, &upload).await;
    remove_upload(&upload.file_path).await;
    Ok((StatusCode::OK, Json(response?)))
}

async fn analyze_upload(state: &AppState, upload: &ReportUpload) -> Result<AnalysisResponse, AnalyzeError> {
    {
        let mut conn = state.pool.get().await?;
        if let Some(cached) = find_cached_result(&mut conn, &upload.file_hash, upload.user_id).await? {
            tracing::info!(
                "Cache hit for '{}' ({}): result {}",
                upload.filename,
                upload.file_hash,
                cached.id
            );
            return Ok(AnalysisResponse::from_result(
                cached,
                upload.filename.clone(),
                upload.query.clone(),
                true,
            ));
        }
    }

    let outcome = analyze_report(state.llm.as_ref(), &state.crew, &upload.file_path, &upload.query)
        .await
        .map_err(|e| {
            tracing::warn!("Analysis of '{}' failed: {}", upload.filename, e);
            AnalyzeError::analysis_failure(e)
        })?;

    let mut conn = state.pool.get().await?;
    let stored = store_analysis_result(
        &mut conn,
        &NewAnalysisResult::new(
            upload.user_id,
            upload.filename.clone(),
            upload.file_hash.clone(),
            upload.query.clone(),
            outcome.analysis,
            outcome.processing_time_secs,
        ),
    )
    .await?;
    tracing::info!(
        "Analysed '{}' in {}s: result {}",
        upload.filename,
        outcome.processing_time_secs,
        stored.id
    );

    Ok(AnalysisResponse::from_result(
        stored,
        upload.filename.clone(),
        upload.query.clone(),
        false,
    ))
}

/// POST /api/analyze/async - Queue an uploaded report for the worker
///
/// The worker owns the upload from here on. It is only deleted now if queueing fails.
pub async fn post_analyze_async(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AnalyzeError> {
    let upload = receive_report(multipart, &state.uploads.dir).await?;
    let job = AnalysisJob::queued(
        upload.user_id,
        upload.filename.clone(),
        upload.file_path.to_string_lossy().into_owned(),
        upload.file_hash.clone(),
        upload.query.clone(),
    );

    if let Err(e) = enqueue_job(&state.pool, &job).await {
        tracing::error!("Could not queue '{}': {:?}", upload.filename, e);
        remove_upload(&upload.file_path).await;
        return Err(e);
    }
    tracing::info!("[job: {}] Queued '{}'", job.job_id, upload.filename);

    Ok((
        StatusCode::ACCEPTED,
        Json(JobQueuedResponse {
            job_id: job.job_id,
            status: job.status,
            file_processed: upload.filename,
        }),
    ))
}

async fn enqueue_job(pool: &DbPool, job: &AnalysisJob) -> Result<(), AnalyzeError> {
    let mut conn = pool.get().await?;
    diesel::insert_into(analysis_jobs::table)
        .values(job)
        .execute(&mut conn)
        .await?;
    Ok(())
}
