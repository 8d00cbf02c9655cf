use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use data_model_bta::api::ResultError;
use data_model_bta::models::AnalysisResult;
use data_model_bta::schema::analysis_results;

use crate::state::AppState;

// GET /api/results/{id} - One stored analysis
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ResultError> {
    let mut conn = state.pool.get().await?;
    let result = analysis_results::table
        .find(id)
        .select(AnalysisResult::as_select())
        .first(&mut conn)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}
