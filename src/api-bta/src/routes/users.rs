use axum::{
    extract::{Json, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use data_model_bta::api::{CreateUserPayload, ResultsListResponse, UserError};
use data_model_bta::models::{AnalysisResult, NewUser, User};
use data_model_bta::schema::{analysis_results, users};

use crate::state::AppState;

/// Loose sanity check: something on both sides of an `@`.
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

/// POST /api/users - Register a user
pub async fn post_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, UserError> {
    let Json(payload) = payload.map_err(|rejection| UserError::InvalidPayload(rejection.body_text()))?;
    let email = payload.email.trim().to_string();
    if !is_plausible_email(&email) {
        return Err(UserError::InvalidEmail);
    }
    let full_name = payload.full_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    let mut conn = state.pool.get().await?;
    let user = diesel::insert_into(users::table)
        .values(&NewUser { email, full_name })
        .returning(User::as_returning())
        .get_result(&mut conn)
        .await?;
    tracing::info!("Created user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/{id}
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> Result<impl IntoResponse, UserError> {
    let mut conn = state.pool.get().await?;
    let user = users::table
        .find(id)
        .select(User::as_select())
        .first(&mut conn)
        .await?;

    Ok((StatusCode::OK, Json(user)))
}

/// GET /api/users/{id}/results - The user's analyses, newest first
pub async fn get_user_results(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, UserError> {
    let mut conn = state.pool.get().await?;

    // 404 for unknown users rather than an empty list
    users::table
        .find(id)
        .select(users::id)
        .first::<i32>(&mut conn)
        .await?;

    let items = analysis_results::table
        .filter(analysis_results::user_id.eq(id))
        .order((analysis_results::created_at.desc(), analysis_results::id.desc()))
        .select(AnalysisResult::as_select())
        .load(&mut conn)
        .await?;

    Ok((StatusCode::OK, Json(ResultsListResponse { items })))
}
