//! Memoization of finished analyses.
//!
//! A stored analysis is looked up by the MD5 of the uploaded PDF together with the
//! uploading user. Anonymous uploads (no user) form their own cache partition.

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{AnalysisResult, NewAnalysisResult};
use crate::schema::analysis_results;

/// Gets the most recent analysis for the file hash and user, if there is one.
pub async fn find_cached_result(
    conn: &mut AsyncPgConnection,
    file_hash: &str,
    user_id: Option<i32>,
) -> Result<Option<AnalysisResult>, diesel::result::Error> {
    let query = analysis_results::table
        .filter(analysis_results::file_hash.eq(file_hash))
        .into_boxed::<Pg>();

    let query = match user_id {
        Some(id) => query.filter(analysis_results::user_id.eq(id)),
        None => query.filter(analysis_results::user_id.is_null()),
    };

    query
        .order((analysis_results::created_at.desc(), analysis_results::id.desc()))
        .select(AnalysisResult::as_select())
        .first(conn)
        .await
        .optional()
}

/// Inserts a finished analysis, returning the stored row.
pub async fn store_analysis_result(
    conn: &mut AsyncPgConnection,
    result: &NewAnalysisResult,
) -> Result<AnalysisResult, diesel::result::Error> {
    diesel::insert_into(analysis_results::table)
        .values(result)
        .returning(AnalysisResult::as_returning())
        .get_result(conn)
        .await
}
