//! Test utilities for database operations
//!
//! This module provides helpers for connecting to the test database,
//! creating test data, and cleaning up after tests.
//!
//! Database-backed tests only run when `TEST_DATABASE_URL` is set. Start the
//! database with `scripts/setup_test_db.sh`, which applies the migrations.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tokio::sync::Mutex;

use crate::db::{DbPool, establish_connection_pool};
use crate::models::{AnalysisJob, AnalysisResult, JobStatus, NewAnalysisResult, NewUser, User};
use crate::schema;

/// Serializes tests that share the test database within one test binary.
pub static DB_TEST_MUTEX: Mutex<()> = Mutex::const_new(());

// =============================================================================
// Database Test Helpers
// =============================================================================

/// Get a connection pool for the test database
///
/// Uses the TEST_DATABASE_URL environment variable. Returns None (and prints a
/// skip notice) if it's not set, so that callers can skip database tests.
pub async fn test_db_pool() -> Option<DbPool> {
    match std::env::var("TEST_DATABASE_URL") {
        Ok(database_url) if !database_url.trim().is_empty() => Some(
            establish_connection_pool(&database_url)
                .await
                .expect("Failed to create test database pool - is the test database running?"),
        ),
        _ => {
            println!("[SKIP] TEST_DATABASE_URL is not set");
            None
        }
    }
}

/// Clean all data from the test database
///
/// Truncates every table to ensure a clean slate for tests.
/// This should be called at the beginning of tests that need an empty database.
pub async fn clean_test_db(pool: &DbPool) {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    diesel::delete(schema::analysis_jobs::table)
        .execute(&mut conn)
        .await
        .expect("Failed to clean analysis_jobs table");

    diesel::delete(schema::analysis_results::table)
        .execute(&mut conn)
        .await
        .expect("Failed to clean analysis_results table");

    diesel::delete(schema::users::table)
        .execute(&mut conn)
        .await
        .expect("Failed to clean users table");
}

/// Create a test user with the given email
pub async fn create_test_user(pool: &DbPool, email: &str) -> User {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    diesel::insert_into(schema::users::table)
        .values(&NewUser {
            email: email.to_string(),
            full_name: Some("Test Patient".to_string()),
        })
        .returning(User::as_returning())
        .get_result(&mut conn)
        .await
        .expect("Failed to insert test user")
}

/// Create a stored analysis for a file hash
pub async fn create_test_result(pool: &DbPool, user_id: Option<i32>, file_hash: &str, analysis: &str) -> AnalysisResult {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    let new_result = NewAnalysisResult::new(
        user_id,
        "blood_test.pdf".to_string(),
        file_hash.to_string(),
        "Provide a comprehensive analysis of my blood test report".to_string(),
        analysis.to_string(),
        3,
    );

    diesel::insert_into(schema::analysis_results::table)
        .values(&new_result)
        .returning(AnalysisResult::as_returning())
        .get_result(&mut conn)
        .await
        .expect("Failed to insert test analysis result")
}

/// Create a test job in the database
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `file_path` - Where the job's PDF lives on disk
/// * `file_hash` - Cache key of the PDF
/// * `status` - Initial status of the job
///
/// # Returns
/// The created AnalysisJob with its generated UUID
pub async fn create_test_job(pool: &DbPool, file_path: &str, file_hash: &str, status: JobStatus) -> AnalysisJob {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    let mut new_job = AnalysisJob::queued(
        None,
        "blood_test.pdf".to_string(),
        file_path.to_string(),
        file_hash.to_string(),
        "Provide a comprehensive analysis of my blood test report".to_string(),
    );
    new_job.status = status;
    if status.is_completed() {
        new_job.completed_at = Some(Utc::now());
    }

    diesel::insert_into(schema::analysis_jobs::table)
        .values(&new_job)
        .execute(&mut conn)
        .await
        .expect("Failed to insert test job");

    new_job
}

/// Get a job by ID from the database
pub async fn get_job_by_id(pool: &DbPool, job_id: uuid::Uuid) -> Option<AnalysisJob> {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    schema::analysis_jobs::table
        .find(job_id)
        .select(AnalysisJob::as_select())
        .first(&mut conn)
        .await
        .ok()
}

/// Get a stored analysis by ID
pub async fn get_result_by_id(pool: &DbPool, id: i32) -> Option<AnalysisResult> {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    schema::analysis_results::table
        .find(id)
        .select(AnalysisResult::as_select())
        .first(&mut conn)
        .await
        .ok()
}

/// Count jobs with a specific status
pub async fn count_jobs_with_status(pool: &DbPool, status: JobStatus) -> i64 {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    schema::analysis_jobs::table
        .filter(schema::analysis_jobs::status.eq(status))
        .count()
        .get_result(&mut conn)
        .await
        .expect("Failed to count jobs")
}

/// Count stored analyses
pub async fn count_results(pool: &DbPool) -> i64 {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    schema::analysis_results::table
        .count()
        .get_result(&mut conn)
        .await
        .expect("Failed to count analysis results")
}

/// Update a job's status
pub async fn update_job_status(pool: &DbPool, job_id: uuid::Uuid, new_status: JobStatus) {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    diesel::update(schema::analysis_jobs::table.find(job_id))
        .set(schema::analysis_jobs::status.eq(new_status))
        .execute(&mut conn)
        .await
        .expect("Failed to update job status");
}
