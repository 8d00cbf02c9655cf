//! Integration tests for API route handlers
//!
//! Tests key endpoints:
//! - GET / and GET /health - Liveness
//! - POST /api/analyze - Synchronous analysis, with caching
//! - POST /api/analyze/async - Queue a job
//! - GET /api/jobs/in_progress, /api/jobs/{job_id}, /api/jobs/{job_id}/result
//! - GET /api/results/{id}
//! - POST /api/users, GET /api/users/{id}, GET /api/users/{id}/results
//!
//! Upload validation is tested without a database. Everything else needs TEST_DATABASE_URL.

use std::{path::Path, sync::Arc};

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use core_bta::{
    UploadConfig,
    crew::{DEFAULT_QUERY, DISCLAIMER},
    fixtures::{sample_report_lines, sample_report_pdf},
    llms::{LlmProvider, mock::MockLlmProvider},
};
use data_model_bta::{
    api::{AnalysisResponse, JobDetailsResponse, JobQueuedResponse, ResultsListResponse, RootResponse},
    db::{DbPool, build_connection_pool},
    models::{AnalysisResult, JobStatus, User},
    test_helpers::{
        DB_TEST_MUTEX, clean_test_db, count_jobs_with_status, count_results, create_test_job, create_test_result,
        create_test_user, get_job_by_id, test_db_pool,
    },
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use api_bta::{routes::router, state::AppState};

const MAX_UPLOAD_BYTES: usize = 1024 * 1024;
const BOUNDARY: &str = "bta-test-boundary";

/// Helper to create a router backed by the given pool, LLM and upload directory
fn test_router(pool: DbPool, llm: Arc<dyn LlmProvider>, upload_dir: &Path) -> axum::Router {
    let uploads = UploadConfig {
        dir: upload_dir.to_path_buf(),
        max_bytes: MAX_UPLOAD_BYTES,
    };
    router(MAX_UPLOAD_BYTES).with_state(AppState::new(pool, llm, uploads))
}

/// A pool that never connects, for requests rejected before touching the database
fn offline_pool() -> DbPool {
    build_connection_pool("postgres://nobody@127.0.0.1:1/offline").unwrap()
}

/// Helper to parse JSON response body
async fn response_json<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

enum Part<'a> {
    File { filename: &'a str, bytes: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { filename, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}").as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn files_in(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

//
// Routes that never touch the database
//

#[tokio::test]
async fn test_root() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let response = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: RootResponse = response_json(response.into_body()).await;
    assert_eq!(body.message, "Blood Test Report Analyser API is running");
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"healthy");
}

#[tokio::test]
async fn test_analyze_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let request = multipart_request("/api/analyze", &[Part::Text { name: "query", value: "Am I ok?" }]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body, json!({ "error": "missing_file" }));
}

#[tokio::test]
async fn test_analyze_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let request = multipart_request(
        "/api/analyze/async",
        &[Part::File {
            filename: "report.docx",
            bytes: b"not a pdf",
        }],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(
        body,
        json!({ "error": "invalid_file_type", "details": "Only PDF files are supported" })
    );
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_analyze_rejects_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let request = multipart_request(
        "/api/analyze",
        &[Part::File {
            filename: "report.pdf",
            bytes: b"",
        }],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body, json!({ "error": "empty_file" }));
}

#[tokio::test]
async fn test_analyze_rejects_bad_user_id() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let pdf = sample_report_pdf(sample_report_lines());
    let request = multipart_request(
        "/api/analyze",
        &[
            Part::Text {
                name: "user_id",
                value: "patient-7",
            },
            Part::File {
                filename: "report.pdf",
                bytes: &pdf,
            },
        ],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body["error"], "invalid_field");
}

#[tokio::test]
async fn test_analyze_rejects_oversized_upload() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let too_big = vec![b'%'; MAX_UPLOAD_BYTES + 1];
    let request = multipart_request(
        "/api/analyze",
        &[Part::File {
            filename: "report.pdf",
            bytes: &too_big,
        }],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body["error"], "upload_too_large");
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_analyze_db_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockLlmProvider::with_medical_sections());
    let app = test_router(offline_pool(), mock.clone(), dir.path());

    let pdf = sample_report_pdf(sample_report_lines());
    let request = multipart_request(
        "/api/analyze",
        &[Part::File {
            filename: "report.pdf",
            bytes: &pdf,
        }],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body["error"], "unknown");
    assert!(mock.calls().is_empty(), "The cache lookup fails before the crew runs");
    assert_eq!(files_in(dir.path()), 0, "The upload is removed even when the database is down");
}

#[tokio::test]
async fn test_analyze_async_enqueue_failure_removes_upload() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let pdf = sample_report_pdf(sample_report_lines());
    let request = multipart_request(
        "/api/analyze/async",
        &[Part::File {
            filename: "report.pdf",
            bytes: &pdf,
        }],
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body["error"], "unknown");
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_post_user_rejects_malformed_body() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    for body in [json!({ "full_name": "No Email" }).to_string(), "{not json".to_string()] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = response_json(response.into_body()).await;
        assert_eq!(body["error"], "invalid_payload");
        assert!(body["details"].is_string());
    }
}

#[tokio::test]
async fn test_post_user_rejects_invalid_email() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(offline_pool(), Arc::new(MockLlmProvider::new()), dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": "not-an-email" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body, json!({ "error": "invalid_email" }));
}

//
// POST /api/analyze tests
//

#[tokio::test]
async fn test_analyze_then_cache_hit() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockLlmProvider::with_medical_sections());
    let app = test_router(pool.clone(), mock.clone(), dir.path());
    let pdf = sample_report_pdf(sample_report_lines());

    let response = app
        .clone()
        .oneshot(multipart_request(
            "/api/analyze",
            &[Part::File {
                filename: "blood_test.pdf",
                bytes: &pdf,
            }],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let first: AnalysisResponse = response_json(response.into_body()).await;
    assert_eq!(first.status, "success");
    assert_eq!(first.query, DEFAULT_QUERY);
    assert_eq!(first.file_processed, "blood_test.pdf");
    assert_eq!(first.message, "Analysis completed successfully");
    assert!(!first.cached);
    assert!(first.analysis.starts_with("## Medical Analysis"));
    assert!(first.analysis.ends_with(DISCLAIMER));
    assert_eq!(mock.calls().len(), 3);
    assert_eq!(count_results(&pool).await, 1);
    assert_eq!(files_in(dir.path()), 0, "upload should be removed");

    // Same bytes, same (anonymous) user: served from the cache without calling the LLM
    let response = app
        .oneshot(multipart_request(
            "/api/analyze",
            &[
                Part::Text {
                    name: "query",
                    value: "  Is my cholesterol high?  ",
                },
                Part::File {
                    filename: "renamed.pdf",
                    bytes: &pdf,
                },
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let second: AnalysisResponse = response_json(response.into_body()).await;
    assert!(second.cached);
    assert_eq!(second.result_id, first.result_id);
    assert_eq!(second.analysis, first.analysis);
    assert_eq!(second.query, "Is my cholesterol high?");
    assert_eq!(second.file_processed, "renamed.pdf");
    assert_eq!(mock.calls().len(), 3);
    assert_eq!(count_results(&pool).await, 1);
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_analyze_cache_is_per_user() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let user = create_test_user(&pool, "patient@example.com").await;
    let pdf = sample_report_pdf(sample_report_lines());
    // an anonymous analysis of the same file must not be served to the user
    create_test_result(&pool, None, &core_bta::file_hash(&pdf), "anonymous analysis").await;

    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockLlmProvider::with_medical_sections());
    let app = test_router(pool.clone(), mock.clone(), dir.path());

    let user_id = user.id.to_string();
    let response = app
        .oneshot(multipart_request(
            "/api/analyze",
            &[
                Part::Text {
                    name: "user_id",
                    value: &user_id,
                },
                Part::File {
                    filename: "blood_test.pdf",
                    bytes: &pdf,
                },
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: AnalysisResponse = response_json(response.into_body()).await;
    assert!(!body.cached);
    assert_ne!(body.analysis, "anonymous analysis");
    assert_eq!(mock.calls().len(), 3);
    assert_eq!(count_results(&pool).await, 2);
}

#[tokio::test]
async fn test_analyze_unreadable_pdf() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockLlmProvider::with_medical_sections());
    let app = test_router(pool.clone(), mock.clone(), dir.path());

    let response = app
        .oneshot(multipart_request(
            "/api/analyze",
            &[Part::File {
                filename: "scan.pdf",
                bytes: b"this is not really a pdf",
            }],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body["error"], "analysis_failure");
    assert!(
        body["details"]
            .as_str()
            .unwrap()
            .starts_with("Error processing blood report: ")
    );
    assert!(mock.calls().is_empty());
    assert_eq!(count_results(&pool).await, 0);
    assert_eq!(files_in(dir.path()), 0, "upload should be removed on failure too");
}

#[tokio::test]
async fn test_analyze_llm_failure() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let dir = tempfile::tempdir().unwrap();
    let app = test_router(pool.clone(), Arc::new(MockLlmProvider::with_failure()), dir.path());
    let pdf = sample_report_pdf(sample_report_lines());

    let response = app
        .oneshot(multipart_request(
            "/api/analyze",
            &[Part::File {
                filename: "blood_test.pdf",
                bytes: &pdf,
            }],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body["error"], "analysis_failure");
    assert_eq!(count_results(&pool).await, 0);
}

//
// POST /api/analyze/async tests
//

#[tokio::test]
async fn test_analyze_async_queues_job() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockLlmProvider::with_medical_sections());
    let app = test_router(pool.clone(), mock.clone(), dir.path());
    let pdf = sample_report_pdf(sample_report_lines());

    let response = app
        .oneshot(multipart_request(
            "/api/analyze/async",
            &[
                Part::Text {
                    name: "query",
                    value: "Is my iron low?",
                },
                Part::File {
                    filename: "blood_test.pdf",
                    bytes: &pdf,
                },
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body: JobQueuedResponse = response_json(response.into_body()).await;
    assert_eq!(body.status, JobStatus::Queued);
    assert_eq!(body.file_processed, "blood_test.pdf");

    let job = get_job_by_id(&pool, body.job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.query, "Is my iron low?");
    assert_eq!(job.file_hash, core_bta::file_hash(&pdf));
    assert_eq!(job.user_id, None);
    // the worker owns the file now
    assert_eq!(std::fs::read(&job.file_path).unwrap(), pdf);
    assert!(mock.calls().is_empty());
}

//
// Job tests
//

#[tokio::test]
async fn test_get_job_and_unknown_job() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let job = create_test_job(&pool, "/tmp/report.pdf", "hash-1", JobStatus::Running).await;
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(pool.clone(), Arc::new(MockLlmProvider::new()), dir.path());

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/jobs/{}", job.job_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let details: JobDetailsResponse = response_json(response.into_body()).await;
    assert_eq!(details.job_id, job.job_id);
    assert_eq!(details.status, JobStatus::Running);

    let response = app
        .oneshot(get_request(&format!("/api/jobs/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body, json!({ "error": "unknown_id" }));
}

#[tokio::test]
async fn test_get_in_progress_jobs() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let queued = create_test_job(&pool, "/tmp/a.pdf", "a", JobStatus::Queued).await;
    let running = create_test_job(&pool, "/tmp/b.pdf", "b", JobStatus::Running).await;
    create_test_job(&pool, "/tmp/c.pdf", "c", JobStatus::Success).await;
    create_test_job(&pool, "/tmp/d.pdf", "d", JobStatus::Failure).await;

    let dir = tempfile::tempdir().unwrap();
    let app = test_router(pool.clone(), Arc::new(MockLlmProvider::new()), dir.path());

    let response = app.oneshot(get_request("/api/jobs/in_progress")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let jobs: Vec<JobDetailsResponse> = response_json(response.into_body()).await;
    let mut ids: Vec<uuid::Uuid> = jobs.iter().map(|j| j.job_id).collect();
    ids.sort();
    let mut expected = vec![queued.job_id, running.job_id];
    expected.sort();
    assert_eq!(ids, expected);
    assert_eq!(count_jobs_with_status(&pool, JobStatus::Success).await, 1);
}

#[tokio::test]
async fn test_get_job_result_states() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let queued = create_test_job(&pool, "/tmp/a.pdf", "a", JobStatus::Queued).await;
    let failed = create_test_job(&pool, "/tmp/b.pdf", "b", JobStatus::Failure).await;
    let result = create_test_result(&pool, None, "c", "All good").await;
    let succeeded = create_test_job(&pool, "/tmp/c.pdf", "c", JobStatus::Success).await;
    {
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use data_model_bta::schema::analysis_jobs;

        let mut conn = pool.get().await.unwrap();
        diesel::update(analysis_jobs::table.find(succeeded.job_id))
            .set(analysis_jobs::result_id.eq(result.id))
            .execute(&mut conn)
            .await
            .unwrap();
        diesel::update(analysis_jobs::table.find(failed.job_id))
            .set(analysis_jobs::error_message.eq("Error reading PDF file: bad xref"))
            .execute(&mut conn)
            .await
            .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let app = test_router(pool.clone(), Arc::new(MockLlmProvider::new()), dir.path());

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/jobs/{}/result", queued.job_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body, json!({ "error": "not_finished", "details": "queued" }));

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/jobs/{}/result", failed.job_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response_json(response.into_body()).await;
    assert_eq!(
        body,
        json!({ "error": "job_failed", "details": "Error reading PDF file: bad xref" })
    );

    let response = app
        .oneshot(get_request(&format!("/api/jobs/{}/result", succeeded.job_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: AnalysisResult = response_json(response.into_body()).await;
    assert_eq!(body, result);
}

//
// Result tests
//

#[tokio::test]
async fn test_get_result() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let result = create_test_result(&pool, None, "hash", "Stored analysis").await;
    let dir = tempfile::tempdir().unwrap();
    let app = test_router(pool.clone(), Arc::new(MockLlmProvider::new()), dir.path());

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/results/{}", result.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: AnalysisResult = response_json(response.into_body()).await;
    assert_eq!(body, result);

    let response = app
        .oneshot(get_request(&format!("/api/results/{}", result.id + 1000)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//
// User tests
//

#[tokio::test]
async fn test_create_and_get_user() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let dir = tempfile::tempdir().unwrap();
    let app = test_router(pool.clone(), Arc::new(MockLlmProvider::new()), dir.path());

    let create = || {
        Request::builder()
            .method("POST")
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "patient@example.com", "full_name": "Pat Ient" }).to_string(),
            ))
            .unwrap()
    };

    let response = app.clone().oneshot(create()).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: User = response_json(response.into_body()).await;
    assert_eq!(user.email, "patient@example.com");
    assert_eq!(user.full_name.as_deref(), Some("Pat Ient"));
    assert!(user.is_active);

    let response = app.clone().oneshot(create()).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response_json(response.into_body()).await;
    assert_eq!(body, json!({ "error": "email_taken" }));

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/users/{}", user.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: User = response_json(response.into_body()).await;
    assert_eq!(fetched.id, user.id);

    let response = app
        .oneshot(get_request(&format!("/api/users/{}", user.id + 1000)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_user_results_newest_first() {
    let Some(pool) = test_db_pool().await else {
        return;
    };
    let _guard = DB_TEST_MUTEX.lock().await;
    clean_test_db(&pool).await;

    let user = create_test_user(&pool, "patient@example.com").await;
    let older = create_test_result(&pool, Some(user.id), "a", "older").await;
    let newer = create_test_result(&pool, Some(user.id), "b", "newer").await;
    create_test_result(&pool, None, "c", "someone else").await;

    let dir = tempfile::tempdir().unwrap();
    let app = test_router(pool.clone(), Arc::new(MockLlmProvider::new()), dir.path());

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/users/{}/results", user.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: ResultsListResponse = response_json(response.into_body()).await;
    let ids: Vec<i32> = body.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let response = app
        .oneshot(get_request(&format!("/api/users/{}/results", user.id + 1000)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
