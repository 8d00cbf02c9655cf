use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::PoolError;
use crate::models::{AnalysisJob, AnalysisResult, JobStatus};

// API Error Types

/// Error for POST /api/analyze and POST /api/analyze/async
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum AnalyzeError {
    /// The multipart form had no `file` field
    #[serde(rename = "missing_file")]
    MissingFile,
    /// The uploaded file is not named `*.pdf`
    #[serde(rename = "invalid_file_type")]
    InvalidFileType(String),
    /// The uploaded file has no content
    #[serde(rename = "empty_file")]
    EmptyFile,
    /// A form field could not be read or parsed
    #[serde(rename = "invalid_field")]
    InvalidField(String),
    /// The request body is over MAX_UPLOAD_BYTES
    #[serde(rename = "upload_too_large")]
    UploadTooLarge(String),
    /// The upload could not be written to disk
    #[serde(rename = "upload_failure")]
    UploadFailure(String),
    /// Reading the report or running the crew failed
    #[serde(rename = "analysis_failure")]
    AnalysisFailure(String),
    /// Unknown error occurred
    #[serde(rename = "unknown")]
    Unknown(String),
}

impl AnalyzeError {
    pub const INVALID_FILE_TYPE_MESSAGE: &'static str = "Only PDF files are supported";

    pub fn invalid_file_type() -> Self {
        AnalyzeError::InvalidFileType(Self::INVALID_FILE_TYPE_MESSAGE.to_string())
    }

    /// Wraps a processing error in the message shown to API callers.
    pub fn analysis_failure(error: impl std::fmt::Display) -> Self {
        AnalyzeError::AnalysisFailure(format!("Error processing blood report: {}", error))
    }
}

/// Error for GET /api/jobs/{job_id} and GET /api/jobs/{job_id}/result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum JobError {
    /// The job_id was not found in the database
    #[serde(rename = "unknown_id")]
    UnknownId,
    /// The job is still queued or running
    #[serde(rename = "not_finished")]
    NotFinished(JobStatus),
    /// The worker failed the job
    #[serde(rename = "job_failed")]
    JobFailed(String),
    /// Unknown error occurred
    #[serde(rename = "unknown")]
    Unknown(String),
}

/// Error for GET /api/results/{id}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum ResultError {
    /// No stored analysis has this id
    #[serde(rename = "unknown_id")]
    UnknownId,
    /// Unknown error occurred
    #[serde(rename = "unknown")]
    Unknown(String),
}

/// Error for the /api/users endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum UserError {
    /// No user has this id
    #[serde(rename = "unknown_id")]
    UnknownId,
    /// Another user already registered this email
    #[serde(rename = "email_taken")]
    EmailTaken,
    /// The email is not plausibly an address
    #[serde(rename = "invalid_email")]
    InvalidEmail,
    /// The JSON body is malformed or misses a required field
    #[serde(rename = "invalid_payload")]
    InvalidPayload(String),
    /// Unknown error occurred
    #[serde(rename = "unknown")]
    Unknown(String),
}

// API Payload Types

/// Response payload for GET /
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// Response payload for POST /api/analyze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: String,
    pub query: String,
    pub analysis: String,
    pub file_processed: String,
    pub message: String,
    /// True when the analysis came from a previous upload of the same file
    pub cached: bool,
    pub result_id: i32,
}

impl AnalysisResponse {
    pub fn from_result(result: AnalysisResult, file_processed: String, query: String, cached: bool) -> Self {
        AnalysisResponse {
            status: "success".to_string(),
            query,
            analysis: result.analysis,
            file_processed,
            message: "Analysis completed successfully".to_string(),
            cached,
            result_id: result.id,
        }
    }
}

/// Response payload for POST /api/analyze/async
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobQueuedResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub file_processed: String,
}

/// Response payload for GET /api/jobs/{job_id}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetailsResponse {
    pub job_id: Uuid,
    pub user_id: Option<i32>,
    pub filename: String,
    pub query: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result_id: Option<i32>,
    pub error_message: Option<String>,
}

impl From<AnalysisJob> for JobDetailsResponse {
    // The on-disk upload location stays internal.
    fn from(job: AnalysisJob) -> Self {
        JobDetailsResponse {
            job_id: job.job_id,
            user_id: job.user_id,
            filename: job.filename,
            query: job.query,
            status: job.status,
            created_at: job.created_at,
            completed_at: job.completed_at,
            result_id: job.result_id,
            error_message: job.error_message,
        }
    }
}

/// Response payload for GET /api/users/{id}/results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsListResponse {
    pub items: Vec<AnalysisResult>,
}

/// Input payload for POST /api/users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserPayload {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

macro_rules! from_error {
    ($lib_err:path, $err_type:tt) => {
        /// Converts a `$lib_err` into an `$err_type::Unknown`.
        impl From<$lib_err> for $err_type {
            fn from(e: $lib_err) -> Self {
                $err_type::Unknown(format!("{:?}", e))
            }
        }
    };
}

macro_rules! from_diesel_not_found_error {
    ($err_type:tt) => {
        /// Converts a `diesel::result::Error::NotFound` into an `$err_type::UnknownId`
        /// otherwise it's a `$err_type::Unknown(diesel::result::Error)`.
        impl From<diesel::result::Error> for $err_type {
            fn from(e: diesel::result::Error) -> Self {
                match e {
                    diesel::result::Error::NotFound => $err_type::UnknownId,
                    _ => $err_type::Unknown(format!("{:?}", e)),
                }
            }
        }
    };
}

// AnalyzeError

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AnalyzeError::MissingFile
            | AnalyzeError::InvalidFileType(_)
            | AnalyzeError::EmptyFile
            | AnalyzeError::InvalidField(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AnalyzeError::UploadFailure(_) | AnalyzeError::AnalysisFailure(_) | AnalyzeError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(self)).into_response()
    }
}

from_error!(PoolError, AnalyzeError);
from_error!(diesel::result::Error, AnalyzeError);

// JobError

impl IntoResponse for JobError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            JobError::UnknownId => StatusCode::NOT_FOUND,
            JobError::NotFinished(_) => StatusCode::CONFLICT,
            JobError::JobFailed(_) | JobError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

from_error!(PoolError, JobError);
from_diesel_not_found_error!(JobError);

// ResultError

impl IntoResponse for ResultError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            ResultError::UnknownId => StatusCode::NOT_FOUND,
            ResultError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

from_error!(PoolError, ResultError);
from_diesel_not_found_error!(ResultError);

// UserError

impl IntoResponse for UserError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            UserError::UnknownId => StatusCode::NOT_FOUND,
            UserError::EmailTaken => StatusCode::CONFLICT,
            UserError::InvalidEmail | UserError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            UserError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

from_error!(PoolError, UserError);

impl From<diesel::result::Error> for UserError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => UserError::UnknownId,
            diesel::result::Error::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, _) => {
                UserError::EmailTaken
            }
            _ => UserError::Unknown(err.to_string()),
        }
    }
}
