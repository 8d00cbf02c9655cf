use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use serde::{Deserialize, Serialize};
use std::io::Write;
use uuid::Uuid;

use crate::schema::sql_types;

// JobStatus enum
/// Status of an analysis job in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::JobStatus)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// A newly uploaded report waiting for a worker
    Queued,
    /// A worker claimed the job and is running the crew
    Running,
    /// Analysis stored in analysis_results
    Success,
    /// Reading the report or running the crew failed
    Failure,
}

impl JobStatus {
    // True if job's status is Success or Failure. False means it's Queued or Running.
    pub fn is_completed(&self) -> bool {
        match self {
            Self::Queued | Self::Running => false,
            Self::Success | Self::Failure => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Failure => "failure",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql<sql_types::JobStatus, Pg> for JobStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<sql_types::JobStatus, Pg> for JobStatus {
    fn from_sql(bytes: PgValue) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"queued" => Ok(JobStatus::Queued),
            b"running" => Ok(JobStatus::Running),
            b"success" => Ok(JobStatus::Success),
            b"failure" => Ok(JobStatus::Failure),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

// users table model (database representation)
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub email: String,
    pub full_name: Option<String>,
}

// analysis_results table model (database representation)
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::analysis_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnalysisResult {
    pub id: i32,
    pub user_id: Option<i32>,
    pub filename: String,
    pub file_hash: String,
    pub query: String,
    pub analysis: String,
    pub processing_time: i32,
    pub created_at: DateTime<Utc>,
}

impl PartialEq for AnalysisResult {
    // Two AnalysisResults are equivalent if all fields other than created_at are equivalent
    fn eq(&self, other: &AnalysisResult) -> bool {
        self.id == other.id
            && self.user_id == other.user_id
            && self.filename == other.filename
            && self.file_hash == other.file_hash
            && self.query == other.query
            && self.analysis == other.analysis
            && self.processing_time == other.processing_time
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::analysis_results)]
pub struct NewAnalysisResult {
    pub user_id: Option<i32>,
    pub filename: String,
    pub file_hash: String,
    pub query: String,
    pub analysis: String,
    pub processing_time: i32,
    pub created_at: DateTime<Utc>,
}

impl NewAnalysisResult {
    /// A result row stamped with the current time.
    /// Processing time is clamped into the column's range.
    pub fn new(
        user_id: Option<i32>,
        filename: String,
        file_hash: String,
        query: String,
        analysis: String,
        processing_time_secs: u64,
    ) -> Self {
        NewAnalysisResult {
            user_id,
            filename,
            file_hash,
            query,
            analysis,
            processing_time: i32::try_from(processing_time_secs).unwrap_or(i32::MAX),
            created_at: Utc::now(),
        }
    }
}

// analysis_jobs table model (database representation)
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::analysis_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnalysisJob {
    pub job_id: Uuid,
    pub user_id: Option<i32>,
    pub filename: String,
    pub file_path: String,
    pub file_hash: String,
    pub query: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result_id: Option<i32>,
    pub error_message: Option<String>,
}

impl AnalysisJob {
    /// A freshly uploaded report, queued for a worker.
    pub fn queued(
        user_id: Option<i32>,
        filename: String,
        file_path: String,
        file_hash: String,
        query: String,
    ) -> Self {
        AnalysisJob {
            job_id: Uuid::new_v4(),
            user_id,
            filename,
            file_path,
            file_hash,
            query,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            completed_at: None,
            result_id: None,
            error_message: None,
        }
    }
}
