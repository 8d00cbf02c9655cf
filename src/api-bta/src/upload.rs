//! Receiving uploaded blood test reports.

use std::path::{Path, PathBuf};

use axum::extract::{Multipart, multipart::MultipartError};
use axum::http::StatusCode;
use core_bta::{file_hash, normalize_query};
use data_model_bta::api::AnalyzeError;
use uuid::Uuid;

/// A validated report, saved to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportUpload {
    /// Name the client gave the file.
    pub filename: String,
    pub file_path: PathBuf,
    pub file_hash: String,
    /// Already normalized.
    pub query: String,
    pub user_id: Option<i32>,
}

/// True for names ending in `.pdf`, ignoring case.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Reads the `file`, `query` and `user_id` fields, validates the file and writes it into `upload_dir`.
/// Unknown fields are ignored.
pub async fn receive_report(mut multipart: Multipart, upload_dir: &Path) -> Result<ReportUpload, AnalyzeError> {
    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    let mut query: Option<String> = None;
    let mut user_id: Option<i32> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_field)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid_field)?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("query") => {
                query = Some(field.text().await.map_err(invalid_field)?);
            }
            Some("user_id") => {
                let text = field.text().await.map_err(invalid_field)?;
                user_id = parse_user_id(&text)?;
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or(AnalyzeError::MissingFile)?;
    let filename = match filename {
        Some(name) if is_pdf_filename(&name) => name,
        _ => return Err(AnalyzeError::invalid_file_type()),
    };
    if bytes.is_empty() {
        return Err(AnalyzeError::EmptyFile);
    }

    let file_path = save_upload(upload_dir, &bytes).await?;
    tracing::debug!("Saved '{}' ({} bytes) to {:?}", filename, bytes.len(), file_path);

    Ok(ReportUpload {
        filename,
        file_path,
        file_hash: file_hash(&bytes),
        query: normalize_query(query.as_deref()),
        user_id,
    })
}

/// Blank means anonymous.
fn parse_user_id(text: &str) -> Result<Option<i32>, AnalyzeError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<i32>()
        .map(Some)
        .map_err(|_| AnalyzeError::InvalidField(format!("user_id must be an integer, got '{}'", text)))
}

/// Bodies over the upload limit are 413, everything else is a bad field.
fn invalid_field(error: MultipartError) -> AnalyzeError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AnalyzeError::UploadTooLarge(error.body_text())
    } else {
        AnalyzeError::InvalidField(error.body_text())
    }
}

/// Writes the bytes to `{upload_dir}/blood_test_report_{uuid}.pdf`, creating the directory if needed.
/// The returned path is absolute so that a worker started elsewhere can find it.
async fn save_upload(upload_dir: &Path, bytes: &[u8]) -> Result<PathBuf, AnalyzeError> {
    tokio::fs::create_dir_all(upload_dir).await.map_err(upload_failure)?;
    let dir = tokio::fs::canonicalize(upload_dir).await.map_err(upload_failure)?;
    let file_path = dir.join(format!("blood_test_report_{}.pdf", Uuid::new_v4()));
    tokio::fs::write(&file_path, bytes).await.map_err(upload_failure)?;
    Ok(file_path)
}

fn upload_failure(error: std::io::Error) -> AnalyzeError {
    AnalyzeError::UploadFailure(error.to_string())
}

/// Deletes an upload. Failing to delete is logged, never returned.
pub async fn remove_upload(file_path: &Path) {
    match tokio::fs::remove_file(file_path).await {
        Ok(()) => tracing::debug!("Removed upload {:?}", file_path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove upload {:?}: {}", file_path, e),
    }
}
