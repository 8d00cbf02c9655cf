//! Reading blood test reports.
//!
//! Text is extracted page by page and lightly cleaned: runs of three newlines collapse to
//! two, double spaces collapse to one, and every page is trimmed. Pages are separated by
//! a blank line.

use std::path::{Path, PathBuf};

use crate::Error;

/// Reads the PDF at `path` and returns its cleaned text.
pub fn read_blood_test_report(path: &Path) -> Result<String, Error> {
    let bytes = std::fs::read(path)?;
    extract_report_text(&bytes)
}

/// Same as `read_blood_test_report` but runs on tokio's blocking thread pool.
pub async fn read_report(path: impl Into<PathBuf>) -> Result<String, Error> {
    let path = path.into();
    tokio::task::spawn_blocking(move || read_blood_test_report(&path)).await?
}

/// Extracts and cleans the text of an in-memory PDF.
pub fn extract_report_text(pdf_bytes: &[u8]) -> Result<String, Error> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes))
        .map_err(|_| Error::PdfRead("the PDF parser could not make sense of this file".to_string()))??;

    let report = join_pages(pages.iter().map(String::as_str));
    if report.is_empty() {
        Err(Error::EmptyReport)
    } else {
        Ok(report)
    }
}

/// Cleans up each page's text and joins the pages with blank lines.
pub fn join_pages<'a>(pages: impl IntoIterator<Item = &'a str>) -> String {
    let mut full_report = String::new();
    for page in pages {
        full_report.push_str(&clean_page_text(page));
        full_report.push_str("\n\n");
    }
    full_report.trim().to_string()
}

/// A single left-to-right pass of each replacement, then a trim.
pub fn clean_page_text(page: &str) -> String {
    page.replace("\n\n\n", "\n\n").replace("  ", " ").trim().to_string()
}

/// The cache key of an uploaded report: lowercase MD5 hex of its raw bytes.
pub fn file_hash(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}
