pub mod common;
pub mod crew;
pub mod errors;
pub mod llms;
pub mod report;

#[cfg(any(test, feature = "test-helpers"))]
pub mod fixtures;

pub use common::*;
pub use crew::{AnalysisOutcome, Crew, CrewOutput, DEFAULT_QUERY, KickoffInputs, analyze_report, normalize_query};
pub use errors::Error;
pub use report::{extract_report_text, file_hash, read_blood_test_report, read_report};
