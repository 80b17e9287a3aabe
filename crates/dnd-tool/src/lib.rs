mod case;
mod runner;
mod source;

pub use case::{ExpectedVerdict, SubmissionCase, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, run_case, RunReport, SubmissionOutcome};
pub use source::{discover_cases, read_exercise_from_dir, read_test_case};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DndToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No .xml exercise under {path}.")]
    SourceEmpty { path: PathBuf },
    #[error("Expected one .xml exercise under {path}, found {count}.")]
    SourceAmbiguous { path: PathBuf, count: usize },
    #[error("Testcase for {path} lists no submissions.")]
    CaseEmpty { path: PathBuf },
    #[error("Failed to serialize testcase input: {0}")]
    CaseSerialize(serde_json::Error),
    #[error("Grading \"{name}\" failed: {source}")]
    Grading {
        name: String,
        source: dnd_core::DndError,
    },
    #[error("Verdict mismatch for \"{name}\": expected {expected}, got {actual}.")]
    VerdictMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}
