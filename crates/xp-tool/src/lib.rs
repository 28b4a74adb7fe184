mod case;
mod runner;
mod source;

pub use case::{ExpectedError, FixtureCase, FIXTURE_SCHEMA_V1};
pub use runner::{assert_fixture, fixture_options, run_fixture, FixtureOutcome};
pub use source::{
    fixture_dirs, fixtures_root, read_fixture_case, read_fixture_file, workspace_root,
    CASE_FILE_NAME,
};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XpToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Failed to parse fixture case {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid fixture schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("Fixture case {path} must set exactly one of \"expected\" and \"expectedError\".")]
    InvalidExpectation { path: PathBuf },
    #[error("No fixture directories with case.json under {path}.")]
    FixturesEmpty { path: PathBuf },
    #[error("Translation failed unexpectedly: {0}")]
    UnexpectedError(xp_core::ConvertError),
    #[error("Translation succeeded but error {expected_code} was expected.")]
    UnexpectedSuccess { expected_code: String },
    #[error(
        "Expected error {expected_code} containing \"{expected_message}\", got {actual}."
    )]
    ErrorMismatch {
        expected_code: String,
        expected_message: String,
        actual: xp_core::ConvertError,
    },
    #[error("Output differs at line {line}. expected={expected:?} actual={actual:?}")]
    OutputMismatch {
        line: usize,
        expected: String,
        actual: String,
    },
}
