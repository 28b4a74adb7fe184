use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{FixtureCase, XpToolError, FIXTURE_SCHEMA_V1};

pub const CASE_FILE_NAME: &str = "case.json";

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures")
}

/// Immediate subdirectories of `root` that contain a `case.json`, sorted.
pub fn fixture_dirs(root: &Path) -> Result<Vec<PathBuf>, XpToolError> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| XpToolError::Scan {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() && entry.path().join(CASE_FILE_NAME).is_file() {
            dirs.push(entry.path().to_path_buf());
        }
    }

    if dirs.is_empty() {
        return Err(XpToolError::FixturesEmpty {
            path: root.to_path_buf(),
        });
    }
    Ok(dirs)
}

pub fn read_fixture_case(case_path: &Path) -> Result<FixtureCase, XpToolError> {
    let raw = read_fixture_file(case_path)?;
    let parsed: FixtureCase =
        serde_json::from_str(&raw).map_err(|source| XpToolError::ParseCase {
            path: case_path.to_path_buf(),
            source,
        })?;

    if parsed.schema_version != FIXTURE_SCHEMA_V1 {
        return Err(XpToolError::InvalidSchemaVersion {
            expected: FIXTURE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    if parsed.expected.is_some() == parsed.expected_error.is_some() {
        return Err(XpToolError::InvalidExpectation {
            path: case_path.to_path_buf(),
        });
    }

    Ok(parsed)
}

pub fn read_fixture_file(path: &Path) -> Result<String, XpToolError> {
    fs::read_to_string(path).map_err(|source| XpToolError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}
