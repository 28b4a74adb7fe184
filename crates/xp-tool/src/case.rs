use serde::{Deserialize, Serialize};

pub const FIXTURE_SCHEMA_V1: &str = "xp-fixture.v1";

/// `case.json` next to a fixture's input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCase {
    pub schema_version: String,
    #[serde(default = "default_input")]
    pub input: String,
    /// Expected script file, relative to the fixture directory.
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub expected_error: Option<ExpectedError>,
    /// Classes registered on top of the PHP built-ins.
    #[serde(default)]
    pub known_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedError {
    pub code: String,
    #[serde(default)]
    pub message_contains: Option<String>,
}

fn default_input() -> String {
    "services.xml".to_string()
}
