use std::path::Path;

use xp_converter::{convert_xml, KnownClasses, TranslateOptions};
use xp_core::ConvertError;

use crate::source::{read_fixture_case, read_fixture_file, CASE_FILE_NAME};
use crate::{FixtureCase, XpToolError};

#[derive(Debug, Clone, PartialEq)]
pub enum FixtureOutcome {
    Converted(String),
    Failed(ConvertError),
}

pub fn fixture_options(case: &FixtureCase) -> TranslateOptions {
    let mut known_classes = KnownClasses::php_builtins();
    for name in &case.known_classes {
        known_classes.insert(name);
    }
    TranslateOptions {
        known_classes,
        ..TranslateOptions::default()
    }
}

pub fn run_fixture(fixture_dir: &Path, case: &FixtureCase) -> Result<FixtureOutcome, XpToolError> {
    let source = read_fixture_file(&fixture_dir.join(&case.input))?;
    match convert_xml(&source, &fixture_options(case)) {
        Ok(script) => Ok(FixtureOutcome::Converted(script)),
        Err(error) => Ok(FixtureOutcome::Failed(error)),
    }
}

pub fn assert_fixture(fixture_dir: &Path) -> Result<(), XpToolError> {
    let case = read_fixture_case(&fixture_dir.join(CASE_FILE_NAME))?;
    let outcome = run_fixture(fixture_dir, &case)?;

    match (&case.expected, &case.expected_error, outcome) {
        (Some(expected), _, FixtureOutcome::Converted(actual)) => {
            let expected = read_fixture_file(&fixture_dir.join(expected))?;
            compare_scripts(&expected, &actual)
        }
        (Some(_), _, FixtureOutcome::Failed(error)) => Err(XpToolError::UnexpectedError(error)),
        (None, Some(expected), FixtureOutcome::Failed(error)) => {
            let message_matches = expected
                .message_contains
                .as_deref()
                .map_or(true, |needle| error.message.contains(needle));
            if error.code != expected.code || !message_matches {
                return Err(XpToolError::ErrorMismatch {
                    expected_code: expected.code.clone(),
                    expected_message: expected.message_contains.clone().unwrap_or_default(),
                    actual: error,
                });
            }
            Ok(())
        }
        (None, Some(expected), FixtureOutcome::Converted(_)) => {
            Err(XpToolError::UnexpectedSuccess {
                expected_code: expected.code.clone(),
            })
        }
        (None, None, _) => Err(XpToolError::InvalidExpectation {
            path: fixture_dir.join(CASE_FILE_NAME),
        }),
    }
}

/// Reports the first differing line, 1-based.
fn compare_scripts(expected: &str, actual: &str) -> Result<(), XpToolError> {
    if expected == actual {
        return Ok(());
    }

    let mut expected_lines = expected.split('\n');
    let mut actual_lines = actual.split('\n');
    let mut line = 1usize;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(left), Some(right)) if left == right => line += 1,
            (left, right) => {
                return Err(XpToolError::OutputMismatch {
                    line,
                    expected: left.unwrap_or("<end of script>").to_string(),
                    actual: right.unwrap_or("<end of script>").to_string(),
                })
            }
        }
    }
}
