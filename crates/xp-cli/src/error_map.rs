use std::fmt::Display;

use xp_core::ConvertError;

fn map_error(code: &'static str, error: impl Display) -> ConvertError {
    ConvertError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: &ConvertError) -> i32 {
    println!("RESULT:ERROR");
    if let Some(location) = error.location_label() {
        println!("ERROR_FILE:{}", location);
    }
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> ConvertError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: impl Display) -> ConvertError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> ConvertError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_target_write(error: std::io::Error) -> ConvertError {
    map_error("CLI_TARGET_WRITE", error)
}
