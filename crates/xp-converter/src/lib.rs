//! Translation of Symfony dependency-injection XML service definitions into
//! the equivalent PHP configurator script.

mod argument;
mod construct;
mod driver;
mod emitter;
mod options;
mod section;
mod service;
mod value;
mod xml_utils;

use std::fs;
use std::path::Path;

use tracing::debug;
use xp_core::ConvertError;
use xp_parser::parse_xml_document;

pub use driver::{translate, SERVICES_NAMESPACE};
pub use options::{KnownClasses, TranslateOptions, DEFAULT_MAX_NESTING};
pub use value::{
    format_binary, format_constant, format_scalar, format_string, format_typed_value,
    quote_string,
};

/// Parses and translates an XML document held in memory.
pub fn convert_xml(source: &str, options: &TranslateOptions) -> Result<String, ConvertError> {
    let document = parse_xml_document(source)?;
    translate(&document, options)
}

/// Reads, parses and translates one `.xml` file. Errors carry the file path.
pub fn convert_file(path: &Path, options: &TranslateOptions) -> Result<String, ConvertError> {
    let label = path.display().to_string();
    let is_xml = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("xml"));
    if !is_xml {
        return Err(ConvertError::new(
            "FILE_EXTENSION_INVALID",
            format!("Only .xml files can be converted, got \"{}\".", label),
        )
        .with_file(label));
    }

    let source = fs::read_to_string(path).map_err(|error| {
        ConvertError::new(
            "FILE_READ_ERROR",
            format!("Failed to read \"{}\": {}", label, error),
        )
        .with_file(label.clone())
    })?;

    debug!(file = %label, bytes = source.len(), "converting file");
    convert_xml(&source, options).map_err(|error| error.with_file(label))
}
