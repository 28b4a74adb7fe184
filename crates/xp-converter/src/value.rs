use std::sync::OnceLock;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use regex::Regex;
use xp_core::ConvertError;

use crate::options::KnownClasses;

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Renders raw attribute/text content as a PHP literal, guessing its type.
pub fn format_scalar(raw: &str, known: &KnownClasses) -> String {
    if raw.eq_ignore_ascii_case("true") {
        return "true".to_string();
    }
    if raw.eq_ignore_ascii_case("false") {
        return "false".to_string();
    }
    if raw.eq_ignore_ascii_case("null") {
        return "null".to_string();
    }

    if let Ok(number) = raw.parse::<i64>() {
        if number.to_string() == raw {
            return raw.to_string();
        }
    }

    if raw.contains('.') {
        if let Ok(number) = raw.parse::<f64>() {
            if number.is_finite() && number.to_string() == raw {
                return raw.to_string();
            }
        }
    }

    format_string(raw, known)
}

/// Renders a value that is a string by declaration; known class names become
/// `\Name::class`.
pub fn format_string(raw: &str, known: &KnownClasses) -> String {
    if let Some(class) = known.resolve(raw) {
        return format!("\\{}::class", class);
    }
    quote_string(raw)
}

/// Single-quoted PHP literal whose decoded value equals `raw` byte for byte.
///
/// Backslashes only need doubling when PHP would otherwise read one of them
/// as part of an escape sequence (`\\`, `\'`, or a trailing `\` that would
/// swallow the closing quote).
pub fn quote_string(raw: &str) -> String {
    let double_backslashes = raw.ends_with('\\') || raw.contains("\\\\") || raw.contains("\\'");
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for ch in raw.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' if double_backslashes => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// `\NAME` or `\Class::NAME` reference to a PHP constant.
pub fn format_constant(raw: &str) -> Result<String, ConvertError> {
    let name = raw.trim();
    if !constant_regex().is_match(name) {
        return Err(ConvertError::new(
            "CONSTANT_INVALID",
            format!("\"{}\" is not a valid PHP constant name.", raw),
        ));
    }
    Ok(format!("\\{}", name.strip_prefix('\\').unwrap_or(name)))
}

/// Decoded base64 content: a quoted string when it is printable UTF-8,
/// otherwise a runtime `base64_decode(...)` call.
pub fn format_binary(raw: &str) -> Result<String, ConvertError> {
    let compact = raw
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect::<String>();
    let bytes = LENIENT_BASE64.decode(compact.as_bytes()).map_err(|error| {
        ConvertError::new(
            "BINARY_INVALID",
            format!("Binary value is not valid base64: {}.", error),
        )
    })?;

    match String::from_utf8(bytes) {
        Ok(text) if is_printable(&text) => Ok(quote_string(&text)),
        _ => Ok(format!("base64_decode({})", quote_string(&compact))),
    }
}

/// Dispatches on a declared `type` attribute; any other type falls back to
/// [`format_scalar`].
pub fn format_typed_value(
    raw: &str,
    declared: Option<&str>,
    known: &KnownClasses,
) -> Result<String, ConvertError> {
    match declared {
        Some("string") => Ok(format_string(raw, known)),
        Some("constant") => format_constant(raw),
        Some("binary") => format_binary(raw),
        _ => Ok(format_scalar(raw, known)),
    }
}

fn is_printable(text: &str) -> bool {
    text.chars()
        .all(|ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r'))
}

fn constant_regex() -> &'static Regex {
    static CONSTANT: OnceLock<Regex> = OnceLock::new();
    CONSTANT.get_or_init(|| {
        Regex::new(
            r"^\\?[A-Za-z_][A-Za-z0-9_]*(?:\\[A-Za-z_][A-Za-z0-9_]*)*(?:::[A-Za-z_][A-Za-z0-9_]*)?$",
        )
        .expect("constant regex must compile")
    })
}
