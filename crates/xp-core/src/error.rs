use crate::types::SourceSpan;
use thiserror::Error;

/// A fatal translation error.
///
/// `code` is a stable upper-snake identifier (`ARGUMENT_TYPE_UNSUPPORTED`,
/// `NAMESPACE_INVALID`, ...), `message` names the offending construct, and
/// `span`/`file` locate it in the source document when known.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct ConvertError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
    pub file: Option<String>,
}

impl ConvertError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
            file: None,
        }
    }

    pub fn with_span(
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: Some(span),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// `path:line:column`, or whichever parts are known.
    pub fn location_label(&self) -> Option<String> {
        match (&self.file, &self.span) {
            (Some(file), Some(span)) => Some(format!("{}:{}", file, span)),
            (Some(file), None) => Some(file.clone()),
            (None, Some(span)) => Some(span.to_string()),
            (None, None) => None,
        }
    }
}
