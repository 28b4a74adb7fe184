use xp_core::ConvertError;
use xp_parser::XmlElementNode;

use crate::options::TranslateOptions;
use crate::value::{format_scalar, format_string};

const INDENT_UNIT: &str = "    ";

/// Indentation and nesting state threaded through every translator.
pub(crate) struct TranslateContext<'a> {
    options: &'a TranslateOptions,
    indent: usize,
    nesting: usize,
}

impl<'a> TranslateContext<'a> {
    pub(crate) fn new(options: &'a TranslateOptions) -> Self {
        Self {
            options,
            indent: 0,
            nesting: 0,
        }
    }

    /// Newline followed by the current indentation.
    pub(crate) fn nl(&self) -> String {
        format!("\n{}", INDENT_UNIT.repeat(self.indent))
    }

    pub(crate) fn indented<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, ConvertError>,
    ) -> Result<T, ConvertError> {
        self.indent += 1;
        let result = body(self);
        self.indent -= 1;
        result
    }

    /// Runs `body` one value level deeper, failing once `max_nesting` is exceeded.
    pub(crate) fn nested<T>(
        &mut self,
        node: &XmlElementNode,
        body: impl FnOnce(&mut Self) -> Result<T, ConvertError>,
    ) -> Result<T, ConvertError> {
        if self.nesting >= self.options.max_nesting {
            return Err(ConvertError::with_span(
                "NESTING_TOO_DEEP",
                format!(
                    "Value nesting exceeds the limit of {} levels at <{}>.",
                    self.options.max_nesting, node.name
                ),
                node.location.clone(),
            ));
        }
        self.nesting += 1;
        let result = body(self);
        self.nesting -= 1;
        result
    }

    pub(crate) fn string(&self, raw: &str) -> String {
        format_string(raw, &self.options.known_classes)
    }

    pub(crate) fn scalar(&self, raw: &str) -> String {
        format_scalar(raw, &self.options.known_classes)
    }

    pub(crate) fn options(&self) -> &TranslateOptions {
        self.options
    }

    /// Single-line comments become `//`, multi-line ones a `/* ... */` block.
    pub(crate) fn comment(&self, text: &str) -> String {
        let nl = self.nl();
        let lines = text.trim().split('\n').collect::<Vec<_>>();
        if lines.len() == 1 {
            let line = format!("// {}", lines[0].trim().replace("?>", "? >"));
            return format!("{}{}", nl, line.trim_end());
        }

        let mut out = format!("{}/*", nl);
        for line in lines {
            let line = format!(" * {}", line.trim().replace("*/", "* /"));
            out.push_str(&nl);
            out.push_str(line.trim_end());
        }
        out.push_str(&nl);
        out.push_str(" */");
        out
    }
}
