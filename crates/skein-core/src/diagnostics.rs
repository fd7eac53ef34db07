//! Rendering of parse and validation errors.

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;

use crate::error::{ParseError, StoryError, ValidationError};

/// A diagnostic message with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Byte range in the source.
    pub span: std::ops::Range<usize>,
    /// Headline message.
    pub message: String,
    /// Text attached to the highlighted span.
    pub label: Option<String>,
}

impl Diagnostic {
    /// Diagnostic pointing at a 1-based source line.
    pub fn at_line(source: &str, line: usize, message: impl Into<String>) -> Self {
        Self {
            span: line_span(source, line),
            message: message.into(),
            label: None,
        }
    }

    /// Attach a label to the highlighted span.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Diagnostic for a parse error.
    pub fn from_parse_error(source: &str, error: &ParseError) -> Self {
        Self::at_line(source, error.line, error.kind.to_string())
    }

    /// Diagnostic for a validation finding.
    pub fn from_validation_error(source: &str, error: &ValidationError) -> Self {
        let diag = Self::at_line(source, error.line(), error.to_string());
        match error {
            ValidationError::DeadEnd { .. } => diag.with_label("add a divert or a gather"),
            ValidationError::UnknownIdentifier { name, .. } => {
                diag.with_label(format!("'{name}' is not declared"))
            }
            ValidationError::VariableShadowsPath { .. } => diag.with_label("rename the variable"),
        }
    }

    /// Diagnostics for everything wrong with a story.
    pub fn from_story_error(source: &str, error: &StoryError) -> Vec<Self> {
        match error {
            StoryError::Parse(e) => vec![Self::from_parse_error(source, e)],
            StoryError::Validation(errors) => errors
                .iter()
                .map(|e| Self::from_validation_error(source, e))
                .collect(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

/// Byte range of a 1-based line, without its line break.
///
/// Lines past the end map to an empty span at the end of the source.
pub fn line_span(source: &str, line: usize) -> std::ops::Range<usize> {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let content = text.trim_end_matches(['\n', '\r']);
            return offset..offset + content.len();
        }
        offset += text.len();
    }
    source.len()..source.len()
}

/// Render diagnostics using ariadne for pretty terminal output.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let span = (filename, diag.span.clone());
        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        Report::build(ReportKind::Error, span)
            .with_message(&diag.message)
            .with_label(
                Label::new((filename, diag.span.clone()))
                    .with_message(label_text)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}
