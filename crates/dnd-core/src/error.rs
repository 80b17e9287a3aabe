use crate::types::SourceSpan;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct DndError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl DndError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
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
        }
    }

    /// Submission errors are system failures, not wrong answers.
    pub fn is_submission_error(&self) -> bool {
        self.code.starts_with("SUBMISSION_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_code_and_message() {
        let error = DndError::new("XML_PARSE_ERROR", "bad");
        assert_eq!(error.to_string(), "XML_PARSE_ERROR: bad");
        assert!(error.span.is_none());
    }

    #[test]
    fn submission_errors_are_distinguishable() {
        assert!(DndError::new("SUBMISSION_SHAPE", "x").is_submission_error());
        assert!(!DndError::new("RULE_UNKNOWN", "x").is_submission_error());
    }
}
