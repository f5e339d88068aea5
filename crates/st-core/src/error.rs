use crate::types::SourceSpan;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct SigTableError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl SigTableError {
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
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::types::SourceLocation;

    #[test]
    fn display_joins_code_and_message() {
        let error = SigTableError::new("SCOPE_NOT_FOUND", "no such scope \"io\"");
        assert_eq!(error.to_string(), "SCOPE_NOT_FOUND: no such scope \"io\"");
        assert!(error.span.is_none());
    }

    #[test]
    fn with_span_keeps_location() {
        let span = SourceSpan {
            start: SourceLocation { line: 3, column: 5 },
            end: SourceLocation { line: 3, column: 9 },
        };
        let error = SigTableError::with_span("GO_PARSE_ERROR", "unexpected token", span.clone());
        assert_eq!(error.span, Some(span));
    }
}
