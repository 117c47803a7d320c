//! CSS errors and recoverable parse warnings

use plume_color::ColorError;

/// Fatal stylesheet error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CssError {
    #[error("Nesting too deep: more than {limit} levels")]
    TooDeep { limit: usize },

    #[error("Too many media queries: more than {limit}")]
    TooManyMediaQueries { limit: usize },

    #[error("Property name too long: {length} bytes (max {limit})")]
    PropertyNameTooLong { length: usize, limit: usize },

    #[error("Property value too long: {length} bytes (max {limit})")]
    PropertyValueTooLong { length: usize, limit: usize },

    #[error(transparent)]
    Color(#[from] ColorError),
}

/// What a recovered parse problem was
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarningKind {
    #[error("@import of {url:?} ignored: imports must precede all other rules")]
    LateImport { url: String },

    #[error("malformed @import: {text}")]
    MalformedImport { text: String },

    #[error("declaration without ':' skipped: {text}")]
    MissingColon { text: String },

    #[error("declaration without a value skipped: {property}")]
    MissingValue { property: String },

    #[error("rule without selector skipped")]
    EmptySelector,

    #[error("unexpected text skipped: {text}")]
    UnexpectedText { text: String },

    #[error("unterminated block after {selector:?}")]
    UnterminatedBlock { selector: String },

    #[error("statement at-rule @{name} dropped")]
    DroppedAtRule { name: String },
}

/// Recoverable problem recorded while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseWarning {
    pub kind: WarningKind,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in bytes)
    pub column: usize,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.kind)
    }
}

impl ParseWarning {
    /// Locate `pos` (a byte offset into `input`) and build the warning.
    pub(crate) fn at(input: &str, pos: usize, kind: WarningKind) -> Self {
        let pos = pos.min(input.len());
        let before = &input.as_bytes()[..pos];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = match before.iter().rposition(|&b| b == b'\n') {
            Some(newline) => pos - newline,
            None => pos + 1,
        };
        Self { kind, line, column }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_position() {
        let input = "a { }\nb { x }";
        let warning = ParseWarning::at(input, 10, WarningKind::EmptySelector);
        assert_eq!(warning.line, 2);
        assert_eq!(warning.column, 5);
        assert_eq!(warning.to_string(), "2:5: rule without selector skipped");
    }

    #[test]
    fn test_error_messages_name_limit() {
        let err = CssError::TooDeep { limit: 10 };
        assert!(err.to_string().contains("10"));
    }
}
