use smol_str::SmolStr;

use crate::base::SourceRange;

/// A syntax error with the range it applies to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {range}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub range: SourceRange,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, range: SourceRange) -> Self {
        Self { kind, range }
    }

    /// The message without position information.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("unrecognized input `{0}`")]
    UnknownToken(SmolStr),
    #[error("expected {expected}, found `{found}`")]
    Unexpected {
        expected: &'static str,
        found: SmolStr,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("whitespace is not allowed inside type path `{0}`")]
    SpacedPath(SmolStr),
    #[error("expression is nested too deeply")]
    TooDeep,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourcePos;

    #[test]
    fn test_display_includes_range() {
        let error = ParseError::new(
            ParseErrorKind::Unexpected {
                expected: "`{`",
                found: "relation".into(),
            },
            SourceRange::new(SourcePos::new(3, 5), SourcePos::new(3, 13)),
        );

        assert_eq!(error.message(), "expected `{`, found `relation`");
        assert_eq!(
            error.to_string(),
            "expected `{`, found `relation` at 3:5-3:13"
        );
    }
}
