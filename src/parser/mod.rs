//! Lexer and parser for schema source text.
//!
//! [`parse`] is the strict entry point: the first syntax error aborts and no
//! schema is returned. [`parse_with`] and [`ParseOptions::best_effort`] keep
//! collecting later declarations for tooling that wants partial results.

mod error;
pub mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Token, TokenKind, tokenize};

use crate::syntax::Schema;

/// Options controlling how the parser reacts to syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Skip to the next declaration after an error instead of stopping.
    pub recover: bool,
    /// Stop collecting after this many errors when recovering.
    pub max_errors: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recover: false,
            max_errors: 100,
        }
    }
}

impl ParseOptions {
    /// Stop at the first error; no schema on failure.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Recover at statement level and return whatever parsed.
    pub fn best_effort() -> Self {
        Self {
            recover: true,
            ..Self::default()
        }
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors.max(1);
        self
    }
}

/// Result of [`parse_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    /// Always `Some` when recovering; `None` after a strict failure.
    pub schema: Option<Schema>,
    /// Errors in document order.
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Collapse into the strict contract: any error means no schema.
    pub fn into_result(self) -> Result<Schema, ParseError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.schema.unwrap_or_default()),
        }
    }
}

/// Parse `source`, failing on the first syntax error.
pub fn parse(source: &str) -> Result<Schema, ParseError> {
    parse_with(source, &ParseOptions::strict()).into_result()
}

/// Parse `source` with explicit options.
pub fn parse_with(source: &str, options: &ParseOptions) -> ParseOutput {
    let tokens = lexer::tokenize(source);
    let output = parser::Parser::new(&tokens, options).parse_schema();

    tracing::debug!(
        definitions = output.schema.as_ref().map_or(0, |s| s.definitions.len()),
        errors = output.errors.len(),
        recover = options.recover,
        "parsed schema"
    );

    output
}
