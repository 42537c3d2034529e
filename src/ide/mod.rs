//! IDE features: high-level APIs for editor handlers.
//!
//! This module sits between the semantic model (HIR) and an editor
//! integration. Each function corresponds to one editor request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: take a schema or resolver in, return data out
//! 2. **No LSP types**: positions are 1-based [`SourceRange`]s, converted at
//!    the protocol boundary
//! 3. **Composable**: built on [`Resolver`] queries only
//!
//! ## Usage
//!
//! ```
//! use zedlang::{parse, Resolver};
//! use zedlang::ide::goto_definition;
//!
//! let schema = parse("definition user {} definition doc { relation viewer: user }").unwrap();
//! let resolver = Resolver::new(&schema);
//!
//! let result = goto_definition(&resolver, 1, 55).unwrap();
//! assert_eq!(result.targets[0].name, "user");
//! ```
//!
//! [`SourceRange`]: crate::base::SourceRange
//! [`Resolver`]: crate::hir::Resolver

mod folding;
mod goto;
mod semantic_tokens;

pub use folding::{FoldingRange, FoldingRangeKind, folding_ranges};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use semantic_tokens::{SemanticToken, TokenType, semantic_tokens};
