//! # zedlang-base
//!
//! Core library for authorization schema (`.zed`) parsing, name resolution,
//! and the editor features built on top of them.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → Editor features (goto-definition, semantic tokens, folding)
//!   ↓
//! hir     → Resolver, reference index, semantic diagnostics
//!   ↓
//! syntax  → Schema model (definitions, relations, permissions, expressions)
//!   ↓
//! parser  → Lexer + recursive-descent parser
//!   ↓
//! base    → Primitives (SourcePos, SourceRange, LineIndex)
//! ```
//!
//! Every edit produces a fresh [`Schema`] and a fresh [`Resolver`] borrowing
//! it. Nothing is cached across document versions.
//!
//! ```
//! use zedlang::{parse, Resolver};
//!
//! let schema = parse("definition user {} definition doc { relation viewer: user }").unwrap();
//! let resolver = Resolver::new(&schema);
//! assert!(resolver.lookup_definition("doc").is_some());
//! ```

/// Foundation types: positions, ranges, line index
pub mod base;

/// Lexer and parser for schema source text
pub mod parser;

/// The positioned schema model produced by the parser
pub mod syntax;

/// Name resolution and reference enumeration
pub mod hir;

/// Editor features: goto-definition, semantic tokens, folding ranges
pub mod ide;

pub use base::{LineIndex, SourcePos, SourceRange};
pub use hir::{
    ArrowResolution, ReferenceKind, ReferenceNode, ReferenceSite, ResolvedReference, Resolver,
    find_reference_node,
};
pub use parser::{ParseError, ParseOptions, ParseOutput, parse, parse_with};
pub use syntax::{Definition, Permission, Relation, RelationOrPermission, RelationRef, Schema, TypeRef};
