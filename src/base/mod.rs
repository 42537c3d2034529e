//! Foundation types for the zedlang toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`SourcePos`], [`SourceRange`] - 1-based line/column positions
//! - [`LineIndex`] - byte offset to line/column conversion
//! - [`PositionCursor`] - the same conversion in one forward pass
//!
//! This module has NO dependencies on other zedlang modules.

mod span;

pub use span::{LineIndex, PositionCursor, SourcePos, SourceRange, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
