//! Semantic layer over a parsed [`Schema`](crate::syntax::Schema).
//!
//! - [`Resolver`] answers name lookups against one schema version
//! - [`reference_sites`] / [`find_reference_node`] enumerate and locate references
//! - [`check`] reports unresolved references and duplicate declarations

mod diagnostics;
mod references;
mod resolve;

pub use diagnostics::{
    Diagnostic, DiagnosticCollector, RelatedInfo, SemanticChecker, Severity, check, codes,
};
pub use references::{
    ReferenceKind, ReferenceNode, ReferenceSite, Resolution, ResolvedReference, find_reference_node,
    reference_sites,
};
pub use resolve::{
    ArrowBranch, ArrowFailure, ArrowResolution, ReferencedTypeAndRelation, Resolver,
};
