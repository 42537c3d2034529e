//! Diagnostics: semantic error reporting.
//!
//! Turns the resolver's unresolved references and the duplicate declarations
//! it shadows into positioned [`Diagnostic`]s with stable codes. Syntax
//! errors convert through `From<&ParseError>` so callers can merge both
//! streams.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::references::{ReferenceNode, Resolution, ResolvedReference};
use super::resolve::{ArrowFailure, ArrowResolution, Resolver};
use crate::base::SourceRange;
use crate::parser::ParseError;
use crate::syntax::{ArrowExpr, Definition, RelationOrPermission, RelationRef, TypeRef};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: SourceRange,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub range: SourceRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn error(range: SourceRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(range, Severity::Error, message)
    }

    pub fn warning(range: SourceRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(range, Severity::Warning, message)
    }

    fn new(range: SourceRange, severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, range: SourceRange, message: impl Into<Arc<str>>) -> Self {
        self.related.push(RelatedInfo {
            range,
            message: message.into(),
        });
        self
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        Diagnostic::error(error.range, error.message()).with_code(codes::SYNTAX_ERROR)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Stable diagnostic codes.
pub mod codes {
    /// Type reference names no definition.
    pub const UNDEFINED_TYPE: &str = "E0001";
    /// Name not declared in the definition it is looked up in.
    pub const UNDEFINED_RELATION: &str = "E0002";
    /// No type reachable through an arrow declares the right-hand name.
    pub const UNDEFINED_ARROW_TARGET: &str = "E0003";
    /// Arrow left-hand side is a permission.
    pub const INVALID_ARROW_SOURCE: &str = "E0004";
    /// Definition name declared more than once.
    pub const DUPLICATE_DEFINITION: &str = "E0005";
    /// Relation or permission name declared more than once in one definition.
    pub const DUPLICATE_MEMBER: &str = "E0006";
    /// Syntax error from the parser.
    pub const SYNTAX_ERROR: &str = "E0100";

    /// Some, but not all, types reachable through an arrow declare the name.
    pub const PARTIAL_ARROW_TARGET: &str = "W0001";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during semantic analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn undefined_type(&mut self, type_ref: &TypeRef) {
        self.add(
            Diagnostic::error(type_ref.path_range, format!("undefined type `{}`", type_ref.path))
                .with_code(codes::UNDEFINED_TYPE),
        );
    }

    pub fn undefined_suffix(&mut self, type_ref: &TypeRef, definition: &Definition) {
        let name = type_ref.relation_name.as_deref().unwrap_or_default();
        self.add(
            Diagnostic::error(
                type_ref.relation_name_range.unwrap_or(type_ref.range),
                format!("`{}` has no relation or permission `{name}`", definition.name),
            )
            .with_code(codes::UNDEFINED_RELATION)
            .with_related(definition.name_range, format!("`{}` declared here", definition.name)),
        );
    }

    pub fn undefined_relation(&mut self, reference: &RelationRef, enclosing: &Definition) {
        self.add(
            Diagnostic::error(
                reference.range,
                format!(
                    "undefined relation or permission `{}` in `{}`",
                    reference.relation_name, enclosing.name
                ),
            )
            .with_code(codes::UNDEFINED_RELATION),
        );
    }

    pub fn invalid_arrow_source(&mut self, arrow: &ArrowExpr) {
        self.add(
            Diagnostic::error(
                arrow.left.range,
                format!(
                    "`{}` is a permission; arrows can only follow relations",
                    arrow.left.relation_name
                ),
            )
            .with_code(codes::INVALID_ARROW_SOURCE),
        );
    }

    pub fn arrow_target(&mut self, arrow: &ArrowExpr, resolution: &ArrowResolution<'_>) {
        let missing: Vec<&str> = resolution
            .missing_branches()
            .map(|branch| branch.definition.name.as_str())
            .collect();
        if missing.is_empty() {
            return;
        }

        let right = &arrow.right;
        let diagnostic = if resolution.is_resolved() {
            Diagnostic::warning(
                right.range,
                format!("`{}` is not defined on {}", right.relation_name, quoted(&missing)),
            )
            .with_code(codes::PARTIAL_ARROW_TARGET)
        } else {
            Diagnostic::error(
                right.range,
                format!(
                    "no type reachable through `{}` has `{}` (checked {})",
                    arrow.left.relation_name,
                    right.relation_name,
                    quoted(&missing)
                ),
            )
            .with_code(codes::UNDEFINED_ARROW_TARGET)
        };
        self.add(diagnostic);
    }

    pub fn duplicate_definition(&mut self, duplicate: &Definition, existing: &Definition) {
        self.add(
            Diagnostic::error(
                duplicate.name_range,
                format!("duplicate definition: `{}` is already defined", duplicate.name),
            )
            .with_code(codes::DUPLICATE_DEFINITION)
            .with_related(
                existing.name_range,
                format!("previous definition of `{}`", existing.name),
            ),
        );
    }

    /// `shadowed` is invisible to lookup because `resolved` answers for its name.
    pub fn duplicate_member(
        &mut self,
        shadowed: RelationOrPermission<'_>,
        resolved: RelationOrPermission<'_>,
        definition: &Definition,
    ) {
        self.add(
            Diagnostic::error(
                shadowed.name_range(),
                format!(
                    "`{}` is declared more than once in `{}`",
                    shadowed.name(),
                    definition.name
                ),
            )
            .with_code(codes::DUPLICATE_MEMBER)
            .with_related(
                resolved.name_range(),
                format!("`{}` resolves to this declaration", resolved.name()),
            ),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

fn quoted(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// SEMANTIC CHECKER
// ============================================================================

/// Performs semantic checks on one schema using its resolver.
pub struct SemanticChecker<'r, 'a> {
    resolver: &'r Resolver<'a>,
    collector: DiagnosticCollector,
}

impl<'r, 'a> SemanticChecker<'r, 'a> {
    pub fn new(resolver: &'r Resolver<'a>) -> Self {
        Self {
            resolver,
            collector: DiagnosticCollector::new(),
        }
    }

    /// Duplicate definition names and duplicate member names.
    pub fn check_declarations(&mut self) {
        let resolver = self.resolver;

        for definition in resolver.schema().definitions() {
            if !resolver.is_visible(definition) {
                if let Some(existing) = resolver.lookup_definition(&definition.name) {
                    self.collector.duplicate_definition(definition, existing);
                }
            }

            let mut seen: FxHashMap<&str, RelationOrPermission<'_>> = FxHashMap::default();
            for member in definition.members() {
                match seen.entry(member.name()) {
                    Entry::Occupied(mut entry) => {
                        // Flag whichever declaration lookup does not return.
                        let existing = *entry.get();
                        let resolved = definition.lookup_relation_or_permission(member.name());
                        if resolved.is_some_and(|r| r.range() == member.range()) {
                            self.collector.duplicate_member(existing, member, definition);
                            entry.insert(member);
                        } else {
                            self.collector.duplicate_member(member, existing, definition);
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(member);
                    }
                }
            }
        }
    }

    /// Every reference that does not fully resolve.
    pub fn check_references(&mut self) {
        for reference in self.resolver.resolved_references() {
            self.check_reference(&reference);
        }
    }

    fn check_reference(&mut self, reference: &ResolvedReference<'a>) {
        let enclosing = reference.site.enclosing_definition;

        match (reference.site.node, &reference.resolution) {
            (ReferenceNode::TypeRef(type_ref), Resolution::Type(None)) => {
                self.collector.undefined_type(type_ref);
            }
            (ReferenceNode::TypeRef(type_ref), Resolution::Type(Some(resolved))) => {
                if type_ref.relation_name.is_some() && resolved.relation.is_none() {
                    self.collector.undefined_suffix(type_ref, resolved.definition);
                }
            }
            (ReferenceNode::RelationRef(relation_ref), Resolution::RelationOrPermission(None)) => {
                self.collector.undefined_relation(relation_ref, enclosing);
            }
            (ReferenceNode::ArrowTarget(arrow), Resolution::Arrow(resolution)) => match resolution {
                // The left-hand reference already carries the error, and an
                // unresolvable type is reported on the relation that names it.
                ArrowResolution::Unresolved(ArrowFailure::UnknownSource)
                | ArrowResolution::Unresolved(ArrowFailure::NoResolvableTypes) => {}
                ArrowResolution::Unresolved(ArrowFailure::SourceNotRelation) => {
                    self.collector.invalid_arrow_source(arrow);
                }
                ArrowResolution::Resolved(_) => self.collector.arrow_target(arrow, resolution),
            },
            _ => {}
        }
    }

    /// The collected diagnostics, ordered by position.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        let mut diagnostics = self.collector.take();
        diagnostics.sort_by_key(|d| d.range.start);
        diagnostics
    }
}

/// Check the schema behind `resolver` and return its diagnostics in
/// document order.
pub fn check(resolver: &Resolver<'_>) -> Vec<Diagnostic> {
    let mut checker = SemanticChecker::new(resolver);
    checker.check_declarations();
    checker.check_references();
    let diagnostics = checker.finish();

    tracing::debug!(diagnostics = diagnostics.len(), "checked schema");

    diagnostics
}
