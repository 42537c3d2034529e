//! Name resolution: resolving references to their declarations.
//!
//! A [`Resolver`] is built once per parsed [`Schema`] and borrows it. The
//! only index is `definition name → &Definition`; member lookup is scoped to
//! a single definition, so no further tables are needed.
//!
//! Unresolved references are values, never errors: lookups return `None`
//! and arrow traversal returns [`ArrowResolution::Unresolved`].

use indexmap::IndexMap;
use indexmap::map::Entry;
use rustc_hash::FxBuildHasher;

use super::references::{ReferenceNode, ReferenceSite, Resolution, ResolvedReference, reference_sites};
use crate::syntax::{ArrowExpr, Definition, RelationOrPermission, RelationRef, Schema, TypeRef};

// ============================================================================
// RESOLUTION RESULTS
// ============================================================================

/// What a [`TypeRef`] points at: its definition and, for `type#relation`,
/// the named member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferencedTypeAndRelation<'a> {
    pub definition: &'a Definition,
    /// `None` when no `#relation` suffix was written, or when it names nothing.
    pub relation: Option<RelationOrPermission<'a>>,
}

/// One resolvable subject type reached through an arrow's left-hand relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrowBranch<'a> {
    pub definition: &'a Definition,
    /// The right-hand name resolved in `definition`, if it exists there.
    pub target: Option<RelationOrPermission<'a>>,
}

/// Why an arrow traversal produced no branches at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrowFailure {
    /// The left-hand name is not declared in the enclosing definition.
    UnknownSource,
    /// The left-hand name is a permission; only relations can be followed.
    SourceNotRelation,
    /// None of the left-hand relation's allowed types name a definition.
    NoResolvableTypes,
}

/// Outcome of resolving `left->right`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrowResolution<'a> {
    Unresolved(ArrowFailure),
    /// One branch per distinct resolvable allowed type, in declaration order.
    Resolved(Vec<ArrowBranch<'a>>),
}

impl<'a> ArrowResolution<'a> {
    /// True when at least one branch resolves the right-hand name.
    pub fn is_resolved(&self) -> bool {
        self.targets().next().is_some()
    }

    pub fn branches(&self) -> &[ArrowBranch<'a>] {
        match self {
            ArrowResolution::Resolved(branches) => branches,
            ArrowResolution::Unresolved(_) => &[],
        }
    }

    /// Every resolved right-hand target across all branches.
    pub fn targets(&self) -> impl Iterator<Item = RelationOrPermission<'a>> + '_ {
        self.branches().iter().filter_map(|branch| branch.target)
    }

    /// Branches whose definition lacks the right-hand name.
    pub fn missing_branches(&self) -> impl Iterator<Item = &ArrowBranch<'a>> + '_ {
        self.branches().iter().filter(|branch| branch.target.is_none())
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolver over one immutable [`Schema`].
///
/// Read-only after construction, so it can be shared across threads for
/// concurrent queries against the same document version.
#[derive(Clone, Debug)]
pub struct Resolver<'a> {
    schema: &'a Schema,
    /// Definition name → first definition with that name, in document order.
    definitions: IndexMap<&'a str, &'a Definition, FxBuildHasher>,
}

impl<'a> Resolver<'a> {
    /// Index `schema` in a single pass.
    ///
    /// When a name is declared twice the first declaration wins; later
    /// duplicates stay in the tree but are invisible to lookup.
    pub fn new(schema: &'a Schema) -> Self {
        let mut definitions =
            IndexMap::with_capacity_and_hasher(schema.definitions.len(), FxBuildHasher);

        for definition in &schema.definitions {
            match definitions.entry(definition.name.as_str()) {
                Entry::Vacant(entry) => {
                    entry.insert(definition);
                }
                Entry::Occupied(_) => {
                    tracing::debug!(
                        name = %definition.name,
                        range = %definition.range,
                        "duplicate definition shadowed by earlier declaration"
                    );
                }
            }
        }

        tracing::debug!(definitions = definitions.len(), "built resolver index");

        Self { schema, definitions }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Exact, case-sensitive definition lookup.
    pub fn lookup_definition(&self, path: &str) -> Option<&'a Definition> {
        self.definitions.get(path).copied()
    }

    /// Definitions visible to lookup, in document order.
    pub fn definitions(&self) -> impl Iterator<Item = &'a Definition> + '_ {
        self.definitions.values().copied()
    }

    /// Whether `definition` is the one lookup returns for its name.
    pub fn is_visible(&self, definition: &Definition) -> bool {
        self.lookup_definition(&definition.name)
            .is_some_and(|found| std::ptr::eq(found, definition))
    }

    /// Resolve a bare name within its enclosing definition.
    pub fn resolve_relation_or_permission(
        &self,
        reference: &RelationRef,
        enclosing: &'a Definition,
    ) -> Option<RelationOrPermission<'a>> {
        enclosing.lookup_relation_or_permission(&reference.relation_name)
    }

    /// Resolve a written type, plus its `#relation` suffix if present.
    pub fn resolve_type_ref(&self, type_ref: &TypeRef) -> Option<ReferencedTypeAndRelation<'a>> {
        let definition = self.lookup_definition(&type_ref.path)?;
        let relation = type_ref
            .relation_name
            .as_deref()
            .and_then(|name| definition.lookup_relation_or_permission(name));

        Some(ReferencedTypeAndRelation { definition, relation })
    }

    /// Resolve `left->right` within `enclosing`.
    ///
    /// `left` must be a relation. Each of its allowed types that names a
    /// definition becomes a branch, in declaration order and without
    /// repeats; `right` is then looked up in each branch on its own.
    pub fn resolve_arrow(&self, arrow: &ArrowExpr, enclosing: &'a Definition) -> ArrowResolution<'a> {
        let source = match self.resolve_relation_or_permission(&arrow.left, enclosing) {
            Some(RelationOrPermission::Relation(relation)) => relation,
            Some(RelationOrPermission::Permission(_)) => {
                return ArrowResolution::Unresolved(ArrowFailure::SourceNotRelation);
            }
            None => return ArrowResolution::Unresolved(ArrowFailure::UnknownSource),
        };

        let mut branches: Vec<ArrowBranch<'a>> = Vec::new();
        for allowed in &source.allowed_types {
            let Some(definition) = self.lookup_definition(&allowed.path) else {
                tracing::trace!(
                    arrow = %arrow.range,
                    subject_type = %allowed.path,
                    "skipping unresolvable allowed type"
                );
                continue;
            };
            if branches.iter().any(|b| std::ptr::eq(b.definition, definition)) {
                continue;
            }
            branches.push(ArrowBranch {
                definition,
                target: definition.lookup_relation_or_permission(&arrow.right.relation_name),
            });
        }

        if branches.is_empty() {
            return ArrowResolution::Unresolved(ArrowFailure::NoResolvableTypes);
        }
        ArrowResolution::Resolved(branches)
    }

    /// Resolve a single reference site.
    pub fn resolve(&self, site: &ReferenceSite<'a>) -> Resolution<'a> {
        match site.node {
            ReferenceNode::TypeRef(type_ref) => Resolution::Type(self.resolve_type_ref(type_ref)),
            ReferenceNode::RelationRef(reference) => Resolution::RelationOrPermission(
                self.resolve_relation_or_permission(reference, site.enclosing_definition),
            ),
            ReferenceNode::ArrowTarget(arrow) => {
                Resolution::Arrow(self.resolve_arrow(arrow, site.enclosing_definition))
            }
        }
    }

    /// Every reference in the schema with its resolution, in document order.
    ///
    /// One walk over the tree; calling it again produces an equal sequence.
    pub fn resolved_references(&self) -> Vec<ResolvedReference<'a>> {
        reference_sites(self.schema)
            .into_iter()
            .map(|site| {
                let resolution = self.resolve(&site);
                ResolvedReference { site, resolution }
            })
            .collect()
    }
}
