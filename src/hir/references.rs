//! Reference enumeration and position lookup.
//!
//! Both [`find_reference_node`] and [`Resolver::resolved_references`] walk
//! the same sequence produced by [`reference_sites`]: every type reference
//! in a relation's allowed types and every name in a permission expression,
//! in document order.
//!
//! [`Resolver::resolved_references`]: super::Resolver::resolved_references

use crate::base::{SourcePos, SourceRange};
use crate::syntax::{
    ArrowExpr, Definition, Expression, RelationOrPermission, RelationRef, Schema, TypeRef,
};

use super::resolve::{ArrowResolution, ReferencedTypeAndRelation};

/// Where a reference was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A type reference in a relation's allowed types
    Type,
    /// A name inside a permission expression
    Expression,
}

/// A reference node in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceNode<'a> {
    TypeRef(&'a TypeRef),
    /// A bare name, or the left side of an arrow
    RelationRef(&'a RelationRef),
    /// The right side of an arrow; resolved in the arrow's target types
    ArrowTarget(&'a ArrowExpr),
}

impl<'a> ReferenceNode<'a> {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            ReferenceNode::TypeRef(_) => ReferenceKind::Type,
            ReferenceNode::RelationRef(_) | ReferenceNode::ArrowTarget(_) => {
                ReferenceKind::Expression
            }
        }
    }

    /// The range of the written reference itself.
    pub fn range(&self) -> SourceRange {
        match self {
            ReferenceNode::TypeRef(type_ref) => type_ref.range,
            ReferenceNode::RelationRef(reference) => reference.range,
            ReferenceNode::ArrowTarget(arrow) => arrow.right.range,
        }
    }

    /// The written name (type path, or relation/permission name).
    pub fn name(&self) -> &'a str {
        match *self {
            ReferenceNode::TypeRef(type_ref) => &type_ref.path,
            ReferenceNode::RelationRef(reference) => &reference.relation_name,
            ReferenceNode::ArrowTarget(arrow) => &arrow.right.relation_name,
        }
    }
}

/// A reference node together with the definition it was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceSite<'a> {
    pub node: ReferenceNode<'a>,
    pub enclosing_definition: &'a Definition,
}

impl ReferenceSite<'_> {
    pub fn kind(&self) -> ReferenceKind {
        self.node.kind()
    }

    pub fn range(&self) -> SourceRange {
        self.node.range()
    }
}

/// Resolution outcome of one reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    Type(Option<ReferencedTypeAndRelation<'a>>),
    RelationOrPermission(Option<RelationOrPermission<'a>>),
    Arrow(ArrowResolution<'a>),
}

/// A reference paired with its resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedReference<'a> {
    pub site: ReferenceSite<'a>,
    pub resolution: Resolution<'a>,
}

impl<'a> ResolvedReference<'a> {
    pub fn kind(&self) -> ReferenceKind {
        self.site.kind()
    }

    pub fn range(&self) -> SourceRange {
        self.site.range()
    }

    /// For [`ReferenceKind::Type`]: the resolved definition and suffix member.
    pub fn referenced_type_and_relation(&self) -> Option<ReferencedTypeAndRelation<'a>> {
        match self.resolution {
            Resolution::Type(resolved) => resolved,
            _ => None,
        }
    }

    /// For bare expression names: the resolved member.
    pub fn resolved_relation_or_permission(&self) -> Option<RelationOrPermission<'a>> {
        match self.resolution {
            Resolution::RelationOrPermission(resolved) => resolved,
            _ => None,
        }
    }

    pub fn arrow_resolution(&self) -> Option<&ArrowResolution<'a>> {
        match &self.resolution {
            Resolution::Arrow(arrow) => Some(arrow),
            _ => None,
        }
    }

    /// Whether the reference fully resolves.
    ///
    /// A type reference with a `#relation` suffix counts only if the suffix
    /// resolves too; an arrow target counts if any branch resolves.
    pub fn is_resolved(&self) -> bool {
        match &self.resolution {
            Resolution::Type(None) => false,
            Resolution::Type(Some(resolved)) => match self.site.node {
                ReferenceNode::TypeRef(type_ref) if type_ref.relation_name.is_some() => {
                    resolved.relation.is_some()
                }
                _ => true,
            },
            Resolution::RelationOrPermission(resolved) => resolved.is_some(),
            Resolution::Arrow(arrow) => arrow.is_resolved(),
        }
    }
}

/// Every reference in `schema`, in document order.
pub fn reference_sites(schema: &Schema) -> Vec<ReferenceSite<'_>> {
    let mut sites = Vec::new();

    for definition in &schema.definitions {
        for member in definition.members() {
            match member {
                RelationOrPermission::Relation(relation) => {
                    sites.extend(relation.allowed_types.iter().map(|type_ref| ReferenceSite {
                        node: ReferenceNode::TypeRef(type_ref),
                        enclosing_definition: definition,
                    }));
                }
                RelationOrPermission::Permission(permission) => {
                    collect_expression(&permission.expression, definition, &mut sites);
                }
            }
        }
    }

    sites
}

fn collect_expression<'a>(
    expression: &'a Expression,
    enclosing: &'a Definition,
    sites: &mut Vec<ReferenceSite<'a>>,
) {
    let site = |node| ReferenceSite {
        node,
        enclosing_definition: enclosing,
    };

    match expression {
        Expression::Reference(reference) => sites.push(site(ReferenceNode::RelationRef(reference))),
        Expression::Arrow(arrow) => {
            sites.push(site(ReferenceNode::RelationRef(&arrow.left)));
            sites.push(site(ReferenceNode::ArrowTarget(arrow)));
        }
        Expression::Binary(binary) => {
            collect_expression(&binary.lhs, enclosing, sites);
            collect_expression(&binary.rhs, enclosing, sites);
        }
        Expression::Nil(_) => {}
    }
}

/// Find the reference whose range contains the 1-based `line`/`column`.
///
/// Returns `None` on keywords, declaration names, punctuation, or outside
/// any definition.
pub fn find_reference_node(schema: &Schema, line: u32, column: u32) -> Option<ReferenceSite<'_>> {
    let pos = SourcePos::new(line, column);
    reference_sites(schema)
        .into_iter()
        .find(|site| site.range().contains(pos))
}
