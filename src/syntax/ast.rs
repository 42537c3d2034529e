//! Schema tree types.
//!
//! Every node carries the [`SourceRange`] of exactly the text it was parsed
//! from. Navigation and highlighting are built on these ranges, so they are
//! part of the contract, not a debugging aid.

use smol_str::SmolStr;

use crate::base::SourceRange;

/// A parsed schema document: definitions in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub definitions: Vec<Definition>,
}

impl Schema {
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// `definition <name> { ... }`: one object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Full path, including an optional `prefix/`
    pub name: SmolStr,
    pub name_range: SourceRange,
    /// From `definition` through the closing `}`
    pub range: SourceRange,
    pub relations: Vec<Relation>,
    pub permissions: Vec<Permission>,
}

impl Definition {
    /// Find a relation or permission declared directly in this definition.
    ///
    /// Relations are searched before permissions. There is no inheritance
    /// and no search across definitions.
    pub fn lookup_relation_or_permission(&self, name: &str) -> Option<RelationOrPermission<'_>> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .map(RelationOrPermission::Relation)
            .or_else(|| {
                self.permissions
                    .iter()
                    .find(|p| p.name == name)
                    .map(RelationOrPermission::Permission)
            })
    }

    /// Relations and permissions interleaved in document order.
    pub fn members(&self) -> Vec<RelationOrPermission<'_>> {
        let mut members: Vec<_> = self
            .relations
            .iter()
            .map(RelationOrPermission::Relation)
            .chain(self.permissions.iter().map(RelationOrPermission::Permission))
            .collect();
        members.sort_by_key(|m| m.range().start);
        members
    }
}

/// `relation <name>: <type> | <type> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: SmolStr,
    pub name_range: SourceRange,
    pub range: SourceRange,
    /// Subject types allowed to hold this relation
    pub allowed_types: Vec<TypeRef>,
}

/// `permission <name> = <expression>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub name: SmolStr,
    pub name_range: SourceRange,
    pub range: SourceRange,
    pub expression: Expression,
}

/// A borrowed relation or permission, as returned by member lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOrPermission<'a> {
    Relation(&'a Relation),
    Permission(&'a Permission),
}

impl<'a> RelationOrPermission<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            RelationOrPermission::Relation(r) => &r.name,
            RelationOrPermission::Permission(p) => &p.name,
        }
    }

    pub fn name_range(&self) -> SourceRange {
        match *self {
            RelationOrPermission::Relation(r) => r.name_range,
            RelationOrPermission::Permission(p) => p.name_range,
        }
    }

    pub fn range(&self) -> SourceRange {
        match *self {
            RelationOrPermission::Relation(r) => r.range,
            RelationOrPermission::Permission(p) => p.range,
        }
    }

    pub fn as_relation(&self) -> Option<&'a Relation> {
        match *self {
            RelationOrPermission::Relation(r) => Some(r),
            RelationOrPermission::Permission(_) => None,
        }
    }

    pub fn as_permission(&self) -> Option<&'a Permission> {
        match *self {
            RelationOrPermission::Permission(p) => Some(p),
            RelationOrPermission::Relation(_) => None,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, RelationOrPermission::Relation(_))
    }
}

/// A written type reference inside a relation's allowed types.
///
/// `user`, `group#member` and `user:*` are all type references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub path: SmolStr,
    pub path_range: SourceRange,
    /// The `#relation` suffix, if written
    pub relation_name: Option<SmolStr>,
    pub relation_name_range: Option<SourceRange>,
    /// `:*` suffix
    pub wildcard: bool,
    /// The whole reference, suffix included
    pub range: SourceRange,
}

/// A bare relation or permission name inside a permission expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRef {
    pub relation_name: SmolStr,
    pub range: SourceRange,
}

/// `left->right`: follow `left`'s allowed types, then resolve `right` there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowExpr {
    pub left: RelationRef,
    pub right: RelationRef,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Union,
    /// `&`
    Intersection,
    /// `-`
    Exclusion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Expression,
    pub rhs: Expression,
    pub range: SourceRange,
}

/// Permission expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Reference(RelationRef),
    Arrow(ArrowExpr),
    Binary(Box<BinaryExpr>),
    /// The `nil` literal: the empty set
    Nil(SourceRange),
}

impl Expression {
    pub fn range(&self) -> SourceRange {
        match self {
            Expression::Reference(r) => r.range,
            Expression::Arrow(a) => a.range,
            Expression::Binary(b) => b.range,
            Expression::Nil(range) => *range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourcePos;

    fn range(line: u32, start: u32, end: u32) -> SourceRange {
        SourceRange::new(SourcePos::new(line, start), SourcePos::new(line, end))
    }

    fn relation(name: &str, line: u32) -> Relation {
        Relation {
            name: name.into(),
            name_range: range(line, 10, 10 + name.len() as u32),
            range: range(line, 1, 30),
            allowed_types: Vec::new(),
        }
    }

    fn permission(name: &str, line: u32) -> Permission {
        Permission {
            name: name.into(),
            name_range: range(line, 12, 12 + name.len() as u32),
            range: range(line, 1, 30),
            expression: Expression::Nil(range(line, 26, 29)),
        }
    }

    fn definition() -> Definition {
        Definition {
            name: "doc".into(),
            name_range: range(1, 12, 15),
            range: SourceRange::new(SourcePos::new(1, 1), SourcePos::new(5, 2)),
            relations: vec![relation("viewer", 2), relation("shared", 4)],
            permissions: vec![permission("view", 3), permission("shared", 5)],
        }
    }

    #[test]
    fn test_lookup_relation_then_permission() {
        let def = definition();

        assert!(def.lookup_relation_or_permission("viewer").unwrap().is_relation());
        assert!(def.lookup_relation_or_permission("view").unwrap().as_permission().is_some());
        assert!(def.lookup_relation_or_permission("View").is_none());
    }

    #[test]
    fn test_lookup_prefers_relation_on_name_collision() {
        let def = definition();

        let found = def.lookup_relation_or_permission("shared").unwrap();
        assert!(std::ptr::eq(found.as_relation().unwrap(), &def.relations[1]));
    }

    #[test]
    fn test_members_in_document_order() {
        let def = definition();

        let names: Vec<_> = def.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["viewer", "view", "shared", "shared"]);
    }
}
