//! Go-to-definition: jump from a reference to what it names.

use smol_str::SmolStr;

use crate::base::{SourcePos, SourceRange};
use crate::hir::{ReferenceNode, Resolution, Resolver, find_reference_node};
use crate::syntax::{Definition, RelationOrPermission};

/// A declaration a reference resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoTarget {
    pub name: SmolStr,
    /// The declared name, for cursor placement
    pub range: SourceRange,
    /// The whole declaration, for peek views
    pub full_range: SourceRange,
}

impl GotoTarget {
    fn definition(definition: &Definition) -> Self {
        Self {
            name: definition.name.clone(),
            range: definition.name_range,
            full_range: definition.range,
        }
    }

    fn member(member: RelationOrPermission<'_>) -> Self {
        Self {
            name: SmolStr::new(member.name()),
            range: member.name_range(),
            full_range: member.range(),
        }
    }
}

/// Result of a go-to-definition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoResult {
    /// The reference under the cursor
    pub origin: SourceRange,
    /// More than one only for arrow targets reachable through several types
    pub targets: Vec<GotoTarget>,
}

/// Find the declaration(s) for the reference at the 1-based `line`/`column`.
///
/// Within `type#relation` the cursor picks the part: the type path goes to
/// the definition, the suffix to the relation or permission. Returns `None`
/// when the position is not on a reference or the reference is unresolved.
pub fn goto_definition(resolver: &Resolver<'_>, line: u32, column: u32) -> Option<GotoResult> {
    let site = find_reference_node(resolver.schema(), line, column)?;
    let pos = SourcePos::new(line, column);

    let (origin, targets) = match (site.node, resolver.resolve(&site)) {
        (ReferenceNode::TypeRef(type_ref), Resolution::Type(Some(resolved))) => {
            let on_suffix = type_ref.relation_name_range.filter(|range| range.contains(pos));
            match (on_suffix, resolved.relation) {
                (Some(range), Some(member)) => (range, vec![GotoTarget::member(member)]),
                (Some(_), None) => return None,
                (None, _) => (
                    type_ref.path_range,
                    vec![GotoTarget::definition(resolved.definition)],
                ),
            }
        }
        (ReferenceNode::RelationRef(reference), Resolution::RelationOrPermission(Some(member))) => {
            (reference.range, vec![GotoTarget::member(member)])
        }
        (ReferenceNode::ArrowTarget(arrow), Resolution::Arrow(resolution)) => (
            arrow.right.range,
            resolution.targets().map(GotoTarget::member).collect(),
        ),
        _ => return None,
    };

    if targets.is_empty() {
        return None;
    }

    Some(GotoResult { origin, targets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SCHEMA: &str = "definition user {}
definition folder {
    relation viewer: user
}
definition doc {
    relation parent: folder
    relation viewer: user | folder#viewer
    permission view = viewer + parent->viewer
}";

    fn range(start: (u32, u32), end: (u32, u32)) -> SourceRange {
        SourceRange::new(SourcePos::new(start.0, start.1), SourcePos::new(end.0, end.1))
    }

    #[test]
    fn test_goto_type_path() {
        let schema = parse(SCHEMA).unwrap();
        let resolver = Resolver::new(&schema);

        let result = goto_definition(&resolver, 7, 30).unwrap();
        assert_eq!(result.origin, range((7, 29), (7, 35)));
        assert_eq!(result.targets.len(), 1);
        assert_eq!(result.targets[0].name, "folder");
        assert_eq!(result.targets[0].range, range((2, 12), (2, 18)));
        assert_eq!(result.targets[0].full_range, range((2, 1), (4, 2)));
    }

    #[test]
    fn test_goto_type_suffix() {
        let schema = parse(SCHEMA).unwrap();
        let resolver = Resolver::new(&schema);

        let result = goto_definition(&resolver, 7, 37).unwrap();
        assert_eq!(result.origin, range((7, 36), (7, 42)));
        assert_eq!(result.targets[0].range, range((3, 14), (3, 20)));
    }

    #[test]
    fn test_goto_expression_name_and_arrow_target() {
        let schema = parse(SCHEMA).unwrap();
        let resolver = Resolver::new(&schema);

        let local = goto_definition(&resolver, 8, 24).unwrap();
        assert_eq!(local.targets[0].range, range((7, 14), (7, 20)));

        let through_arrow = goto_definition(&resolver, 8, 41).unwrap();
        assert_eq!(through_arrow.origin, range((8, 40), (8, 46)));
        assert_eq!(through_arrow.targets[0].range, range((3, 14), (3, 20)));
    }

    #[test]
    fn test_goto_outside_reference_or_unresolved() {
        let schema = parse(SCHEMA).unwrap();
        let resolver = Resolver::new(&schema);
        assert!(goto_definition(&resolver, 1, 12).is_none());
        assert!(goto_definition(&resolver, 8, 38).is_none());

        let schema = parse("definition doc { relation viewer: ghost }").unwrap();
        let resolver = Resolver::new(&schema);
        assert!(goto_definition(&resolver, 1, 36).is_none());
    }

    #[test]
    fn test_goto_arrow_with_several_targets() {
        let schema = parse(
            "definition a { relation r: a } definition b { relation r: b } \
             definition doc { relation parent: a | b permission p = parent->r }",
        )
        .unwrap();
        let resolver = Resolver::new(&schema);

        let site = crate::hir::reference_sites(&schema)
            .into_iter()
            .find(|site| matches!(site.node, ReferenceNode::ArrowTarget(_)))
            .unwrap();
        let start = site.range().start;

        let result = goto_definition(&resolver, start.line, start.column).unwrap();
        assert_eq!(result.targets.len(), 2);
        assert_ne!(result.targets[0].range, result.targets[1].range);
    }
}
