//! Folding ranges: collapsible regions.
//!
//! Definitions and permissions that span multiple lines.

use crate::base::SourceRange;
use crate::syntax::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldingRangeKind {
    Definition,
    Permission,
}

/// A folding range with position information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldingRange {
    pub range: SourceRange,
    pub kind: FoldingRangeKind,
}

impl FoldingRange {
    pub fn start_line(&self) -> u32 {
        self.range.start.line
    }

    pub fn end_line(&self) -> u32 {
        self.range.end.line
    }
}

/// Get folding ranges for a schema, sorted by start position.
pub fn folding_ranges(schema: &Schema) -> Vec<FoldingRange> {
    let definitions = schema.definitions().iter().map(|definition| FoldingRange {
        range: definition.range,
        kind: FoldingRangeKind::Definition,
    });
    let permissions = schema
        .definitions()
        .iter()
        .flat_map(|definition| &definition.permissions)
        .map(|permission| FoldingRange {
            range: permission.range,
            kind: FoldingRangeKind::Permission,
        });

    let mut ranges: Vec<FoldingRange> = definitions
        .chain(permissions)
        .filter(|r| r.end_line() > r.start_line()) // Only multiline regions
        .collect();

    ranges.sort_by_key(|r| r.range.start);

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_multiline_definitions_and_permissions() {
        let schema = parse(
            "definition user {}
definition doc {
    relation viewer: user
    permission view = viewer +
        viewer
    permission edit = viewer
}",
        )
        .unwrap();

        let ranges = folding_ranges(&schema);
        let summary: Vec<_> = ranges
            .iter()
            .map(|r| (r.kind, r.start_line(), r.end_line()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (FoldingRangeKind::Definition, 2, 7),
                (FoldingRangeKind::Permission, 4, 5),
            ]
        );
    }

    #[test]
    fn test_single_line_schema_has_no_folds() {
        let schema = parse("definition user {} definition doc { relation viewer: user }").unwrap();
        assert!(folding_ranges(&schema).is_empty());
    }
}
