//! Semantic tokens: syntax highlighting based on resolution.
//!
//! Declarations are coloured by what they declare; references by what they
//! resolve to, or [`TokenType::Unresolved`] when they resolve to nothing.

use crate::base::SourceRange;
use crate::hir::{ReferenceNode, Resolution, Resolver};
use crate::syntax::RelationOrPermission;

/// Token type for semantic highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Type,
    Relation,
    Permission,
    Unresolved,
}

impl TokenType {
    /// Token type names, indexed by [`TokenType::to_lsp_index`].
    pub const LEGEND: [&'static str; 4] = ["type", "relation", "permission", "unresolved"];

    /// Convert to LSP token type index.
    pub fn to_lsp_index(self) -> u32 {
        match self {
            TokenType::Type => 0,
            TokenType::Relation => 1,
            TokenType::Permission => 2,
            TokenType::Unresolved => 3,
        }
    }

    fn of_member(member: Option<RelationOrPermission<'_>>) -> Self {
        match member {
            Some(RelationOrPermission::Relation(_)) => TokenType::Relation,
            Some(RelationOrPermission::Permission(_)) => TokenType::Permission,
            None => TokenType::Unresolved,
        }
    }
}

/// A semantic token for syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticToken {
    pub range: SourceRange,
    pub token_type: TokenType,
}

impl SemanticToken {
    fn new(range: SourceRange, token_type: TokenType) -> Self {
        Self { range, token_type }
    }

    /// Length in characters; tokens never span lines.
    pub fn length(&self) -> u32 {
        self.range.end.column.saturating_sub(self.range.start.column)
    }
}

/// Get semantic tokens for the schema behind `resolver`.
///
/// A `type#relation` reference yields two tokens so the suffix can be
/// coloured (or flagged) on its own. Sorted by position.
pub fn semantic_tokens(resolver: &Resolver<'_>) -> Vec<SemanticToken> {
    let mut tokens = Vec::new();

    for definition in resolver.schema().definitions() {
        tokens.push(SemanticToken::new(definition.name_range, TokenType::Type));
        for member in definition.members() {
            tokens.push(SemanticToken::new(
                member.name_range(),
                TokenType::of_member(Some(member)),
            ));
        }
    }

    for reference in resolver.resolved_references() {
        match (reference.site.node, &reference.resolution) {
            (ReferenceNode::TypeRef(type_ref), Resolution::Type(resolved)) => {
                let path_type = match resolved {
                    Some(_) => TokenType::Type,
                    None => TokenType::Unresolved,
                };
                tokens.push(SemanticToken::new(type_ref.path_range, path_type));

                if let Some(suffix_range) = type_ref.relation_name_range {
                    let member = resolved.and_then(|r| r.relation);
                    tokens.push(SemanticToken::new(suffix_range, TokenType::of_member(member)));
                }
            }
            (ReferenceNode::RelationRef(relation_ref), Resolution::RelationOrPermission(member)) => {
                tokens.push(SemanticToken::new(relation_ref.range, TokenType::of_member(*member)));
            }
            (ReferenceNode::ArrowTarget(arrow), Resolution::Arrow(resolution)) => {
                let first_target = resolution.targets().next();
                tokens.push(SemanticToken::new(
                    arrow.right.range,
                    TokenType::of_member(first_target),
                ));
            }
            _ => {}
        }
    }

    // Sort tokens by position (line, then column)
    tokens.sort_by_key(|t| t.range.start);

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourcePos;
    use crate::parser::parse;

    #[test]
    fn test_legend_matches_indexes() {
        for token_type in [
            TokenType::Type,
            TokenType::Relation,
            TokenType::Permission,
            TokenType::Unresolved,
        ] {
            let name = TokenType::LEGEND[token_type.to_lsp_index() as usize];
            assert_eq!(name, format!("{token_type:?}").to_lowercase());
        }
    }

    #[test]
    fn test_tokens_for_declarations_and_references() {
        let schema = parse(
            "definition user {}\ndefinition doc { relation viewer: user | ghost#x permission view = viewer + nope }",
        )
        .unwrap();
        let resolver = Resolver::new(&schema);

        let tokens = semantic_tokens(&resolver);
        let types: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
        assert_eq!(
            types,
            vec![
                TokenType::Type,       // user
                TokenType::Type,       // doc
                TokenType::Relation,   // viewer
                TokenType::Type,       // user
                TokenType::Unresolved, // ghost
                TokenType::Unresolved, // x
                TokenType::Permission, // view
                TokenType::Relation,   // viewer
                TokenType::Unresolved, // nope
            ]
        );

        assert_eq!(tokens[4].range.start, SourcePos::new(2, 42));
        assert_eq!(tokens[4].length(), 5);
        assert_eq!(tokens[5].range.start, SourcePos::new(2, 48));
        assert_eq!(tokens[8].range.start, SourcePos::new(2, 77));
    }

    #[test]
    fn test_arrow_target_coloured_by_first_target() {
        let schema = parse(
            "definition folder { permission read = nil } \
             definition doc { relation parent: folder permission view = parent->read }",
        )
        .unwrap();
        let resolver = Resolver::new(&schema);

        let tokens = semantic_tokens(&resolver);
        let last = tokens.last().unwrap();
        assert_eq!(last.token_type, TokenType::Permission);
    }

    #[test]
    fn test_tokens_sorted_by_position() {
        let schema = parse(
            "definition doc {\n  permission view = owner\n  relation owner: doc\n}",
        )
        .unwrap();
        let resolver = Resolver::new(&schema);

        let starts: Vec<_> = semantic_tokens(&resolver).iter().map(|t| t.range.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }
}
