//! Property-based robustness tests.
//!
//! Feeds token soup and arbitrary text through the whole pipeline and checks
//! that nothing panics and every reported range is well-formed.
#![cfg(feature = "proptest")]

use proptest::prelude::*;
use zedlang::base::{LineIndex, SourceRange};
use zedlang::hir::check;
use zedlang::ide::{folding_ranges, semantic_tokens};
use zedlang::{ParseOptions, Resolver, find_reference_node, parse, parse_with};

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Fragments that look like schema text, so generated input gets past the
/// first few tokens more often than random text would.
fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec![
            "definition", "relation", "permission", "nil", "{", "}", "(", ")", ":", "=", "|",
            "#", "+", "&", "-", "->", "*", "/", ",", "$",
        ])
        .prop_map(String::from),
        3 => "[a-z_][a-z0-9_]{0,6}",
        2 => prop::sample::select(vec![" ", "\n", "\t", "// c\n", "/* c */", "/*"]).prop_map(String::from),
    ]
}

fn arb_schema_like() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_fragment(), 0..80).prop_map(|parts| parts.concat())
}

/// Well-formed schemas whose references may or may not resolve.
fn arb_valid_schema() -> impl Strategy<Value = String> {
    let name = || prop::sample::select(vec!["user", "group", "doc", "folder"]);
    let member = || prop::sample::select(vec!["viewer", "owner", "parent", "view", "edit"]);

    let relation = (member(), prop::collection::vec((name(), prop::option::of(member())), 1..4))
        .prop_map(|(rel, types)| {
            let types: Vec<String> = types
                .into_iter()
                .map(|(ty, suffix)| match suffix {
                    Some(suffix) => format!("{ty}#{suffix}"),
                    None => ty.to_string(),
                })
                .collect();
            format!("    relation {rel}: {}\n", types.join(" | "))
        });
    let permission = (member(), member(), member(), any::<bool>()).prop_map(|(perm, a, b, arrow)| {
        if arrow {
            format!("    permission {perm} = {a} + {a}->{b}\n")
        } else {
            format!("    permission {perm} = ({a} - {b}) & nil\n")
        }
    });
    let body = prop::collection::vec(prop_oneof![relation, permission], 0..5);
    let definition = (name(), body)
        .prop_map(|(name, body)| format!("definition {name} {{\n{}}}\n", body.concat()));

    prop::collection::vec(definition, 0..5).prop_map(|defs| defs.concat())
}

fn well_formed(range: SourceRange, end: zedlang::SourcePos) -> bool {
    range.start <= range.end
        && range.end <= end
        && range.start.line >= 1
        && range.start.column >= 1
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn parsing_never_panics_and_errors_are_positioned(source in arb_schema_like()) {
        let end = LineIndex::new(&source).end_of(&source);

        let output = parse_with(&source, &ParseOptions::best_effort());
        prop_assert!(output.schema.is_some());
        for error in &output.errors {
            prop_assert!(well_formed(error.range, end), "{error} past {end}");
        }

        match parse(&source) {
            Ok(_) => prop_assert!(output.errors.is_empty()),
            Err(error) => prop_assert_eq!(output.errors.first(), Some(&error)),
        }
    }

    #[test]
    fn arbitrary_text_never_panics(source in "\\PC{0,200}") {
        let output = parse_with(&source, &ParseOptions::best_effort());
        if let Some(schema) = output.schema {
            let resolver = Resolver::new(&schema);
            let _ = check(&resolver);
            let _ = semantic_tokens(&resolver);
        }
    }

    #[test]
    fn recovered_schemas_are_safe_to_query(source in arb_schema_like()) {
        let end = LineIndex::new(&source).end_of(&source);
        let output = parse_with(&source, &ParseOptions::best_effort());
        let Some(schema) = output.schema else {
            return Ok(());
        };
        let resolver = Resolver::new(&schema);

        for reference in resolver.resolved_references() {
            prop_assert!(well_formed(reference.range(), end));
        }
        for token in semantic_tokens(&resolver) {
            prop_assert!(well_formed(token.range, end));
        }
        for diagnostic in check(&resolver) {
            prop_assert!(well_formed(diagnostic.range, end));
        }
        for fold in folding_ranges(&schema) {
            prop_assert!(fold.start_line() < fold.end_line());
        }
    }

    #[test]
    fn every_reference_is_found_by_position(source in arb_valid_schema()) {
        let schema = parse(&source).map_err(|e| TestCaseError::fail(format!("{e}\n{source}")))?;
        let resolver = Resolver::new(&schema);

        let references = resolver.resolved_references();
        prop_assert_eq!(&references, &resolver.resolved_references());

        for reference in references {
            let start = reference.range().start;
            let found = find_reference_node(&schema, start.line, start.column);
            prop_assert_eq!(found, Some(reference.site));
        }
    }
}
