//! End-to-end tests for the whole-project parse pipeline: parse a root file,
//! resolve its include closure (bundled stdlib or on-disk files), aggregate
//! and order the diagnostics, and run position queries over the result.

use std::fs;
use std::path::Path;

use sophia_parser::cache::{ParsedFile, ParsedFileCache};
use sophia_parser::diagnostics;
use sophia_parser::parser::{self, ParseResult};
use sophia_parser::position::{self, InsideKind};
use sophia_parser::stdlib;

fn parse_text(text: &str) -> ParseResult {
    parser::parse(text)
}

/// Bundled stdlib only, like the CLI with no search paths.
fn stdlib_resolver(uri: &str) -> Option<String> {
    stdlib::stdlib_content(uri).map(str::to_string)
}

fn registered_uris(cache: &ParsedFileCache) -> Vec<Option<String>> {
    cache
        .get_sorted_parsed_files()
        .iter()
        .map(|f| f.uri.clone())
        .collect()
}

#[test]
fn test_stdlib_include_closure() {
    let source = "include \"List.aes\"\ncontract C =\n  entrypoint f(xs) = List.length(xs)\n";
    let result = parse_text(source);
    assert!(result.errors.is_empty());

    let mut cache = ParsedFileCache::new();
    cache.add_parsed_file(
        ParsedFile::new(Some("main.aes".to_string()), result),
        &stdlib_resolver,
        &parse_text,
    );

    // List.aes pulls in ListInternal.aes; three registered files in total.
    assert_eq!(
        registered_uris(&cache),
        [
            Some("List.aes".to_string()),
            Some("ListInternal.aes".to_string()),
            Some("main.aes".to_string()),
        ]
    );
    assert_eq!(cache.get_errors(), Vec::new());
    assert_eq!(cache.get_warnings(), Vec::new());
    assert!(cache.get_namespace("List").is_some());
    assert!(cache.get_namespace("ListInternal").is_some());
}

#[test]
fn test_on_disk_include_closure() {
    let dir = Path::new("tests/fixtures");
    let text = fs::read_to_string(dir.join("Main.aes")).expect("fixture");
    let result = parse_text(&text);
    assert!(result.errors.is_empty());

    let resolve = |uri: &str| fs::read_to_string(dir.join(uri)).ok();

    let mut cache = ParsedFileCache::new();
    cache.add_parsed_file(
        ParsedFile::new(Some("Main.aes".to_string()), result),
        &resolve,
        &parse_text,
    );

    assert_eq!(
        registered_uris(&cache),
        [Some("Helper.aes".to_string()), Some("Main.aes".to_string())]
    );
    assert_eq!(cache.get_errors(), Vec::new());
    let helper = cache.get_namespace("Helper").expect("namespace");
    assert_eq!(helper.span.begin.line, 1);
}

#[test]
fn test_unresolved_include_diagnostic() {
    let result = parse_text("include \"Nope.aes\"\ncontract C =\n  entrypoint f() = 1\n");
    assert!(result.errors.is_empty());

    let mut cache = ParsedFileCache::new();
    cache.add_parsed_file(
        ParsedFile::new(Some("main.aes".to_string()), result),
        &stdlib_resolver,
        &parse_text,
    );

    let errors = cache.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Can't find include \"Nope.aes\"");
    assert_eq!(errors[0].filename.as_deref(), Some("main.aes"));
    let loc = errors[0].location.expect("location");
    assert_eq!((loc.begin.line, loc.begin.col), (1, 10));
}

#[test]
fn test_root_diagnostics_sort_before_included_ones() {
    // The root buffer has its own syntax error; the included file has one too.
    let resolve = |uri: &str| match uri {
        "Bad.aes" => Some("contract C =\n  record r = { x : int, }\n".to_string()),
        _ => None,
    };

    let result = parse_text("include \"Bad.aes\"\ninclude \"foo\n");
    let mut cache = ParsedFileCache::new();
    cache.add_parsed_file(ParsedFile::new(None, result), &resolve, &parse_text);

    let mut errors = cache.get_errors();
    diagnostics::sort(&mut errors);

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].message, "Missing string end quote");
    assert_eq!(errors[0].filename, None);
    assert_eq!(errors[1].message, "Expected a field type");
    assert_eq!(errors[1].filename.as_deref(), Some("Bad.aes"));
}

#[test]
fn test_position_query_on_parsed_stdlib() {
    let text = stdlib::stdlib_content("List.aes").expect("content");
    let tree = parse_text(text).ast.expect("tree");

    // Inside the include string of a valid include: default classification.
    let hit = position::inside_ast(&tree, 1, 12).expect("hit");
    assert_eq!(hit.kind, InsideKind::Default);

    // On a qualified call target inside a function body.
    let (line, col) = find_text(text, "ListInternal.foldr");
    let hit = position::inside_ast(&tree, line, col).expect("hit");
    match hit.kind {
        InsideKind::ExprIdentifier { identifier, .. } => {
            assert_eq!(identifier.text, "ListInternal.foldr");
        }
        other => panic!("expected identifier, got {other:?}"),
    }
}

#[test]
fn test_incomplete_include_offers_completion_context() {
    let result = parse_text("include \"Li\n");
    let tree = result.ast.expect("tree");
    assert_eq!(result.errors.len(), 1);

    // Cursor one past the unterminated string content.
    let hit = position::inside_ast(&tree, 1, 12).expect("hit");
    assert_eq!(hit.kind, InsideKind::IncompleteIncludeStr);

    // The names offered for completion at that point.
    let names = stdlib::stdlib_filenames();
    assert!(names.contains(&"List.aes"));
    assert!(!names.contains(&"ListInternal.aes"));
}

/// 1-based (line, column) of the first occurrence of `needle`.
fn find_text(text: &str, needle: &str) -> (u32, u32) {
    for (ix, line) in text.lines().enumerate() {
        if let Some(col) = line.find(needle) {
            return (ix as u32 + 1, col as u32 + 1);
        }
    }
    panic!("{needle:?} not found");
}
