//! Parsed-file registry and include resolution.
//!
//! A [`ParsedFile`] is one parsed source text together with the include
//! references and namespace declarations found at its top level. The
//! [`ParsedFileCache`] registers a root file and recursively resolves and
//! parses its include closure through two caller-supplied callbacks: a content
//! resolver (URI to source text) and a text parser. Both are plain synchronous
//! functions; include-graph recursion is ordinary call-stack recursion.
//!
//! Registration happens before descending into a file's own includes, so
//! shared dependencies and include cycles short-circuit instead of reparsing.

use std::collections::{BTreeMap, HashMap};

use sophia_syntax::ast::{Node, NodeKind, Span};
use sophia_syntax::diagnostics::Diagnostic;
use sophia_syntax::parser::ParseResult;

/// Resolves an include URI to its source text, or `None` when the file cannot
/// be found. Callers use this hook to special-case bundled stdlib modules.
pub type ContentResolver<'a> = dyn Fn(&str) -> Option<String> + 'a;

/// Parses one source text. The cache never constructs a parser itself.
pub type TextParser<'a> = dyn Fn(&str) -> ParseResult + 'a;

/// One include reference found at the top level of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub path: String,
    /// Range of the include string literal's content; unresolved-include
    /// diagnostics anchor here.
    pub location: Span,
}

/// A parsed source text plus everything the cache needs to know about it.
///
/// `uri` is `None` for an anonymous buffer (e.g. standard input); such a file
/// sorts first in [`ParsedFileCache::get_sorted_parsed_files`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub uri: Option<String>,
    pub ast: Node,
    pub includes: Vec<Include>,
    /// Top-level namespace declarations by name. Only the first declaration
    /// per name is kept; later same-named declarations stay in the tree but
    /// are not reachable through [`ParsedFileCache::get_namespace`].
    pub namespaces: HashMap<String, Node>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ParsedFile {
    /// Wrap a parse result for registration under `uri`.
    ///
    /// Diagnostics get tagged with the file name, and a parse that produced no
    /// tree is represented by an empty placeholder file node so the rest of
    /// the pipeline never deals with a missing tree.
    pub fn new(uri: Option<String>, result: ParseResult) -> Self {
        let ast = result
            .ast
            .unwrap_or_else(|| Node::new(NodeKind::File, Vec::new(), Span::default()));

        let mut includes = Vec::new();
        let mut namespaces = HashMap::new();
        for top in &ast.children {
            match &top.kind {
                NodeKind::IncludeDecl { include, .. } => includes.push(Include {
                    path: include.text.clone(),
                    location: include.span,
                }),
                NodeKind::NamespaceDecl { con } => {
                    namespaces
                        .entry(con.text.clone())
                        .or_insert_with(|| top.clone());
                }
                _ => {}
            }
        }

        let tag = |mut d: Diagnostic| {
            d.filename = uri.clone();
            d
        };
        Self {
            errors: result.errors.into_iter().map(tag).collect(),
            warnings: result.warnings.into_iter().map(tag).collect(),
            uri,
            ast,
            includes,
            namespaces,
        }
    }
}

/// Registry of parsed files keyed by URI.
#[derive(Debug, Default)]
pub struct ParsedFileCache {
    files: BTreeMap<Option<String>, ParsedFile>,
}

impl ParsedFileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `file` and recursively resolve and parse its includes.
    ///
    /// # Panics
    ///
    /// Panics if a file with the same URI is already registered; callers must
    /// pre-check with [`Self::get_file`]. URIs re-encountered *during* the
    /// recursive descent are not an error and short-circuit silently.
    pub fn add_parsed_file(
        &mut self,
        file: ParsedFile,
        resolve_content: &ContentResolver<'_>,
        parse_text: &TextParser<'_>,
    ) {
        assert!(
            !self.files.contains_key(&file.uri),
            "parsed file {:?} already in cache",
            file.uri
        );
        self.insert_recursive(file, resolve_content, parse_text);
    }

    pub fn remove_cached_file(&mut self, uri: &str) {
        self.files.remove(&Some(uri.to_string()));
    }

    pub fn get_file(&self, uri: &str) -> Option<&ParsedFile> {
        self.files.get(&Some(uri.to_string()))
    }

    /// Look up a top-level namespace declaration by name across all
    /// registered files.
    pub fn get_namespace(&self, con: &str) -> Option<&Node> {
        self.files.values().find_map(|f| f.namespaces.get(con))
    }

    /// All errors across every registered file.
    pub fn get_errors(&self) -> Vec<Diagnostic> {
        self.files.values().flat_map(|f| f.errors.clone()).collect()
    }

    /// All warnings across every registered file.
    pub fn get_warnings(&self) -> Vec<Diagnostic> {
        self.files
            .values()
            .flat_map(|f| f.warnings.clone())
            .collect()
    }

    /// Registered files ordered by URI, the anonymous file first.
    pub fn get_sorted_parsed_files(&self) -> Vec<&ParsedFile> {
        self.files.values().collect()
    }

    fn insert_recursive(
        &mut self,
        file: ParsedFile,
        resolve_content: &ContentResolver<'_>,
        parse_text: &TextParser<'_>,
    ) {
        if self.files.contains_key(&file.uri) {
            return;
        }

        let uri = file.uri.clone();
        let includes = file.includes.clone();
        self.files.insert(uri.clone(), file);

        for inc in includes {
            // A sibling may have registered this URI already; it is not
            // resolved or parsed a second time.
            if self.files.contains_key(&Some(inc.path.clone())) {
                continue;
            }
            match resolve_content(&inc.path) {
                Some(content) => {
                    let result = parse_text(&content);
                    self.insert_recursive(
                        ParsedFile::new(Some(inc.path.clone()), result),
                        resolve_content,
                        parse_text,
                    );
                }
                None => {
                    let mut diag = Diagnostic::new(
                        format!("Can't find include \"{}\"", inc.path),
                        inc.location,
                    );
                    diag.filename = uri.clone();
                    if let Some(f) = self.files.get_mut(&uri) {
                        f.errors.push(diag);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sophia_syntax::parser;

    fn parse(text: &str) -> ParseResult {
        parser::parse(text)
    }

    #[test]
    fn test_includes_and_namespaces_are_collected() {
        let result = parse("include \"Lib.aes\"\nnamespace N =\n  function f() = 1\n");
        let pf = ParsedFile::new(Some("main.aes".to_string()), result);

        assert_eq!(pf.includes.len(), 1);
        assert_eq!(pf.includes[0].path, "Lib.aes");
        assert!(pf.namespaces.contains_key("N"));
        assert_eq!(pf.errors, Vec::new());
    }

    #[test]
    fn test_first_namespace_declaration_wins() {
        let result = parse(
            "namespace N =\n  function f() = 1\nnamespace N =\n  function g() = 2\n",
        );
        let pf = ParsedFile::new(None, result);

        assert_eq!(pf.ast.children.len(), 2);
        let kept = pf.namespaces.get("N").expect("namespace");
        assert_eq!(kept.span, pf.ast.children[0].span);
    }

    #[test]
    fn test_diagnostics_are_tagged_with_the_file_uri() {
        let result = parse("include \"foo\n");
        let pf = ParsedFile::new(Some("main.aes".to_string()), result);

        assert_eq!(pf.errors.len(), 1);
        assert_eq!(pf.errors[0].filename.as_deref(), Some("main.aes"));
    }

    #[test]
    fn test_unresolved_include_produces_a_diagnostic() {
        let result = parse("include \"Missing.aes\"\n");
        let pf = ParsedFile::new(Some("main.aes".to_string()), result);

        let mut cache = ParsedFileCache::new();
        cache.add_parsed_file(pf, &|_| None, &|t| parser::parse(t));

        let errors = cache.get_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't find include \"Missing.aes\"");
        assert_eq!(errors[0].filename.as_deref(), Some("main.aes"));
        // Anchored at the string content, not the whole declaration.
        let loc = errors[0].location.expect("location");
        assert_eq!(loc.begin.col, 10);
    }

    #[test]
    fn test_recursive_include_closure() {
        let resolve = |uri: &str| match uri {
            "List.aes" => Some("include \"ListInternal.aes\"\nnamespace List =\n  function map(f, xs) = xs\n".to_string()),
            "ListInternal.aes" => Some("namespace ListInternal =\n  function id(x) = x\n".to_string()),
            _ => None,
        };

        let result = parse("include \"List.aes\"\ncontract C =\n  entrypoint f() = 1\n");
        let pf = ParsedFile::new(Some("main.aes".to_string()), result);

        let mut cache = ParsedFileCache::new();
        cache.add_parsed_file(pf, &resolve, &|t| parser::parse(t));

        let uris: Vec<_> = cache
            .get_sorted_parsed_files()
            .iter()
            .map(|f| f.uri.clone())
            .collect();
        assert_eq!(
            uris,
            [
                Some("List.aes".to_string()),
                Some("ListInternal.aes".to_string()),
                Some("main.aes".to_string()),
            ]
        );
        assert_eq!(cache.get_errors(), Vec::new());
        assert!(cache.get_namespace("ListInternal").is_some());
    }

    #[test]
    fn test_shared_include_is_parsed_once() {
        use std::cell::RefCell;

        let parse_count = RefCell::new(0usize);
        let resolve = |uri: &str| match uri {
            "A.aes" | "B.aes" => Some(format!("include \"Shared.aes\"\nnamespace {} =\n  function f() = 1\n", &uri[..1])),
            "Shared.aes" => Some("namespace Shared =\n  function f() = 1\n".to_string()),
            _ => None,
        };
        let parse_text = |text: &str| {
            *parse_count.borrow_mut() += 1;
            parser::parse(text)
        };

        let result = parse("include \"A.aes\"\ninclude \"B.aes\"\n");
        let pf = ParsedFile::new(None, result);

        let mut cache = ParsedFileCache::new();
        cache.add_parsed_file(pf, &resolve, &parse_text);

        // A, B and Shared each parsed exactly once.
        assert_eq!(*parse_count.borrow(), 3);
        assert_eq!(cache.get_sorted_parsed_files().len(), 4);
        assert_eq!(cache.get_errors(), Vec::new());
    }

    #[test]
    fn test_anonymous_file_sorts_first() {
        let result = parse("include \"A.aes\"\n");
        let pf = ParsedFile::new(None, result);

        let mut cache = ParsedFileCache::new();
        cache.add_parsed_file(
            pf,
            &|_| Some("namespace A =\n  function f() = 1\n".to_string()),
            &|t| parser::parse(t),
        );

        let files = cache.get_sorted_parsed_files();
        assert_eq!(files[0].uri, None);
        assert_eq!(files[1].uri.as_deref(), Some("A.aes"));
    }

    #[test]
    #[should_panic(expected = "already in cache")]
    fn test_duplicate_registration_panics() {
        let pf1 = ParsedFile::new(Some("main.aes".to_string()), parse("contract C =\n  entrypoint f() = 1\n"));
        let pf2 = pf1.clone();

        let mut cache = ParsedFileCache::new();
        cache.add_parsed_file(pf1, &|_| None, &|t| parser::parse(t));
        cache.add_parsed_file(pf2, &|_| None, &|t| parser::parse(t));
    }

    #[test]
    fn test_remove_cached_file() {
        let pf = ParsedFile::new(Some("main.aes".to_string()), parse("contract C =\n  entrypoint f() = 1\n"));

        let mut cache = ParsedFileCache::new();
        cache.add_parsed_file(pf, &|_| None, &|t| parser::parse(t));
        assert!(cache.get_file("main.aes").is_some());

        cache.remove_cached_file("main.aes");
        assert!(cache.get_file("main.aes").is_none());
    }

    #[test]
    fn test_missing_tree_becomes_placeholder() {
        let pf = ParsedFile::new(None, parse("123"));
        assert!(matches!(pf.ast.kind, NodeKind::File));
        assert!(pf.ast.children.is_empty());
        assert_eq!(pf.errors.len(), 1);
    }
}
