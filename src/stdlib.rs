//! Bundled standard library modules.
//!
//! The Sophia standard library ships with the parser so that `include
//! "List.aes"` resolves without any files on disk. Contents are embedded at
//! compile time from `assets/stdlib/`.

const FRAC_AES: &str = include_str!("../assets/stdlib/Frac.aes");
const FUNC_AES: &str = include_str!("../assets/stdlib/Func.aes");
const LIST_AES: &str = include_str!("../assets/stdlib/List.aes");
const LIST_INTERNAL_AES: &str = include_str!("../assets/stdlib/ListInternal.aes");
const OPTION_AES: &str = include_str!("../assets/stdlib/Option.aes");
const PAIR_AES: &str = include_str!("../assets/stdlib/Pair.aes");
const TRIPLE_AES: &str = include_str!("../assets/stdlib/Triple.aes");

/// Bundled modules in sorted filename order.
const STDLIB: [(&str, &str); 7] = [
    ("Frac.aes", FRAC_AES),
    ("Func.aes", FUNC_AES),
    ("List.aes", LIST_AES),
    ("ListInternal.aes", LIST_INTERNAL_AES),
    ("Option.aes", OPTION_AES),
    ("Pair.aes", PAIR_AES),
    ("Triple.aes", TRIPLE_AES),
];

pub fn is_stdlib_uri(uri: &str) -> bool {
    stdlib_content(uri).is_some()
}

pub fn stdlib_content(uri: &str) -> Option<&'static str> {
    STDLIB
        .iter()
        .find(|(name, _)| *name == uri)
        .map(|(_, content)| *content)
}

/// Filenames offered for include completion, sorted. `ListInternal.aes` is an
/// implementation detail of `List.aes` and is not offered.
pub fn stdlib_filenames() -> Vec<&'static str> {
    STDLIB
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| *name != "ListInternal.aes")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sophia_syntax::parser;

    #[test]
    fn test_lookup() {
        assert!(is_stdlib_uri("List.aes"));
        assert!(!is_stdlib_uri("Nope.aes"));
        assert!(stdlib_content("Pair.aes").is_some());
    }

    #[test]
    fn test_filenames_are_sorted_and_hide_list_internal() {
        let names = stdlib_filenames();
        assert!(!names.contains(&"ListInternal.aes"));
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_every_bundled_module_parses_cleanly() {
        for (name, content) in STDLIB {
            let result = parser::parse(content);
            assert!(result.ast.is_some(), "{name} produced no tree");
            assert_eq!(result.errors, Vec::new(), "{name} has parse errors");
        }
    }

    #[test]
    fn test_list_includes_list_internal() {
        let result = parser::parse(stdlib_content("List.aes").expect("content"));
        let file = result.ast.expect("tree");
        assert!(file.children.iter().any(|c| matches!(
            &c.kind,
            sophia_syntax::ast::NodeKind::IncludeDecl { include, .. }
                if include.text == "ListInternal.aes"
        )));
    }
}
