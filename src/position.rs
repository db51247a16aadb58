//! Position query over a syntax tree.
//!
//! [`inside_ast`] finds the innermost node containing a (line, column)
//! position, classifying two node kinds specially to drive editor completion:
//! an include declaration whose string literal is missing its closing quote,
//! and identifier expressions (including call targets). Those two kinds allow
//! one column of trailing slack past their own end, so a cursor immediately
//! after the token still counts as inside it; everything else uses exact
//! range containment.

use sophia_syntax::ast::{ExprKind, GeneratorKind, IdKind, LetKind, Node, NodeKind, PathKind, Span, SpannedStr, StmtKind, TypeKind};

/// Classification of the found node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsideKind {
    Default,
    /// Inside (or one column past) the string literal of an include
    /// declaration that is missing its closing quote.
    IncompleteIncludeStr,
    /// Inside (or one column past) an identifier expression.
    ExprIdentifier {
        id_kind: IdKind,
        identifier: SpannedStr,
    },
}

/// A node containing the queried position, with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct InsideAstItem<'a> {
    pub node: &'a Node,
    pub kind: InsideKind,
}

/// Return the innermost node containing the 1-based (line, column) position.
pub fn inside_ast(tree: &Node, line: u32, col: u32) -> Option<InsideAstItem<'_>> {
    let mut hits = Vec::new();
    collect(tree, line, col, &mut hits);
    hits.pop()
}

fn collect<'a>(node: &'a Node, line: u32, col: u32, hits: &mut Vec<InsideAstItem<'a>>) {
    if let Some(hit) = classify(node, line, col) {
        hits.push(hit);
    }
    for payload in payload_nodes(node) {
        collect(payload, line, col, hits);
    }
    for child in &node.children {
        collect(child, line, col, hits);
    }
}

fn classify<'a>(node: &'a Node, line: u32, col: u32) -> Option<InsideAstItem<'a>> {
    match &node.kind {
        NodeKind::IncludeDecl { include, valid_token } => {
            if !contains(node.span, line, col, 1) {
                return None;
            }
            let kind = if !valid_token && contains(include.full_span, line, col, 1) {
                InsideKind::IncompleteIncludeStr
            } else {
                InsideKind::Default
            };
            Some(InsideAstItem { node, kind })
        }
        NodeKind::Expr(ExprKind::Identifier { id_kind, identifier }) => {
            if !contains(node.span, line, col, 1) {
                return None;
            }
            Some(InsideAstItem {
                node,
                kind: InsideKind::ExprIdentifier {
                    id_kind: *id_kind,
                    identifier: identifier.clone(),
                },
            })
        }
        _ => {
            if !contains(node.span, line, col, 0) {
                return None;
            }
            Some(InsideAstItem {
                node,
                kind: InsideKind::Default,
            })
        }
    }
}

/// Range containment with `slack` extra columns allowed past the end.
fn contains(span: Span, line: u32, col: u32, slack: u32) -> bool {
    if line < span.begin.line || line > span.end.line {
        return false;
    }
    if line == span.begin.line && col < span.begin.col {
        return false;
    }
    if line == span.end.line && col > span.end.col + slack {
        return false;
    }
    true
}

/// Nodes kept as kind-specific payload rather than tree children; the walk
/// has to descend into these too (most importantly call targets).
fn payload_nodes(node: &Node) -> Vec<&Node> {
    match &node.kind {
        NodeKind::TypeDecl { alias, .. } => vec![alias],
        NodeKind::RecordDecl { fields, .. } => fields.iter().map(|f| &f.ty).collect(),
        NodeKind::FuncDecl { args, return_type, .. } => {
            let mut ret: Vec<&Node> = args.iter().collect();
            ret.extend(return_type.as_deref());
            ret
        }
        NodeKind::Type(TypeKind::List { args }) => args.iter().collect(),
        NodeKind::Type(TypeKind::Map { key, value }) => vec![key, value],
        NodeKind::Type(TypeKind::FunctionType { domain, codomain }) => vec![domain, codomain],
        NodeKind::Type(TypeKind::Application { head }) => vec![head],
        NodeKind::Stmt(StmtKind::Switch { cond })
        | NodeKind::Stmt(StmtKind::If { cond })
        | NodeKind::Stmt(StmtKind::Elif { cond }) => vec![cond],
        NodeKind::Stmt(StmtKind::Let(LetKind::FunctionDefinition { def })) => vec![def],
        NodeKind::Stmt(StmtKind::Let(LetKind::ValueDefinition { pattern })) => vec![pattern],
        NodeKind::Stmt(StmtKind::FunctionDef { args, return_type }) => {
            let mut ret: Vec<&Node> = args.iter().collect();
            ret.extend(return_type.as_deref());
            ret
        }
        NodeKind::Case { pattern } => vec![pattern],
        NodeKind::Expr(ExprKind::Application { callee }) => vec![callee],
        NodeKind::Expr(ExprKind::MapLookup { map, key }) => vec![map, key],
        NodeKind::Expr(ExprKind::RecordOrMapUpdate { expr }) => vec![expr],
        NodeKind::Expr(ExprKind::ListComprehension { head }) => vec![head],
        NodeKind::Expr(ExprKind::AnonymousFunction { args }) => args.iter().collect(),
        NodeKind::LamArg { arg_type, .. } => arg_type.as_deref().into_iter().collect(),
        NodeKind::Path(PathKind::MapKey { key }) => vec![key],
        NodeKind::Generator(GeneratorKind::Generator { pattern, expr }) => vec![pattern, expr],
        NodeKind::Generator(GeneratorKind::Guard { expr }) => vec![expr],
        NodeKind::Generator(GeneratorKind::Definition { let_def }) => vec![let_def],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sophia_syntax::parser::{self, Rule};

    fn parse(source: &str) -> Node {
        parser::parse(source).ast.expect("tree")
    }

    fn parse_expr(source: &str) -> Node {
        parser::parse_rule(source, Rule::Expr).ast.expect("expr")
    }

    #[test]
    fn test_incomplete_include_string_gets_slack() {
        //         123456789012
        let tree = parse("include \"foo\ninclude \"bar\"\n");

        // One column past the incomplete include string is still inside it.
        let f = inside_ast(&tree, 1, 13).expect("hit");
        assert_eq!(f.kind, InsideKind::IncompleteIncludeStr);

        // One column past the complete include is the include node itself,
        // with the default classification.
        let f = inside_ast(&tree, 2, 14).expect("hit");
        assert!(matches!(f.node.kind, NodeKind::IncludeDecl { .. }));
        assert_eq!(f.kind, InsideKind::Default);
    }

    #[test]
    fn test_identifier_expression() {
        //              12345678
        let e = parse_expr("List.foo");

        let f1 = inside_ast(&e, 1, 1).expect("hit");
        match &f1.kind {
            InsideKind::ExprIdentifier { id_kind, identifier } => {
                assert_eq!(*id_kind, IdKind::QId);
                assert_eq!(identifier.text, "List.foo");
            }
            other => panic!("expected identifier, got {other:?}"),
        }

        let f2 = inside_ast(&e, 1, 8).expect("hit");
        assert_eq!(f1, f2);

        // Trailing slack: the cursor right after the identifier still hits it.
        let f3 = inside_ast(&e, 1, 9).expect("hit");
        assert_eq!(f1, f3);
    }

    #[test]
    fn test_call_target_identifier() {
        //              1234567890
        let e = parse_expr("List.foo()");

        let f = inside_ast(&e, 1, 3).expect("hit");
        match &f.kind {
            InsideKind::ExprIdentifier { identifier, .. } => {
                assert_eq!(identifier.text, "List.foo");
            }
            other => panic!("expected identifier, got {other:?}"),
        }

        // The closing paren belongs to the application, not the callee.
        let f = inside_ast(&e, 1, 10).expect("hit");
        assert!(matches!(
            f.node.kind,
            NodeKind::Expr(ExprKind::Application { .. })
        ));
        assert_eq!(f.kind, InsideKind::Default);
    }

    #[test]
    fn test_identifier_inside_function_body() {
        let tree = parse("contract C =\n  function foo() = List.bar\n");

        let f1 = inside_ast(&tree, 2, 20).expect("hit");
        match &f1.kind {
            InsideKind::ExprIdentifier { id_kind, identifier } => {
                assert_eq!(*id_kind, IdKind::QId);
                assert_eq!(identifier.text, "List.bar");
            }
            other => panic!("expected identifier, got {other:?}"),
        }

        let f2 = inside_ast(&tree, 2, 27).expect("hit");
        assert_eq!(f1, f2);
    }

    #[test]
    fn test_innermost_node_wins() {
        let tree = parse("contract C =\n  entrypoint f() = 1\n");

        // On the literal `1`.
        let f = inside_ast(&tree, 2, 20).expect("hit");
        assert!(matches!(
            f.node.kind,
            NodeKind::Expr(ExprKind::Literal { .. })
        ));

        // On the `contract` keyword only the outer declarations contain it.
        let f = inside_ast(&tree, 1, 1).expect("hit");
        assert!(matches!(f.node.kind, NodeKind::ContractDecl { .. }));
    }

    #[test]
    fn test_position_outside_everything() {
        let tree = parse("contract C =\n  entrypoint f() = 1\n");
        assert!(inside_ast(&tree, 10, 1).is_none());
    }
}
