/// Public parsing API: grammar-rule entry points and the result type.

/// Grammar rule to use as the parse entry point. [`Rule::File`] is the normal
/// whole-source rule; the others parse a sub-grammar, which is useful for
/// tooling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    File,
    TopDecl,
    IncludeDecl,
    ContractDecl,
    TypeDecl,
    RecordDecl,
    DatatypeDecl,
    EntrypointDecl,
    FunctionDecl,
    Stmt,
    Type,
    Expr,
    Path,
}

/// Outcome of a parse: a best-effort tree plus diagnostics.
///
/// `ast` is `None` only when the entry rule did not match at all; diagnostics
/// recorded before the top-level mismatch are still returned.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub ast: Option<Node>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn dispatch(&mut self, rule: Rule) -> MatchResult<Node> {
        match rule {
            Rule::File => self.parse_file(),
            Rule::TopDecl => self.match_top_decl(),
            Rule::IncludeDecl => self.match_include(),
            Rule::ContractDecl => self.match_contract(),
            Rule::TypeDecl => self.match_type_decl(),
            Rule::RecordDecl => self.match_record_decl(),
            Rule::DatatypeDecl => self.match_datatype_decl(),
            Rule::EntrypointDecl => self.match_entrypoint_decl(),
            Rule::FunctionDecl => self.match_function_decl(),
            Rule::Stmt => self.match_stmt(),
            Rule::Type => self.match_type(),
            Rule::Expr => self.match_expr(),
            Rule::Path => self.match_expr_path(),
        }
    }
}

/// Parse a whole source text with the `File` rule.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse(source: &str) -> ParseResult {
    parse_rule(source, Rule::File)
}

/// Parse a source text starting from an arbitrary grammar rule.
///
/// A top-level `NoMatch` restores the cursor but keeps the diagnostics
/// recorded along the way.
#[tracing::instrument(skip_all, fields(rule = ?rule, source_len = source.len()))]
pub fn parse_rule(source: &str, rule: Rule) -> ParseResult {
    let mut parser = Parser::new(source);
    let saved = parser.scanner.pos();

    let ast = match parser.dispatch(rule) {
        Ok(node) => Some(node),
        Err(NoMatch) => {
            parser.scanner.set_pos(saved);
            None
        }
    };

    ParseResult {
        ast,
        errors: parser.errors,
        warnings: parser.warnings,
    }
}
