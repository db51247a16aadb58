/// Expressions.
///
/// A primary expression is matched first, then a suffix loop greedily extends
/// it: binary operators (flat, no precedence), type annotations, projections,
/// assignments (argument position only), and same-line applications, map
/// lookups, and record/map updates.

/// Context flags for expression parsing.
#[derive(Debug, Clone, Copy, Default)]
struct ExprOpts {
    /// Skip the anonymous-function alternative, so a parenthesised pattern
    /// like `(x, _)` is not read as a lambda argument list.
    ignore_anonymous_function: bool,
    /// Allow `Expr '=' Expr` suffixes (named call arguments).
    allow_assign: bool,
}

impl<'a> Parser<'a> {
    fn match_expr(&mut self) -> MatchResult<Node> {
        self.match_expr_with(ExprOpts::default())
    }

    fn match_expr_allow_assign(&mut self) -> MatchResult<Node> {
        self.match_expr_with(ExprOpts {
            allow_assign: true,
            ..ExprOpts::default()
        })
    }

    fn match_pattern(&mut self) -> MatchResult<Node> {
        self.match_expr()
    }

    fn match_pattern_no_anonymous_function(&mut self) -> MatchResult<Node> {
        self.match_expr_with(ExprOpts {
            ignore_anonymous_function: true,
            ..ExprOpts::default()
        })
    }

    fn match_expr_with(&mut self, opts: ExprOpts) -> MatchResult<Node> {
        let primary = self.match_expr_primary(opts)?;
        self.match_expr_suffixes(primary, opts)
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    fn match_expr_primary(&mut self, opts: ExprOpts) -> MatchResult<Node> {
        let pt = self.scanner.peek_token();

        // Record or map value
        if is_ch_opt(pt.as_ref(), '{') {
            let (children, span) = self.match_expr_sep_list(
                '{',
                '}',
                "Expected record or map value",
                Self::match_expr_field_update,
            )?;
            return Ok(Node::new(NodeKind::Expr(ExprKind::RecordOrMapValue), children, span));
        }

        // List comprehension, list range, or plain list
        if is_ch_opt(pt.as_ref(), '[') {
            if let Ok(compr) = self.try_match(Self::match_expr_list_comprehension) {
                return Ok(compr);
            }
            if let Ok(range) = self.try_match(Self::match_expr_list_range) {
                return Ok(range);
            }
            let (children, span) =
                self.match_expr_sep_list('[', ']', "Expected an expression", Self::match_expr)?;
            return Ok(Node::new(NodeKind::Expr(ExprKind::List), children, span));
        }

        // Anonymous function or parenthesised expression group
        if is_ch_opt(pt.as_ref(), '(') {
            if !opts.ignore_anonymous_function {
                if let Ok(af) = self.try_match(Self::match_expr_anonymous_function) {
                    return Ok(af);
                }
            }
            let (children, span) =
                self.match_expr_sep_list('(', ')', "Expected an expression", Self::match_expr)?;
            return Ok(Node::new(NodeKind::Expr(ExprKind::Pair), children, span));
        }

        if pt.as_ref().is_some_and(|t| t.text == "if") {
            return self.match_expr_if();
        }

        // Unary operators
        for op in ['-', '!'] {
            let is_op = pt
                .as_ref()
                .is_some_and(|t| t.kind == TokenKind::Op && t.text.len() == 1 && t.text.starts_with(op));
            if is_op {
                let op_tok = self.match_token()?;
                let operand = self.match_expr()?;
                let span = Span::new(op_tok.full_span.begin, operand.span.end);
                return Ok(Node::new(
                    NodeKind::Expr(ExprKind::UnaryOp { op: op_tok.spanned() }),
                    vec![operand],
                    span,
                ));
            }
        }

        // Identifiers
        for (kind, id_kind) in [
            (TokenKind::Id, IdKind::Id),
            (TokenKind::Con, IdKind::Con),
            (TokenKind::QId, IdKind::QId),
            (TokenKind::QCon, IdKind::QCon),
        ] {
            if let Some(t) = self.try_match_token_of(kind) {
                return Ok(identifier_expr(&t, id_kind));
            }
        }

        // Literals
        let saved = self.scanner.pos();
        match self.scanner.next_token() {
            Some(t) if t.kind == TokenKind::Int => {
                return Ok(Node::new(
                    NodeKind::Expr(ExprKind::Literal {
                        kind: LiteralKind::Int,
                        value: t.spanned(),
                    }),
                    Vec::new(),
                    t.span,
                ));
            }
            Some(t) if t.kind == TokenKind::String => {
                self.check_valid_string_token(&t);
                return Ok(Node::new(
                    NodeKind::Expr(ExprKind::Literal {
                        kind: LiteralKind::Str,
                        value: t.spanned(),
                    }),
                    Vec::new(),
                    t.span,
                ));
            }
            _ => self.scanner.set_pos(saved),
        }

        Err(NoMatch)
    }

    // ========================================================================
    // Suffix chaining
    // ========================================================================

    fn match_expr_suffixes(&mut self, primary: Node, opts: ExprOpts) -> MatchResult<Node> {
        let first_begin = primary.span.begin;
        let mut ret = primary;

        loop {
            // Binary operator, flat and greedy; precedence is left to consumers.
            if let Some(bin_op) = self.try_match_bin_op() {
                match self.try_match(Self::match_expr) {
                    Ok(rhs) => {
                        let span = Span::new(ret.span.begin, rhs.span.end);
                        ret = Node::new(
                            NodeKind::Expr(ExprKind::BinaryOp { op: bin_op.spanned() }),
                            vec![ret, rhs],
                            span,
                        );
                        continue;
                    }
                    Err(NoMatch) => {
                        self.add_error("Missing expression", bin_op.span);
                        break;
                    }
                }
            }

            // Type annotation
            if let Some(colon) = self.try_match_ch(':') {
                match self.try_match(Self::match_type) {
                    Ok(ty) => {
                        let span = Span::new(first_begin, ty.span.end);
                        ret = Node::new(NodeKind::Expr(ExprKind::TypeAnnotation), vec![ret, ty], span);
                        continue;
                    }
                    Err(NoMatch) => {
                        self.add_error("Missing type", colon.span);
                        let span = Span::new(first_begin, ret.span.end);
                        ret = Node::new(NodeKind::Expr(ExprKind::TypeAnnotation), vec![ret], span);
                        break;
                    }
                }
            }

            // Projection
            if let Some(dot) = self.try_match_ch('.') {
                match self.try_match_token_of(TokenKind::Id) {
                    Some(id) => {
                        let ide = identifier_expr(&id, IdKind::Id);
                        let span = Span::new(first_begin, ide.span.end);
                        ret = Node::new(NodeKind::Expr(ExprKind::Projection), vec![ret, ide], span);
                        continue;
                    }
                    None => {
                        self.add_error("Missing projection id \"Expr '.' Id\"", dot.span);
                        let span = Span::new(first_begin, ret.span.end);
                        ret = Node::new(NodeKind::Expr(ExprKind::Projection), vec![ret], span);
                        break;
                    }
                }
            }

            if opts.allow_assign && self.try_match_ch('=').is_some() {
                let value = self.match_expr()?;
                let span = Span::new(ret.span.begin, value.span.end);
                ret = Node::new(NodeKind::Expr(ExprKind::Assign), vec![ret, value], span);
                continue;
            }

            let pt = self.scanner.peek_token();

            // Application; the argument list must start on the line where the
            // expression so far ends.
            if is_ch_opt(pt.as_ref(), '(') {
                let pt_line = pt.as_ref().map_or(0, |t| t.full_span.begin.line);
                if pt_line > ret.span.end.line {
                    break;
                }
                let list = self.match_sep_list(
                    '(',
                    ')',
                    ',',
                    "Expected an expression",
                    Self::match_expr_allow_assign,
                )?;
                let span = Span::new(first_begin, list.end_span().end);
                ret = Node::new(
                    NodeKind::Expr(ExprKind::Application { callee: Box::new(ret) }),
                    list.children,
                    span,
                );
                continue;
            }

            // Map lookup, same-line rule as application
            if is_ch_opt(pt.as_ref(), '[') {
                let pt_line = pt.as_ref().map_or(0, |t| t.full_span.begin.line);
                if pt_line > ret.span.end.line {
                    break;
                }
                self.match_ch('[')?;
                let key = self.match_expr()?;
                let rb = self.match_ch(']')?;
                let span = Span::new(ret.span.begin, rb.full_span.end);
                ret = Node::new(
                    NodeKind::Expr(ExprKind::MapLookup {
                        map: Box::new(ret),
                        key: Box::new(key),
                    }),
                    Vec::new(),
                    span,
                );
                continue;
            }

            // Record or map update. Requires the brace on the expression's
            // first line, so a block-mate record value on the next line is
            // not swallowed.
            let same_line = pt
                .as_ref()
                .is_some_and(|t| is_ch(t, '{') && t.full_span.begin.line == ret.span.begin.line);
            if same_line {
                let (children, span) = self.match_expr_sep_list(
                    '{',
                    '}',
                    "Expected record or map update",
                    Self::match_expr_field_update,
                )?;
                ret = Node::new(
                    NodeKind::Expr(ExprKind::RecordOrMapUpdate { expr: Box::new(ret) }),
                    children,
                    span,
                );
                continue;
            }

            break;
        }

        Ok(ret)
    }

    // ========================================================================
    // Compound expression forms
    // ========================================================================

    /// Comma-separated expression list between delimiter tokens. The returned
    /// span covers the delimiters' content range.
    fn match_expr_sep_list(
        &mut self,
        begin: char,
        end: char,
        trailing_sep_error: &str,
        item: fn(&mut Self) -> MatchResult<Node>,
    ) -> MatchResult<(Vec<Node>, Span)> {
        let list = self.match_sep_list(begin, end, ',', trailing_sep_error, item)?;
        let span = Span::new(list.begin.span.begin, list.end_span().end);
        Ok((list.children, span))
    }

    /// ```text
    /// '(' Sep(LamArg, ',') ')' '=>' Block(Stmt)
    /// LamArg ::= Id [':' Type]
    /// ```
    fn match_expr_anonymous_function(&mut self) -> MatchResult<Node> {
        let args = self.match_sep_list('(', ')', ',', "Expected lambda argument", Self::match_lam_arg)?;
        let arrow = self.match_text("=>")?;
        let children = self.parse_block(Self::match_stmt);

        let end = block_end(&children, arrow.full_span.end);
        let span = Span::new(args.begin.full_span.begin, end);
        Ok(Node::new(
            NodeKind::Expr(ExprKind::AnonymousFunction { args: args.children }),
            children,
            span,
        ))
    }

    fn match_lam_arg(&mut self) -> MatchResult<Node> {
        let id = self.match_id()?;

        let mut span = id.full_span;
        let mut arg_type = None;
        if self.try_match_ch(':').is_some() {
            let ty = self.match_type()?;
            span.end = ty.span.end;
            arg_type = Some(Box::new(ty));
        }

        Ok(Node::new(
            NodeKind::LamArg {
                id: id.spanned(),
                arg_type,
            },
            Vec::new(),
            span,
        ))
    }

    /// `'if' '(' Expr ')' Expr 'else' Expr`
    fn match_expr_if(&mut self) -> MatchResult<Node> {
        let kw = self.match_text("if")?;
        self.match_ch('(')?;
        let cond = self.match_expr()?;
        self.match_ch(')')?;

        let then_expr = self.match_expr()?;
        self.match_text("else")?;
        let else_expr = self.match_expr()?;

        let span = Span::new(kw.full_span.begin, else_expr.span.end);
        Ok(Node::new(
            NodeKind::Expr(ExprKind::If),
            vec![cond, then_expr, else_expr],
            span,
        ))
    }

    /// ```text
    /// '[' Expr '|' Sep1(Generator, ',') ']'
    /// Generator ::= Pattern '<-' Expr  // Generator
    ///             | 'if' '(' Expr ')'  // Guard
    ///             | 'let' LetDef       // Definition
    /// ```
    fn match_expr_list_comprehension(&mut self) -> MatchResult<Node> {
        let lb = self.match_ch('[')?;
        let head = self.match_expr()?;
        self.match_text("|")?;
        let children = self.match_sep1_list(",", Self::match_generator)?;
        let rb = self.match_ch(']')?;

        let span = Span::new(lb.full_span.begin, rb.full_span.end);
        Ok(Node::new(
            NodeKind::Expr(ExprKind::ListComprehension { head: Box::new(head) }),
            children,
            span,
        ))
    }

    fn match_generator(&mut self) -> MatchResult<Node> {
        if let Ok(let_def) = self.try_match(Self::match_stmt_let) {
            let span = let_def.span;
            return Ok(Node::new(
                NodeKind::Generator(GeneratorKind::Definition {
                    let_def: Box::new(let_def),
                }),
                Vec::new(),
                span,
            ));
        }

        if let Some(kw) = self.try_match_text("if") {
            self.match_ch('(')?;
            let expr = self.match_expr()?;
            let rp = self.match_ch(')')?;
            let span = Span::new(kw.full_span.begin, rp.full_span.end);
            return Ok(Node::new(
                NodeKind::Generator(GeneratorKind::Guard { expr: Box::new(expr) }),
                Vec::new(),
                span,
            ));
        }

        let pattern = self.match_pattern()?;
        self.match_text("<-")?;
        let expr = self.match_expr()?;
        let span = Span::new(pattern.span.begin, expr.span.end);
        Ok(Node::new(
            NodeKind::Generator(GeneratorKind::Generator {
                pattern: Box::new(pattern),
                expr: Box::new(expr),
            }),
            Vec::new(),
            span,
        ))
    }

    /// `'[' Expr '..' Expr ']'`
    fn match_expr_list_range(&mut self) -> MatchResult<Node> {
        let lb = self.match_ch('[')?;
        let from = self.match_expr()?;
        self.match_text("..")?;
        let to = self.match_expr()?;
        let rb = self.match_ch(']')?;

        let span = Span::new(lb.full_span.begin, rb.full_span.end);
        Ok(Node::new(NodeKind::Expr(ExprKind::ListRange), vec![from, to], span))
    }

    /// `[Id '@'] Path '=' Expr`
    fn match_expr_field_update(&mut self) -> MatchResult<Node> {
        // Speculative alias prefix
        let saved = self.scanner.pos();
        let mut alias = None;
        let t_alias = self.scanner.next_token();
        let t_at = self.scanner.next_token();
        match (&t_alias, &t_at) {
            (Some(a), Some(at)) if a.kind == TokenKind::Id && is_ch(at, '@') => {
                alias = Some(a.clone());
            }
            _ => self.scanner.set_pos(saved),
        }

        let path = self.match_expr_path()?;
        self.match_ch('=')?;
        let expr = self.match_expr()?;

        let begin = alias.as_ref().map_or(path.span.begin, |a| a.full_span.begin);
        let span = Span::new(begin, expr.span.end);
        Ok(Node::new(
            NodeKind::FieldUpdate {
                alias: alias.map(|a| a.spanned()),
            },
            vec![path, expr],
            span,
        ))
    }

    /// ```text
    /// Path ::= Id                 // Record field
    ///        | '[' Expr ']'       // Map key
    ///        | Path '.' Id        // Nested record field
    ///        | Path '[' Expr ']'  // Nested map key
    /// ```
    fn match_expr_path(&mut self) -> MatchResult<Node> {
        let mut ret = if is_ch_opt(self.scanner.peek_token().as_ref(), '[') {
            let lb = self.match_ch('[')?;
            let key = self.match_expr()?;
            let rb = self.match_ch(']')?;
            Node::new(
                NodeKind::Path(PathKind::MapKey { key: Box::new(key) }),
                Vec::new(),
                Span::new(lb.full_span.begin, rb.full_span.end),
            )
        } else {
            let id = self.try_match_token_of(TokenKind::Id).ok_or(NoMatch)?;
            Node::new(
                NodeKind::Path(PathKind::RecordField { id: id.spanned() }),
                Vec::new(),
                id.full_span,
            )
        };

        if is_ch_opt(self.scanner.peek_token().as_ref(), '.') {
            self.scanner.next_token();
            let child = self.match_expr_path()?;
            ret.children = vec![child];
        } else if is_ch_opt(self.scanner.peek_token().as_ref(), '[') {
            let child = self.match_expr_path()?;
            ret.children = vec![child];
        }

        Ok(ret)
    }
}

fn identifier_expr(t: &Token, id_kind: IdKind) -> Node {
    Node::new(
        NodeKind::Expr(ExprKind::Identifier {
            id_kind,
            identifier: t.spanned(),
        }),
        Vec::new(),
        t.span,
    )
}
