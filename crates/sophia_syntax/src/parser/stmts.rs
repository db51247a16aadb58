/// Statements.
///
/// ```text
/// Stmt ::= 'switch' '(' Expr ')' Block(Case)
///        | 'if' '(' Expr ')' Block(Stmt)
///        | 'elif' '(' Expr ')' Block(Stmt)
///        | 'else' Block(Stmt)
///        | 'let' LetDef
///        | Id Args [':' Type] '=' Block(Stmt)  // Function definition
///        | Expr
/// ```

impl<'a> Parser<'a> {
    fn match_stmt(&mut self) -> MatchResult<Node> {
        if let Ok(stmt) = self.try_match(Self::match_stmt_switch) {
            return Ok(stmt);
        }
        if let Ok(stmt) = self.try_match(Self::match_stmt_if) {
            return Ok(stmt);
        }
        if let Ok(stmt) = self.try_match(Self::match_stmt_elif) {
            return Ok(stmt);
        }
        if let Ok(stmt) = self.try_match(Self::match_stmt_else) {
            return Ok(stmt);
        }
        if let Ok(stmt) = self.try_match(Self::match_stmt_let) {
            return Ok(stmt);
        }
        if let Ok(stmt) = self.try_match(Self::match_function_def) {
            return Ok(stmt);
        }
        self.match_expr()
    }

    /// `'switch' '(' Expr ')' Block(Case)`
    fn match_stmt_switch(&mut self) -> MatchResult<Node> {
        let kw = self.match_text("switch")?;
        self.match_ch('(')?;
        let cond = self.match_expr()?;
        let rp = self.match_ch(')')?;

        let children = self.parse_block(Self::match_case);

        let end = block_end(&children, rp.full_span.end);
        Ok(Node::new(
            NodeKind::Stmt(StmtKind::Switch { cond: Box::new(cond) }),
            children,
            Span::new(kw.full_span.begin, end),
        ))
    }

    fn match_stmt_if(&mut self) -> MatchResult<Node> {
        let kw = self.match_text("if")?;
        self.match_ch('(')?;
        let cond = self.match_expr()?;
        let rp = self.match_ch(')')?;

        let children = self.parse_block(Self::match_stmt);

        let end = block_end(&children, rp.full_span.end);
        Ok(Node::new(
            NodeKind::Stmt(StmtKind::If { cond: Box::new(cond) }),
            children,
            Span::new(kw.full_span.begin, end),
        ))
    }

    fn match_stmt_elif(&mut self) -> MatchResult<Node> {
        let kw = self.match_text("elif")?;
        self.match_ch('(')?;
        let cond = self.match_expr()?;
        let rp = self.match_ch(')')?;

        let children = self.parse_block(Self::match_stmt);

        let end = block_end(&children, rp.full_span.end);
        Ok(Node::new(
            NodeKind::Stmt(StmtKind::Elif { cond: Box::new(cond) }),
            children,
            Span::new(kw.full_span.begin, end),
        ))
    }

    fn match_stmt_else(&mut self) -> MatchResult<Node> {
        let kw = self.match_text("else")?;
        let children = self.parse_block(Self::match_stmt);

        let end = block_end(&children, kw.full_span.end);
        Ok(Node::new(
            NodeKind::Stmt(StmtKind::Else),
            children,
            Span::new(kw.full_span.begin, end),
        ))
    }

    /// ```text
    /// 'let' LetDef
    /// LetDef ::= Id Args [':' Type] '=' Block(Stmt)  // Function definition
    ///          | Pattern '=' Block(Stmt)             // Value definition
    /// ```
    fn match_stmt_let(&mut self) -> MatchResult<Node> {
        let kw = self.match_text("let")?;
        let begin = kw.full_span.begin;

        if let Ok(def) = self.try_match(Self::match_function_def) {
            let span = Span::new(begin, def.span.end);
            return Ok(Node::new(
                NodeKind::Stmt(StmtKind::Let(LetKind::FunctionDefinition { def: Box::new(def) })),
                Vec::new(),
                span,
            ));
        }

        let pattern = self.match_pattern()?;
        let eq = self.match_ch('=')?;
        let children = self.parse_block(Self::match_stmt);

        let end = block_end(&children, eq.full_span.end);
        Ok(Node::new(
            NodeKind::Stmt(StmtKind::Let(LetKind::ValueDefinition {
                pattern: Box::new(pattern),
            })),
            children,
            Span::new(begin, end),
        ))
    }

    /// `Case ::= Pattern '=>' Block(Stmt)`. The pattern skips the
    /// anonymous-function alternative so `(x, _) => ...` reads as a pair.
    fn match_case(&mut self) -> MatchResult<Node> {
        let pattern = self.match_pattern_no_anonymous_function()?;
        let arrow = self.match_text("=>")?;
        let children = self.parse_block(Self::match_stmt);

        let end = block_end(&children, arrow.full_span.end);
        let span = Span::new(pattern.span.begin, end);
        Ok(Node::new(
            NodeKind::Case {
                pattern: Box::new(pattern),
            },
            children,
            span,
        ))
    }

    /// `Id Args [':' Type] '=' Block(Stmt)`
    fn match_function_def(&mut self) -> MatchResult<Node> {
        let id = self.match_id_checked()?;
        let args = self.match_args()?;

        let return_type = if self.try_match_ch(':').is_some() {
            Some(self.match_type()?)
        } else {
            None
        };

        let eq = self.match_ch('=')?;
        let children = self.parse_block(Self::match_stmt);

        let end = block_end(&children, eq.full_span.end);
        Ok(Node::new(
            NodeKind::Stmt(StmtKind::FunctionDef {
                args,
                return_type: return_type.map(Box::new),
            }),
            children,
            Span::new(id.span.begin, end),
        ))
    }
}
