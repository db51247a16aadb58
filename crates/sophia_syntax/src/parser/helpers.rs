/// Token-level matchers and shared list/block machinery.

/// True if `t` is the single-character token `ch`.
fn is_ch(t: &Token, ch: char) -> bool {
    t.kind == TokenKind::Char && t.text.len() == ch.len_utf8() && t.text.starts_with(ch)
}

fn is_ch_opt(t: Option<&Token>, ch: char) -> bool {
    t.is_some_and(|t| is_ch(t, ch))
}

/// Result of matching `begin Item (sep Item)* end`. The end token is `None`
/// when the input ran out before the closing delimiter.
struct SepList {
    begin: Token,
    end: Option<Token>,
    children: Vec<Node>,
}

impl SepList {
    /// End position of the list: the closing delimiter when present, else the
    /// last child, else the opening delimiter.
    fn end_span(&self) -> Span {
        match (&self.end, self.children.last()) {
            (Some(end), _) => end.full_span,
            (None, Some(last)) => last.span,
            (None, None) => self.begin.full_span,
        }
    }
}

impl<'a> Parser<'a> {
    fn add_error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(Diagnostic::new(message, span));
    }

    fn add_unexpected_token_error(&mut self, token: &str, span: Span) {
        self.add_error(format!("Unexpected token '{token}'"), span);
    }

    // ========================================================================
    // Single-token matchers
    // ========================================================================

    /// Next token regardless of kind, `NoMatch` at end of input.
    fn match_token(&mut self) -> MatchResult<Token> {
        self.scanner.next_token().ok_or(NoMatch)
    }

    /// Next token if its text is exactly `text` (keywords, `=>`, `*`, ...).
    fn match_text(&mut self, text: &str) -> MatchResult<Token> {
        let t = self.match_token()?;
        if t.text == text { Ok(t) } else { Err(NoMatch) }
    }

    fn try_match_text(&mut self, text: &str) -> Option<Token> {
        self.try_match(|p| p.match_text(text)).ok()
    }

    fn try_match_any_text(&mut self, texts: &[&str]) -> Option<Token> {
        self.try_match(|p| {
            let t = p.match_token()?;
            if texts.contains(&t.text.as_str()) {
                Ok(t)
            } else {
                Err(NoMatch)
            }
        })
        .ok()
    }

    /// Next token if it is the single-character token `ch`.
    fn match_ch(&mut self, ch: char) -> MatchResult<Token> {
        let t = self.match_token()?;
        if is_ch(&t, ch) { Ok(t) } else { Err(NoMatch) }
    }

    fn try_match_ch(&mut self, ch: char) -> Option<Token> {
        self.try_match(|p| p.match_ch(ch)).ok()
    }

    fn try_match_token_of(&mut self, kind: TokenKind) -> Option<Token> {
        self.try_match(|p| {
            let t = p.match_token()?;
            if t.kind == kind { Ok(t) } else { Err(NoMatch) }
        })
        .ok()
    }

    /// Any operator token; binary operators are matched flat, without a
    /// precedence table.
    fn try_match_bin_op(&mut self) -> Option<Token> {
        self.try_match_token_of(TokenKind::Op)
    }

    fn match_id(&mut self) -> MatchResult<Token> {
        let t = self.match_token()?;
        if t.kind == TokenKind::Id { Ok(t) } else { Err(NoMatch) }
    }

    /// Consume the next token as an identifier, flagging (but keeping) one of
    /// the wrong shape.
    fn match_id_checked(&mut self) -> MatchResult<Token> {
        let t = self.match_token()?;
        if t.kind != TokenKind::Id {
            self.add_error("Invalid identifier, format is [a-z_][A-Za-z0-9_']*", t.span);
        }
        Ok(t)
    }

    fn match_con_checked(&mut self) -> MatchResult<Token> {
        let t = self.match_token()?;
        if t.kind != TokenKind::Con {
            self.add_error("Invalid con, format is [A-Z][A-Za-z0-9_']*", t.span);
        }
        Ok(t)
    }

    /// Surface a token-level lexical error (e.g. a missing string end quote)
    /// as a positioned diagnostic.
    fn check_valid_string_token(&mut self, t: &Token) {
        if let Some(error) = t.error {
            self.add_error(error.to_string(), t.full_span);
        }
    }

    /// Flag items that are not on the reference line. Only the first offender
    /// is reported.
    fn check_same_line(&mut self, reference: Pos, items: &[Pos]) {
        for item in items {
            if item.line != reference.line {
                self.add_error("Unexpected indentation", Span::at(*item));
                break;
            }
        }
    }

    // ========================================================================
    // Blocks and separated lists
    // ========================================================================

    /// Match a maximal run of block items. The block ends when an item fails
    /// to match or when the next token starts left of the first item's column.
    fn parse_block(&mut self, item: fn(&mut Self) -> MatchResult<Node>) -> Vec<Node> {
        let mut items: Vec<Node> = Vec::new();
        loop {
            let Ok(node) = self.try_match(item) else { break };
            items.push(node);
            let Some(t) = self.scanner.peek_token() else { break };
            if t.full_span.begin.col < items[0].span.begin.col {
                break;
            }
        }
        items
    }

    /// `begin [Item (sep Item)*] end`. A separator directly before the end
    /// delimiter is reported with `trailing_sep_error` but does not abort. An
    /// item that fails to match propagates `NoMatch` for the whole list.
    fn match_sep_list(
        &mut self,
        begin: char,
        end: char,
        sep: char,
        trailing_sep_error: &str,
        mut item: impl FnMut(&mut Self) -> MatchResult<Node>,
    ) -> MatchResult<SepList> {
        let begin_tok = self.match_ch(begin)?;
        let mut children = Vec::new();
        let mut end_tok = None;
        let mut sep_tok = None;
        while self.scanner.peek_token().is_some() {
            if let Some(e) = self.try_match_ch(end) {
                end_tok = Some(e);
                break;
            }
            children.push(item(self)?);
            sep_tok = self.try_match_ch(sep);
        }
        if let Some(sep) = sep_tok {
            self.add_error(trailing_sep_error, sep.span);
        }
        Ok(SepList {
            begin: begin_tok,
            end: end_tok,
            children,
        })
    }

    /// `Item (sep Item)*`, unbounded and at least one item.
    fn match_sep1_list(
        &mut self,
        sep: &str,
        mut item: impl FnMut(&mut Self) -> MatchResult<Node>,
    ) -> MatchResult<Vec<Node>> {
        let mut children = vec![item(self)?];
        while self.try_match_text(sep).is_some() {
            children.push(item(self)?);
        }
        Ok(children)
    }

    // ========================================================================
    // `<keyword> Id ['(' TVar* ')'] '='` prefix
    // ========================================================================

    fn match_kw_id_opt_tvar_eq(&mut self, keyword: &str) -> MatchResult<KwIdPrefix> {
        let kw = self.match_text(keyword)?;
        let id = self.match_id_checked()?;

        let mut tvars: Option<Vec<SpannedStr>> = None;
        if is_ch_opt(self.scanner.peek_token().as_ref(), '(') {
            self.scanner.next_token();
            loop {
                let Some(pt) = self.scanner.peek_token() else { break };
                if is_ch(&pt, ')') {
                    break;
                }
                match self.scanner.next_token() {
                    Some(t) if t.kind == TokenKind::TVar => {
                        tvars.get_or_insert_with(Vec::new).push(t.spanned());
                    }
                    Some(t) => self.add_error("Invalid type variable", t.full_span),
                    None => break,
                }
                if is_ch_opt(self.scanner.peek_token().as_ref(), ',') {
                    self.scanner.next_token();
                    if let Some(pt) = self.scanner.peek_token() {
                        if is_ch(&pt, ')') {
                            self.add_unexpected_token_error(")", pt.full_span);
                        }
                    }
                }
            }
            // Consume ')'
            self.scanner.next_token();
        }

        let eq = self.match_ch('=')?;
        Ok(KwIdPrefix { kw, id, tvars, eq })
    }
}

struct KwIdPrefix {
    kw: Token,
    id: Token,
    tvars: Option<Vec<SpannedStr>>,
    eq: Token,
}
