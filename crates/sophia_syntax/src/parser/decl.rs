/// Top-level and contract-member declarations.

fn block_end(children: &[Node], fallback: Pos) -> Pos {
    children.last().map_or(fallback, |n| n.span.end)
}

impl<'a> Parser<'a> {
    /// `File ::= TopDecl+`. At least one top-level declaration is required;
    /// leftover content after the last one is flagged, not consumed.
    fn parse_file(&mut self) -> MatchResult<Node> {
        let mut children = Vec::new();
        while let Ok(decl) = self.try_match(Self::match_top_decl) {
            children.push(decl);
        }

        self.check_trailing_content();

        match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                let span = Span::covering(first.span, last.span);
                Ok(Node::new(NodeKind::File, children, span))
            }
            _ => Err(NoMatch),
        }
    }

    fn check_trailing_content(&mut self) {
        if let Some(rest) = self.scanner.rest_of_line() {
            self.add_error(format!("Trailing content \"{}\"", rest.text), rest.span);
        }
    }

    fn match_top_decl(&mut self) -> MatchResult<Node> {
        if let Ok(decl) = self.try_match(Self::match_contract) {
            return Ok(decl);
        }
        if let Ok(decl) = self.try_match(Self::match_namespace) {
            return Ok(decl);
        }
        if let Ok(decl) = self.try_match(Self::match_include) {
            return Ok(decl);
        }
        self.try_match(Self::match_pragma_compiler)
    }

    /// `['payable'] 'contract' Con '=' Block(Decl)`
    fn match_contract(&mut self) -> MatchResult<Node> {
        let payable = self.try_match_text("payable");
        let kw = self.match_text("contract")?;
        let con = self.match_con_checked()?;
        let eq = self.match_ch('=')?;

        let children = self.parse_block(Self::match_decl);

        let begin = payable.as_ref().map_or(kw.full_span.begin, |t| t.full_span.begin);
        let end = block_end(&children, eq.full_span.end);
        Ok(Node::new(
            NodeKind::ContractDecl {
                payable: payable.is_some(),
                con: con.spanned(),
            },
            children,
            Span::new(begin, end),
        ))
    }

    /// `'namespace' Con '=' Block(Decl)`
    fn match_namespace(&mut self) -> MatchResult<Node> {
        let kw = self.match_text("namespace")?;
        let con = self.match_con_checked()?;
        let eq = self.match_ch('=')?;

        let children = self.parse_block(Self::match_decl);

        let end = block_end(&children, eq.full_span.end);
        Ok(Node::new(
            NodeKind::NamespaceDecl { con: con.spanned() },
            children,
            Span::new(kw.full_span.begin, end),
        ))
    }

    /// `'include' String`. The include node is built even when the string is
    /// missing its end quote; the path query relies on that.
    fn match_include(&mut self) -> MatchResult<Node> {
        let kw = self.match_text("include")?;
        let s = self.match_token()?;
        if s.kind != TokenKind::String {
            return Err(NoMatch);
        }
        self.check_valid_string_token(&s);

        let span = Span::new(kw.full_span.begin, s.full_span.end);
        Ok(Node::new(
            NodeKind::IncludeDecl {
                include: s.quoted(),
                valid_token: s.error.is_none(),
            },
            Vec::new(),
            span,
        ))
    }

    /// `'@' 'compiler' Op Version`, e.g. `@compiler >= 4.3`.
    fn match_pragma_compiler(&mut self) -> MatchResult<Node> {
        let at = self.match_ch('@')?;
        self.match_text("compiler")?;
        let op = self.try_match_token_of(TokenKind::Op).ok_or(NoMatch)?;
        let version = self.match_version()?;

        let span = Span::new(at.full_span.begin, version.span.end);
        Ok(Node::new(
            NodeKind::PragmaCompiler { op: op.spanned() },
            vec![version],
            span,
        ))
    }

    /// `Version ::= Sep1(Int, '.')`
    fn match_version(&mut self) -> MatchResult<Node> {
        let ints = self.match_sep1_list(".", |p| {
            let t = p.try_match_token_of(TokenKind::Int).ok_or(NoMatch)?;
            Ok(Node::new(
                NodeKind::IntToken { value: t.spanned() },
                Vec::new(),
                t.span,
            ))
        })?;

        // Sep1 guarantees at least one element.
        let span = Span::covering(ints[0].span, ints[ints.len() - 1].span);
        Ok(Node::new(NodeKind::Version, ints, span))
    }

    fn match_decl(&mut self) -> MatchResult<Node> {
        if let Ok(decl) = self.try_match(Self::match_type_decl) {
            return Ok(decl);
        }
        if let Ok(decl) = self.try_match(Self::match_record_decl) {
            return Ok(decl);
        }
        if let Ok(decl) = self.try_match(Self::match_datatype_decl) {
            return Ok(decl);
        }
        if let Ok(decl) = self.try_match(Self::match_entrypoint_decl) {
            return Ok(decl);
        }
        self.try_match(Self::match_function_decl)
    }

    /// `'type' Id ['(' TVar* ')'] '=' Type`, all on one line.
    fn match_type_decl(&mut self) -> MatchResult<Node> {
        let prefix = self.match_kw_id_opt_tvar_eq("type")?;
        let alias = self.match_type()?;

        self.check_same_line(
            prefix.kw.span.begin,
            &[
                prefix.kw.span.begin,
                prefix.id.span.begin,
                prefix.eq.span.begin,
                alias.span.begin,
            ],
        );

        let span = Span::new(prefix.kw.span.begin, alias.span.end);
        Ok(Node::new(
            NodeKind::TypeDecl {
                id: prefix.id.spanned(),
                tvars: prefix.tvars,
                alias: Box::new(alias),
            },
            Vec::new(),
            span,
        ))
    }

    /// `'record' Id ['(' TVar* ')'] '=' '{' Sep(FieldType, ',') '}'`
    fn match_record_decl(&mut self) -> MatchResult<Node> {
        let prefix = self.match_kw_id_opt_tvar_eq("record")?;
        let record = self.match_record_type()?;

        self.check_same_line(
            prefix.kw.span.begin,
            &[
                prefix.kw.span.begin,
                prefix.id.span.begin,
                prefix.eq.span.begin,
                record.lcurly.span.begin,
            ],
        );

        let end = match (&record.rcurly, record.fields.last()) {
            (Some(rcurly), _) => rcurly.full_span.end,
            (None, Some(last)) => last.ty.span.end,
            (None, None) => record.lcurly.full_span.end,
        };
        Ok(Node::new(
            NodeKind::RecordDecl {
                id: prefix.id.spanned(),
                tvars: prefix.tvars,
                fields: record.fields,
            },
            Vec::new(),
            Span::new(prefix.kw.span.begin, end),
        ))
    }

    /// `FieldType ::= Id ':' Type`
    fn match_record_type(&mut self) -> MatchResult<RecordType> {
        let lcurly = self.match_ch('{')?;
        let mut rcurly = None;
        let mut comma = None;
        let mut fields = Vec::new();

        while self.scanner.peek_token().is_some() {
            if let Some(t) = self.try_match_ch('}') {
                rcurly = Some(t);
                break;
            }
            let id = self.match_id_checked()?;
            let colon = self.match_ch(':')?;
            let ty = self.match_type()?;
            fields.push(FieldType {
                id: id.spanned(),
                colon: colon.span.begin,
                ty,
            });
            comma = self.try_match_ch(',');
        }

        if let Some(comma) = comma {
            self.add_error("Expected a field type", comma.span);
        }

        Ok(RecordType { lcurly, rcurly, fields })
    }

    /// ```text
    /// 'datatype' Id ['(' TVar* ')'] '=' Sep1(ConDecl, '|')
    /// ConDecl ::= Con ['(' Sep1(Type, ',') ')']
    /// ```
    fn match_datatype_decl(&mut self) -> MatchResult<Node> {
        let prefix = self.match_kw_id_opt_tvar_eq("datatype")?;
        let children = self.match_sep1_list("|", Self::match_con_decl)?;

        // Sep1 guarantees at least one constructor.
        let end = children[children.len() - 1].span.end;
        Ok(Node::new(
            NodeKind::DatatypeDecl {
                id: prefix.id.spanned(),
                tvars: prefix.tvars,
            },
            children,
            Span::new(prefix.kw.span.begin, end),
        ))
    }

    fn match_con_decl(&mut self) -> MatchResult<Node> {
        let con = self.match_con_checked()?;

        let mut children = Vec::new();
        let mut end = con.full_span.end;
        if self.try_match_ch('(').is_some() {
            children = self.match_sep1_list(",", Self::match_type)?;
            let rp = self.match_ch(')')?;
            end = rp.full_span.end;
        }

        Ok(Node::new(
            NodeKind::ConDecl { con: con.spanned() },
            children,
            Span::new(con.full_span.begin, end),
        ))
    }

    /// ```text
    /// EModifier? 'entrypoint' Block(FuncDecl)
    /// EModifier ::= 'payable' | 'stateful'
    /// ```
    fn match_entrypoint_decl(&mut self) -> MatchResult<Node> {
        let modifier = self.try_match_any_text(&["payable", "stateful"]);
        let kw = self.match_text("entrypoint")?;

        let children = self.parse_block(Self::match_func_decl);

        let begin = modifier.as_ref().map_or(kw.full_span.begin, |t| t.full_span.begin);
        let end = block_end(&children, kw.full_span.end);
        Ok(Node::new(
            NodeKind::EntrypointDecl {
                modifier: modifier.map(|t| t.spanned()),
            },
            children,
            Span::new(begin, end),
        ))
    }

    /// ```text
    /// FModifier? 'function' Block(FuncDecl)
    /// FModifier ::= 'stateful' | 'private'
    /// ```
    fn match_function_decl(&mut self) -> MatchResult<Node> {
        let modifier = self.try_match_any_text(&["stateful", "private"]);
        let kw = self.match_text("function")?;

        let children = self.parse_block(Self::match_func_decl);

        let begin = modifier.as_ref().map_or(kw.full_span.begin, |t| t.full_span.begin);
        let end = block_end(&children, kw.full_span.end);
        Ok(Node::new(
            NodeKind::FunctionDecl {
                modifier: modifier.map(|t| t.spanned()),
            },
            children,
            Span::new(begin, end),
        ))
    }

    /// ```text
    /// FuncDecl ::= Id ':' Type                        // Type signature
    ///            | Id Args [':' Type] '=' Block(Stmt) // Definition
    /// Args ::= '(' Sep(Pattern, ',') ')'
    /// ```
    fn match_func_decl(&mut self) -> MatchResult<Node> {
        let id = self.match_id_checked()?;

        if self.try_match_ch(':').is_some() {
            let return_type = self.match_type()?;
            let span = Span::new(id.span.begin, return_type.span.end);
            return Ok(Node::new(
                NodeKind::FuncDecl {
                    kind: FuncDeclKind::Signature,
                    id: id.spanned(),
                    args: Vec::new(),
                    return_type: Some(Box::new(return_type)),
                },
                Vec::new(),
                span,
            ));
        }

        let args = self.match_args()?;
        let return_type = if self.try_match_ch(':').is_some() {
            Some(self.match_type()?)
        } else {
            None
        };
        let eq = self.match_ch('=')?;

        let missing_stmt_pos = self.scanner.location();
        let children = self.parse_block(Self::match_stmt);
        if children.is_empty() {
            self.add_error("Missing stmt", Span::at(missing_stmt_pos));
        }

        let end = block_end(&children, eq.full_span.end);
        Ok(Node::new(
            NodeKind::FuncDecl {
                kind: FuncDeclKind::Definition,
                id: id.spanned(),
                args,
                return_type: return_type.map(Box::new),
            },
            children,
            Span::new(id.span.begin, end),
        ))
    }

    fn match_args(&mut self) -> MatchResult<Vec<Node>> {
        let list = self.match_sep_list('(', ')', ',', "Expected expression", Self::match_pattern)?;
        Ok(list.children)
    }
}

struct RecordType {
    lcurly: Token,
    rcurly: Option<Token>,
    fields: Vec<FieldType>,
}
