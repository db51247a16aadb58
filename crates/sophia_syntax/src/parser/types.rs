/// Type expressions.
///
/// ```text
/// Type ::= Domain '=>' Type             // Function type
///        | Type '(' Sep(Type, ',') ')'  // Type application
///        | '(' Type ')'                 // Parens
///        | 'unit' | Sep(Type, '*')      // Tuples
///        | Id | QId | TVar
/// Domain ::= Type                       // Single argument
///          | '(' Sep(Type, ',') ')'     // Multiple arguments
/// ```

impl<'a> Parser<'a> {
    fn match_type(&mut self) -> MatchResult<Node> {
        let mut base = self.try_match(Self::match_type_literal).ok();

        if base.is_none() {
            if let Some(t) = self.try_match_token_of(TokenKind::Id) {
                base = Some(if t.text == "unit" {
                    // The unit type is the empty tuple.
                    Node::new(NodeKind::Type(TypeKind::Tuple), Vec::new(), t.span)
                } else {
                    Node::new(NodeKind::Type(TypeKind::Id(t.spanned())), Vec::new(), t.span)
                });
            }
        }
        if base.is_none() {
            if let Some(t) = self.try_match_token_of(TokenKind::QId) {
                base = Some(Node::new(NodeKind::Type(TypeKind::QId(t.spanned())), Vec::new(), t.span));
            }
        }
        if base.is_none() {
            if let Some(t) = self.try_match_token_of(TokenKind::TVar) {
                base = Some(Node::new(NodeKind::Type(TypeKind::TVar(t.spanned())), Vec::new(), t.span));
            }
        }
        // Not valid per the grammar, but seen in real contracts.
        if base.is_none() {
            if let Some(t) = self.try_match_token_of(TokenKind::Con) {
                base = Some(Node::new(NodeKind::Type(TypeKind::Con(t.spanned())), Vec::new(), t.span));
            }
        }

        if base.is_none() && is_ch_opt(self.scanner.peek_token().as_ref(), '(') {
            base = self.try_match(|p| p.match_type_function_type(None)).ok();
        }

        if base.is_none() && is_ch_opt(self.scanner.peek_token().as_ref(), '(') {
            let list = self.match_sep_list('(', ')', ',', "Expecting type", Self::match_type)?;
            let span = Span::new(list.begin.full_span.begin, list.end_span().end);
            let kind = if list.children.len() == 1 {
                TypeKind::Parens
            } else {
                // Not in the grammar.
                TypeKind::Pair
            };
            base = Some(Node::new(NodeKind::Type(kind), list.children, span));
        }

        let Some(mut ret) = base else { return Err(NoMatch) };

        let single = ret.clone();
        if let Ok(ft) = self.try_match(|p| p.match_type_function_type(Some(single))) {
            ret = ft;
        }
        let head = ret.clone();
        if let Ok(app) = self.try_match(|p| p.match_type_application(head)) {
            ret = app;
        }
        let first = ret.clone();
        if let Ok(tuple) = self.try_match(|p| p.match_type_tuple(first)) {
            ret = tuple;
        }

        Ok(ret)
    }

    /// `int`, `string`, `bool`, `list(...)`, `map(Key, Value)`.
    fn match_type_literal(&mut self) -> MatchResult<Node> {
        let t = self.match_token()?;
        let kind = match t.text.as_str() {
            "int" => TypeKind::Int,
            "string" => TypeKind::String,
            "bool" => TypeKind::Bool,
            "list" => TypeKind::List {
                args: self.match_type_list_args()?,
            },
            "map" => {
                let (key, value) = self.match_type_map_args()?;
                TypeKind::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            _ => return Err(NoMatch),
        };
        Ok(Node::new(NodeKind::Type(kind), Vec::new(), t.span))
    }

    fn match_type_list_args(&mut self) -> MatchResult<Vec<Node>> {
        self.match_ch('(')?;
        let mut args = Vec::new();
        let mut comma = None;
        while self.scanner.peek_token().is_some() {
            if self.try_match_ch(')').is_some() {
                break;
            }
            let t = self.match_type()?;
            comma = self.try_match_ch(',');
            args.push(t);
        }
        if let Some(comma) = comma {
            self.add_error("Expected type", comma.span);
        }
        Ok(args)
    }

    fn match_type_map_args(&mut self) -> MatchResult<(Node, Node)> {
        self.match_ch('(')?;
        let key = self.match_type()?;
        self.match_ch(',')?;
        let value = self.match_type()?;
        self.match_ch(')')?;
        Ok((key, value))
    }

    /// `Domain '=>' Type`. When `single_domain` is given, that already-parsed
    /// type is the whole domain; otherwise a parenthesised argument list is
    /// matched.
    fn match_type_function_type(&mut self, single_domain: Option<Node>) -> MatchResult<Node> {
        let domain = self.match_domain(single_domain)?;
        self.match_text("=>")?;
        let codomain = self.match_type()?;

        let span = Span::new(domain.span.begin, codomain.span.end);
        Ok(Node::new(
            NodeKind::Type(TypeKind::FunctionType {
                domain: Box::new(domain),
                codomain: Box::new(codomain),
            }),
            Vec::new(),
            span,
        ))
    }

    fn match_domain(&mut self, single_domain: Option<Node>) -> MatchResult<Node> {
        if let Some(single) = single_domain {
            let span = single.span;
            return Ok(Node::new(NodeKind::Domain, vec![single], span));
        }
        let list = self.match_sep_list('(', ')', ',', "Expected type", Self::match_type)?;
        let span = Span::new(list.begin.span.begin, list.end_span().end);
        Ok(Node::new(NodeKind::Domain, list.children, span))
    }

    /// `Type '(' Sep(Type, ',') ')'`
    fn match_type_application(&mut self, head: Node) -> MatchResult<Node> {
        let list = self.match_sep_list('(', ')', ',', "Missing type", Self::match_type)?;
        let span = Span::new(head.span.begin, list.end_span().end);
        Ok(Node::new(
            NodeKind::Type(TypeKind::Application { head: Box::new(head) }),
            list.children,
            span,
        ))
    }

    /// `Type '*' Type`, with nested tuples flattened into one node.
    fn match_type_tuple(&mut self, first: Node) -> MatchResult<Node> {
        self.match_text("*")?;
        let second = self.match_type()?;

        let span = Span::new(first.span.begin, second.span.end);
        let children = if matches!(second.kind, NodeKind::Type(TypeKind::Tuple)) {
            let mut children = vec![first];
            children.extend(second.children);
            children
        } else {
            vec![first, second]
        };
        Ok(Node::new(NodeKind::Type(TypeKind::Tuple), children, span))
    }
}
