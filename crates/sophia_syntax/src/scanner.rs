//! Scanner for Sophia source text.
//!
//! Tokens are classified into a small set of kinds:
//! - `Id` / `Con` / `QId` / `QCon` / `TVar` — identifier shapes
//! - `Int` / `String` — literals
//! - `Op` — operators (including the word operator `mod`)
//! - `Misc` — `=>`, `..`, `<-`
//! - `Char` — any other single character
//!
//! The scanner never fails: lexical problems are recorded as an error tag on the
//! token itself (see [`TokenError`]) and scanning continues. The cursor is an
//! opaque [`ScannerPos`] that can be saved and restored, which is what the
//! parser's backtracking is built on.
//!
//! Line and column bookkeeping happens only in the whitespace/comment skipping
//! code; `\r`, `\n`, and `\r\n` each count as exactly one line break.

use crate::ast::{Pos, QuotedStr, Span, SpannedStr};

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Id,
    Con,
    QId,
    QCon,
    TVar,
    Int,
    String,
    Op,
    Misc,
    Char,
}

/// Lexical error tag attached to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Missing string end quote")]
    MissingRightStringQuote,
}

/// A scanned token.
///
/// `span` covers the token's content; `full_span` additionally covers any
/// delimiters. The two differ only for string literals, where `span` is the
/// text between the quotes and `full_span` includes them. Span ends point at
/// the token's last character, not one past it.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub full_span: Span,
    pub error: Option<TokenError>,
}

impl Token {
    pub fn spanned(&self) -> SpannedStr {
        SpannedStr {
            text: self.text.clone(),
            span: self.span,
        }
    }

    pub fn quoted(&self) -> QuotedStr {
        QuotedStr {
            text: self.text.clone(),
            span: self.span,
            full_span: self.full_span,
        }
    }
}

/// Saved scanner cursor. Opaque to callers; obtained from [`Scanner::pos`]
/// and given back to [`Scanner::set_pos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerPos {
    pos: usize,
    line: u32,
    col: u32,
}

// ============================================================================
// Scanner
// ============================================================================

pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Save the cursor.
    pub fn pos(&self) -> ScannerPos {
        ScannerPos {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    /// Restore a previously saved cursor.
    pub fn set_pos(&mut self, p: ScannerPos) {
        self.pos = p.pos;
        self.line = p.line;
        self.col = p.col;
    }

    /// Source position of the next unconsumed character.
    pub fn location(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    // ========================================================================
    // Character handling
    // ========================================================================

    fn peek_ch(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_ch_at(&self, n: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(n)
    }

    fn next_ch(&mut self) -> Option<char> {
        let c = self.peek_ch()?;
        self.pos += c.len_utf8();
        self.col += 1;
        Some(c)
    }

    /// Consume one line break (`\n`, `\r`, or `\r\n`) if present.
    fn try_match_line_break(&mut self) -> bool {
        match self.peek_ch() {
            Some('\n') => {
                self.pos += 1;
            }
            Some('\r') => {
                self.pos += 1;
                if self.peek_ch() == Some('\n') {
                    self.pos += 1;
                }
            }
            _ => return false,
        }
        self.line += 1;
        self.col = 1;
        true
    }

    // ========================================================================
    // Whitespace and comments
    // ========================================================================

    fn skip_ws(&mut self) {
        loop {
            match self.peek_ch() {
                Some(' ' | '\t') => {
                    self.next_ch();
                }
                Some('\n' | '\r') => {
                    self.try_match_line_break();
                }
                _ => break,
            }
        }
    }

    fn try_match_line_comment(&mut self) -> bool {
        if self.peek_ch() != Some('/') || self.peek_ch_at(1) != Some('/') {
            return false;
        }
        while let Some(c) = self.peek_ch() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.next_ch();
        }
        true
    }

    /// Consume a `/* ... */` comment. An unterminated comment is not consumed
    /// at all; the cursor is restored and the `/` is scanned as an operator.
    fn try_match_block_comment(&mut self) -> bool {
        if self.peek_ch() != Some('/') || self.peek_ch_at(1) != Some('*') {
            return false;
        }
        let saved = self.pos();
        self.next_ch();
        self.next_ch();
        loop {
            match self.peek_ch() {
                None => {
                    self.set_pos(saved);
                    return false;
                }
                Some('*') if self.peek_ch_at(1) == Some('/') => {
                    self.next_ch();
                    self.next_ch();
                    return true;
                }
                Some('\n' | '\r') => {
                    self.try_match_line_break();
                }
                Some(_) => {
                    self.next_ch();
                }
            }
        }
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            self.skip_ws();
            let before = self.pos;
            self.try_match_line_comment();
            self.try_match_block_comment();
            if self.pos == before {
                break;
            }
        }
    }

    /// Remaining text on the current line (leading whitespace/comments
    /// skipped), with its range. `None` at end of input or end of line.
    pub fn rest_of_line(&mut self) -> Option<SpannedStr> {
        self.skip_ws_and_comments();
        let begin = self.location();
        let mut last = begin;
        while let Some(c) = self.peek_ch() {
            if c == '\n' || c == '\r' {
                break;
            }
            last = self.location();
            self.next_ch();
        }
        if self.pos == begin.offset {
            return None;
        }
        Some(SpannedStr {
            text: self.text[begin.offset..self.pos].to_string(),
            span: Span::new(begin, last),
        })
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Scan the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_ws_and_comments();
        let c = self.peek_ch()?;
        let token = match c {
            'a'..='z' | '_' => self.scan_id(),
            'A'..='Z' => self.scan_con(),
            '0'..='9' => self.scan_int(),
            '"' => self.scan_string(),
            '\'' => self.scan_tvar_or_quote(),
            _ => self.scan_op_or_char(),
        };
        Some(token)
    }

    /// Scan the next token without moving the cursor.
    pub fn peek_token(&mut self) -> Option<Token> {
        let saved = self.pos();
        let token = self.next_token();
        self.set_pos(saved);
        token
    }

    fn scan_word_span(&mut self) -> Span {
        let begin = self.location();
        let mut last = begin;
        while let Some(c) = self.peek_ch() {
            if !is_word_char(c) {
                break;
            }
            last = self.location();
            self.next_ch();
        }
        Span::new(begin, last)
    }

    fn token_at(&self, kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            text: self.text[span.begin.offset..self.pos].to_string(),
            span,
            full_span: span,
            error: None,
        }
    }

    fn scan_id(&mut self) -> Token {
        let span = self.scan_word_span();
        let mut token = self.token_at(TokenKind::Id, span);
        if token.text == "mod" {
            token.kind = TokenKind::Op;
        }
        token
    }

    /// Scan a constructor, speculatively extending it into a qualified name
    /// (`Con.id` or `Con.Con`). A dot not followed by a name part is left
    /// unconsumed and the token stays a plain `Con`.
    fn scan_con(&mut self) -> Token {
        let span = self.scan_word_span();
        if self.peek_ch() != Some('.') {
            return self.token_at(TokenKind::Con, span);
        }
        let saved = self.pos();
        self.next_ch();
        let kind = match self.peek_ch() {
            Some('a'..='z' | '_') => TokenKind::QId,
            Some('A'..='Z') => TokenKind::QCon,
            _ => {
                self.set_pos(saved);
                return self.token_at(TokenKind::Con, span);
            }
        };
        let trailing = self.scan_word_span();
        self.token_at(kind, Span::new(span.begin, trailing.end))
    }

    /// Scan an integer literal: a greedy run of digits and `_` separators.
    fn scan_int(&mut self) -> Token {
        let begin = self.location();
        let mut last = begin;
        while let Some(c) = self.peek_ch() {
            if !c.is_ascii_digit() && c != '_' {
                break;
            }
            last = self.location();
            self.next_ch();
        }
        self.token_at(TokenKind::Int, Span::new(begin, last))
    }

    /// Scan a string literal. The token is produced even when the closing
    /// quote is missing before end of line/input; it then carries the
    /// `MissingRightStringQuote` tag and ends at the last content character.
    fn scan_string(&mut self) -> Token {
        let quote = self.location();
        self.next_ch();
        let content_begin = self.location();
        let mut last = content_begin;
        let mut any_content = false;
        let mut terminated = false;
        let mut close = quote;
        loop {
            match self.peek_ch() {
                None | Some('\n' | '\r') => break,
                Some('"') => {
                    close = self.location();
                    self.next_ch();
                    terminated = true;
                    break;
                }
                Some(_) => {
                    last = self.location();
                    any_content = true;
                    self.next_ch();
                }
            }
        }
        let content_end_offset = if terminated { close.offset } else { self.pos };
        let span = if any_content {
            Span::new(content_begin, last)
        } else {
            Span::at(content_begin)
        };
        let full_span = if terminated {
            Span::new(quote, close)
        } else if any_content {
            Span::new(quote, last)
        } else {
            Span::at(quote)
        };
        Token {
            kind: TokenKind::String,
            text: self.text[content_begin.offset..content_end_offset].to_string(),
            span,
            full_span,
            error: (!terminated).then_some(TokenError::MissingRightStringQuote),
        }
    }

    /// A `'` starts a type variable when an identifier follows; otherwise it
    /// is just a single character token.
    fn scan_tvar_or_quote(&mut self) -> Token {
        let begin = self.location();
        let saved = self.pos();
        self.next_ch();
        if matches!(self.peek_ch(), Some('a'..='z' | '_')) {
            let word = self.scan_word_span();
            return self.token_at(TokenKind::TVar, Span::new(begin, word.end));
        }
        self.set_pos(saved);
        self.scan_single(TokenKind::Char)
    }

    fn scan_op_or_char(&mut self) -> Token {
        let (c0, c1) = (self.peek_ch(), self.peek_ch_at(1));
        if let (Some(a), Some(b)) = (c0, c1) {
            let kind = match (a, b) {
                ('+', '+') | (':', ':') | ('|', '|') | ('&', '&') | ('=', '=') | ('=', '<')
                | ('>', '=') | ('!', '=') => Some(TokenKind::Op),
                ('=', '>') | ('.', '.') | ('<', '-') => Some(TokenKind::Misc),
                _ => None,
            };
            if let Some(kind) = kind {
                let begin = self.location();
                self.next_ch();
                let last = self.location();
                self.next_ch();
                return self.token_at(kind, Span::new(begin, last));
            }
        }
        if matches!(c0, Some('+' | '-' | '*' | '/' | '^' | '>' | '<' | '!')) {
            return self.scan_single(TokenKind::Op);
        }
        self.scan_single(TokenKind::Char)
    }

    fn scan_single(&mut self, kind: TokenKind) -> Token {
        let begin = self.location();
        self.next_ch();
        self.token_at(kind, Span::at(begin))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\''
}

/// Scan a whole source text into tokens. Convenience for tests and tooling.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token() {
        tokens.push(token);
    }
    tokens
}

// ============================================================================
// Identifier shape helpers
// ============================================================================

pub fn is_valid_id(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('a'..='z' | '_')) && chars.all(is_word_char)
}

pub fn is_valid_con(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('A'..='Z')) && chars.all(is_word_char)
}

pub fn is_valid_qid(s: &str) -> bool {
    matches!(split_qid(s), Some((con, id)) if is_valid_con(con) && is_valid_id(id))
}

pub fn is_valid_qcon(s: &str) -> bool {
    matches!(split_qid(s), Some((con, trailing)) if is_valid_con(con) && is_valid_con(trailing))
}

pub fn is_valid_tvar(s: &str) -> bool {
    matches!(s.strip_prefix('\''), Some(rest) if is_valid_id(rest))
}

/// Split a qualified name into its two dot-separated parts. `None` unless
/// there is exactly one dot with text on both sides.
pub fn split_qid(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.splitn(3, '.');
    let head = parts.next()?;
    let tail = parts.next()?;
    if parts.next().is_some() || head.is_empty() || tail.is_empty() {
        return None;
    }
    Some((head, tail))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_identifier_shapes() {
        assert_eq!(
            kinds("foo Foo Foo.bar Foo.Bar 'a 42"),
            [
                TokenKind::Id,
                TokenKind::Con,
                TokenKind::QId,
                TokenKind::QCon,
                TokenKind::TVar,
                TokenKind::Int,
            ]
        );
        assert_eq!(
            texts("Foo.bar 'state x_1'"),
            ["Foo.bar", "'state", "x_1'"]
        );
    }

    #[test]
    fn test_integer_with_underscore_separators() {
        let tokens = tokenize("1_000");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].text, "1_000");
        assert_eq!(tokens[0].span.end.col, 5);

        assert_eq!(
            kinds("100_000_000 x"),
            [TokenKind::Int, TokenKind::Id]
        );
    }

    #[test]
    fn test_mod_is_an_operator() {
        let tokens = tokenize("x mod y");
        assert_eq!(tokens[1].kind, TokenKind::Op);
        assert_eq!(tokens[1].text, "mod");
    }

    #[test]
    fn test_two_char_operators() {
        for op in ["++", "::", "||", "&&", "==", "=<", ">=", "!="] {
            let tokens = tokenize(op);
            assert_eq!(tokens.len(), 1, "{op:?}");
            assert_eq!(tokens[0].kind, TokenKind::Op, "{op:?}");
            assert_eq!(tokens[0].text, op);
        }
        for misc in ["=>", "..", "<-"] {
            let tokens = tokenize(misc);
            assert_eq!(tokens.len(), 1, "{misc:?}");
            assert_eq!(tokens[0].kind, TokenKind::Misc, "{misc:?}");
        }
    }

    #[test]
    fn test_single_char_tokens() {
        assert_eq!(
            kinds("+ = ( ) { } , : . | @"),
            [
                TokenKind::Op,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
            ]
        );
    }

    #[test]
    fn test_qualified_name_span_ends_at_trailing_part() {
        let tokens = tokenize("List.map");
        assert_eq!(tokens[0].kind, TokenKind::QId);
        assert_eq!(tokens[0].span.begin.col, 1);
        assert_eq!(tokens[0].span.end.col, 8);
    }

    #[test]
    fn test_trailing_dot_rewinds_to_con() {
        let tokens = tokenize("Foo.)");
        assert_eq!(tokens[0].kind, TokenKind::Con);
        assert_eq!(tokens[0].text, "Foo");
        assert_eq!(tokens[1].text, ".");
        assert_eq!(tokens[2].text, ")");
    }

    #[test]
    fn test_quote_without_identifier_is_a_char() {
        let tokens = tokenize("' x");
        assert_eq!(tokens[0].kind, TokenKind::Char);
        assert_eq!(tokens[0].text, "'");
        assert_eq!(tokens[1].text, "x");
    }

    #[test]
    fn test_string_spans() {
        // 'include "bar"': quotes at cols 9 and 13, content at 10..12.
        let tokens = tokenize("include \"bar\"");
        let s = &tokens[1];
        assert_eq!(s.kind, TokenKind::String);
        assert_eq!(s.text, "bar");
        assert!(s.error.is_none());
        assert_eq!((s.span.begin.col, s.span.end.col), (10, 12));
        assert_eq!((s.full_span.begin.col, s.full_span.end.col), (9, 13));
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = tokenize("include \"foo\nx");
        let s = &tokens[1];
        assert_eq!(s.kind, TokenKind::String);
        assert_eq!(s.text, "foo");
        assert_eq!(s.error, Some(TokenError::MissingRightStringQuote));
        // Full range ends at the last content character.
        assert_eq!((s.full_span.begin.col, s.full_span.end.col), (9, 12));
        // Scanning continues on the next line.
        assert_eq!(tokens[2].text, "x");
        assert_eq!(tokens[2].span.begin.line, 2);
    }

    #[test]
    fn test_line_breaks_count_once_each() {
        for source in ["a\nb", "a\rb", "a\r\nb"] {
            let tokens = tokenize(source);
            assert_eq!(tokens[1].span.begin.line, 2, "{source:?}");
            assert_eq!(tokens[1].span.begin.col, 1, "{source:?}");
        }
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = tokenize("a // line comment\nb /* block\ncomment */ c");
        assert_eq!(texts("a // line comment\nb /* block\ncomment */ c"), ["a", "b", "c"]);
        assert_eq!(tokens[2].span.begin.line, 3);
    }

    #[test]
    fn test_unterminated_block_comment_is_not_consumed() {
        let tokens = tokenize("a /* no end");
        assert_eq!(tokens[1].kind, TokenKind::Op);
        assert_eq!(tokens[1].text, "/");
        assert_eq!(tokens[2].text, "*");
    }

    #[test]
    fn test_cursor_save_restore() {
        let mut scanner = Scanner::new("contract C =");
        let saved = scanner.pos();
        let first = scanner.next_token();
        scanner.next_token();
        scanner.set_pos(saved);
        assert_eq!(scanner.next_token(), first);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut scanner = Scanner::new("foo bar");
        let peeked = scanner.peek_token();
        let next = scanner.next_token();
        assert_eq!(peeked, next);
    }

    #[test]
    fn test_shape_helpers() {
        assert!(is_valid_id("foo_1'"));
        assert!(!is_valid_id("Foo"));
        assert!(is_valid_con("Foo"));
        assert!(is_valid_qid("List.map"));
        assert!(!is_valid_qid("List.Map"));
        assert!(is_valid_qcon("A.B"));
        assert!(!is_valid_qcon("A.B.C"));
        assert!(is_valid_tvar("'a"));
        assert!(!is_valid_tvar("a"));
        assert_eq!(split_qid("List.map"), Some(("List", "map")));
        assert_eq!(split_qid("List."), None);
    }

    #[test]
    fn test_rest_of_line() {
        let mut scanner = Scanner::new("  stray ) here\nnext");
        let rest = scanner.rest_of_line().unwrap();
        assert_eq!(rest.text, "stray ) here");
        assert_eq!(rest.span.begin.col, 3);
        assert_eq!(rest.span.end.col, 14);
    }
}
