//! Syntax tree definitions for the Sophia contract language.
//!
//! Every node carries an exact begin/end source range. A handful of node kinds keep
//! some of their parts as payload fields rather than tree children (for example a
//! map lookup's map and key); the position query in the root crate compensates for
//! the one case where that matters (call targets).

/// A single source position: byte offset plus 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// A begin/end source range. `end` is the position of the last character in the
/// range, not one past it. Zero-width placeholder ranges (`begin == end`) appear
/// only during error recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub begin: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(begin: Pos, end: Pos) -> Self {
        Self { begin, end }
    }

    /// Zero-width span at a single position.
    pub fn at(pos: Pos) -> Self {
        Self { begin: pos, end: pos }
    }

    /// Span covering everything from the start of `b` to the end of `e`.
    pub fn covering(b: Span, e: Span) -> Self {
        Self {
            begin: b.begin,
            end: e.end,
        }
    }
}

/// A piece of source text with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedStr {
    pub text: String,
    pub span: Span,
}

/// A quoted string literal: `span` covers the content only, `full_span` includes
/// the surrounding quotes (as far as they exist in the source).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedStr {
    pub text: String,
    pub span: Span,
    pub full_span: Span,
}

/// A record field type: `Id ':' Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub id: SpannedStr,
    pub colon: Pos,
    pub ty: Node,
}

/// A single syntax tree node.
///
/// `children` holds the child nodes in source order; which parts of a construct
/// are children versus kind-specific payload follows [`NodeKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>, span: Span) -> Self {
        Self { kind, children, span }
    }
}

// ============================================================================
// Node kinds
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A whole source file; children are the top-level declarations.
    File,
    /// `contract Con = ...`; children are the member declarations.
    ContractDecl { payable: bool, con: SpannedStr },
    /// `namespace Con = ...`; children are the member declarations.
    NamespaceDecl { con: SpannedStr },
    /// `include "path"`. `valid_token` is false when the string literal is
    /// missing its closing quote.
    IncludeDecl { include: QuotedStr, valid_token: bool },
    /// `@compiler >= 4.3`; children: one [`NodeKind::Version`].
    PragmaCompiler { op: SpannedStr },
    /// Dotted version number; children are [`NodeKind::IntToken`] nodes.
    Version,
    IntToken { value: SpannedStr },
    /// `type Id ['(' TVar* ')'] = Type`.
    TypeDecl {
        id: SpannedStr,
        tvars: Option<Vec<SpannedStr>>,
        alias: Box<Node>,
    },
    /// `record Id ['(' TVar* ')'] = '{' FieldType, ... '}'`.
    RecordDecl {
        id: SpannedStr,
        tvars: Option<Vec<SpannedStr>>,
        fields: Vec<FieldType>,
    },
    /// `datatype Id ['(' TVar* ')'] = ConDecl | ...`; children are the
    /// constructor declarations.
    DatatypeDecl {
        id: SpannedStr,
        tvars: Option<Vec<SpannedStr>>,
    },
    /// `Con ['(' Type, ... ')']`; children are the argument types.
    ConDecl { con: SpannedStr },
    /// `[payable|stateful] entrypoint Block(FuncDecl)`; children are func decls.
    EntrypointDecl { modifier: Option<SpannedStr> },
    /// `[stateful|private] function Block(FuncDecl)`; children are func decls.
    FunctionDecl { modifier: Option<SpannedStr> },
    /// One function signature or definition inside an entrypoint/function
    /// declaration. Children are the body statements (empty for signatures).
    FuncDecl {
        kind: FuncDeclKind,
        id: SpannedStr,
        args: Vec<Node>,
        return_type: Option<Box<Node>>,
    },
    Type(TypeKind),
    /// Function-type argument list; children are the argument types.
    Domain,
    Stmt(StmtKind),
    /// `Pattern '=>' Block(Stmt)`; children are the body statements.
    Case { pattern: Box<Node> },
    Expr(ExprKind),
    /// A record/map field update `[alias @] Path '=' Expr`; children are the
    /// path and the value expression.
    FieldUpdate { alias: Option<SpannedStr> },
    /// Anonymous-function argument `Id [':' Type]`.
    LamArg {
        id: SpannedStr,
        arg_type: Option<Box<Node>>,
    },
    /// Record-field or map-key path; a nested path is the single child.
    Path(PathKind),
    Generator(GeneratorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncDeclKind {
    Signature,
    Definition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Id(SpannedStr),
    QId(SpannedStr),
    TVar(SpannedStr),
    /// Not valid per the language grammar, but appears in real contracts.
    Con(SpannedStr),
    Int,
    String,
    Bool,
    List { args: Vec<Node> },
    Map { key: Box<Node>, value: Box<Node> },
    /// `Domain '=>' Type`.
    FunctionType {
        domain: Box<Node>,
        codomain: Box<Node>,
    },
    /// `Type '(' Sep(Type, ',') ')'`; children are the type arguments.
    Application { head: Box<Node> },
    /// Tuple type; no children means the `unit` tuple.
    Tuple,
    /// Single parenthesised type; one child.
    Parens,
    /// Parenthesised type list with more than one element; children are the
    /// elements. Not in the grammar, but produced for e.g. `(int, string)`.
    Pair,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `switch '(' Expr ')' Block(Case)`; children are the cases.
    Switch { cond: Box<Node> },
    /// `if '(' Expr ')' Block(Stmt)`.
    If { cond: Box<Node> },
    Elif { cond: Box<Node> },
    Else,
    /// `let LetDef`.
    Let(LetKind),
    /// `Id Args [':' Type] '=' Block(Stmt)`; children are the body statements.
    FunctionDef {
        args: Vec<Node>,
        return_type: Option<Box<Node>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LetKind {
    /// `let Id Args [':' Type] '=' Block(Stmt)`; the definition is a
    /// [`StmtKind::FunctionDef`] node.
    FunctionDefinition { def: Box<Node> },
    /// `let Pattern '=' Block(Stmt)`; children are the body statements.
    ValueDefinition { pattern: Box<Node> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `'(' LamArg, ... ')' '=>' Block(Stmt)`; children are the body statements.
    AnonymousFunction { args: Vec<Node> },
    /// `if '(' Expr ')' Expr else Expr`; children: condition, then, else.
    If,
    /// `Expr ':' Type`; children: expression plus the type, or just the
    /// expression when the annotation is incomplete.
    TypeAnnotation,
    /// Flat binary operator application; children: left and right operand.
    /// There is no precedence or associativity handling.
    BinaryOp { op: SpannedStr },
    /// `-`/`!` prefix; one child.
    UnaryOp { op: SpannedStr },
    /// `Expr '(' Sep(Expr, ',') ')'`; children are the arguments only, the
    /// call target is the payload.
    Application { callee: Box<Node> },
    /// `Expr '.' Id`; children: expression plus the projected identifier, or
    /// just the expression when the projection is incomplete.
    Projection,
    /// `Expr '[' Expr ']'`.
    MapLookup { map: Box<Node>, key: Box<Node> },
    /// `'{' FieldUpdate, ... '}'` as a value; children are the field updates.
    RecordOrMapValue,
    /// `Expr '{' FieldUpdate, ... '}'`; children are the field updates.
    RecordOrMapUpdate { expr: Box<Node> },
    /// `'[' Sep(Expr, ',') ']'`; children are the elements.
    List,
    /// `'[' Expr '|' Sep1(Generator, ',') ']'`; children are the generators.
    ListComprehension { head: Box<Node> },
    /// `'[' Expr '..' Expr ']'`; children: the two bounds.
    ListRange,
    Identifier {
        id_kind: IdKind,
        identifier: SpannedStr,
    },
    Literal {
        kind: LiteralKind,
        value: SpannedStr,
    },
    /// `Expr '=' Expr` in call-argument position; children: target and value.
    Assign,
    /// Parenthesised expression group; children are the elements.
    Pair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Id,
    Con,
    QId,
    QCon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathKind {
    RecordField { id: SpannedStr },
    MapKey { key: Box<Node> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorKind {
    /// `Pattern '<-' Expr`.
    Generator { pattern: Box<Node>, expr: Box<Node> },
    /// `if '(' Expr ')'`.
    Guard { expr: Box<Node> },
    /// `let LetDef`.
    Definition { let_def: Box<Node> },
}
