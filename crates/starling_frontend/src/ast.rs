use starling_diagnostic::span::Span;
use starling_interner::Istr;

use crate::token::FloatValue;
use crate::{Node, NodeCopy};

#[derive(Node!)]
pub struct Module {
    pub docstring: Option<String>,
    pub items: Vec<Item>,
    pub span: Span,
}

#[derive(NodeCopy!)]
pub struct Ident {
    pub name: Istr,
    pub span: Span,
}

/// A `.`-separated path such as `std.io.File`.
#[derive(Node!)]
pub struct Path {
    pub segments: Vec<Ident>,
    pub span: Span,
}

impl Path {
    pub fn single(ident: Ident) -> Self {
        Self {
            segments: vec![ident],
            span: ident.span,
        }
    }

    pub fn as_single(&self) -> Option<Ident> {
        match self.segments.as_slice() {
            [ident] => Some(*ident),
            _ => None,
        }
    }
}

#[derive(NodeCopy!)]
pub enum Visibility {
    Private,
    /// Carries the span of the `pub` keyword.
    Public(Span),
}

// ---- items ----

#[derive(Node!)]
pub struct Item {
    pub kind: ItemKind,
    pub visibility: Visibility,
    pub docstring: Option<String>,
    pub span: Span,
}

#[derive(Node!)]
pub enum ItemKind {
    Import { path: Path, alias: Option<Ident> },
    Function(Function),
    Struct(Struct),
    Enum(Enum),
    Interface(Interface),
    TypeAlias(TypeAlias),

    ParseError,
}

#[derive(Node!)]
pub struct Function {
    pub signature: Signature,
    /// `None` for a declaration ending in `;`.
    pub body: Option<Block>,
}

#[derive(Node!)]
pub struct Signature {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub where_clause: Vec<WherePredicate>,
}

#[derive(Node!)]
pub struct Param {
    pub kind: ParamKind,
    pub span: Span,
}

#[derive(Node!)]
pub enum ParamKind {
    SelfParam { ty: Option<Type> },
    Regular { pattern: Pattern, ty: Type },
}

#[derive(Node!)]
pub struct GenericParam {
    pub name: Ident,
    pub bounds: Vec<Type>,
    pub default: Option<Type>,
    pub span: Span,
}

#[derive(Node!)]
pub struct WherePredicate {
    pub ty: Type,
    pub bounds: Vec<Type>,
    pub span: Span,
}

#[derive(Node!)]
pub struct Struct {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub kind: StructKind,
    pub implements: Vec<Type>,
    pub where_clause: Vec<WherePredicate>,
    pub methods: Vec<Method>,
}

#[derive(Node!)]
pub enum StructKind {
    Unit,
    Tuple(Vec<TupleField>),
    Record(Vec<Field>),
}

#[derive(Node!)]
pub struct TupleField {
    pub visibility: Visibility,
    pub ty: Type,
    pub span: Span,
}

#[derive(Node!)]
pub struct Field {
    pub visibility: Visibility,
    pub docstring: Option<String>,
    pub name: Ident,
    pub ty: Type,
    pub span: Span,
}

#[derive(Node!)]
pub struct Enum {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub implements: Vec<Type>,
    pub where_clause: Vec<WherePredicate>,
    pub variants: Vec<Variant>,
    pub methods: Vec<Method>,
}

#[derive(Node!)]
pub struct Variant {
    pub docstring: Option<String>,
    pub name: Ident,
    pub kind: StructKind,
    pub span: Span,
}

#[derive(Node!)]
pub struct Interface {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub supertraits: Vec<Type>,
    pub where_clause: Vec<WherePredicate>,
    pub methods: Vec<Method>,
}

#[derive(Node!)]
pub struct Method {
    pub visibility: Visibility,
    pub docstring: Option<String>,
    pub function: Function,
    pub span: Span,
}

#[derive(Node!)]
pub struct TypeAlias {
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub ty: Type,
}

// ---- types ----

#[derive(Node!)]
pub struct Type {
    pub kind: TypeKind,
    pub span: Span,
}

impl Type {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Node!)]
pub enum TypeKind {
    /// `Path` or `Path[Args]`.
    Path { path: Path, args: Vec<Type> },
    Tuple(Vec<Type>),
    Function { params: Vec<Type>, ret: Option<Box<Type>> },
    Dyn(Vec<Type>),
    /// `_`
    Infer,

    ParseError,
}

// ---- patterns ----

#[derive(Node!)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether the pattern can fail to match a value of the right type.
    pub fn is_refutable(&self) -> bool {
        match &self.kind {
            PatternKind::Literal { .. } | PatternKind::TupleLike { .. } | PatternKind::Path(_) => {
                true
            }

            PatternKind::List(elems) => !matches!(elems.as_slice(), [p] if p.is_rest()),

            PatternKind::Struct { path, fields, .. } => {
                path.segments.len() > 1 || fields.iter().any(FieldPattern::pattern_is_refutable)
            }

            PatternKind::Tuple(elems) => elems.iter().any(Pattern::is_refutable),
            PatternKind::Grouped(inner) => inner.is_refutable(),
            PatternKind::Identifier { sub, .. } => sub.as_ref().is_some_and(|p| p.is_refutable()),

            // Checked per alternative, not for exhaustiveness.
            PatternKind::Or(alternatives) => alternatives.iter().any(Pattern::is_refutable),

            PatternKind::Wildcard | PatternKind::Rest | PatternKind::ParseError => false,
        }
    }

    /// `..` or `name @ ..`
    pub fn is_rest(&self) -> bool {
        match &self.kind {
            PatternKind::Rest => true,
            PatternKind::Identifier { sub: Some(sub), .. } => matches!(sub.kind, PatternKind::Rest),
            _ => false,
        }
    }
}

#[derive(Node!)]
pub enum PatternKind {
    Literal { lit: Literal, negative: bool },
    /// `name` or `name @ sub`.
    Identifier { name: Ident, sub: Option<Box<Pattern>> },
    Wildcard,
    Rest,
    Struct { path: Path, fields: Vec<FieldPattern>, has_rest: bool },
    TupleLike { path: Path, elems: Vec<Pattern> },
    Tuple(Vec<Pattern>),
    List(Vec<Pattern>),
    Grouped(Box<Pattern>),
    /// A multi-segment path such as `Option.None`.
    Path(Path),
    Or(Vec<Pattern>),

    ParseError,
}

#[derive(Node!)]
pub struct FieldPattern {
    pub name: Ident,
    /// `None` for the shorthand `{ name }`.
    pub pattern: Option<Pattern>,
    pub span: Span,
}

impl FieldPattern {
    pub fn pattern_is_refutable(&self) -> bool {
        self.pattern.as_ref().is_some_and(Pattern::is_refutable)
    }
}

#[derive(NodeCopy!)]
pub enum Literal {
    Integer(u64),
    Float(FloatValue),
    Char(char),
    String(Istr),
    Bool(bool),
}

// ---- expressions ----

#[derive(Node!)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Node!)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(Istr),
    /// `_` as a placeholder, e.g. on the left of an assignment.
    Underscore,

    Parenthesized(Box<Expr>),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Block(Block),

    Prefix {
        op: PrefixOp,
        expr: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `=` when `op` is `None`, otherwise a compound assignment.
    Assign {
        op: Option<BinOp>,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Cast {
        expr: Box<Expr>,
        ty: Type,
    },

    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
    },
    Field {
        expr: Box<Expr>,
        field: Ident,
    },
    Struct {
        path: Path,
        fields: Vec<FieldInit>,
    },

    If {
        cond: Box<Expr>,
        then: Block,
        else_: Option<Box<Expr>>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    While {
        cond: Box<Expr>,
        body: Block,
    },
    Loop(Block),
    For {
        pattern: Pattern,
        iterable: Box<Expr>,
        body: Block,
    },
    Lambda {
        params: Vec<LambdaParam>,
        return_type: Option<Type>,
        body: Box<Expr>,
    },

    ParseError,
}

impl ExprKind {
    /// Expressions that end a statement without needing a `;`.
    pub fn is_block_like(&self) -> bool {
        matches!(
            self,
            ExprKind::Block(_)
                | ExprKind::If { .. }
                | ExprKind::Match { .. }
                | ExprKind::While { .. }
                | ExprKind::Loop(_)
                | ExprKind::For { .. }
        )
    }
}

#[derive(Node!)]
pub struct FieldInit {
    pub name: Ident,
    /// `None` for the shorthand `Point { x }`.
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Node!)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Expr,
    pub span: Span,
}

#[derive(Node!)]
pub struct LambdaParam {
    pub pattern: Pattern,
    pub ty: Option<Type>,
    pub span: Span,
}

#[derive(NodeCopy!)]
pub enum PrefixOp {
    Neg,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
}

#[derive(NodeCopy!)]
pub enum PostfixOp {
    PostIncrement,
    PostDecrement,
    Try,
}

#[derive(NodeCopy!)]
pub enum BinOp {
    Or,
    And,

    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,

    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
        }
    }
}

// ---- statements ----

#[derive(Node!)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    /// The trailing expression without a `;`, which gives the block its value.
    pub fn tail(&self) -> Option<&Expr> {
        match self.stmts.last() {
            Some(Stmt {
                kind:
                    StmtKind::Expr {
                        expr,
                        has_semicolon: false,
                    },
                ..
            }) => Some(expr),
            _ => None,
        }
    }
}

#[derive(Node!)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Node!)]
pub enum StmtKind {
    Let {
        pattern: Pattern,
        ty: Option<Type>,
        value: Expr,
    },
    Expr {
        expr: Expr,
        has_semicolon: bool,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Defer(Expr),
    /// A lone `;`.
    Empty,

    ParseError,
}
