//! Syntax tree of a scene document.

use core::ops::Range;

use ecow::EcoString;

pub(crate) type Span = Range<usize>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DocumentAst {
    pub imports: Vec<Import>,
    pub root: ObjectDef,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Import {
    pub kind: ImportKind,
    pub qualifier: Option<EcoString>,
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ImportKind {
    /// `import QtQuick 2.0`
    Module {
        name: String,
        version: Option<String>,
    },
    /// `import "controls"`
    Directory(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ObjectDef {
    pub qualifier: Option<EcoString>,
    pub type_name: EcoString,
    pub members: Vec<Member>,
    /// Span of the type reference.
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Member {
    Property(PropertyDecl),
    Function(FunctionDecl),
    Attached(AttachedHandler),
    Child(ObjectDef),
    Binding(Binding),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropertyDecl {
    /// Declared type keyword, e.g. `int` or `var`.
    pub kind: EcoString,
    pub name: EcoString,
    pub value: Option<BindingValue>,
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Binding {
    pub name: EcoString,
    pub value: BindingValue,
    /// Span of the property name.
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindingValue {
    Expr(Expr),
    Block(Vec<Stmt>),
    Object(ObjectDef),
}

/// `Component.onCompleted: ...`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AttachedHandler {
    pub attached: EcoString,
    pub name: EcoString,
    pub body: Vec<Stmt>,
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FunctionDecl {
    pub name: EcoString,
    pub params: Vec<EcoString>,
    pub body: Vec<Stmt>,
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StmtKind {
    Var {
        name: EcoString,
        init: Option<Expr>,
    },
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `target = value`, or a compound form when `op` is set.
    Assign {
        target: Expr,
        op: Option<BinaryOp>,
        value: Expr,
    },
    Expr(Expr),
    Block(Vec<Stmt>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ExprKind {
    Literal(Literal),
    Ident(EcoString),
    Member {
        object: Box<Expr>,
        name: EcoString,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Number(f64),
    String(EcoString),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalOp {
    And,
    Or,
}

impl Expr {
    pub(crate) fn new(kind: ExprKind, line: usize) -> Self {
        Expr { kind, line }
    }

    /// Literal value of this expression, folding a leading sign on numbers.
    pub(crate) fn as_literal(&self) -> Option<Literal> {
        match &self.kind {
            ExprKind::Literal(lit) => Some(lit.clone()),
            ExprKind::Unary { op, operand } => match (op, operand.as_literal()?) {
                (UnaryOp::Neg, Literal::Number(n)) => Some(Literal::Number(-n)),
                (UnaryOp::Plus, Literal::Number(n)) => Some(Literal::Number(n)),
                _ => None,
            },
            _ => None,
        }
    }
}
