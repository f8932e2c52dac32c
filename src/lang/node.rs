//! Syntax tree consumed by the bytecode compiler.
//!
//! The tree is produced by an external parser; this module only fixes the
//! shape the compiler walks.

/// Parsed program: a flat list of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// A braced sequence of statements introducing a new scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let name = value;`
    Let { name: String, value: Expression },

    /// An expression evaluated for its value.
    Expression(Expression),

    /// A nested block: `{ ... }`.
    Block(Block),

    /// `return value;`
    Return(Expression),
}

impl Statement {
    /// Human-readable node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Let { .. } => "let statement",
            Statement::Expression(expr) => expr.kind(),
            Statement::Block(_) => "block",
            Statement::Return(_) => "return statement",
        }
    }
}

/// Abstract Syntax Tree expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // ───────────────────────────── Literals ─────────────────────────────
    /// Integer literal: `5`.
    Integer(i64),

    /// Boolean literal: `true` / `false`.
    Boolean(bool),

    /// String literal: `"hello"`.
    String(String),

    /// Array literal: `[1, 2, 3]`.
    Array(Vec<Expression>),

    /// Hash literal: `{"a": 1}`. Pairs keep source order.
    Hash(Vec<(Expression, Expression)>),

    /// Function literal: `fn(a, b) { ... }`.
    Function { parameters: Vec<String>, body: Block },

    // ──────────────────────────── References ────────────────────────────
    /// Reference to a bound name.
    Identifier(String),

    // ──────────────────────────── Operators ─────────────────────────────
    /// Prefix operator: `!x`, `-x`.
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },

    /// Binary operator: `left <op> right`.
    Infix {
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    // ──────────────────────────── Control flow ──────────────────────────
    /// `if (condition) { ... } else { ... }`
    If {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },

    /// `function(arguments...)`
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// `left[index]`
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Expression {
    /// Build an infix node without spelling out the boxes.
    pub fn infix(operator: InfixOperator, left: Expression, right: Expression) -> Self {
        Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    /// Human-readable node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Integer(_) => "integer literal",
            Expression::Boolean(_) => "boolean literal",
            Expression::String(_) => "string literal",
            Expression::Array(_) => "array literal",
            Expression::Hash(_) => "hash literal",
            Expression::Function { .. } => "function literal",
            Expression::Identifier(_) => "identifier",
            Expression::Prefix { .. } => "prefix expression",
            Expression::Infix { .. } => "infix expression",
            Expression::If { .. } => "if expression",
            Expression::Call { .. } => "call expression",
            Expression::Index { .. } => "index expression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    /// `!`
    Not,
    /// `-`
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl std::fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            InfixOperator::Add => "+",
            InfixOperator::Sub => "-",
            InfixOperator::Mul => "*",
            InfixOperator::Div => "/",
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
            InfixOperator::Lt => "<",
            InfixOperator::LtEq => "<=",
            InfixOperator::Gt => ">",
            InfixOperator::GtEq => ">=",
        };
        write!(f, "{}", symbol)
    }
}
