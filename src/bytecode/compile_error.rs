use crate::bytecode::code_error::CodeError;
use crate::lang::node::{Expression, Statement};

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A name not bound in any enclosing scope
    UndefinedIdentifier(String),

    /// A node kind the compiler has no translation for
    UnsupportedNode {
        node_type: String,
        hint: Option<String>,
    },

    /// `let` whose initializer is not known at compile time
    NonConstantBinding { name: String, node_type: String },

    /// `let` whose initializer evaluated to an error value
    InvalidConstant { name: String, message: String },

    /// More constants than a CONST operand can address
    ConstantPoolOverflow(usize),

    /// The encoder refused an instruction
    Encoding(CodeError),
}

impl CompileError {
    pub fn undefined(name: &str) -> Self {
        CompileError::UndefinedIdentifier(name.to_string())
    }

    /// Create an error for an expression the compiler can't handle
    pub fn unsupported(expr: &Expression) -> Self {
        CompileError::UnsupportedNode {
            node_type: expr.kind().to_string(),
            hint: unsupported_hint(expr).map(str::to_string),
        }
    }

    /// Create an error for a statement the compiler can't handle
    pub fn unsupported_statement(stmt: &Statement) -> Self {
        let hint = match stmt {
            Statement::Return(_) => Some("return is only meaningful inside a function body"),
            Statement::Expression(expr) => unsupported_hint(expr),
            _ => None,
        };

        CompileError::UnsupportedNode {
            node_type: stmt.kind().to_string(),
            hint: hint.map(str::to_string),
        }
    }

    pub fn non_constant(name: &str, value: &Expression) -> Self {
        CompileError::NonConstantBinding {
            name: name.to_string(),
            node_type: value.kind().to_string(),
        }
    }

    /// The node kind named by an `UnsupportedNode`, if that's what this is.
    pub fn node_type(&self) -> Option<&str> {
        match self {
            CompileError::UnsupportedNode { node_type, .. } => Some(node_type.as_str()),
            _ => None,
        }
    }
}

fn unsupported_hint(expr: &Expression) -> Option<&'static str> {
    match expr {
        Expression::Array(_) | Expression::Hash(_) => {
            Some("collection literals can only appear as `let` initializers")
        }
        Expression::If { .. } => Some("the instruction set has no jump instructions yet"),
        Expression::Prefix { .. } => Some("the instruction set has no unary operators yet"),
        _ => None,
    }
}

impl From<CodeError> for CompileError {
    fn from(err: CodeError) -> Self {
        CompileError::Encoding(err)
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::UndefinedIdentifier(name) => {
                write!(f, "compile error: undefined identifier '{}'", name)
            }
            CompileError::UnsupportedNode { node_type, hint } => {
                write!(f, "compile error: cannot compile '{}' node", node_type)?;
                if let Some(h) = hint {
                    write!(f, "\n  hint: {}", h)?;
                }
                Ok(())
            }
            CompileError::NonConstantBinding { name, node_type } => {
                write!(
                    f,
                    "compile error: let '{}': {} is not a compile-time constant",
                    name, node_type
                )
            }
            CompileError::InvalidConstant { name, message } => {
                write!(f, "compile error: let '{}': {}", name, message)
            }
            CompileError::ConstantPoolOverflow(len) => {
                write!(
                    f,
                    "compile error: constant pool overflow ({} entries, max {})",
                    len,
                    u16::MAX as usize + 1
                )
            }
            CompileError::Encoding(err) => {
                write!(f, "compile error: internal error: {}", err)
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Encoding(err) => Some(err),
            _ => None,
        }
    }
}
