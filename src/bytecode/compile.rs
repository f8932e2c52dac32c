use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::{
    bytecode::{Bytecode, Instructions, OpCode, compile_error::CompileError, encode::make},
    lang::{
        node::{Block, Expression, InfixOperator, Program, Statement},
        object::{Function, Object},
        scope::Scope,
    },
};

/// One-pass translator from syntax tree to bytecode.
///
/// A compiler is consumed by the compile call, so a failed compilation
/// leaves nothing behind to be mistaken for output.
pub struct Compiler {
    /// Output instruction stream
    instructions: Instructions,

    /// Constant pool. Indices are handed out in append order and never reused.
    constants: Vec<Object>,

    /// Innermost scope of the walk
    scope: Rc<Scope>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_scope(Scope::root())
    }

    /// Start from a host-provided scope, e.g. one seeded with builtins.
    pub fn with_scope(scope: Rc<Scope>) -> Self {
        Self {
            instructions: Instructions::new(),
            constants: Vec::new(),
            scope,
        }
    }

    pub fn compile_program(mut self, program: &Program) -> Result<Bytecode, CompileError> {
        debug!(statements = program.statements.len(), "compiling program");

        for stmt in &program.statements {
            self.compile_statement(stmt)?;
        }

        Ok(self.finish())
    }

    /// Compile a lone expression, e.g. a REPL line.
    pub fn compile_expression(mut self, expr: &Expression) -> Result<Bytecode, CompileError> {
        debug!(kind = expr.kind(), "compiling expression");

        self.compile_expr(expr)?;

        Ok(self.finish())
    }

    fn finish(self) -> Bytecode {
        debug!(
            bytes = self.instructions.len(),
            constants = self.constants.len(),
            "compilation finished"
        );
        Bytecode::new(self.instructions, self.constants)
    }

    fn compile_statement(&mut self, stmt: &Statement) -> Result<(), CompileError> {
        match stmt {
            Statement::Expression(expr) => self.compile_expr(expr),

            Statement::Let { name, value } => {
                let object = self.const_value(name, value)?;
                if contains_function(value) {
                    // a closure must never be stored in the scope it captured
                    self.scope = Scope::enclosed(&self.scope);
                    trace!(depth = self.scope.depth(), "let opens scope");
                }
                self.bind(name, object);
                Ok(())
            }

            Statement::Block(block) => self.compile_block(block),

            Statement::Return(_) => Err(CompileError::unsupported_statement(stmt)),
        }
    }

    fn compile_block(&mut self, block: &Block) -> Result<(), CompileError> {
        let enclosing = Rc::clone(&self.scope);
        self.scope = Scope::enclosed(&enclosing);
        trace!(depth = self.scope.depth(), "enter scope");

        let result = block
            .statements
            .iter()
            .try_for_each(|stmt| self.compile_statement(stmt));

        trace!(depth = self.scope.depth(), "leave scope");
        self.scope = enclosing;
        result
    }

    fn compile_expr(&mut self, expr: &Expression) -> Result<(), CompileError> {
        match expr {
            Expression::Integer(n) => {
                let index = self.add_constant(Object::Integer(*n))?;
                self.emit(OpCode::Const, &[index])?;
            }

            Expression::String(s) => {
                let index = self.add_constant(Object::String(s.clone()))?;
                self.emit(OpCode::Const, &[index])?;
            }

            Expression::Boolean(true) => {
                self.emit(OpCode::True, &[])?;
            }
            Expression::Boolean(false) => {
                self.emit(OpCode::False, &[])?;
            }

            Expression::Infix {
                operator,
                left,
                right,
            } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.emit(infix_opcode(*operator), &[])?;
            }

            Expression::Identifier(name) => {
                let value = self
                    .scope
                    .get(name)
                    .ok_or_else(|| CompileError::undefined(name))?;
                self.emit_object(value)?;
            }

            Expression::Function { parameters, body } => {
                let func = self.closure(parameters, body);
                let index = self.add_constant(func)?;
                self.emit(OpCode::Const, &[index])?;
            }

            Expression::Array(_)
            | Expression::Hash(_)
            | Expression::Prefix { .. }
            | Expression::If { .. }
            | Expression::Call { .. }
            | Expression::Index { .. } => return Err(CompileError::unsupported(expr)),
        }

        Ok(())
    }

    /// Load a value known at compile time.
    fn emit_object(&mut self, value: Object) -> Result<(), CompileError> {
        match value {
            Object::Boolean(true) => self.emit(OpCode::True, &[])?,
            Object::Boolean(false) => self.emit(OpCode::False, &[])?,
            other => {
                let index = self.add_constant(other)?;
                self.emit(OpCode::Const, &[index])?
            }
        };
        Ok(())
    }

    // =========================================================================
    // Compile-time bindings
    // =========================================================================

    fn bind(&mut self, name: &str, value: Object) {
        if !self.scope.contains_local(name) && self.scope.get(name).is_some() {
            warn!(name, depth = self.scope.depth(), "let shadows an outer binding");
        }
        trace!(name, value = %value, "bind");
        self.scope.set(name, value);
    }

    /// Evaluate a `let` initializer. Only literals, names, and collections
    /// of those are allowed; no arithmetic is folded.
    fn const_value(&self, name: &str, expr: &Expression) -> Result<Object, CompileError> {
        match expr {
            Expression::Integer(n) => Ok(Object::Integer(*n)),
            Expression::Boolean(b) => Ok(Object::Boolean(*b)),
            Expression::String(s) => Ok(Object::String(s.clone())),

            Expression::Identifier(ident) => self
                .scope
                .get(ident)
                .ok_or_else(|| CompileError::undefined(ident)),

            Expression::Function { parameters, body } => Ok(self.closure(parameters, body)),

            Expression::Array(items) => {
                let items = items
                    .iter()
                    .map(|item| self.const_value(name, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(items))
            }

            Expression::Hash(pairs) => {
                let pairs = pairs
                    .iter()
                    .map(|(key, value)| -> Result<_, CompileError> {
                        Ok((self.const_value(name, key)?, self.const_value(name, value)?))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                match Object::hash_from_pairs(pairs) {
                    Object::Error(message) => Err(CompileError::InvalidConstant {
                        name: name.to_string(),
                        message,
                    }),
                    hash => Ok(hash),
                }
            }

            _ => Err(CompileError::non_constant(name, expr)),
        }
    }

    /// Function value closing over the current scope.
    fn closure(&self, parameters: &[String], body: &Block) -> Object {
        Object::Function(Function::new(
            parameters.to_vec(),
            Rc::new(body.clone()),
            Rc::clone(&self.scope),
        ))
    }

    // =========================================================================
    // Emission
    // =========================================================================

    fn add_constant(&mut self, value: Object) -> Result<usize, CompileError> {
        let index = self.constants.len();
        if index > u16::MAX as usize {
            return Err(CompileError::ConstantPoolOverflow(index + 1));
        }
        self.constants.push(value);
        Ok(index)
    }

    fn emit(&mut self, op: OpCode, operands: &[usize]) -> Result<usize, CompileError> {
        let instruction = make(op, operands)?;
        let position = self.instructions.push(&instruction);
        trace!(position, %op, ?operands, "emit");
        Ok(position)
    }
}

fn contains_function(expr: &Expression) -> bool {
    match expr {
        Expression::Function { .. } => true,
        Expression::Array(items) => items.iter().any(contains_function),
        Expression::Hash(pairs) => pairs
            .iter()
            .any(|(key, value)| contains_function(key) || contains_function(value)),
        _ => false,
    }
}

fn infix_opcode(operator: InfixOperator) -> OpCode {
    match operator {
        InfixOperator::Add => OpCode::Add,
        InfixOperator::Sub => OpCode::Sub,
        InfixOperator::Mul => OpCode::Mul,
        InfixOperator::Div => OpCode::Quo,
        InfixOperator::Eq => OpCode::Eql,
        InfixOperator::NotEq => OpCode::Neql,
        InfixOperator::Lt => OpCode::Lt,
        InfixOperator::LtEq => OpCode::Lte,
        InfixOperator::Gt => OpCode::Gt,
        InfixOperator::GtEq => OpCode::Gte,
    }
}
