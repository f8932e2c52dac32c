//! # Cinder
//!
//! Back end of the Cinder language: compiles a parsed syntax tree into a
//! linear bytecode program and defines the runtime values that program
//! operates over.
//!
//! ```text
//! Program (AST) --Compiler--> Bytecode { instructions, constants } --> VM
//! ```
//!
//! The instruction format is a binary contract. Each instruction is one
//! opcode byte followed by big-endian unsigned operands whose widths come
//! from the opcode's [`Definition`](bytecode::Definition).

pub mod bytecode;
pub mod lang;

pub use bytecode::{Bytecode, CompileError, Compiler};
pub use lang::{Object, Scope};
