//! # Cinder language model
//!
//! The syntax tree handed to the compiler, the runtime object model, and
//! the lexical scopes both the compiler and an executor resolve names
//! through.

pub mod node;
pub mod object;
pub mod scope;

pub use object::{Builtin, Function, HashKey, HashObject, HashPair, Object, ObjectType};
pub use scope::Scope;
