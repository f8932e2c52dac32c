pub mod code_error;
pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod encode;
pub mod ir;
pub mod op;

pub use code_error::CodeError;
pub use compile::Compiler;
pub use compile_error::CompileError;
pub use disasm::disassemble;
pub use encode::{make, read_operands, read_u16};
pub use ir::{Bytecode, CodecError, Decoded, Instructions};
pub use op::{Definition, OpCode, lookup};
