use thiserror::Error;

use crate::bytecode::op::OpCode;

/// Failures encoding or decoding an instruction stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// Byte value with no definition. Decoding cannot resynchronize after it.
    #[error("opcode {0} undefined")]
    UnknownOpcode(u8),

    #[error("operand count does not match definition of {op}: expected {expected}, actual {actual}")]
    OperandCountMismatch {
        op: OpCode,
        expected: usize,
        actual: usize,
    },

    #[error("operand {operand} of {op} does not fit in {width} bytes")]
    OperandOutOfRange {
        op: OpCode,
        operand: usize,
        width: usize,
    },

    #[error("truncated {op} instruction: needs {needed} operand bytes, {available} available")]
    Truncated {
        op: OpCode,
        needed: usize,
        available: usize,
    },

    #[error("unsupported operand width {width} in definition of {op}")]
    UnsupportedWidth { op: OpCode, width: usize },
}
