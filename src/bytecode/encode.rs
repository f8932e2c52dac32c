use crate::bytecode::code_error::CodeError;
use crate::bytecode::op::{Definition, OpCode};

/// Encode one instruction: the opcode byte, then each operand big-endian
/// in its declared width.
///
/// Never returns a partial instruction. A wrong operand count or a value
/// that does not fit its width is an error, not padding or truncation.
pub fn make(op: OpCode, operands: &[usize]) -> Result<Vec<u8>, CodeError> {
    let def = op.definition();

    if operands.len() != def.operand_widths.len() {
        return Err(CodeError::OperandCountMismatch {
            op,
            expected: def.operand_widths.len(),
            actual: operands.len(),
        });
    }

    let mut instruction = Vec::with_capacity(def.instruction_len());
    instruction.push(op as u8);

    for (&operand, &width) in operands.iter().zip(def.operand_widths) {
        match width {
            2 => {
                let value = u16::try_from(operand).map_err(|_| CodeError::OperandOutOfRange {
                    op,
                    operand,
                    width,
                })?;
                instruction.extend_from_slice(&value.to_be_bytes());
            }
            _ => return Err(CodeError::UnsupportedWidth { op, width }),
        }
    }

    Ok(instruction)
}

/// Decode the operands following an opcode byte.
///
/// `bytes` starts right after the opcode. Returns the operand values and the
/// number of bytes consumed, which never exceeds the declared widths.
pub fn read_operands(def: &Definition, bytes: &[u8]) -> Result<(Vec<usize>, usize), CodeError> {
    let needed = def.instruction_len() - 1;
    if bytes.len() < needed {
        return Err(CodeError::Truncated {
            op: def.opcode,
            needed,
            available: bytes.len(),
        });
    }

    let mut operands = Vec::with_capacity(def.operand_widths.len());
    let mut offset = 0;

    for &width in def.operand_widths {
        match width {
            2 => operands.push(read_u16(&bytes[offset..]) as usize),
            _ => {
                return Err(CodeError::UnsupportedWidth {
                    op: def.opcode,
                    width,
                });
            }
        }
        offset += width;
    }

    Ok((operands, offset))
}

/// Read a big-endian u16 from the first two bytes.
///
/// Callers check the length first; see [`read_operands`].
pub fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}
