use std::collections::HashMap;
use std::fmt::Write as _;

use crate::bytecode::code_error::CodeError;
use crate::bytecode::encode::read_operands;
use crate::bytecode::ir::{Bytecode, Instructions};
use crate::bytecode::op::{Definition, OpCode, lookup};
use crate::lang::object::Object;

/// Render an instruction stream, one line per instruction:
/// `<offset:04> <NAME> <operands...>`.
///
/// An unknown opcode or truncated instruction aborts the whole render;
/// there is no safe point to resume from.
pub fn disassemble(ins: &Instructions) -> Result<String, CodeError> {
    let mut output = String::new();
    let bytes = ins.as_bytes();
    let mut ip = 0;

    while ip < bytes.len() {
        let def = lookup(bytes[ip])?;
        let (operands, read) = read_operands(def, &bytes[ip + 1..])?;
        let _ = writeln!(output, "{:04} {}", ip, format_instruction(def, &operands)?);
        ip += 1 + read;
    }

    Ok(output)
}

fn format_instruction(def: &Definition, operands: &[usize]) -> Result<String, CodeError> {
    let operand_count = def.operand_widths.len();

    if operands.len() != operand_count {
        return Err(CodeError::OperandCountMismatch {
            op: def.opcode,
            expected: operand_count,
            actual: operands.len(),
        });
    }

    let mut line = def.name.to_string();
    for operand in operands {
        let _ = write!(line, " {}", operand);
    }
    Ok(line)
}

impl std::fmt::Display for Instructions {
    /// Same text as [`disassemble`]. A malformed stream ends with a single
    /// `ERROR:` line at the failing offset.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.as_bytes();
        let mut ip = 0;

        while ip < bytes.len() {
            let decoded = lookup(bytes[ip]).and_then(|def| {
                let (operands, read) = read_operands(def, &bytes[ip + 1..])?;
                Ok((format_instruction(def, &operands)?, read))
            });

            match decoded {
                Ok((line, read)) => {
                    writeln!(f, "{:04} {}", ip, line)?;
                    ip += 1 + read;
                }
                Err(e) => return writeln!(f, "{:04} ERROR: {}", ip, e),
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for Bytecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "instructions ({} bytes):", self.instructions.len())?;
        write!(f, "{}", self.instructions)?;
        writeln!(f, "constants ({}):", self.constants.len())?;
        write!(f, "{}", list_constants(&self.constants))
    }
}

/// Render a constant pool, one `<index:04> <TYPE> <value>` line per entry.
pub fn list_constants(constants: &[Object]) -> String {
    let mut output = String::new();
    for (i, constant) in constants.iter().enumerate() {
        let _ = writeln!(output, "{:04} {} {}", i, constant.object_type(), constant.inspect());
    }
    output
}

// =============================================================================
// Raw bytes
// =============================================================================

/// Hex dump, 16 bytes per line, prefixed with the offset.
pub fn hex_dump(ins: &Instructions) -> String {
    let mut output = String::new();

    for (row, chunk) in ins.as_bytes().chunks(16).enumerate() {
        let _ = write!(output, "{:04}", row * 16);
        for byte in chunk {
            let _ = write!(output, " {:02x}", byte);
        }
        output.push('\n');
    }

    output
}

// =============================================================================
// Statistics
// =============================================================================

/// Count instructions per opcode, most frequent first.
///
/// Ties are broken by opcode byte so the order is stable.
pub fn op_counts(ins: &Instructions) -> Result<Vec<(OpCode, usize)>, CodeError> {
    let mut counts: HashMap<OpCode, usize> = HashMap::new();

    for decoded in ins.decode()? {
        *counts.entry(decoded.op).or_insert(0) += 1;
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then((a.0 as u8).cmp(&(b.0 as u8))));
    Ok(counts)
}
