use crate::bytecode::code_error::CodeError;

// =============================================================================
// OPCODE - Instruction tags
// =============================================================================

/// One instruction kind. The discriminant is the opcode byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Nop = 0,

    /// Push constant pool entry. Operand: u16 pool index.
    Const = 1,

    // arithmetic
    Add = 2,
    Sub = 3,
    Mul = 4,
    Quo = 5,

    // literals
    True = 6,
    False = 7,

    // comparison
    Eql = 8,
    Neql = 9,
    Lt = 10,
    Lte = 11,
    Gt = 12,
    Gte = 13,
}

/// Per-opcode metadata: display name and operand widths in bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct Definition {
    pub opcode: OpCode,
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

impl Definition {
    /// Total encoded size, opcode byte included.
    pub fn instruction_len(&self) -> usize {
        1 + self.operand_widths.iter().sum::<usize>()
    }
}

/// Registry indexed by opcode byte. Read-only for the life of the process.
static DEFINITIONS: [Definition; 14] = [
    Definition { opcode: OpCode::Nop, name: "NOP", operand_widths: &[] },
    Definition { opcode: OpCode::Const, name: "CONST", operand_widths: &[2] },
    Definition { opcode: OpCode::Add, name: "ADD", operand_widths: &[] },
    Definition { opcode: OpCode::Sub, name: "SUB", operand_widths: &[] },
    Definition { opcode: OpCode::Mul, name: "MUL", operand_widths: &[] },
    Definition { opcode: OpCode::Quo, name: "QUO", operand_widths: &[] },
    Definition { opcode: OpCode::True, name: "TRUE", operand_widths: &[] },
    Definition { opcode: OpCode::False, name: "FALSE", operand_widths: &[] },
    Definition { opcode: OpCode::Eql, name: "EQL", operand_widths: &[] },
    Definition { opcode: OpCode::Neql, name: "NEQL", operand_widths: &[] },
    Definition { opcode: OpCode::Lt, name: "LT", operand_widths: &[] },
    Definition { opcode: OpCode::Lte, name: "LTE", operand_widths: &[] },
    Definition { opcode: OpCode::Gt, name: "GT", operand_widths: &[] },
    Definition { opcode: OpCode::Gte, name: "GTE", operand_widths: &[] },
];

impl OpCode {
    pub const ALL: [OpCode; 14] = [
        OpCode::Nop,
        OpCode::Const,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Quo,
        OpCode::True,
        OpCode::False,
        OpCode::Eql,
        OpCode::Neql,
        OpCode::Lt,
        OpCode::Lte,
        OpCode::Gt,
        OpCode::Gte,
    ];

    pub fn definition(self) -> &'static Definition {
        &DEFINITIONS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }
}

impl TryFrom<u8> for OpCode {
    type Error = CodeError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::ALL
            .get(byte as usize)
            .copied()
            .ok_or(CodeError::UnknownOpcode(byte))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Look up the definition for a raw opcode byte.
pub fn lookup(byte: u8) -> Result<&'static Definition, CodeError> {
    OpCode::try_from(byte).map(OpCode::definition)
}
