use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bytecode::code_error::CodeError;
use crate::bytecode::encode::read_operands;
use crate::bytecode::op::{OpCode, lookup};
use crate::lang::object::{Object, ObjectType};

/// A linear instruction stream.
///
/// Instructions are variable length with no separators; boundaries are only
/// recoverable by decoding from offset 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Instructions(Vec<u8>);

impl Instructions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append an encoded instruction, returning its offset.
    pub fn push(&mut self, instruction: &[u8]) -> usize {
        let position = self.0.len();
        self.0.extend_from_slice(instruction);
        position
    }

    /// Decode the whole stream.
    ///
    /// Fails on the first unknown opcode or truncated instruction; nothing
    /// past that point is trusted.
    pub fn decode(&self) -> Result<Vec<Decoded>, CodeError> {
        let mut decoded = Vec::new();
        let mut offset = 0;

        while offset < self.0.len() {
            let def = lookup(self.0[offset])?;
            let (operands, read) = read_operands(def, &self.0[offset + 1..])?;
            decoded.push(Decoded {
                offset,
                op: def.opcode,
                operands,
            });
            offset += 1 + read;
        }

        Ok(decoded)
    }
}

impl From<Vec<u8>> for Instructions {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl FromIterator<Vec<u8>> for Instructions {
    fn from_iter<I: IntoIterator<Item = Vec<u8>>>(iter: I) -> Self {
        Self(iter.into_iter().flatten().collect())
    }
}

/// One decoded instruction and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub offset: usize,
    pub op: OpCode,
    pub operands: Vec<usize>,
}

/// Compiler output handed to an executor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bytecode {
    pub instructions: Instructions,
    /// Constant pool. `CONST` operands index into it.
    pub constants: Vec<Object>,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cannot serialize {0} constant")]
    Unserializable(ObjectType),

    #[error("invalid constant: {0}")]
    InvalidConstant(String),

    #[error("postcard: {0}")]
    Postcard(#[from] postcard::Error),
}

impl Bytecode {
    pub fn new(instructions: Instructions, constants: Vec<Object>) -> Self {
        Self {
            instructions,
            constants,
        }
    }

    /// Serialize to the postcard wire format.
    ///
    /// Functions and builtins reference live scopes and native code, so a
    /// pool holding one cannot be serialized.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let constants = self
            .constants
            .iter()
            .map(ConstantRepr::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let repr = BytecodeRepr {
            instructions: self.instructions.clone(),
            constants,
        };
        Ok(postcard::to_allocvec(&repr)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let repr: BytecodeRepr = postcard::from_bytes(bytes)?;
        let constants = repr
            .constants
            .into_iter()
            .map(ConstantRepr::into_object)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            instructions: repr.instructions,
            constants,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct BytecodeRepr {
    instructions: Instructions,
    constants: Vec<ConstantRepr>,
}

/// Wire form of a constant: variant tag plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ConstantRepr {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Error(String),
    Array(Vec<ConstantRepr>),
    Hash(Vec<(ConstantRepr, ConstantRepr)>),
}

impl TryFrom<&Object> for ConstantRepr {
    type Error = CodecError;

    fn try_from(object: &Object) -> Result<Self, CodecError> {
        Ok(match object {
            Object::Integer(n) => ConstantRepr::Integer(*n),
            Object::Boolean(b) => ConstantRepr::Boolean(*b),
            Object::String(s) => ConstantRepr::String(s.clone()),
            Object::Null => ConstantRepr::Null,
            Object::Error(message) => ConstantRepr::Error(message.clone()),
            Object::Array(items) => ConstantRepr::Array(
                items
                    .iter()
                    .map(ConstantRepr::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Object::Hash(hash) => ConstantRepr::Hash(
                hash.iter()
                    .map(|pair| -> Result<_, CodecError> {
                        Ok((
                            ConstantRepr::try_from(&pair.key)?,
                            ConstantRepr::try_from(&pair.value)?,
                        ))
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Object::Function(_) | Object::Builtin(_) => {
                return Err(CodecError::Unserializable(object.object_type()));
            }
        })
    }
}

impl ConstantRepr {
    /// Rebuild through the object model so hash keys are re-derived.
    fn into_object(self) -> Result<Object, CodecError> {
        Ok(match self {
            ConstantRepr::Integer(n) => Object::Integer(n),
            ConstantRepr::Boolean(b) => Object::Boolean(b),
            ConstantRepr::String(s) => Object::String(s),
            ConstantRepr::Null => Object::Null,
            ConstantRepr::Error(message) => Object::Error(message),
            ConstantRepr::Array(items) => Object::Array(
                items
                    .into_iter()
                    .map(ConstantRepr::into_object)
                    .collect::<Result<_, _>>()?,
            ),
            ConstantRepr::Hash(pairs) => {
                let pairs = pairs
                    .into_iter()
                    .map(|(key, value)| -> Result<_, CodecError> {
                        Ok((key.into_object()?, value.into_object()?))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                match Object::hash_from_pairs(pairs) {
                    Object::Error(message) => return Err(CodecError::InvalidConstant(message)),
                    hash => hash,
                }
            }
        })
    }
}
