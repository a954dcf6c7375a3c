//! Decoded instructions.

use crate::opcode::{Opcode, OperandKind};
use std::fmt;

/// Operand of an instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// No operand
    None,
    /// Signed 32-bit integer
    Int32(i32),
    /// IEEE-754 double
    Float64(f64),
    /// One unsigned 16-bit value
    UInt16(u16),
    /// Two unsigned 16-bit values
    TwoUInt16(u16, u16),
}

impl Operand {
    /// The shape of this operand.
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::None => OperandKind::None,
            Operand::Int32(_) => OperandKind::Int32,
            Operand::Float64(_) => OperandKind::Float64,
            Operand::UInt16(_) => OperandKind::UInt16,
            Operand::TwoUInt16(_, _) => OperandKind::TwoUInt16,
        }
    }
}

/// A single bytecode instruction.
///
/// # Examples
///
/// ```
/// use bytecode_system::{Instruction, Opcode, Operand};
///
/// let call = Instruction::with_u16(Opcode::Call, 2);
/// assert_eq!(call.operand, Operand::UInt16(2));
/// assert_eq!(call.to_string(), "CALL 2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    /// The opcode
    pub opcode: Opcode,
    /// Its operand, shaped per [`Opcode::operand_kind`]
    pub operand: Operand,
}

impl Instruction {
    /// Instruction without operand.
    pub fn new(opcode: Opcode) -> Self {
        Instruction {
            opcode,
            operand: Operand::None,
        }
    }

    /// `LD_INT value`.
    pub fn load_int(value: i32) -> Self {
        Instruction {
            opcode: Opcode::LoadInt,
            operand: Operand::Int32(value),
        }
    }

    /// `LD_DOUBLE value`.
    pub fn load_double(value: f64) -> Self {
        Instruction {
            opcode: Opcode::LoadDouble,
            operand: Operand::Float64(value),
        }
    }

    /// Instruction with a single u16 operand.
    pub fn with_u16(opcode: Opcode, value: u16) -> Self {
        Instruction {
            opcode,
            operand: Operand::UInt16(value),
        }
    }

    /// Instruction with two u16 operands.
    pub fn with_u16_pair(opcode: Opcode, first: u16, second: u16) -> Self {
        Instruction {
            opcode,
            operand: Operand::TwoUInt16(first, second),
        }
    }

    /// True if the operand has the shape the opcode requires.
    pub fn is_well_formed(&self) -> bool {
        self.opcode.operand_kind() == self.operand.kind()
    }

    /// The first u16 operand, if any.
    pub fn u16_operand(&self) -> Option<u16> {
        match self.operand {
            Operand::UInt16(v) | Operand::TwoUInt16(v, _) => Some(v),
            _ => None,
        }
    }

    /// The body size of a function declaration.
    pub fn body_size(&self) -> Option<u16> {
        match (self.opcode, self.operand) {
            (Opcode::FuncDecl, Operand::TwoUInt16(_, size)) => Some(size),
            (Opcode::FuncDeclExpr, Operand::UInt16(size)) => Some(size),
            _ => None,
        }
    }

    /// Encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        1 + self.operand.kind().size()
    }

    /// Appends the encoding to `out`: opcode byte, then little-endian operands.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode.byte());
        match self.operand {
            Operand::None => {}
            Operand::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Operand::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Operand::UInt16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Operand::TwoUInt16(a, b) => {
                out.extend_from_slice(&a.to_le_bytes());
                out.extend_from_slice(&b.to_le_bytes());
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => write!(f, "{}", self.opcode),
            Operand::Int32(v) => write!(f, "{} {}", self.opcode, v),
            Operand::Float64(v) => write!(f, "{} {:?}", self.opcode, v),
            Operand::UInt16(v) => write!(f, "{} {}", self.opcode, v),
            Operand::TwoUInt16(a, b) => write!(f, "{} {} {}", self.opcode, a, b),
        }
    }
}
