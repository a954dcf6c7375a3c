//! Compiled modules: header, string table and instruction stream.

use crate::error::{FormatError, FormatResult};
use crate::instruction::{Instruction, Operand};
use crate::opcode::{Opcode, OperandKind};
use crate::reader::ByteReader;
use crate::string_table::StringTable;
use core_types::JsString;
use std::fmt::Write as _;

/// Magic bytes of a module image (`.AxM`).
pub const MODULE_MAGIC: [u8; 4] = [0x2e, 0x41, 0x78, 0x4d];

/// Supported module format version.
pub const MODULE_VERSION: u16 = 2;

/// magic + version + hash + two section offsets
const HEADER_LEN: usize = 4 + 2 + 8 + 4 + 4;
const DATA_HEADER_LEN: usize = 8;

/// A compiled module.
///
/// Constructed only through [`Module::new`] or [`Module::from_bytes`],
/// both of which validate every string index, jump target and function
/// body range, so the interpreter can trust the stream.
///
/// # Examples
///
/// ```
/// use bytecode_system::{Instruction, Module, Opcode, StringTable};
///
/// let mut strings = StringTable::new();
/// let sum = strings.intern("sum").unwrap();
/// let module = Module::new(
///     7,
///     strings,
///     vec![
///         Instruction::load_int(2),
///         Instruction::load_int(3),
///         Instruction::new(Opcode::Add),
///         Instruction::with_u16(Opcode::Export, sum),
///     ],
/// )
/// .unwrap();
///
/// let bytes = module.to_bytes();
/// assert_eq!(Module::from_bytes(&bytes).unwrap(), module);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    hash: u64,
    strings: StringTable,
    instructions: Vec<Instruction>,
}

impl Module {
    /// Builds a module, validating the instruction stream.
    pub fn new(hash: u64, strings: StringTable, instructions: Vec<Instruction>) -> FormatResult<Self> {
        let module = Module {
            hash,
            strings,
            instructions,
        };
        module.validate()?;
        Ok(module)
    }

    /// Identity hash.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// String table.
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Constant string at `index`.
    pub fn string(&self, index: u16) -> Option<&JsString> {
        self.strings.get(index)
    }

    /// Instruction stream.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction at `index`.
    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True for a module with no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    fn validate(&self) -> FormatResult<()> {
        let count = self.instructions.len();
        if count > u32::MAX as usize {
            return Err(FormatError::TooMany {
                what: "instruction",
                count,
                limit: u32::MAX as usize,
            });
        }
        for (index, instruction) in self.instructions.iter().enumerate() {
            let opcode = instruction.opcode;
            if !instruction.is_well_formed() {
                return Err(FormatError::MalformedOperand {
                    index,
                    mnemonic: opcode.mnemonic(),
                });
            }
            if opcode.takes_string_operand() {
                if let Some(string) = instruction.u16_operand() {
                    if self.strings.get(string).is_none() {
                        return Err(FormatError::StringIndexOutOfBounds {
                            index,
                            string,
                            count: self.strings.len(),
                        });
                    }
                }
            }
            if opcode.is_jump() {
                if let Some(target) = instruction.u16_operand() {
                    if target as usize > count {
                        return Err(FormatError::InvalidJumpTarget { index, target, count });
                    }
                }
            }
            if let Some(size) = instruction.body_size() {
                if index + 1 + size as usize > count {
                    return Err(FormatError::InvalidFunctionBody { index, size, count });
                }
            }
        }
        Ok(())
    }

    /// Decodes a standalone module image.
    pub fn from_bytes(bytes: &[u8]) -> FormatResult<Self> {
        Self::decode(bytes).map(|(module, _)| module)
    }

    /// Decodes a module at the start of `bytes`, returning it together with
    /// the number of bytes it occupies. Section offsets are relative to the
    /// module start.
    pub fn decode(bytes: &[u8]) -> FormatResult<(Self, usize)> {
        let mut reader = ByteReader::new(bytes);
        let found = reader.magic()?;
        if found != MODULE_MAGIC {
            return Err(FormatError::BadMagic {
                expected: MODULE_MAGIC,
                found,
            });
        }
        let version = reader.u16()?;
        if version != MODULE_VERSION {
            return Err(FormatError::UnsupportedVersion {
                what: "module",
                expected: MODULE_VERSION,
                found: version,
            });
        }
        let hash = reader.u64()?;
        let strings_offset = reader.u32()? as usize;
        let data_offset = reader.u32()? as usize;

        reader.seek(strings_offset)?;
        let strings = StringTable::decode(&mut reader)?;
        let strings_end = reader.offset();

        reader.seek(data_offset)?;
        let instructions = decode_data_section(&mut reader)?;
        let end = reader.offset().max(strings_end);

        let module = Module::new(hash, strings, instructions)?;
        log::debug!(
            "decoded module {:016x}: {} strings, {} instructions",
            hash,
            module.strings.len(),
            module.instructions.len()
        );
        Ok((module, end))
    }

    /// Encodes the module image.
    pub fn to_bytes(&self) -> Vec<u8> {
        let strings_len = self.strings.encoded_len();
        let mut out = Vec::with_capacity(HEADER_LEN + strings_len + self.data_len());
        out.extend_from_slice(&MODULE_MAGIC);
        out.extend_from_slice(&MODULE_VERSION.to_le_bytes());
        out.extend_from_slice(&self.hash.to_le_bytes());
        out.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());
        out.extend_from_slice(&((HEADER_LEN + strings_len) as u32).to_le_bytes());
        self.strings.encode(&mut out);

        out.extend_from_slice(&(self.data_len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.instructions.len() as u32).to_le_bytes());
        for instruction in &self.instructions {
            instruction.encode(&mut out);
        }
        out
    }

    fn data_len(&self) -> usize {
        DATA_HEADER_LEN
            + self
                .instructions
                .iter()
                .map(Instruction::encoded_len)
                .sum::<usize>()
    }

    /// Human-readable listing, one instruction per line, with string
    /// operands resolved.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "; module {:016x}", self.hash);
        for (i, s) in self.strings.iter().enumerate() {
            let _ = writeln!(out, ";   ${} = {:?}", i, s);
        }
        for (i, instruction) in self.instructions.iter().enumerate() {
            let _ = write!(out, "{:04}  {}", i, instruction);
            if instruction.opcode.takes_string_operand() {
                if let Some(s) = instruction.u16_operand().and_then(|idx| self.string(idx)) {
                    let _ = write!(out, "  ; {:?}", s);
                }
            }
            out.push('\n');
        }
        out
    }
}

fn decode_data_section(reader: &mut ByteReader<'_>) -> FormatResult<Vec<Instruction>> {
    let start = reader.offset();
    let length = reader.u32()? as usize;
    let count = reader.u32()? as usize;
    let mut instructions = Vec::with_capacity(count.min(1 << 16));
    for index in 0..count {
        let byte = reader.u8()?;
        let opcode = Opcode::from_byte(byte).ok_or(FormatError::UnknownOpcode {
            opcode: byte,
            index,
        })?;
        let operand = match opcode.operand_kind() {
            OperandKind::None => Operand::None,
            OperandKind::Int32 => Operand::Int32(reader.i32()?),
            OperandKind::Float64 => Operand::Float64(reader.f64()?),
            OperandKind::UInt16 => Operand::UInt16(reader.u16()?),
            OperandKind::TwoUInt16 => Operand::TwoUInt16(reader.u16()?, reader.u16()?),
        };
        instructions.push(Instruction { opcode, operand });
    }
    let consumed = reader.offset() - start;
    if consumed != length {
        return Err(FormatError::MalformedSection {
            section: "data",
            reason: format!("declared {} bytes, instructions occupy {}", length, consumed),
        });
    }
    Ok(instructions)
}
