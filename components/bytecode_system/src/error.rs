//! Load-time format errors.

use thiserror::Error;

/// Reasons a module or bundle image is rejected.
///
/// Every variant is detected before any instruction runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The image does not start with the expected magic bytes
    #[error("bad magic: expected {expected:02x?}, found {found:02x?}")]
    BadMagic {
        /// Magic the reader wanted
        expected: [u8; 4],
        /// Bytes actually present
        found: [u8; 4],
    },

    /// The format version is not supported
    #[error("unsupported {what} version {found} (expected {expected})")]
    UnsupportedVersion {
        /// "module" or "bundle"
        what: &'static str,
        /// Supported version
        expected: u16,
        /// Version in the image
        found: u16,
    },

    /// A read ran past the end of the buffer
    #[error("truncated image: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        /// Offset of the read
        offset: usize,
        /// Bytes requested
        needed: usize,
        /// Bytes left
        available: usize,
    },

    /// A section length field is inconsistent with its contents
    #[error("malformed {section} section: {reason}")]
    MalformedSection {
        /// "string table" or "data"
        section: &'static str,
        /// What was wrong
        reason: String,
    },

    /// An opcode byte outside the table
    #[error("unknown opcode 0x{opcode:02x} at instruction {index}")]
    UnknownOpcode {
        /// The byte
        opcode: u8,
        /// Instruction index
        index: usize,
    },

    /// An operand that does not match its opcode
    #[error("instruction {index} ({mnemonic}) has a malformed operand")]
    MalformedOperand {
        /// Instruction index
        index: usize,
        /// Opcode mnemonic
        mnemonic: &'static str,
    },

    /// A string operand outside the string table
    #[error("instruction {index} references string {string} but the table has {count}")]
    StringIndexOutOfBounds {
        /// Instruction index
        index: usize,
        /// Referenced entry
        string: u16,
        /// Entries in the table
        count: usize,
    },

    /// A jump target past the end of the instruction stream
    #[error("instruction {index} jumps to {target} past the end ({count} instructions)")]
    InvalidJumpTarget {
        /// Instruction index
        index: usize,
        /// Jump target
        target: u16,
        /// Instruction count
        count: usize,
    },

    /// A function body extending past the end of the instruction stream
    #[error("function declared at {index} with {size} instructions overruns the module ({count} instructions)")]
    InvalidFunctionBody {
        /// Instruction index
        index: usize,
        /// Declared body size
        size: u16,
        /// Instruction count
        count: usize,
    },

    /// Too many entries for the format's index width
    #[error("{what} count {count} exceeds the format limit of {limit}")]
    TooMany {
        /// What overflowed
        what: &'static str,
        /// Requested count
        count: usize,
        /// Format limit
        limit: usize,
    },

    /// Two modules in a bundle share a hash
    #[error("duplicate module hash {0:016x} in bundle")]
    DuplicateModule(u64),
}

/// Result type for decoding.
pub type FormatResult<T> = Result<T, FormatError>;
