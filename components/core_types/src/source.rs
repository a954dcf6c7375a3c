//! Bytecode locations and stack frame records for error reporting.
//!
//! Compiled modules carry no source text, so a location is the module's
//! hash plus an instruction index.

use std::fmt;

/// A position inside a compiled module.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition::new(0xabcd, 12);
/// assert_eq!(pos.to_string(), "module 000000000000abcd @ 12");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    /// Hash identifying the module
    pub module_hash: u64,
    /// Index of the instruction being executed
    pub instruction: usize,
}

impl SourcePosition {
    /// Creates a position.
    pub fn new(module_hash: u64, instruction: usize) -> Self {
        SourcePosition {
            module_hash,
            instruction,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module {:016x} @ {}", self.module_hash, self.instruction)
    }
}

/// A single frame of an interpreted call stack.
///
/// # Examples
///
/// ```
/// use core_types::{SourcePosition, StackFrame};
///
/// let frame = StackFrame {
///     function_name: Some("counter".to_string()),
///     position: SourcePosition::new(1, 4),
/// };
/// assert_eq!(frame.to_string(), "at counter (module 0000000000000001 @ 4)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Name of the function, or None for anonymous functions and module code
    pub function_name: Option<String>,
    /// Where the frame was executing when the error passed through it
    pub position: SourcePosition,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.function_name.as_deref().unwrap_or("<anonymous>");
        write!(f, "at {} ({})", name, self.position)
    }
}
