//! Bytecode system for the stack virtual machine
//!
//! This crate defines the closed opcode table, the module and bundle
//! binary formats, and an assembler for producing modules in code.
//!
//! # Features
//!
//! - Closed, version-pinned opcode set with fixed operand shapes
//! - Module (`.AxM`) and bundle (`.AxB`) decoding and encoding
//! - Load-time validation of string indices, jump targets and function bodies
//! - [`ModuleBuilder`] with forward-jump and function-body patching
//! - Disassembly
//!
//! # Example
//!
//! ```
//! use bytecode_system::{Module, ModuleBuilder, Opcode};
//!
//! let mut builder = ModuleBuilder::named("main");
//! builder.load_int(2).load_int(3).op(Opcode::Add).export("sum");
//! let module = builder.build().unwrap();
//!
//! let bytes = module.to_bytes();
//! let restored = Module::from_bytes(&bytes).unwrap();
//! assert_eq!(restored.instructions(), module.instructions());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod bundle;
pub mod error;
pub mod hash;
pub mod instruction;
pub mod module;
pub mod opcode;
pub mod reader;
pub mod string_table;

// Re-export main types at crate root
pub use builder::{FunctionBody, Label, ModuleBuilder};
pub use bundle::{Bundle, BUNDLE_MAGIC, BUNDLE_VERSION};
pub use error::{FormatError, FormatResult};
pub use hash::module_hash;
pub use instruction::{Instruction, Operand};
pub use module::{Module, MODULE_MAGIC, MODULE_VERSION};
pub use opcode::{Opcode, OperandKind};
pub use string_table::StringTable;

/// What a binary image contains, judged by its magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// A single module
    Module,
    /// A bundle of modules
    Bundle,
}

/// Detects the image kind from its first four bytes.
///
/// # Examples
///
/// ```
/// use bytecode_system::{detect_image, ImageKind};
///
/// assert_eq!(detect_image(b".AxM\x02\x00"), Some(ImageKind::Module));
/// assert_eq!(detect_image(b".AxB"), Some(ImageKind::Bundle));
/// assert_eq!(detect_image(b"\x7fELF"), None);
/// ```
pub fn detect_image(bytes: &[u8]) -> Option<ImageKind> {
    match bytes.get(..4)? {
        m if m == MODULE_MAGIC => Some(ImageKind::Module),
        m if m == BUNDLE_MAGIC => Some(ImageKind::Bundle),
        _ => None,
    }
}
