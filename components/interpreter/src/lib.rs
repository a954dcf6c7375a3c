//! Bytecode interpreter
//!
//! A stack machine executing compiled modules:
//! - One dispatch-table entry per opcode
//! - Lexical scopes and closures allocated on the collected heap
//! - Arguments and receivers passed in call frames on a bounded stack
//! - Script exceptions kept apart from fatal VM errors
//!
//! # Example
//!
//! ```
//! use bytecode_system::{ModuleBuilder, Opcode};
//! use core_types::Value;
//! use interpreter::{Vm, VmConfig};
//!
//! let mut b = ModuleBuilder::named("main");
//! b.load_int(40).load_int(2).op(Opcode::Add).export("answer");
//!
//! let mut vm = Vm::new(VmConfig::default());
//! let id = vm.load_module(b.build().unwrap());
//! vm.run_module(id).unwrap();
//! assert_eq!(vm.exported(id, "answer").unwrap(), Value::Number(42.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call;
pub mod call_frame;
pub mod coercion;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gc_integration;
pub mod module_loader;
pub mod native;
pub mod operators;
pub mod output;
pub mod property;
pub mod realm;
pub mod stack;
pub mod vm;

// Re-export main types at crate root
pub use call_frame::CallFrame;
pub use coercion::PreferredType;
pub use config::VmConfig;
pub use error::{FatalError, VmError, VmResult};
pub use module_loader::ModuleRecord;
pub use native::NativeFn;
pub use operators::{NumericOp, Relation};
pub use output::SharedOutput;
pub use realm::Intrinsics;
pub use stack::OperandStack;
pub use vm::Vm;
