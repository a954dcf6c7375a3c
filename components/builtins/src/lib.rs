//! Native built-ins
//!
//! Installs the host functions scripts can reach through the global scope:
//! - `print` and `console.log`
//! - `module.getExportObj` and `module.require`
//! - `Object.create`, `Object.defineProperty`, `Object.getPrototypeOf`, `Object.keys`
//! - `Array.isArray`
//! - `Symbol`, `Symbol.toPrimitive`, `Symbol.toStringTag`
//! - `gc`
//!
//! The same values are exported by a native module registered under
//! [`CORE_MODULE`], so bundles can resolve it like any other module.
//!
//! # Example
//!
//! ```
//! use bytecode_system::ModuleBuilder;
//! use interpreter::{SharedOutput, Vm, VmConfig};
//!
//! let mut vm = Vm::new(VmConfig::default());
//! builtins::install(&mut vm).unwrap();
//! let out = SharedOutput::new();
//! vm.set_output(out.clone());
//!
//! let mut b = ModuleBuilder::named("hello");
//! b.load_string("hello").load_local("print").call(1);
//! let id = vm.load_module(b.build().unwrap());
//! vm.run_module(id).unwrap();
//! assert_eq!(out.contents(), "hello\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod console;
pub mod gc;
pub mod module;
pub mod object;
pub mod symbol;

pub use console::display_value;
pub use module::CORE_MODULE;

use interpreter::{Vm, VmResult};
use log::debug;

/// Installs every built-in into `vm`'s global scope and registers the
/// core native module.
pub fn install(vm: &mut Vm) -> VmResult<()> {
    console::install(vm)?;
    object::install(vm)?;
    array::install(vm)?;
    symbol::install(vm)?;
    gc::install(vm)?;
    module::install(vm)?;
    debug!("installed builtins");
    Ok(())
}
