//! Contract tests for builtins component
//!
//! Scripts assembled with `ModuleBuilder` call the installed natives the
//! way compiled code does.

mod module_object_tests;
mod object_constructor_tests;

use bytecode_system::ModuleBuilder;
use interpreter::{SharedOutput, Vm, VmConfig};
use memory_manager::ModuleId;

/// A VM with builtins installed and its output captured.
pub fn vm_with_builtins() -> (Vm, SharedOutput) {
    let mut vm = Vm::new(VmConfig::default());
    builtins::install(&mut vm).unwrap();
    let out = SharedOutput::new();
    vm.set_output(out.clone());
    (vm, out)
}

/// Loads and runs a module, panicking on any error.
pub fn run(vm: &mut Vm, b: ModuleBuilder) -> ModuleId {
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap();
    id
}
