//! `gc()`

use core_types::Value;
use interpreter::{Vm, VmResult};

/// `gc()`: collects immediately. The caller's operands are on the stack
/// and this native holds nothing else.
pub fn gc(vm: &mut Vm, _this: Value, _args: &[Value]) -> VmResult<Value> {
    vm.collect_garbage();
    Ok(Value::Undefined)
}

/// Installs the global `gc`.
pub fn install(vm: &mut Vm) -> VmResult<()> {
    vm.define_native_global("gc", gc);
    Ok(())
}
