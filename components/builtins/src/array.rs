//! The `Array` constructor's static methods

use core_types::Value;
use interpreter::{Vm, VmResult};

/// `Array.isArray(value)`.
pub fn is_array(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    let result = match args.first() {
        Some(Value::Object(id)) => vm.heap().object(*id).map_or(false, |o| o.is_array()),
        _ => false,
    };
    Ok(Value::Boolean(result))
}

/// Installs the global `Array`.
pub fn install(vm: &mut Vm) -> VmResult<()> {
    let array = vm.new_object();
    let prototype = vm.intrinsics().array_prototype;
    vm.define_value(array, "prototype", Value::Object(prototype))?;
    vm.define_native_method(array, "isArray", is_array)?;
    vm.define_global("Array", Value::Object(array));
    Ok(())
}
