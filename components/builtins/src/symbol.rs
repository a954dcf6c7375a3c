//! The `Symbol` function and its well-known symbols

use core_types::Value;
use interpreter::{Vm, VmResult};

/// `Symbol(description)`: a new unique symbol.
pub fn symbol(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    let description = match args.first() {
        None | Some(Value::Undefined) => String::new(),
        Some(value) => vm.to_js_string(value)?.to_string(),
    };
    Ok(vm.new_symbol(&description))
}

/// Installs the global `Symbol` with `Symbol.toPrimitive` and
/// `Symbol.toStringTag`.
pub fn install(vm: &mut Vm) -> VmResult<()> {
    let function = vm.define_native_global("Symbol", symbol);
    let base = vm.function_base(function)?;
    let intrinsics = *vm.intrinsics();
    vm.define_value(base, "prototype", Value::Object(intrinsics.symbol_prototype))?;
    vm.define_value(base, "toPrimitive", Value::Symbol(intrinsics.symbol_to_primitive))?;
    vm.define_value(base, "toStringTag", Value::Symbol(intrinsics.symbol_to_string_tag))?;
    Ok(())
}
