//! The `module` object and the native core module

use bytecode_system::module_hash;
use core_types::{ErrorKind, JsError, Value};
use interpreter::{Vm, VmResult};

/// Name the core native module is registered under.
pub const CORE_MODULE: &str = "native:core";

/// `module.getExportObj()`: exports of the calling module.
pub fn get_export_obj(vm: &mut Vm, _this: Value, _args: &[Value]) -> VmResult<Value> {
    match vm.exports_of_running() {
        Some(exports) => Ok(Value::Object(exports)),
        None => Ok(Value::Undefined),
    }
}

/// Parses a module specifier: sixteen hex digits are a raw hash, anything
/// else is a module name.
pub fn specifier_hash(specifier: &str) -> u64 {
    if specifier.len() == 16 {
        if let Ok(hash) = u64::from_str_radix(specifier, 16) {
            return hash;
        }
    }
    module_hash(specifier)
}

/// `module.require(specifier)`: exports of a bundled module, running it
/// on first use, or of a registered native module.
pub fn require(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    let specifier = vm.to_js_string(args.first().unwrap_or(&Value::Undefined))?;
    let hash = specifier_hash(&specifier);
    match vm.resolve_module(hash)? {
        Some(exports) => Ok(Value::Object(exports)),
        None => Err(JsError::new(ErrorKind::Error, format!("Cannot find module '{}'", specifier)).into()),
    }
}

/// Installs the global `module` object and registers the core native
/// module, whose exports mirror the global natives.
pub fn install(vm: &mut Vm) -> VmResult<()> {
    let module = vm.new_object();
    vm.define_native_method(module, "getExportObj", get_export_obj)?;
    vm.define_native_method(module, "require", require)?;
    vm.define_global("module", Value::Object(module));

    let core = vm.new_object();
    for name in ["print", "console", "Object", "Array", "Symbol", "gc"] {
        if let Some(value) = vm.global(name) {
            vm.define_value(core, name, value)?;
        }
    }
    vm.register_native_module(module_hash(CORE_MODULE), core);
    Ok(())
}
