//! `print` and `console.log`

use std::io::Write;

use core_types::{number, ErrorKind, JsError, Value};
use interpreter::{Vm, VmResult};

/// Text written for a value: primitives as by ToString, symbols as
/// `Symbol(description)`, objects and functions as a fixed placeholder.
/// Never runs script code.
pub fn display_value(vm: &Vm, value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => number::to_js_string(*n),
        Value::String(s) => s.to_string(),
        Value::Symbol(id) => vm.symbol_display(*id),
        Value::Object(_) | Value::Accessor(_) => "[Object]".to_string(),
        Value::Function(_) => "[Function]".to_string(),
    }
}

fn write_line(vm: &mut Vm, line: &str) -> VmResult<()> {
    writeln!(vm.output(), "{}", line)
        .map_err(|e| JsError::new(ErrorKind::InternalError, format!("print failed: {}", e)).into())
}

/// `print(...values)`: one line per argument, a blank line without any.
pub fn print(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    if args.is_empty() {
        write_line(vm, "")?;
    }
    for arg in args {
        let line = display_value(vm, arg);
        write_line(vm, &line)?;
    }
    Ok(Value::Undefined)
}

/// `console.log(...values)`: all arguments on one line, space separated.
pub fn log(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    let line = args
        .iter()
        .map(|arg| display_value(vm, arg))
        .collect::<Vec<_>>()
        .join(" ");
    write_line(vm, &line)?;
    Ok(Value::Undefined)
}

/// Installs `print` and a `console` object with `log`.
pub fn install(vm: &mut Vm) -> VmResult<()> {
    vm.define_native_global("print", print);
    let console = vm.new_object();
    vm.define_native_method(console, "log", log)?;
    vm.define_global("console", Value::Object(console));
    Ok(())
}
