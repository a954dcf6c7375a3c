//! The `Object` constructor's static methods

use core_types::{JsError, ObjectId, Value};
use interpreter::{Vm, VmResult};
use memory_manager::PropertyKey;

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

fn target_object(vm: &Vm, value: &Value, method: &str) -> VmResult<ObjectId> {
    match value {
        Value::Object(_) | Value::Function(_) => vm
            .object_of(value)
            .ok_or_else(|| JsError::type_error(format!("Object.{} called on a dead object", method)).into()),
        _ => Err(JsError::type_error(format!("Object.{} called on non-object", method)).into()),
    }
}

/// `Object.create(proto)`: a fresh object whose prototype is `proto`,
/// or which has none when `proto` is null.
pub fn create(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    let prototype = match arg(args, 0) {
        Value::Null => None,
        proto @ (Value::Object(_) | Value::Function(_)) => vm.object_of(&proto),
        _ => return Err(JsError::type_error("Object prototype may only be an Object or null").into()),
    };
    let object = vm.new_object();
    if let Some(created) = vm.heap_mut().object_mut(object) {
        created.prototype = prototype;
    }
    Ok(Value::Object(object))
}

/// `Object.defineProperty(obj, key, descriptor)`.
///
/// A descriptor with `get` or `set` installs an accessor; otherwise its
/// `value` becomes a data property.
pub fn define_property(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    let target_value = arg(args, 0);
    let target = target_object(vm, &target_value, "defineProperty")?;
    let key = vm.to_property_key(&arg(args, 1))?;
    let descriptor = arg(args, 2);
    if !matches!(descriptor, Value::Object(_) | Value::Function(_)) {
        return Err(JsError::type_error("Property description must be an object").into());
    }

    // Descriptor reads may run script while the key and getter are held here.
    let mut held = match &key {
        PropertyKey::Symbol(id) => vec![Value::Symbol(*id)],
        PropertyKey::String(_) => Vec::new(),
    };
    let getter = vm.with_rooted(&held, |vm| vm.get_property(&descriptor, &PropertyKey::from("get")))?;
    held.push(getter.clone());
    let setter = vm.with_rooted(&held, |vm| vm.get_property(&descriptor, &PropertyKey::from("set")))?;
    if getter.is_nullish() && setter.is_nullish() {
        let value = vm.with_rooted(&held, |vm| vm.get_property(&descriptor, &PropertyKey::from("value")))?;
        vm.define_value(target, key, value)?;
        return Ok(target_value);
    }

    let accessor = |value: &Value, which: &str| match value {
        Value::Undefined => Ok(None),
        Value::Function(f) => Ok(Some(*f)),
        _ => Err(JsError::type_error(format!("{} must be a function", which))),
    };
    let getter = accessor(&getter, "Getter")?;
    let setter = accessor(&setter, "Setter")?;
    vm.define_accessor(target, key, getter, setter)?;
    Ok(target_value)
}

/// `Object.getPrototypeOf(obj)`. The root prototype reports null.
pub fn get_prototype_of(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    let target = arg(args, 0);
    if target.is_nullish() {
        return Err(JsError::type_error("Cannot convert undefined or null to object").into());
    }
    let id = match vm.object_of(&target) {
        Some(id) => id,
        None => match &target {
            Value::Boolean(_) => return Ok(Value::Object(vm.intrinsics().boolean_prototype)),
            Value::Number(_) => return Ok(Value::Object(vm.intrinsics().number_prototype)),
            Value::String(_) => return Ok(Value::Object(vm.intrinsics().string_prototype)),
            _ => return Ok(Value::Null),
        },
    };
    match vm.heap().object(id).and_then(|o| o.prototype) {
        Some(proto) if proto != id => Ok(Value::Object(proto)),
        _ => Ok(Value::Null),
    }
}

/// `Object.keys(obj)`: own string keys as an array, integer keys first.
pub fn keys(vm: &mut Vm, _this: Value, args: &[Value]) -> VmResult<Value> {
    let target = arg(args, 0);
    let target = target_object(vm, &target, "keys")?;
    let keys = vm.own_keys(target)?;
    let array = vm.new_array();
    let array_value = Value::Object(array);
    for (index, key) in keys.into_iter().enumerate() {
        vm.set_property(&array_value, PropertyKey::from(index.to_string().as_str()), Value::String(key))?;
    }
    Ok(array_value)
}

/// Installs the global `Object`.
pub fn install(vm: &mut Vm) -> VmResult<()> {
    let object = vm.new_object();
    let prototype = vm.intrinsics().object_prototype;
    vm.define_value(object, "prototype", Value::Object(prototype))?;
    vm.define_native_method(object, "create", create)?;
    vm.define_native_method(object, "defineProperty", define_property)?;
    vm.define_native_method(object, "getPrototypeOf", get_prototype_of)?;
    vm.define_native_method(object, "keys", keys)?;
    vm.define_global("Object", Value::Object(object));
    Ok(())
}
