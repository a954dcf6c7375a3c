//! Property access
//!
//! Reads walk the prototype chain and run getters with the original
//! receiver as `this`. Writes only consult the receiver's own slot for an
//! accessor; inherited accessors are shadowed, not invoked.

use core_types::{AccessorId, FunctionId, JsError, JsString, ObjectId, Value};
use memory_manager::{AccessorPair, PropertyKey};

use crate::error::{FatalError, VmResult};
use crate::vm::Vm;

impl Vm {
    /// The backing object of a function.
    pub fn function_base(&self, function: FunctionId) -> VmResult<ObjectId> {
        self.heap
            .function(function)
            .map(|f| f.base)
            .ok_or_else(|| FatalError::DanglingHandle("function").into())
    }

    /// The object carrying a value's own properties, if it has one.
    pub fn object_of(&self, value: &Value) -> Option<ObjectId> {
        match value {
            Value::Object(id) | Value::Symbol(id) => Some(*id),
            Value::Function(f) => self.heap.function(*f).map(|f| f.base),
            _ => None,
        }
    }

    /// Human-readable form of a key, for messages.
    pub fn key_display(&self, key: &PropertyKey) -> String {
        match key {
            PropertyKey::String(s) => s.to_string(),
            PropertyKey::Symbol(id) => self.symbol_display(*id),
        }
    }

    /// `receiver[key]`.
    ///
    /// Primitives delegate to their intrinsic prototype; strings also
    /// answer `length` and index keys themselves. Reading from
    /// `undefined` or `null` is a TypeError.
    pub fn get_property(&mut self, receiver: &Value, key: &PropertyKey) -> VmResult<Value> {
        let start = match receiver {
            Value::Object(id) | Value::Symbol(id) => *id,
            Value::Function(f) => self.function_base(*f)?,
            Value::String(s) => {
                if let Some(value) = string_own_property(s, key) {
                    return Ok(value);
                }
                self.intrinsics.string_prototype
            }
            Value::Number(_) => self.intrinsics.number_prototype,
            Value::Boolean(_) => self.intrinsics.boolean_prototype,
            Value::Undefined | Value::Null | Value::Accessor(_) => {
                return Err(JsError::type_error(format!(
                    "Cannot read properties of {} (reading '{}')",
                    describe(receiver),
                    self.key_display(key)
                ))
                .into());
            }
        };

        match self.heap.find_property(start, key) {
            None => Ok(Value::Undefined),
            Some((_, Value::Accessor(accessor))) => match self.accessor_pair(accessor)?.getter {
                Some(getter) => self.call_function(&Value::Function(getter), receiver.clone(), &[]),
                None => Err(JsError::type_error(format!(
                    "Cannot read property '{}' which has only a setter",
                    self.key_display(key)
                ))
                .into()),
            },
            Some((_, value)) => Ok(value),
        }
    }

    /// `target[key] = value`.
    ///
    /// An accessor in the target's own slot intercepts the write: its
    /// setter runs with `this = target`, and a missing setter is a
    /// TypeError. Arrays keep `length` one past their highest index.
    pub fn set_property(&mut self, target: &Value, key: PropertyKey, value: Value) -> VmResult<()> {
        let id = match target {
            Value::Object(id) => *id,
            Value::Function(f) => self.function_base(*f)?,
            _ => {
                return Err(JsError::type_error(format!(
                    "Cannot set properties of {} (setting '{}')",
                    describe(target),
                    self.key_display(&key)
                ))
                .into());
            }
        };

        let object = self
            .heap
            .object(id)
            .ok_or(FatalError::DanglingHandle("object"))?;
        if let Some(Value::Accessor(accessor)) = object.properties.get_key(&key) {
            let accessor = *accessor;
            return match self.accessor_pair(accessor)?.setter {
                Some(setter) => self
                    .call_function(&Value::Function(setter), target.clone(), &[value])
                    .map(|_| ()),
                None => Err(JsError::type_error(format!(
                    "Cannot set property '{}' which has only a getter",
                    self.key_display(&key)
                ))
                .into()),
            };
        }

        let index = match (&key, object.is_array()) {
            (PropertyKey::String(name), true) => array_index(name),
            _ => None,
        };
        self.define_value(id, key, value)?;
        if let Some(index) = index {
            self.grow_array_length(id, index)?;
        }
        Ok(())
    }

    /// Own data property, bypassing accessors.
    pub fn define_value(&mut self, target: ObjectId, key: impl Into<PropertyKey>, value: Value) -> VmResult<()> {
        let object = self
            .heap
            .object_mut(target)
            .ok_or(FatalError::DanglingHandle("object"))?;
        object.properties.insert_key(key.into(), value);
        Ok(())
    }

    /// Own accessor property. An existing accessor box in the slot is
    /// completed rather than replaced, so getter and setter can be
    /// installed separately.
    pub fn define_accessor(
        &mut self,
        target: ObjectId,
        key: impl Into<PropertyKey>,
        getter: Option<FunctionId>,
        setter: Option<FunctionId>,
    ) -> VmResult<()> {
        let key = key.into();
        let existing = self
            .heap
            .object(target)
            .ok_or(FatalError::DanglingHandle("object"))?
            .properties
            .get_key(&key)
            .cloned();
        let pair = match existing {
            Some(Value::Accessor(id)) => {
                let old = self.accessor_pair(id)?;
                AccessorPair {
                    getter: getter.or(old.getter),
                    setter: setter.or(old.setter),
                }
            }
            _ => AccessorPair { getter, setter },
        };
        let accessor = self.heap.alloc_accessor(pair);
        self.define_value(target, key, Value::Accessor(accessor))
    }

    /// Own string keys, integer keys first in ascending order.
    pub fn own_keys(&self, target: ObjectId) -> VmResult<Vec<JsString>> {
        let object = self
            .heap
            .object(target)
            .ok_or(FatalError::DanglingHandle("object"))?;
        let (mut indices, named): (Vec<_>, Vec<_>) = object
            .properties
            .keys()
            .cloned()
            .partition(|k| array_index(k).is_some());
        indices.sort_by_key(|k| array_index(k));
        indices.extend(named);
        Ok(indices)
    }

    fn accessor_pair(&self, accessor: AccessorId) -> VmResult<AccessorPair> {
        self.heap
            .accessor(accessor)
            .cloned()
            .ok_or_else(|| FatalError::DanglingHandle("accessor").into())
    }

    fn grow_array_length(&mut self, array: ObjectId, index: u32) -> VmResult<()> {
        let object = self
            .heap
            .object_mut(array)
            .ok_or(FatalError::DanglingHandle("object"))?;
        let length = match object.properties.get("length") {
            Some(Value::Number(n)) => *n,
            _ => 0.0,
        };
        let needed = f64::from(index) + 1.0;
        if needed > length {
            object.properties.insert("length", Value::Number(needed));
        }
        Ok(())
    }
}

/// Canonical array index: the decimal form of an integer below 2^32 - 1.
pub(crate) fn array_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    (index != u32::MAX && index.to_string() == key).then_some(index)
}

fn string_own_property(s: &JsString, key: &PropertyKey) -> Option<Value> {
    let PropertyKey::String(name) = key else {
        return None;
    };
    if name.as_str() == "length" {
        return Some(Value::Number(s.utf16_len() as f64));
    }
    let index = array_index(name)? as usize;
    let unit = s.encode_utf16().nth(index)?;
    Some(Value::String(JsString::from(String::from_utf16_lossy(&[unit]))))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "null",
        other => other.type_of(),
    }
}
