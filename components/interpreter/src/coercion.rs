//! Type coercions: ToPrimitive, ToNumber, ToString, ToPropertyKey, ToObject

use core_types::{number, JsError, JsString, Value};
use memory_manager::{JsObject, ObjectKind, PropertyKey};

use crate::error::VmResult;
use crate::vm::Vm;

/// Preferred type passed to ToPrimitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// No preference (`+`, `==`)
    Default,
    /// Numeric context
    Number,
    /// String context
    String,
}

impl PreferredType {
    /// The string handed to a `Symbol.toPrimitive` method.
    pub fn name(self) -> &'static str {
        match self {
            PreferredType::Default => "default",
            PreferredType::Number => "number",
            PreferredType::String => "string",
        }
    }
}

fn is_object(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Function(_))
}

impl Vm {
    /// ToPrimitive.
    ///
    /// Consults `Symbol.toPrimitive` first, then falls back to calling
    /// `valueOf`/`toString` in hint order.
    pub fn to_primitive(&mut self, value: &Value, hint: PreferredType) -> VmResult<Value> {
        if !is_object(value) {
            return Ok(value.clone());
        }
        let key = PropertyKey::Symbol(self.intrinsics.symbol_to_primitive);
        let exotic = self.get_property(value, &key)?;
        match exotic {
            Value::Undefined | Value::Null => self.ordinary_to_primitive(value, hint),
            Value::Function(_) => {
                let result = self.call_function(&exotic, value.clone(), &[Value::from(hint.name())])?;
                if is_object(&result) {
                    Err(JsError::type_error("Cannot convert object to primitive value").into())
                } else {
                    Ok(result)
                }
            }
            _ => Err(JsError::type_error("Symbol.toPrimitive is not a function").into()),
        }
    }

    fn ordinary_to_primitive(&mut self, value: &Value, hint: PreferredType) -> VmResult<Value> {
        let order = match hint {
            PreferredType::String => ["toString", "valueOf"],
            PreferredType::Default | PreferredType::Number => ["valueOf", "toString"],
        };
        for name in order {
            let method = self.get_property(value, &PropertyKey::from(name))?;
            if let Value::Function(_) = method {
                let result = self.call_function(&method, value.clone(), &[])?;
                if !is_object(&result) {
                    return Ok(result);
                }
            }
        }
        Err(JsError::type_error("Cannot convert object to primitive value").into())
    }

    /// ToNumber.
    pub fn to_number(&mut self, value: &Value) -> VmResult<f64> {
        match value {
            Value::Undefined => Ok(f64::NAN),
            Value::Null => Ok(0.0),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Ok(*n),
            Value::String(s) => Ok(number::parse_js_number(s)),
            Value::Symbol(_) => Err(JsError::type_error("Cannot convert a Symbol value to a number").into()),
            Value::Accessor(_) => Err(JsError::type_error("Cannot convert an accessor to a number").into()),
            Value::Object(_) | Value::Function(_) => {
                let primitive = self.to_primitive(value, PreferredType::Number)?;
                self.to_number(&primitive)
            }
        }
    }

    /// ToString.
    pub fn to_js_string(&mut self, value: &Value) -> VmResult<JsString> {
        match value {
            Value::Undefined => Ok(JsString::from("undefined")),
            Value::Null => Ok(JsString::from("null")),
            Value::Boolean(b) => Ok(JsString::from(if *b { "true" } else { "false" })),
            Value::Number(n) => Ok(JsString::from(number::to_js_string(*n))),
            Value::String(s) => Ok(s.clone()),
            Value::Symbol(_) => Err(JsError::type_error("Cannot convert a Symbol value to a string").into()),
            Value::Accessor(_) => Err(JsError::type_error("Cannot convert an accessor to a string").into()),
            Value::Object(_) | Value::Function(_) => {
                let primitive = self.to_primitive(value, PreferredType::String)?;
                self.to_js_string(&primitive)
            }
        }
    }

    /// ToPropertyKey: symbols stay symbols, everything else is stringified.
    pub fn to_property_key(&mut self, value: &Value) -> VmResult<PropertyKey> {
        let primitive = self.to_primitive(value, PreferredType::String)?;
        match primitive {
            Value::Symbol(id) => Ok(PropertyKey::Symbol(id)),
            other => Ok(PropertyKey::String(self.to_js_string(&other)?)),
        }
    }

    /// ToObject: objects pass through, primitives are boxed.
    pub fn to_object(&mut self, value: &Value) -> VmResult<Value> {
        let prototype = match value {
            Value::Object(_) | Value::Function(_) => return Ok(value.clone()),
            Value::Undefined => return Err(JsError::type_error("Cannot convert undefined to object").into()),
            Value::Null => return Err(JsError::type_error("Cannot convert null to object").into()),
            Value::Accessor(_) => return Err(JsError::type_error("Cannot convert an accessor to object").into()),
            Value::Boolean(_) => self.intrinsics.boolean_prototype,
            Value::Number(_) => self.intrinsics.number_prototype,
            Value::String(_) => self.intrinsics.string_prototype,
            Value::Symbol(_) => self.intrinsics.symbol_prototype,
        };
        let mut boxed = JsObject::with_kind(Some(prototype), ObjectKind::Boxed(value.clone()));
        if let Value::String(s) = value {
            boxed.properties.insert("length", Value::Number(s.utf16_len() as f64));
        }
        Ok(Value::Object(self.heap.alloc_object(boxed)))
    }

    /// ToInt32.
    pub fn to_int32(&mut self, value: &Value) -> VmResult<i32> {
        Ok(number::to_int32(self.to_number(value)?))
    }

    /// ToUint32.
    pub fn to_uint32(&mut self, value: &Value) -> VmResult<u32> {
        Ok(number::to_uint32(self.to_number(value)?))
    }
}
