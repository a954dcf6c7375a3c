//! JavaScript value representation.
//!
//! [`Value`] is a closed tagged union. Primitive payloads are stored inline;
//! heap entities are referenced through generation-checked handles owned
//! by the collector, so copying a `Value` never copies an object.

use crate::handle::{AccessorId, FunctionId, ObjectId};
use crate::number;
use crate::JsString;

/// Represents any JavaScript value.
///
/// The tag fully determines which payload is valid. Symbols are heap
/// objects (they carry a `description` property) but keep their own tag so
/// `typeof` and the coercions can tell them apart. `Accessor` only ever
/// appears as a stored property value, never on the operand stack.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::Number(42.0);
///
/// assert!(!undefined.to_boolean());
/// assert!(number.to_boolean());
/// assert_eq!(number.type_of(), "number");
/// assert!(Value::from("1").strict_equals(&Value::from("1")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JavaScript undefined value
    Undefined,
    /// JavaScript null value
    Null,
    /// JavaScript boolean (true or false)
    Boolean(bool),
    /// IEEE 754 double-precision number
    Number(f64),
    /// Immutable string
    String(JsString),
    /// Heap object (plain object, array or boxed primitive)
    Object(ObjectId),
    /// Native or interpreted function
    Function(FunctionId),
    /// Symbol, addressed by the identity of its backing object
    Symbol(ObjectId),
    /// Getter/setter pair stored in place of a data value
    Accessor(AccessorId),
}

impl Value {
    /// ToBoolean.
    ///
    /// `undefined`, `null`, `false`, `0`, `-0`, `NaN` and `""` are falsy;
    /// every object, function and symbol is truthy.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(!Value::Number(f64::NAN).to_boolean());
    /// assert!(!Value::from("").to_boolean());
    /// assert!(Value::from("0").to_boolean());
    /// ```
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Function(_) | Value::Symbol(_) | Value::Accessor(_) => true,
        }
    }

    /// The result of the `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) | Value::Accessor(_) => "object",
            Value::Function(_) => "function",
            Value::Symbol(_) => "symbol",
        }
    }

    /// Strict equality (`===`).
    ///
    /// Tags must match. Numbers compare numerically (NaN is unequal to
    /// itself, `0 === -0`), strings by contents, heap values by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => number::equal(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Accessor(a), Value::Accessor(b)) => a == b,
            _ => false,
        }
    }

    /// True for `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// True for values that live in the heap and carry properties.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Function(_) | Value::Symbol(_))
    }

    /// Returns the number payload, if this is a Number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a String.
    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object handle, if this is a plain Object.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the function handle, if this is a Function.
    pub fn as_function(&self) -> Option<FunctionId> {
        match self {
            Value::Function(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<JsString> for Value {
    fn from(s: JsString) -> Self {
        Value::String(s)
    }
}
