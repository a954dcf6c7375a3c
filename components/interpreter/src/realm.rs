//! Intrinsic objects
//!
//! Every [`Vm`] owns its own set of canonical prototypes and well-known
//! symbols, created when the VM is constructed.

use crate::error::{FatalError, VmResult};
use crate::vm::Vm;
use core_types::{JsError, JsString, ObjectId, Value};
use memory_manager::{Heap, JsObject, ObjectKind, PropertyKey};

/// Canonical prototypes and well-known symbols of one VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intrinsics {
    /// Root of every prototype chain; its own prototype is itself
    pub object_prototype: ObjectId,
    /// Prototype of arrays
    pub array_prototype: ObjectId,
    /// Prototype of function backing objects
    pub function_prototype: ObjectId,
    /// Prototype of symbols
    pub symbol_prototype: ObjectId,
    /// Prototype of booleans
    pub boolean_prototype: ObjectId,
    /// Prototype of numbers
    pub number_prototype: ObjectId,
    /// Prototype of strings
    pub string_prototype: ObjectId,
    /// `Symbol.toPrimitive`
    pub symbol_to_primitive: ObjectId,
    /// `Symbol.toStringTag`
    pub symbol_to_string_tag: ObjectId,
}

impl Intrinsics {
    pub(crate) fn create(heap: &mut Heap) -> Self {
        let object_prototype = heap.alloc_object(JsObject::new(None));
        if let Some(root) = heap.object_mut(object_prototype) {
            root.prototype = Some(object_prototype);
        }
        let mut derived = || heap.alloc_object(JsObject::new(Some(object_prototype)));
        let array_prototype = derived();
        let function_prototype = derived();
        let symbol_prototype = derived();
        let boolean_prototype = derived();
        let number_prototype = derived();
        let string_prototype = derived();

        let symbol_to_primitive = create_symbol(heap, symbol_prototype, "Symbol.toPrimitive");
        let symbol_to_string_tag = create_symbol(heap, symbol_prototype, "Symbol.toStringTag");

        Intrinsics {
            object_prototype,
            array_prototype,
            function_prototype,
            symbol_prototype,
            boolean_prototype,
            number_prototype,
            string_prototype,
            symbol_to_primitive,
            symbol_to_string_tag,
        }
    }

    /// Every intrinsic, for rooting.
    pub fn all(&self) -> [ObjectId; 9] {
        [
            self.object_prototype,
            self.array_prototype,
            self.function_prototype,
            self.symbol_prototype,
            self.boolean_prototype,
            self.number_prototype,
            self.string_prototype,
            self.symbol_to_primitive,
            self.symbol_to_string_tag,
        ]
    }
}

pub(crate) fn create_symbol(heap: &mut Heap, prototype: ObjectId, description: &str) -> ObjectId {
    let mut symbol = JsObject::with_kind(Some(prototype), ObjectKind::Symbol);
    symbol
        .properties
        .insert("description", Value::String(JsString::from(description)));
    heap.alloc_object(symbol)
}

impl Vm {
    /// Methods the coercion algorithms depend on.
    pub(crate) fn install_intrinsic_methods(&mut self) -> VmResult<()> {
        let Intrinsics {
            object_prototype,
            boolean_prototype,
            number_prototype,
            string_prototype,
            symbol_prototype,
            ..
        } = self.intrinsics;

        self.define_native_method(object_prototype, "toString", object_to_string)?;
        self.define_native_method(object_prototype, "valueOf", object_value_of)?;
        for prototype in [boolean_prototype, number_prototype, string_prototype] {
            self.define_native_method(prototype, "valueOf", primitive_value_of)?;
            self.define_native_method(prototype, "toString", primitive_to_string)?;
        }
        self.define_native_method(symbol_prototype, "toString", symbol_to_string)?;
        Ok(())
    }

    /// Creates a new unique symbol.
    pub fn new_symbol(&mut self, description: &str) -> Value {
        let prototype = self.intrinsics.symbol_prototype;
        Value::Symbol(create_symbol(&mut self.heap, prototype, description))
    }

    /// The description a symbol was created with.
    pub fn symbol_description(&self, symbol: ObjectId) -> Option<JsString> {
        match self.heap.object(symbol)?.properties.get("description")? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// `"Symbol(description)"`.
    pub fn symbol_display(&self, symbol: ObjectId) -> String {
        let description = self.symbol_description(symbol);
        format!("Symbol({})", description.as_deref().unwrap_or(""))
    }

    /// Built-in tag used by `Object.prototype.toString`.
    pub(crate) fn builtin_tag(&self, value: &Value) -> &'static str {
        match value {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Function(_) => "Function",
            Value::Accessor(_) => "Object",
            Value::Object(id) => match self.heap.object(*id).map(|o| &o.kind) {
                Some(ObjectKind::Array) => "Array",
                Some(ObjectKind::Boxed(inner)) => self.builtin_tag(inner),
                _ => "Object",
            },
        }
    }
}

fn object_to_string(vm: &mut Vm, this: Value, _args: &[Value]) -> VmResult<Value> {
    let mut tag = vm.builtin_tag(&this).to_string();
    if !this.is_nullish() {
        let key = PropertyKey::Symbol(vm.intrinsics.symbol_to_string_tag);
        if let Value::String(custom) = vm.get_property(&this, &key)? {
            tag = custom.to_string();
        }
    }
    Ok(Value::String(JsString::from(format!("[object {}]", tag))))
}

fn object_value_of(vm: &mut Vm, this: Value, _args: &[Value]) -> VmResult<Value> {
    vm.to_object(&this)
}

fn primitive_value_of(vm: &mut Vm, this: Value, _args: &[Value]) -> VmResult<Value> {
    match &this {
        Value::Boolean(_) | Value::Number(_) | Value::String(_) => Ok(this),
        Value::Object(id) => match vm.heap.object(*id).map(|o| &o.kind) {
            Some(ObjectKind::Boxed(inner)) => Ok(inner.clone()),
            Some(_) => Err(JsError::type_error("valueOf called on incompatible receiver").into()),
            None => Err(FatalError::DanglingHandle("object").into()),
        },
        _ => Err(JsError::type_error("valueOf called on incompatible receiver").into()),
    }
}

fn primitive_to_string(vm: &mut Vm, this: Value, args: &[Value]) -> VmResult<Value> {
    let primitive = primitive_value_of(vm, this, args)?;
    Ok(Value::String(vm.to_js_string(&primitive)?))
}

fn symbol_to_string(vm: &mut Vm, this: Value, _args: &[Value]) -> VmResult<Value> {
    match this {
        Value::Symbol(id) => Ok(Value::String(JsString::from(vm.symbol_display(id)))),
        _ => Err(JsError::type_error("Symbol.prototype.toString requires a symbol").into()),
    }
}
