//! Heap objects and accessor boxes.

use crate::dict::{Dict, PropertyKey, OBJECT_BUCKETS};
use crate::gc::{Trace, Tracer};
use core_types::{FunctionId, ObjectId, Value};

/// What kind of object this is, beyond its properties.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array; keeps a `length` data property
    Array,
    /// Symbol; identity is the object itself, `description` is a property
    Symbol,
    /// Wrapper created by ToObject around a primitive
    Boxed(Value),
}

/// A JavaScript object: a prototype link and a property table.
///
/// Following `prototype` links always reaches the self-referencing root
/// prototype in a finite number of steps.
#[derive(Debug, Clone)]
pub struct JsObject {
    /// Prototype, `None` only while a root is being wired up
    pub prototype: Option<ObjectId>,
    /// Own properties
    pub properties: Dict,
    /// Object kind
    pub kind: ObjectKind,
}

impl JsObject {
    /// Creates an empty ordinary object with the given prototype.
    pub fn new(prototype: Option<ObjectId>) -> Self {
        Self::with_kind(prototype, ObjectKind::Ordinary)
    }

    /// Creates an empty object of a specific kind.
    pub fn with_kind(prototype: Option<ObjectId>, kind: ObjectKind) -> Self {
        JsObject {
            prototype,
            properties: Dict::new(OBJECT_BUCKETS),
            kind,
        }
    }

    /// True for array objects.
    pub fn is_array(&self) -> bool {
        self.kind == ObjectKind::Array
    }
}

impl Trace for JsObject {
    fn trace(&self, tracer: &mut Tracer) {
        if let Some(proto) = self.prototype {
            tracer.edge(proto);
        }
        for (key, value) in self.properties.entries() {
            if let PropertyKey::Symbol(sym) = key {
                tracer.edge(*sym);
            }
            tracer.value(value);
        }
        if let ObjectKind::Boxed(primitive) = &self.kind {
            tracer.value(primitive);
        }
    }
}

/// Getter/setter pair stored as a property value in place of data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessorPair {
    /// Invoked on reads
    pub getter: Option<FunctionId>,
    /// Invoked on writes
    pub setter: Option<FunctionId>,
}

impl Trace for AccessorPair {
    fn trace(&self, tracer: &mut Tracer) {
        if let Some(getter) = self.getter {
            tracer.edge(getter);
        }
        if let Some(setter) = self.setter {
            tracer.edge(setter);
        }
    }
}
