//! Tracing interface and collection statistics.
//!
//! Each heap entity implements [`Trace`] once, reporting the handles it
//! holds to a [`Tracer`]. The collector core in [`crate::Heap`] drains the
//! tracer's worklist, setting the marked bit of each slot the first time it
//! is reached, so cycles (the self-referencing root prototype, mutually
//! recursive closures) are visited once.

use core_types::{AccessorId, FunctionId, ObjectId, ScopeId, Value};

/// A handle to any kind of heap entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapRef {
    /// An object
    Object(ObjectId),
    /// A function
    Function(FunctionId),
    /// A scope
    Scope(ScopeId),
    /// An accessor box
    Accessor(AccessorId),
}

impl HeapRef {
    /// The heap entity a value points at, if any.
    pub fn from_value(value: &Value) -> Option<HeapRef> {
        match value {
            Value::Object(id) | Value::Symbol(id) => Some(HeapRef::Object(*id)),
            Value::Function(id) => Some(HeapRef::Function(*id)),
            Value::Accessor(id) => Some(HeapRef::Accessor(*id)),
            Value::Undefined
            | Value::Null
            | Value::Boolean(_)
            | Value::Number(_)
            | Value::String(_) => None,
        }
    }
}

impl From<ObjectId> for HeapRef {
    fn from(id: ObjectId) -> Self {
        HeapRef::Object(id)
    }
}

impl From<FunctionId> for HeapRef {
    fn from(id: FunctionId) -> Self {
        HeapRef::Function(id)
    }
}

impl From<ScopeId> for HeapRef {
    fn from(id: ScopeId) -> Self {
        HeapRef::Scope(id)
    }
}

impl From<AccessorId> for HeapRef {
    fn from(id: AccessorId) -> Self {
        HeapRef::Accessor(id)
    }
}

/// Worklist of entities still to be marked.
#[derive(Debug, Default)]
pub struct Tracer {
    worklist: Vec<HeapRef>,
}

impl Tracer {
    /// Creates an empty tracer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an entity.
    pub fn edge(&mut self, target: impl Into<HeapRef>) {
        self.worklist.push(target.into());
    }

    /// Queues the entity a value points at. Primitives are ignored.
    pub fn value(&mut self, value: &Value) {
        if let Some(target) = HeapRef::from_value(value) {
            self.worklist.push(target);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<HeapRef> {
        self.worklist.pop()
    }
}

/// Reports outgoing heap references.
pub trait Trace {
    /// Queues every handle this entity holds.
    fn trace(&self, tracer: &mut Tracer);
}

/// Collector statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Completed collections
    pub collections: usize,
    /// Entities marked by the last collection
    pub last_marked: usize,
    /// Entities freed by the last collection
    pub last_freed: usize,
    /// Entities freed over the heap's lifetime
    pub total_freed: usize,
    /// Entities currently live
    pub live: usize,
}
