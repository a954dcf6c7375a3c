//! The garbage-collected heap.
//!
//! [`Heap`] owns one [`Space`] per entity type and implements the generic
//! mark-sweep core: mark everything reachable from the caller-supplied
//! roots through [`Trace`], then sweep every space.

use crate::dict::PropertyKey;
use crate::gc::{GcStats, HeapRef, Trace, Tracer};
use crate::object::{AccessorPair, JsObject};
use crate::scope::Scope;
use crate::space::Space;
use crate::function::JsFunction;
use core_types::{AccessorId, FunctionId, ObjectId, ScopeId, Value};
use log::debug;

/// Allocations between automatic collections unless configured otherwise.
pub const DEFAULT_GC_THRESHOLD: usize = 4096;

/// Heap of objects, functions, scopes and accessor boxes.
///
/// # Examples
///
/// ```
/// use memory_manager::{Heap, HeapRef, JsObject, Scope};
/// use core_types::Value;
///
/// let mut heap = Heap::new();
/// let scope = heap.alloc_scope(Scope::new(None));
/// let obj = heap.alloc_object(JsObject::new(None));
/// heap.scope_declare(scope, "a", Value::Object(obj));
///
/// heap.collect([HeapRef::Scope(scope)]);
/// assert!(heap.object(obj).is_some());
///
/// heap.scope_set(scope, "a", Value::Null);
/// heap.collect([HeapRef::Scope(scope)]);
/// assert!(heap.object(obj).is_none());
/// ```
#[derive(Debug)]
pub struct Heap {
    objects: Space<ObjectId, JsObject>,
    functions: Space<FunctionId, JsFunction>,
    scopes: Space<ScopeId, Scope>,
    accessors: Space<AccessorId, AccessorPair>,
    allocated_since_collect: usize,
    threshold: usize,
    stats: GcStats,
}

impl Heap {
    /// Creates an empty heap with the default collection threshold.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_GC_THRESHOLD)
    }

    /// Creates an empty heap that asks for a collection every `threshold`
    /// allocations. Zero disables the automatic trigger.
    pub fn with_threshold(threshold: usize) -> Self {
        Heap {
            objects: Space::new(),
            functions: Space::new(),
            scopes: Space::new(),
            accessors: Space::new(),
            allocated_since_collect: 0,
            threshold,
            stats: GcStats::default(),
        }
    }

    /// Allocates an object.
    pub fn alloc_object(&mut self, object: JsObject) -> ObjectId {
        self.allocated_since_collect += 1;
        self.objects.allocate(object)
    }

    /// Allocates a function.
    pub fn alloc_function(&mut self, function: JsFunction) -> FunctionId {
        self.allocated_since_collect += 1;
        self.functions.allocate(function)
    }

    /// Allocates a scope.
    pub fn alloc_scope(&mut self, scope: Scope) -> ScopeId {
        self.allocated_since_collect += 1;
        self.scopes.allocate(scope)
    }

    /// Allocates an accessor box.
    pub fn alloc_accessor(&mut self, accessor: AccessorPair) -> AccessorId {
        self.allocated_since_collect += 1;
        self.accessors.allocate(accessor)
    }

    /// Resolves an object handle.
    pub fn object(&self, id: ObjectId) -> Option<&JsObject> {
        self.objects.get(id)
    }

    /// Resolves an object handle mutably.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut JsObject> {
        self.objects.get_mut(id)
    }

    /// Resolves a function handle.
    pub fn function(&self, id: FunctionId) -> Option<&JsFunction> {
        self.functions.get(id)
    }

    /// Resolves a function handle mutably.
    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut JsFunction> {
        self.functions.get_mut(id)
    }

    /// Resolves a scope handle.
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Resolves a scope handle mutably.
    pub fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id)
    }

    /// Resolves an accessor handle.
    pub fn accessor(&self, id: AccessorId) -> Option<&AccessorPair> {
        self.accessors.get(id)
    }

    /// True if the referenced entity has not been freed.
    pub fn is_live(&self, target: HeapRef) -> bool {
        match target {
            HeapRef::Object(id) => self.objects.contains(id),
            HeapRef::Function(id) => self.functions.contains(id),
            HeapRef::Scope(id) => self.scopes.contains(id),
            HeapRef::Accessor(id) => self.accessors.contains(id),
        }
    }

    /// Walks the prototype chain from `start` looking for `key`.
    ///
    /// Returns the object owning the property and the stored value, which
    /// may be an accessor box. The walk ends at an object whose prototype
    /// is absent or is the object itself.
    pub fn find_property(&self, start: ObjectId, key: &PropertyKey) -> Option<(ObjectId, Value)> {
        let mut current = start;
        loop {
            let object = self.object(current)?;
            if let Some(value) = object.properties.get_key(key) {
                return Some((current, value.clone()));
            }
            match object.prototype {
                Some(proto) if proto != current => current = proto,
                _ => return None,
            }
        }
    }

    /// True once the allocation threshold has been reached.
    pub fn should_collect(&self) -> bool {
        self.threshold > 0 && self.allocated_since_collect >= self.threshold
    }

    /// Changes the automatic collection threshold (zero disables it).
    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    /// Current collection threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Statistics as of the last collection, with a current live count.
    pub fn stats(&self) -> GcStats {
        GcStats {
            live: self.live_count(),
            ..self.stats
        }
    }

    fn live_count(&self) -> usize {
        self.objects.stats().live
            + self.functions.stats().live
            + self.scopes.stats().live
            + self.accessors.stats().live
    }

    /// Runs a full mark-sweep collection.
    ///
    /// Everything not reachable from `roots` is freed and every handle to
    /// it goes stale. The roots must dominate all live interpreter state.
    pub fn collect(&mut self, roots: impl IntoIterator<Item = HeapRef>) -> GcStats {
        let mut tracer = Tracer::new();
        for root in roots {
            tracer.edge(root);
        }

        let mut marked = 0;
        while let Some(target) = tracer.pop() {
            let newly_marked = match target {
                HeapRef::Object(id) => self.objects.mark(id),
                HeapRef::Function(id) => self.functions.mark(id),
                HeapRef::Scope(id) => self.scopes.mark(id),
                HeapRef::Accessor(id) => self.accessors.mark(id),
            };
            if !newly_marked {
                continue;
            }
            marked += 1;
            match target {
                HeapRef::Object(id) => trace_entity(self.objects.get(id), &mut tracer),
                HeapRef::Function(id) => trace_entity(self.functions.get(id), &mut tracer),
                HeapRef::Scope(id) => trace_entity(self.scopes.get(id), &mut tracer),
                HeapRef::Accessor(id) => trace_entity(self.accessors.get(id), &mut tracer),
            }
        }

        let freed = self.objects.sweep()
            + self.functions.sweep()
            + self.scopes.sweep()
            + self.accessors.sweep();

        self.allocated_since_collect = 0;
        self.stats.collections += 1;
        self.stats.last_marked = marked;
        self.stats.last_freed = freed;
        self.stats.total_freed += freed;
        let stats = self.stats();
        debug!(
            "gc #{}: marked {}, freed {}, live {}",
            stats.collections, marked, freed, stats.live
        );
        stats
    }
}

fn trace_entity<T: Trace>(entity: Option<&T>, tracer: &mut Tracer) {
    if let Some(entity) = entity {
        entity.trace(tracer);
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
