//! Memory Manager - heap entities and mark-sweep garbage collection
//!
//! This component provides:
//! - [`Dict`]: chained hash table shared by objects and scopes
//! - [`JsObject`], [`JsFunction`], [`Scope`], [`AccessorPair`]: heap entities
//! - [`Space`]: slot-block registry with generation-checked handles
//! - [`Trace`] and [`Heap::collect`]: a generic mark-sweep collector core
//! - Scope-chain operations (`scope_declare`, `scope_set`, `scope_get`, ...)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod dict;
pub mod function;
pub mod gc;
pub mod heap;
pub mod object;
pub mod scope;
pub mod space;

// Re-export main types
pub use dict::{Dict, PropertyKey};
pub use function::{FunctionKind, JsFunction, ModuleId, NativeId};
pub use gc::{GcStats, HeapRef, Trace, Tracer};
pub use heap::{Heap, DEFAULT_GC_THRESHOLD};
pub use object::{AccessorPair, JsObject, ObjectKind};
pub use scope::Scope;
pub use space::{Space, SpaceStats, BLOCK_SLOTS};
