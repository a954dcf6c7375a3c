//! Function entities.

use crate::gc::{Trace, Tracer};
use core_types::{JsString, ObjectId, ScopeId};

/// Index of a native callback in the VM's native table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId(pub u32);

/// Index of a loaded module in the VM's module table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub u32);

/// Native or interpreted body of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Host callback
    Native(NativeId),
    /// Bytecode range `[start, end)` of `module`, closed over `scope`
    Interpreted {
        /// Scope active at the declaration site, shared by reference
        scope: ScopeId,
        /// Owning module
        module: ModuleId,
        /// First instruction of the body
        start: usize,
        /// One past the last instruction of the body
        end: usize,
    },
}

/// A function: a backing object for its properties plus its body.
#[derive(Debug, Clone)]
pub struct JsFunction {
    /// Object carrying the function's own properties (`prototype`, ...)
    pub base: ObjectId,
    /// Declared name, used in stack traces
    pub name: Option<JsString>,
    /// Body
    pub kind: FunctionKind,
}

impl JsFunction {
    /// True for host callbacks.
    pub fn is_native(&self) -> bool {
        matches!(self.kind, FunctionKind::Native(_))
    }
}

impl Trace for JsFunction {
    fn trace(&self, tracer: &mut Tracer) {
        tracer.edge(self.base);
        if let FunctionKind::Interpreted { scope, .. } = self.kind {
            tracer.edge(scope);
        }
    }
}
