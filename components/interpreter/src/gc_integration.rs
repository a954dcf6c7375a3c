//! Root enumeration and collection scheduling
//!
//! The heap knows how to trace; the VM knows what is alive. Everything
//! the interpreter can still reach is listed by [`Vm::roots`].

use core_types::Value;
use log::debug;
use memory_manager::{GcStats, HeapRef};

use crate::call_frame::CallFrame;
use crate::vm::Vm;

fn frame_roots(frame: &CallFrame, roots: &mut Vec<HeapRef>) {
    roots.push(frame.scope.into());
    roots.extend(HeapRef::from_value(&frame.this));
    if let Some(function) = frame.function {
        roots.push(function.into());
    }
}

impl Vm {
    /// Every handle the interpreter can reach without going through the
    /// heap: scopes and receivers of all frames, the operand stack, values
    /// rooted by running natives, module exports and scopes, native modules
    /// and the intrinsics.
    pub fn roots(&self) -> Vec<HeapRef> {
        let mut roots = vec![HeapRef::from(self.global_scope)];
        frame_roots(&self.frame, &mut roots);
        for frame in &self.frames {
            frame_roots(frame, &mut roots);
        }
        roots.extend(self.stack.iter().filter_map(HeapRef::from_value));
        roots.extend(self.rooted.iter().filter_map(HeapRef::from_value));
        for record in &self.modules {
            roots.push(record.exports.into());
            roots.push(record.scope.into());
        }
        roots.extend(self.native_modules.iter().map(|(_, exports)| HeapRef::from(*exports)));
        roots.extend(self.intrinsics.all().iter().map(|id| HeapRef::from(*id)));
        roots
    }

    /// Collect now.
    ///
    /// A native calling this must hold its heap values in its arguments,
    /// its `this` or [`with_rooted`](Self::with_rooted); anything else it
    /// keeps in Rust locals may be freed.
    pub fn collect_garbage(&mut self) -> GcStats {
        self.gc_requested = false;
        let roots = self.roots();
        if self.native_depth > 0 {
            debug!("gc under {} native frame(s), {} rooted value(s)", self.native_depth, self.rooted.len());
        }
        self.heap.collect(roots)
    }

    /// Runs `f` with `values` kept alive across any collection it triggers.
    ///
    /// Needed wherever Rust code holds a value it took off the operand
    /// stack and then calls back into script.
    pub fn with_rooted<R>(&mut self, values: &[Value], f: impl FnOnce(&mut Vm) -> R) -> R {
        let mark = self.rooted.len();
        self.rooted.extend(values.iter().cloned());
        let result = f(self);
        self.rooted.truncate(mark);
        result
    }

    /// Ask for a collection at the next safe point.
    pub fn request_collection(&mut self) {
        self.gc_requested = true;
    }

    /// Collector statistics.
    pub fn gc_stats(&self) -> GcStats {
        self.heap.stats()
    }

    /// Safe point, checked before each instruction.
    pub(crate) fn maybe_collect(&mut self) {
        if self.gc_requested || self.heap.should_collect() {
            self.collect_garbage();
        }
    }
}
