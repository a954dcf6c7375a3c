//! Module loading and execution
//!
//! Modules are registered once by hash, run at most once, and expose their
//! exports object to other modules through [`Vm::resolve_module`].

use std::rc::Rc;

use bytecode_system::{Bundle, Module};
use core_types::{JsError, ObjectId, ScopeId, SourcePosition, StackFrame, Value};
use log::debug;
use memory_manager::{ModuleId, PropertyKey, Scope};

use crate::call_frame::CallFrame;
use crate::error::{FatalError, VmResult};
use crate::vm::Vm;

/// A loaded module.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    /// Code
    pub module: Rc<Module>,
    /// Exports object, written by `EXPORT`
    pub exports: ObjectId,
    /// Top-level scope, a child of the global scope
    pub scope: ScopeId,
    /// Set once the top-level code has started
    pub initialized: bool,
}

impl Vm {
    /// Register a module. Loading a hash twice returns the first id.
    pub fn load_module(&mut self, module: Module) -> ModuleId {
        let hash = module.hash();
        let pos = match self.module_index.binary_search_by_key(&hash, |(h, _)| *h) {
            Ok(pos) => return self.module_index[pos].1,
            Err(pos) => pos,
        };
        let id = ModuleId(self.modules.len() as u32);
        let exports = self.new_object();
        let scope = self.heap.alloc_scope(Scope::new(Some(self.global_scope)));
        debug!(
            "loaded module {:016x} as #{} ({} instructions)",
            hash,
            id.0,
            module.len()
        );
        self.modules.push(ModuleRecord {
            module: Rc::new(module),
            exports,
            scope,
            initialized: false,
        });
        self.module_index.insert(pos, (hash, id));
        id
    }

    /// Register every module of a bundle, returning the entry point.
    pub fn load_bundle(&mut self, bundle: Bundle) -> VmResult<ModuleId> {
        let entry = bundle.entry_point();
        for module in bundle.into_modules() {
            self.load_module(module);
        }
        self.find_module(entry)
            .ok_or_else(|| FatalError::UnknownModule(entry).into())
    }

    /// Id of a loaded module.
    pub fn find_module(&self, hash: u64) -> Option<ModuleId> {
        self.module_index
            .binary_search_by_key(&hash, |(h, _)| *h)
            .ok()
            .map(|pos| self.module_index[pos].1)
    }

    /// Record of a loaded module.
    pub fn module_record(&self, id: ModuleId) -> Option<&ModuleRecord> {
        self.modules.get(id.0 as usize)
    }

    /// Exports object of a loaded module.
    pub fn exports_of(&self, id: ModuleId) -> Option<ObjectId> {
        self.module_record(id).map(|record| record.exports)
    }

    /// Exports object of the module whose code is running.
    pub fn exports_of_running(&self) -> Option<ObjectId> {
        self.frame.module.and_then(|id| self.exports_of(id))
    }

    /// Read one export of a loaded module.
    pub fn exported(&mut self, id: ModuleId, name: &str) -> VmResult<Value> {
        let exports = self
            .exports_of(id)
            .ok_or_else(|| FatalError::InvalidInstruction(format!("module #{} is not loaded", id.0)))?;
        self.get_property(&Value::Object(exports), &PropertyKey::from(name))
    }

    /// Run a module's top-level code, at most once, returning its exports.
    ///
    /// A module that is already running or has run returns its exports
    /// as they currently are, which is what makes import cycles terminate.
    pub fn run_module(&mut self, id: ModuleId) -> VmResult<ObjectId> {
        let (module, exports, scope) = match self.modules.get_mut(id.0 as usize) {
            Some(record) if record.initialized => return Ok(record.exports),
            Some(record) => {
                record.initialized = true;
                (Rc::clone(&record.module), record.exports, record.scope)
            }
            None => return Err(FatalError::InvalidInstruction(format!("module #{} is not loaded", id.0)).into()),
        };
        if self.call_depth() >= self.config.max_call_depth {
            return Err(JsError::range_error("Maximum call stack size exceeded").into());
        }
        debug!("running module {:016x}", module.hash());

        let stack_start = self.stack.len();
        self.enter(CallFrame::module(id, module.len(), scope, stack_start));
        let result = self.execute();
        let finished = self.leave();
        self.stack.truncate(stack_start);

        match result {
            Ok(_) => Ok(exports),
            Err(error) => Err(error.through(StackFrame {
                function_name: None,
                position: SourcePosition::new(module.hash(), finished.current_instruction()),
            })),
        }
    }

    /// Load a bundle and run its entry module.
    pub fn run_entry(&mut self, bundle: Bundle) -> VmResult<ObjectId> {
        let entry = self.load_bundle(bundle)?;
        self.run_module(entry)
    }

    /// Exports for `hash`: a loaded module (run on first use) or, failing
    /// that, a registered native module.
    pub fn resolve_module(&mut self, hash: u64) -> VmResult<Option<ObjectId>> {
        if let Some(id) = self.find_module(hash) {
            return self.run_module(id).map(Some);
        }
        Ok(self.native_module(hash))
    }
}
