//! Native function ABI and registries

use std::fmt;

use core_types::{FunctionId, JsString, ObjectId, Value};
use log::debug;
use memory_manager::{FunctionKind, NativeId, PropertyKey};

use crate::error::VmResult;
use crate::vm::Vm;

/// Signature of a host callback: `(vm, this, args) -> result`.
///
/// Arguments arrive in natural order. Returning an `Err` with
/// [`VmError::Exception`](crate::VmError::Exception) throws into the
/// calling script.
pub type NativeFn = fn(&mut Vm, Value, &[Value]) -> VmResult<Value>;

#[derive(Clone, Copy)]
pub(crate) struct NativeEntry {
    pub(crate) name: &'static str,
    pub(crate) callback: NativeFn,
}

impl fmt::Debug for NativeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeEntry").field("name", &self.name).finish()
    }
}

impl Vm {
    /// Register a host callback and wrap it in a function value.
    ///
    /// # Arguments
    ///
    /// * `name` - Function name, visible as its `name` property
    /// * `callback` - The host callback
    ///
    /// # Returns
    ///
    /// The new function. It is not bound anywhere; store it in a global or
    /// an object to keep it alive across collections.
    pub fn register_native(&mut self, name: &'static str, callback: NativeFn) -> FunctionId {
        let id = NativeId(self.natives.len() as u32);
        self.natives.push(NativeEntry { name, callback });
        debug!("registered native {} as #{}", name, id.0);
        self.new_function(Some(JsString::from(name)), FunctionKind::Native(id))
    }

    /// Register a callback and store it as an own property of `target`.
    pub fn define_native_method(
        &mut self,
        target: ObjectId,
        name: &'static str,
        callback: NativeFn,
    ) -> VmResult<FunctionId> {
        let function = self.register_native(name, callback);
        self.define_value(target, PropertyKey::from(name), Value::Function(function))?;
        Ok(function)
    }

    /// Register a callback and bind it in the global scope.
    pub fn define_native_global(&mut self, name: &'static str, callback: NativeFn) -> FunctionId {
        let function = self.register_native(name, callback);
        self.define_global(name, Value::Function(function));
        function
    }

    /// Name a native was registered under.
    pub fn native_name(&self, id: NativeId) -> Option<&'static str> {
        self.natives.get(id.0 as usize).map(|entry| entry.name)
    }

    /// Make `exports` resolvable under `hash` when no loaded module has it.
    pub fn register_native_module(&mut self, hash: u64, exports: ObjectId) {
        match self.native_modules.binary_search_by_key(&hash, |(h, _)| *h) {
            Ok(pos) => self.native_modules[pos].1 = exports,
            Err(pos) => self.native_modules.insert(pos, (hash, exports)),
        }
        debug!("registered native module {:016x}", hash);
    }

    /// Exports of a native module.
    pub fn native_module(&self, hash: u64) -> Option<ObjectId> {
        self.native_modules
            .binary_search_by_key(&hash, |(h, _)| *h)
            .ok()
            .map(|pos| self.native_modules[pos].1)
    }
}
