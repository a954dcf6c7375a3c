//! Call frame for function call stack management

use core_types::{FunctionId, ScopeId, Value};
use memory_manager::ModuleId;

/// Activation record of the code currently executing.
///
/// The VM keeps the running frame in place and the suspended callers on a
/// vector; `this` lives here rather than in any scope, so recursive calls
/// never overwrite a caller's receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Module whose instructions run, None for the host frame
    pub module: Option<ModuleId>,
    /// Next instruction
    pub ip: usize,
    /// One past the last instruction of the body
    pub end: usize,
    /// Stack height at entry; arguments sit directly below it
    pub stack_start: usize,
    /// Number of arguments passed
    pub argc: usize,
    /// Receiver
    pub this: Value,
    /// Innermost scope
    pub scope: ScopeId,
    /// Function being run, None for module code
    pub function: Option<FunctionId>,
}

impl CallFrame {
    /// The frame of the embedding host, before any code runs
    pub fn host(global: ScopeId) -> Self {
        Self {
            module: None,
            ip: 0,
            end: 0,
            stack_start: 0,
            argc: 0,
            this: Value::Undefined,
            scope: global,
            function: None,
        }
    }

    /// Top-level code of a module
    pub fn module(module: ModuleId, len: usize, scope: ScopeId, stack_start: usize) -> Self {
        Self {
            module: Some(module),
            ip: 0,
            end: len,
            stack_start,
            argc: 0,
            this: Value::Undefined,
            scope,
            function: None,
        }
    }

    /// Index of the instruction last fetched
    pub fn current_instruction(&self) -> usize {
        self.ip.saturating_sub(1)
    }
}
