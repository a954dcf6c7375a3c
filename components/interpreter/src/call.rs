//! Function invocation
//!
//! Arguments travel on the operand stack, last argument pushed first, so
//! argument `i` of the running frame sits at `stack_start - 1 - i`.

use core_types::{FunctionId, JsError, SourcePosition, StackFrame, Value};
use log::trace;
use memory_manager::{FunctionKind, Scope};

use crate::call_frame::CallFrame;
use crate::error::{FatalError, VmResult};
use crate::vm::Vm;

impl Vm {
    /// Call `callee` with `this` and `args`.
    ///
    /// This is the entry point for hosts and natives; bytecode calls go
    /// through the same path with their arguments already on the stack.
    ///
    /// # Example
    ///
    /// ```
    /// use bytecode_system::{ModuleBuilder, Opcode};
    /// use core_types::Value;
    /// use interpreter::{Vm, VmConfig};
    ///
    /// // function double(x) { return x + x }
    /// let mut b = ModuleBuilder::named("double");
    /// let body = b.begin_function(Some("double"));
    /// b.load_arg(0).load_arg(0).op(Opcode::Add).op(Opcode::Return);
    /// b.end_function(body);
    /// b.export("double");
    ///
    /// let mut vm = Vm::new(VmConfig::default());
    /// let id = vm.load_module(b.build().unwrap());
    /// vm.run_module(id).unwrap();
    /// let double = vm.exported(id, "double").unwrap();
    /// let result = vm.call_function(&double, Value::Undefined, &[Value::from(21)]).unwrap();
    /// assert_eq!(result, Value::Number(42.0));
    /// ```
    pub fn call_function(&mut self, callee: &Value, this: Value, args: &[Value]) -> VmResult<Value> {
        let function = callable(callee)?;
        for arg in args.iter().rev() {
            self.push(arg.clone())?;
        }
        self.invoke(function, this, args.len())
    }

    /// Call with `argc` arguments already on top of the stack.
    pub(crate) fn call_with_stack_args(&mut self, callee: &Value, this: Value, argc: usize) -> VmResult<Value> {
        if self.stack.len() < self.frame.stack_start + argc {
            return Err(FatalError::StackUnderflow.into());
        }
        let function = callable(callee)?;
        self.invoke(function, this, argc)
    }

    /// Runs `function`, consuming its `argc` stack arguments on every path.
    fn invoke(&mut self, function: FunctionId, this: Value, argc: usize) -> VmResult<Value> {
        let (name, kind) = match self.heap.function(function) {
            Some(f) => (f.name.clone(), f.kind),
            None => {
                self.stack.truncate(self.stack.len().saturating_sub(argc));
                return Err(FatalError::DanglingHandle("function").into());
            }
        };
        trace!(
            "call {} argc={} depth={}",
            name.as_deref().unwrap_or("<anonymous>"),
            argc,
            self.call_depth()
        );
        // Natives count too: a getter that reads itself recurses on the host stack.
        if self.call_depth() >= self.config.max_call_depth {
            self.stack.truncate(self.stack.len().saturating_sub(argc));
            return Err(JsError::range_error("Maximum call stack size exceeded").into());
        }

        match kind {
            FunctionKind::Native(native) => {
                let args = self
                    .stack
                    .take_args(argc)
                    .ok_or(FatalError::StackUnderflow)?;
                let callback = self
                    .natives
                    .get(native.0 as usize)
                    .map(|entry| entry.callback)
                    .ok_or(FatalError::MissingNative(native.0))?;
                // The callback holds `this` and its arguments only in Rust.
                let mark = self.rooted.len();
                self.rooted.push(this.clone());
                self.rooted.extend(args.iter().cloned());
                self.native_depth += 1;
                let result = callback(self, this, &args);
                self.native_depth -= 1;
                self.rooted.truncate(mark);
                result
            }
            FunctionKind::Interpreted {
                scope,
                module,
                start,
                end,
            } => {
                let stack_start = self.stack.len();
                let activation = self.heap.alloc_scope(Scope::new(Some(scope)));
                self.enter(CallFrame {
                    module: Some(module),
                    ip: start,
                    end,
                    stack_start,
                    argc,
                    this,
                    scope: activation,
                    function: Some(function),
                });
                let result = self.execute();
                let finished = self.leave();
                self.stack.truncate(finished.stack_start - finished.argc);

                result.map_err(|error| {
                    let hash = self
                        .modules
                        .get(module.0 as usize)
                        .map(|record| record.module.hash())
                        .unwrap_or_default();
                    error.through(StackFrame {
                        function_name: name.map(|n| n.to_string()),
                        position: SourcePosition::new(hash, finished.current_instruction()),
                    })
                })
            }
        }
    }

    /// Argument `index` of the running frame, undefined past `argc`.
    pub(crate) fn argument(&self, index: usize) -> Value {
        if index >= self.frame.argc {
            return Value::Undefined;
        }
        self.frame
            .stack_start
            .checked_sub(index + 1)
            .and_then(|slot| self.stack.get(slot))
            .cloned()
            .unwrap_or(Value::Undefined)
    }
}

fn callable(callee: &Value) -> VmResult<FunctionId> {
    match callee {
        Value::Function(id) => Ok(*id),
        other => Err(FatalError::NotCallable(other.type_of()).into()),
    }
}
