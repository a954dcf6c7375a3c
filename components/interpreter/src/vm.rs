//! Virtual Machine for bytecode execution
//!
//! Main entry point for loading modules and running JavaScript bytecode.

use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use bytecode_system::{Module, Opcode};
use core_types::{JsString, ObjectId, ScopeId, SourcePosition, Value};
use memory_manager::{FunctionKind, Heap, JsFunction, JsObject, ModuleId, ObjectKind, Scope};

use crate::call_frame::CallFrame;
use crate::config::VmConfig;
use crate::dispatch;
use crate::error::{FatalError, VmResult};
use crate::module_loader::ModuleRecord;
use crate::native::NativeEntry;
use crate::realm::Intrinsics;
use crate::stack::OperandStack;

/// Virtual Machine for executing JavaScript bytecode
///
/// The VM owns every piece of interpreter state:
/// - The heap and the intrinsic prototypes
/// - The global scope and the loaded modules
/// - The operand stack, the running frame and the suspended callers
/// - The native function table and the native module registry
///
/// Independent VMs share nothing.
///
/// # Example
///
/// ```
/// use bytecode_system::{ModuleBuilder, Opcode};
/// use core_types::Value;
/// use interpreter::{Vm, VmConfig};
///
/// let mut b = ModuleBuilder::named("main");
/// b.load_int(2).load_int(3).op(Opcode::Add).export("sum");
///
/// let mut vm = Vm::new(VmConfig::default());
/// let id = vm.load_module(b.build().unwrap());
/// vm.run_module(id).unwrap();
/// assert_eq!(vm.exported(id, "sum").unwrap(), Value::Number(5.0));
/// ```
pub struct Vm {
    pub(crate) heap: Heap,
    pub(crate) intrinsics: Intrinsics,
    pub(crate) global_scope: ScopeId,
    pub(crate) stack: OperandStack,
    /// Running frame
    pub(crate) frame: CallFrame,
    /// Suspended callers, innermost last
    pub(crate) frames: Vec<CallFrame>,
    pub(crate) modules: Vec<ModuleRecord>,
    /// Loaded modules sorted by hash
    pub(crate) module_index: Vec<(u64, ModuleId)>,
    pub(crate) natives: Vec<NativeEntry>,
    pub(crate) native_modules: Vec<(u64, ObjectId)>,
    /// Natives currently on the host stack
    pub(crate) native_depth: usize,
    /// Values held by Rust code across a re-entrant call, traced as roots
    pub(crate) rooted: Vec<Value>,
    pub(crate) gc_requested: bool,
    pub(crate) output: Box<dyn Write>,
    pub(crate) config: VmConfig,
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("config", &self.config)
            .field("stack_depth", &self.stack.len())
            .field("call_depth", &self.call_depth())
            .field("modules", &self.modules.len())
            .field("natives", &self.natives.len())
            .field("gc", &self.heap.stats())
            .finish()
    }
}

impl Vm {
    /// Create a VM with its intrinsics and an empty global scope.
    ///
    /// Output of the `print` family goes to stdout until
    /// [`set_output`](Self::set_output) redirects it.
    pub fn new(config: VmConfig) -> Self {
        let mut heap = Heap::with_threshold(config.gc_threshold);
        let intrinsics = Intrinsics::create(&mut heap);
        let global_scope = heap.alloc_scope(Scope::new(None));
        let mut vm = Self {
            heap,
            intrinsics,
            global_scope,
            stack: OperandStack::new(config.stack_size),
            frame: CallFrame::host(global_scope),
            frames: Vec::new(),
            modules: Vec::new(),
            module_index: Vec::new(),
            natives: Vec::new(),
            native_modules: Vec::new(),
            native_depth: 0,
            rooted: Vec::new(),
            gc_requested: false,
            output: Box::new(io::stdout()),
            config,
        };
        vm.install_intrinsic_methods()
            .expect("intrinsic prototypes were allocated by this heap");
        vm
    }

    /// The configuration this VM was built with
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// The heap
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// The heap, mutably
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Canonical prototypes and well-known symbols
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// The global scope, parent of every module scope
    pub fn global_scope(&self) -> ScopeId {
        self.global_scope
    }

    /// Declare (or overwrite) a global binding
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.heap.scope_declare(self.global_scope, name, value);
    }

    /// Look up a global binding
    pub fn global(&self, name: &str) -> Option<Value> {
        self.heap.scope_lookup(self.global_scope, name)
    }

    /// Redirect the output of the `print` family
    pub fn set_output(&mut self, output: impl Write + 'static) {
        self.output = Box::new(output);
    }

    /// Sink for script output
    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    /// Calls in progress: suspended frames plus natives on the host stack
    pub fn call_depth(&self) -> usize {
        self.frames.len() + self.native_depth
    }

    /// Current operand stack height
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `this` of the running frame
    pub fn this(&self) -> &Value {
        &self.frame.this
    }

    /// Allocate an ordinary object inheriting from `Object.prototype`
    pub fn new_object(&mut self) -> ObjectId {
        let prototype = self.intrinsics.object_prototype;
        self.heap.alloc_object(JsObject::new(Some(prototype)))
    }

    /// Allocate an empty array
    pub fn new_array(&mut self) -> ObjectId {
        let mut array = JsObject::with_kind(Some(self.intrinsics.array_prototype), ObjectKind::Array);
        array.properties.insert("length", Value::Number(0.0));
        self.heap.alloc_object(array)
    }

    /// Allocate a function with its backing object.
    ///
    /// Interpreted functions also get a fresh `prototype` object whose
    /// `constructor` points back at the function.
    pub(crate) fn new_function(&mut self, name: Option<JsString>, kind: FunctionKind) -> core_types::FunctionId {
        let mut base = JsObject::new(Some(self.intrinsics.function_prototype));
        let display_name = name.clone().unwrap_or_else(|| JsString::from(""));
        base.properties.insert("name", Value::String(display_name));
        let base = self.heap.alloc_object(base);
        let function = self.heap.alloc_function(JsFunction { base, name, kind });

        if let FunctionKind::Interpreted { .. } = kind {
            let prototype = self.new_object();
            if let Some(object) = self.heap.object_mut(prototype) {
                object.properties.insert("constructor", Value::Function(function));
            }
            if let Some(object) = self.heap.object_mut(base) {
                object.properties.insert("prototype", Value::Object(prototype));
            }
        }
        function
    }

    pub(crate) fn push(&mut self, value: Value) -> VmResult<()> {
        self.stack.push(value).map_err(Into::into)
    }

    /// Pop within the running frame; the frame marker is a hard floor.
    pub(crate) fn pop(&mut self) -> VmResult<Value> {
        if self.stack.len() <= self.frame.stack_start {
            return Err(FatalError::StackUnderflow.into());
        }
        self.stack.pop().ok_or_else(|| FatalError::StackUnderflow.into())
    }

    pub(crate) fn peek(&self) -> VmResult<&Value> {
        if self.stack.len() <= self.frame.stack_start {
            return Err(FatalError::StackUnderflow.into());
        }
        self.stack.peek().ok_or_else(|| FatalError::StackUnderflow.into())
    }

    fn running_module(&self) -> VmResult<Rc<Module>> {
        let id = self
            .frame
            .module
            .ok_or_else(|| FatalError::InvalidInstruction("no module is running".to_string()))?;
        self.modules
            .get(id.0 as usize)
            .map(|record| Rc::clone(&record.module))
            .ok_or_else(|| FatalError::InvalidInstruction(format!("module #{} is not loaded", id.0)).into())
    }

    /// Position of the running frame
    pub fn position(&self) -> Option<SourcePosition> {
        let id = self.frame.module?;
        let record = self.modules.get(id.0 as usize)?;
        Some(SourcePosition::new(record.module.hash(), self.frame.current_instruction()))
    }

    /// Run the current frame until RETURN or the end of its range.
    ///
    /// Returns the top of the frame's sub-stack, or undefined if nothing
    /// was left there. The caller rewinds the stack.
    pub(crate) fn execute(&mut self) -> VmResult<Value> {
        let module = self.running_module()?;
        let table = dispatch::table();
        let hash = module.hash();

        while self.frame.ip < self.frame.end {
            self.maybe_collect();

            let index = self.frame.ip;
            let instruction = *module.instruction(index).ok_or_else(|| {
                FatalError::InvalidInstruction(format!("instruction {} is out of range", index))
            })?;
            if instruction.opcode == Opcode::Return {
                break;
            }
            self.frame.ip = index + 1;

            let handler = table[instruction.opcode.byte() as usize];
            handler(self, &module, instruction).map_err(|e| e.at(SourcePosition::new(hash, index)))?;
        }

        if self.stack.len() > self.frame.stack_start {
            self.pop()
        } else {
            Ok(Value::Undefined)
        }
    }

    /// Make `frame` the running frame, suspending the current one.
    pub(crate) fn enter(&mut self, frame: CallFrame) {
        let caller = std::mem::replace(&mut self.frame, frame);
        self.frames.push(caller);
    }

    /// Resume the innermost suspended frame, returning the finished one.
    pub(crate) fn leave(&mut self) -> CallFrame {
        match self.frames.pop() {
            Some(caller) => std::mem::replace(&mut self.frame, caller),
            None => std::mem::replace(&mut self.frame, CallFrame::host(self.global_scope)),
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}
