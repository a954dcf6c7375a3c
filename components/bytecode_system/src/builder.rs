//! Programmatic assembler for modules.

use crate::error::{FormatError, FormatResult};
use crate::hash::module_hash;
use crate::instruction::{Instruction, Operand};
use crate::module::Module;
use crate::opcode::Opcode;
use crate::string_table::StringTable;

/// A forward jump awaiting its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a jump must be bound to a target"]
pub struct Label(usize);

/// A function declaration awaiting the end of its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a function body must be closed"]
pub struct FunctionBody(usize);

/// Assembles a [`Module`] instruction by instruction.
///
/// String operands are interned automatically, forward jumps are patched
/// when their label is bound and function body sizes are patched when the
/// body is closed.
///
/// # Examples
///
/// ```
/// use bytecode_system::{ModuleBuilder, Opcode};
///
/// let mut b = ModuleBuilder::named("main");
/// b.load_int(2).load_int(3).op(Opcode::Add).export("sum");
/// let module = b.build().unwrap();
/// assert_eq!(module.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    hash: u64,
    strings: StringTable,
    instructions: Vec<Instruction>,
    error: Option<FormatError>,
}

impl ModuleBuilder {
    /// Starts a module with an explicit hash.
    pub fn new(hash: u64) -> Self {
        ModuleBuilder {
            hash,
            strings: StringTable::new(),
            instructions: Vec::new(),
            error: None,
        }
    }

    /// Starts a module whose hash is derived from `name`.
    pub fn named(name: &str) -> Self {
        Self::new(module_hash(name))
    }

    fn fail(&mut self, error: FormatError) {
        self.error.get_or_insert(error);
    }

    /// Interns a string, returning its index.
    pub fn string(&mut self, s: &str) -> u16 {
        match self.strings.intern(s) {
            Ok(index) => index,
            Err(e) => {
                self.fail(e);
                0
            }
        }
    }

    /// Index the next instruction will have.
    pub fn here(&self) -> usize {
        self.instructions.len()
    }

    fn here_u16(&mut self) -> u16 {
        let here = self.here();
        u16::try_from(here).unwrap_or_else(|_| {
            self.fail(FormatError::TooMany {
                what: "jump target",
                count: here,
                limit: u16::MAX as usize,
            });
            0
        })
    }

    /// Appends an instruction.
    pub fn emit(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends an operand-less instruction.
    pub fn op(&mut self, opcode: Opcode) -> &mut Self {
        self.emit(Instruction::new(opcode))
    }

    /// `LD_INT`.
    pub fn load_int(&mut self, value: i32) -> &mut Self {
        self.emit(Instruction::load_int(value))
    }

    /// `LD_DOUBLE`.
    pub fn load_double(&mut self, value: f64) -> &mut Self {
        self.emit(Instruction::load_double(value))
    }

    fn with_string(&mut self, opcode: Opcode, s: &str) -> &mut Self {
        let index = self.string(s);
        self.emit(Instruction::with_u16(opcode, index))
    }

    /// `LD_STRING`.
    pub fn load_string(&mut self, s: &str) -> &mut Self {
        self.with_string(Opcode::LoadString, s)
    }

    /// `ALLOC_LOCAL`: declares `name` with the value on top of the stack.
    pub fn alloc_local(&mut self, name: &str) -> &mut Self {
        self.with_string(Opcode::AllocLocal, name)
    }

    /// `STORE_LOCAL`.
    pub fn store_local(&mut self, name: &str) -> &mut Self {
        self.with_string(Opcode::StoreLocal, name)
    }

    /// `LOAD_LOCAL`.
    pub fn load_local(&mut self, name: &str) -> &mut Self {
        self.with_string(Opcode::LoadLocal, name)
    }

    /// `LOAD_ARG`.
    pub fn load_arg(&mut self, index: u16) -> &mut Self {
        self.emit(Instruction::with_u16(Opcode::LoadArg, index))
    }

    /// `OBJ_STORE`.
    pub fn obj_store(&mut self, key: &str) -> &mut Self {
        self.with_string(Opcode::ObjStore, key)
    }

    /// `OBJ_LOAD`.
    pub fn obj_load(&mut self, key: &str) -> &mut Self {
        self.with_string(Opcode::ObjLoad, key)
    }

    /// `EXPORT`.
    pub fn export(&mut self, name: &str) -> &mut Self {
        self.with_string(Opcode::Export, name)
    }

    /// `CALL`.
    pub fn call(&mut self, argc: u16) -> &mut Self {
        self.emit(Instruction::with_u16(Opcode::Call, argc))
    }

    /// `CALL_METHOD`.
    pub fn call_method(&mut self, argc: u16) -> &mut Self {
        self.emit(Instruction::with_u16(Opcode::CallMethod, argc))
    }

    /// Emits a jump whose target is bound later with [`bind`](Self::bind).
    pub fn jump(&mut self, opcode: Opcode) -> Label {
        debug_assert!(opcode.is_jump());
        let label = Label(self.here());
        self.emit(Instruction::with_u16(opcode, 0));
        label
    }

    /// Emits a jump to an already known target (a loop head).
    pub fn jump_to(&mut self, opcode: Opcode, target: usize) -> &mut Self {
        let target = u16::try_from(target).unwrap_or(u16::MAX);
        self.emit(Instruction::with_u16(opcode, target))
    }

    /// Points a pending jump at the next instruction.
    pub fn bind(&mut self, label: Label) -> &mut Self {
        let target = self.here_u16();
        if let Some(instruction) = self.instructions.get_mut(label.0) {
            instruction.operand = Operand::UInt16(target);
        }
        self
    }

    /// Opens a function body. `Some(name)` emits `FUNC_DECL`, which also
    /// binds the function in the current scope; `None` emits `FUNC_DECL_E`.
    /// Both push the function.
    pub fn begin_function(&mut self, name: Option<&str>) -> FunctionBody {
        let body = FunctionBody(self.here());
        match name {
            Some(name) => {
                let index = self.string(name);
                self.emit(Instruction::with_u16_pair(Opcode::FuncDecl, index, 0));
            }
            None => {
                self.emit(Instruction::with_u16(Opcode::FuncDeclExpr, 0));
            }
        }
        body
    }

    /// Closes a function body opened with [`begin_function`](Self::begin_function).
    pub fn end_function(&mut self, body: FunctionBody) -> &mut Self {
        let size = self.here() - body.0 - 1;
        let size = u16::try_from(size).unwrap_or_else(|_| {
            self.fail(FormatError::TooMany {
                what: "function body instruction",
                count: size,
                limit: u16::MAX as usize,
            });
            0
        });
        if let Some(instruction) = self.instructions.get_mut(body.0) {
            instruction.operand = match instruction.operand {
                Operand::TwoUInt16(name, _) => Operand::TwoUInt16(name, size),
                _ => Operand::UInt16(size),
            };
        }
        self
    }

    /// Validates and produces the module.
    pub fn build(self) -> FormatResult<Module> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Module::new(self.hash, self.strings, self.instructions)
    }
}
