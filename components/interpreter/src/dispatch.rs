//! Opcode handlers and the dispatch table
//!
//! Every opcode maps to exactly one handler. The table is built once from
//! an exhaustive match, so adding an opcode without a handler does not
//! compile.

use std::sync::OnceLock;

use bytecode_system::{Instruction, Module, Opcode, Operand};
use core_types::{JsError, JsString, Value};
use memory_manager::{FunctionKind, PropertyKey, Scope};

use crate::error::{FatalError, VmResult};
use crate::operators::{NumericOp, Relation};
use crate::vm::Vm;

/// An opcode handler. `ip` already points past the instruction.
pub type Handler = fn(&mut Vm, &Module, Instruction) -> VmResult<()>;

/// The dispatch table, indexed by opcode byte.
pub fn table() -> &'static [Handler; Opcode::COUNT] {
    static TABLE: OnceLock<[Handler; Opcode::COUNT]> = OnceLock::new();
    TABLE.get_or_init(|| std::array::from_fn(|i| handler_for(Opcode::ALL[i])))
}

fn handler_for(opcode: Opcode) -> Handler {
    match opcode {
        Opcode::Nop => nop,
        Opcode::LoadInt => load_int,
        Opcode::LoadDouble => load_double,
        Opcode::LoadString => load_string,
        Opcode::LoadUndefined => |vm, _, _| vm.push(Value::Undefined),
        Opcode::LoadNull => |vm, _, _| vm.push(Value::Null),
        Opcode::LoadTrue => |vm, _, _| vm.push(Value::Boolean(true)),
        Opcode::LoadFalse => |vm, _, _| vm.push(Value::Boolean(false)),
        Opcode::LoadThis => load_this,

        Opcode::Add => add,
        Opcode::Sub => |vm, _, _| numeric(vm, NumericOp::Sub),
        Opcode::Mul => |vm, _, _| numeric(vm, NumericOp::Mul),
        Opcode::Div => |vm, _, _| numeric(vm, NumericOp::Div),
        Opcode::Mod => |vm, _, _| numeric(vm, NumericOp::Mod),
        Opcode::BitAnd => |vm, _, _| numeric(vm, NumericOp::BitAnd),
        Opcode::BitOr => |vm, _, _| numeric(vm, NumericOp::BitOr),
        Opcode::BitXor => |vm, _, _| numeric(vm, NumericOp::BitXor),
        Opcode::Shl => |vm, _, _| numeric(vm, NumericOp::Shl),
        Opcode::Shr => |vm, _, _| numeric(vm, NumericOp::Shr),
        Opcode::UShr => |vm, _, _| numeric(vm, NumericOp::UShr),
        Opcode::BitNot => bit_not,

        Opcode::Not => not,
        Opcode::Negate => negate,
        Opcode::TypeOf => type_of,

        Opcode::Eq => |vm, _, _| loose_equality(vm, false),
        Opcode::Ne => |vm, _, _| loose_equality(vm, true),
        Opcode::StrictEq => |vm, _, _| strict_equality(vm, false),
        Opcode::StrictNe => |vm, _, _| strict_equality(vm, true),
        Opcode::Gt => |vm, _, _| relational(vm, Relation::Greater),
        Opcode::Ge => |vm, _, _| relational(vm, Relation::GreaterEqual),
        Opcode::Lt => |vm, _, _| relational(vm, Relation::Less),
        Opcode::Le => |vm, _, _| relational(vm, Relation::LessEqual),

        Opcode::Pop => pop,
        Opcode::Dup => dup,
        Opcode::Swap => swap,

        Opcode::AllocLocal => alloc_local,
        Opcode::StoreLocal => store_local,
        Opcode::LoadLocal => load_local,
        Opcode::LoadArg => load_arg,

        Opcode::FuncDecl | Opcode::FuncDeclExpr => func_decl,
        Opcode::Call => call,
        Opcode::CallMethod => call_method,

        Opcode::ArrAlloc => arr_alloc,
        Opcode::ObjAlloc => obj_alloc,
        Opcode::ObjStore => obj_store,
        Opcode::ObjLoad => obj_load,
        Opcode::ObjLoadComputed => obj_load_computed,
        Opcode::ObjStoreComputed => obj_store_computed,
        Opcode::ObjLoadSymbol => obj_load_symbol,
        Opcode::ObjStoreSymbol => obj_store_symbol,

        // Intercepted by the run loop before dispatch.
        Opcode::Return => nop,
        Opcode::PushScope => push_scope,
        Opcode::PopScope => pop_scope,
        Opcode::Jump => jump,
        Opcode::JumpIfFalse => |vm, _, instruction| conditional_jump(vm, instruction, false),
        Opcode::JumpIfTrue => |vm, _, instruction| conditional_jump(vm, instruction, true),

        Opcode::Export => export,
    }
}

fn malformed(instruction: Instruction) -> FatalError {
    FatalError::InvalidInstruction(format!("malformed operand on {}", instruction))
}

fn u16_operand(instruction: Instruction) -> VmResult<u16> {
    instruction.u16_operand().ok_or_else(|| malformed(instruction).into())
}

fn string_operand(module: &Module, instruction: Instruction) -> VmResult<JsString> {
    let index = u16_operand(instruction)?;
    module.string(index).cloned().ok_or_else(|| {
        FatalError::InvalidInstruction(format!("string index {} out of range in {}", index, instruction)).into()
    })
}

fn nop(_vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    Ok(())
}

// Literals

fn load_int(vm: &mut Vm, _module: &Module, instruction: Instruction) -> VmResult<()> {
    match instruction.operand {
        Operand::Int32(n) => vm.push(Value::Number(n as f64)),
        _ => Err(malformed(instruction).into()),
    }
}

fn load_double(vm: &mut Vm, _module: &Module, instruction: Instruction) -> VmResult<()> {
    match instruction.operand {
        Operand::Float64(n) => vm.push(Value::Number(n)),
        _ => Err(malformed(instruction).into()),
    }
}

fn load_string(vm: &mut Vm, module: &Module, instruction: Instruction) -> VmResult<()> {
    let s = string_operand(module, instruction)?;
    vm.push(Value::String(s))
}

fn load_this(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let this = vm.frame.this.clone();
    vm.push(this)
}

// Operators

fn add(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    let result = vm.with_rooted(&[a.clone(), b.clone()], |vm| vm.add_values(&a, &b))?;
    vm.push(result)
}

fn numeric(vm: &mut Vm, op: NumericOp) -> VmResult<()> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    let result = vm.with_rooted(&[a.clone(), b.clone()], |vm| vm.numeric_binary(op, &a, &b))?;
    vm.push(result)
}

fn bit_not(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let a = vm.pop()?;
    let result = vm.bitwise_not(&a)?;
    vm.push(result)
}

fn not(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let a = vm.pop()?;
    vm.push(Value::Boolean(!a.to_boolean()))
}

fn negate(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let a = vm.pop()?;
    let result = vm.negate(&a)?;
    vm.push(result)
}

fn type_of(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let a = vm.pop()?;
    vm.push(Value::from(a.type_of()))
}

fn loose_equality(vm: &mut Vm, negated: bool) -> VmResult<()> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    let equal = vm.with_rooted(&[a.clone(), b.clone()], |vm| vm.loose_equals(&a, &b))?;
    vm.push(Value::Boolean(equal != negated))
}

fn strict_equality(vm: &mut Vm, negated: bool) -> VmResult<()> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    vm.push(Value::Boolean(a.strict_equals(&b) != negated))
}

fn relational(vm: &mut Vm, relation: Relation) -> VmResult<()> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    let result = vm.with_rooted(&[a.clone(), b.clone()], |vm| vm.compare(relation, &a, &b))?;
    vm.push(Value::Boolean(result))
}

// Stack shuffling

fn pop(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    vm.pop().map(drop)
}

fn dup(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let top = vm.peek()?.clone();
    vm.push(top)
}

fn swap(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let b = vm.pop()?;
    let a = vm.pop()?;
    vm.push(b)?;
    vm.push(a)
}

// Bindings

fn alloc_local(vm: &mut Vm, module: &Module, instruction: Instruction) -> VmResult<()> {
    let name = string_operand(module, instruction)?;
    let value = vm.pop()?;
    let scope = vm.frame.scope;
    vm.heap.scope_declare(scope, name, value);
    Ok(())
}

fn store_local(vm: &mut Vm, module: &Module, instruction: Instruction) -> VmResult<()> {
    let name = string_operand(module, instruction)?;
    let value = vm.pop()?;
    let scope = vm.frame.scope;
    if vm.heap.scope_set(scope, &name, value) {
        Ok(())
    } else {
        Err(JsError::reference_error(format!("{} is not defined", name)).into())
    }
}

fn load_local(vm: &mut Vm, module: &Module, instruction: Instruction) -> VmResult<()> {
    let name = string_operand(module, instruction)?;
    match vm.heap.scope_lookup(vm.frame.scope, &name) {
        Some(value) => vm.push(value),
        None => Err(JsError::reference_error(format!("{} is not defined", name)).into()),
    }
}

fn load_arg(vm: &mut Vm, _module: &Module, instruction: Instruction) -> VmResult<()> {
    let index = u16_operand(instruction)?;
    let arg = vm.argument(index as usize);
    vm.push(arg)
}

// Functions

fn func_decl(vm: &mut Vm, module: &Module, instruction: Instruction) -> VmResult<()> {
    let size = instruction.body_size().ok_or_else(|| malformed(instruction))? as usize;
    let name = match instruction.opcode {
        Opcode::FuncDecl => Some(string_operand(module, instruction)?),
        _ => None,
    };
    let owner = vm
        .frame
        .module
        .ok_or_else(|| FatalError::InvalidInstruction("function declared outside a module".to_string()))?;
    let start = vm.frame.ip;
    let end = start + size;
    let scope = vm.frame.scope;

    let function = vm.new_function(
        name.clone(),
        FunctionKind::Interpreted {
            scope,
            module: owner,
            start,
            end,
        },
    );
    if let Some(name) = name {
        vm.heap.scope_declare(scope, name, Value::Function(function));
    }
    vm.frame.ip = end;
    vm.push(Value::Function(function))
}

fn call(vm: &mut Vm, _module: &Module, instruction: Instruction) -> VmResult<()> {
    let argc = u16_operand(instruction)? as usize;
    let callee = vm.pop()?;
    let result = vm.call_with_stack_args(&callee, Value::Undefined, argc)?;
    vm.push(result)
}

fn call_method(vm: &mut Vm, _module: &Module, instruction: Instruction) -> VmResult<()> {
    let argc = u16_operand(instruction)? as usize;
    let callee = vm.pop()?;
    let this = vm.pop()?;
    let result = vm.call_with_stack_args(&callee, this, argc)?;
    vm.push(result)
}

// Objects

fn arr_alloc(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let array = vm.new_array();
    vm.push(Value::Object(array))
}

fn obj_alloc(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let object = vm.new_object();
    vm.push(Value::Object(object))
}

fn obj_store(vm: &mut Vm, module: &Module, instruction: Instruction) -> VmResult<()> {
    let key = string_operand(module, instruction)?;
    let value = vm.pop()?;
    let target = vm.pop()?;
    vm.set_property(&target, PropertyKey::String(key), value)
}

fn obj_load(vm: &mut Vm, module: &Module, instruction: Instruction) -> VmResult<()> {
    let key = string_operand(module, instruction)?;
    let target = vm.pop()?;
    let value = vm.get_property(&target, &PropertyKey::String(key))?;
    vm.push(value)
}

fn obj_load_computed(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let key = vm.pop()?;
    let target = vm.pop()?;
    let key = vm.with_rooted(std::slice::from_ref(&target), |vm| vm.to_property_key(&key))?;
    let value = vm.get_property(&target, &key)?;
    vm.push(value)
}

fn obj_store_computed(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let key = vm.pop()?;
    let target = vm.pop()?;
    let value = vm.pop()?;
    let key = vm.with_rooted(&[target.clone(), value.clone()], |vm| vm.to_property_key(&key))?;
    vm.set_property(&target, key, value)
}

fn symbol_key(value: &Value) -> VmResult<PropertyKey> {
    match value {
        Value::Symbol(id) => Ok(PropertyKey::Symbol(*id)),
        other => Err(JsError::type_error(format!("{} is not a symbol", other.type_of())).into()),
    }
}

fn obj_load_symbol(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let key = vm.pop()?;
    let target = vm.pop()?;
    let value = vm.get_property(&target, &symbol_key(&key)?)?;
    vm.push(value)
}

fn obj_store_symbol(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let key = vm.pop()?;
    let target = vm.pop()?;
    let value = vm.pop()?;
    vm.set_property(&target, symbol_key(&key)?, value)
}

// Control flow

fn push_scope(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let parent = vm.frame.scope;
    vm.frame.scope = vm.heap.alloc_scope(Scope::new(Some(parent)));
    Ok(())
}

fn pop_scope(vm: &mut Vm, _module: &Module, _instruction: Instruction) -> VmResult<()> {
    let scope = vm
        .heap
        .scope(vm.frame.scope)
        .ok_or(FatalError::DanglingHandle("scope"))?;
    vm.frame.scope = scope.parent.ok_or(FatalError::ScopeUnderflow)?;
    Ok(())
}

fn jump(vm: &mut Vm, _module: &Module, instruction: Instruction) -> VmResult<()> {
    vm.frame.ip = u16_operand(instruction)? as usize;
    Ok(())
}

fn conditional_jump(vm: &mut Vm, instruction: Instruction, when: bool) -> VmResult<()> {
    let target = u16_operand(instruction)? as usize;
    if vm.pop()?.to_boolean() == when {
        vm.frame.ip = target;
    }
    Ok(())
}

// Modules

fn export(vm: &mut Vm, module: &Module, instruction: Instruction) -> VmResult<()> {
    let name = string_operand(module, instruction)?;
    let value = vm.pop()?;
    let exports = vm
        .exports_of_running()
        .ok_or_else(|| FatalError::InvalidInstruction("EXPORT outside a module".to_string()))?;
    vm.set_property(&Value::Object(exports), PropertyKey::String(name), value)
}
