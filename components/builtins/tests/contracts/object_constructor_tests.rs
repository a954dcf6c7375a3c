//! Contract tests for `Object` and `Array`

use super::{run, vm_with_builtins};
use bytecode_system::{ModuleBuilder, Opcode};
use core_types::Value;

#[test]
fn test_define_property_getter_runs_on_read() {
    let (mut vm, _) = vm_with_builtins();
    // let o = {}; Object.defineProperty(o, "twice", { get: function () { return this.n * 2 } })
    let mut b = ModuleBuilder::named("getter");
    b.op(Opcode::ObjAlloc).alloc_local("o");
    b.load_local("o").load_int(21).obj_store("n");

    b.op(Opcode::ObjAlloc).alloc_local("descriptor");
    b.load_local("descriptor");
    let get = b.begin_function(None);
    b.op(Opcode::LoadThis).obj_load("n").load_int(2).op(Opcode::Mul).op(Opcode::Return);
    b.end_function(get);
    b.obj_store("get");

    b.load_local("descriptor").load_string("twice").load_local("o");
    b.load_local("Object");
    b.load_local("Object").obj_load("defineProperty");
    b.call_method(3).op(Opcode::Pop);
    b.load_local("o").obj_load("twice").export("twice");

    let id = run(&mut vm, b);
    assert_eq!(vm.exported(id, "twice").unwrap(), Value::Number(42.0));
}

#[test]
fn test_setter_intercepts_own_writes() {
    let (mut vm, _) = vm_with_builtins();
    // Object.defineProperty(o, "x", { set: function (v) { this.seen = v } }); o.x = 9
    let mut b = ModuleBuilder::named("setter");
    b.op(Opcode::ObjAlloc).alloc_local("o");
    b.op(Opcode::ObjAlloc).alloc_local("descriptor");
    b.load_local("descriptor");
    let set = b.begin_function(None);
    b.op(Opcode::LoadThis).load_arg(0).obj_store("seen");
    b.end_function(set);
    b.obj_store("set");

    b.load_local("descriptor").load_string("x").load_local("o");
    b.load_local("Object");
    b.load_local("Object").obj_load("defineProperty");
    b.call_method(3).op(Opcode::Pop);
    b.load_local("o").load_int(9).obj_store("x");
    b.load_local("o").obj_load("seen").export("seen");

    let id = run(&mut vm, b);
    assert_eq!(vm.exported(id, "seen").unwrap(), Value::Number(9.0));
}

#[test]
fn test_create_and_get_prototype_of() {
    let (mut vm, _) = vm_with_builtins();
    let mut b = ModuleBuilder::named("create");
    b.op(Opcode::ObjAlloc).alloc_local("proto");
    b.load_local("proto").load_string("hi").obj_store("greeting");
    b.load_local("proto");
    b.load_local("Object");
    b.load_local("Object").obj_load("create");
    b.call_method(1).alloc_local("child");
    b.load_local("child").obj_load("greeting").export("greeting");

    b.load_local("child");
    b.load_local("Object");
    b.load_local("Object").obj_load("getPrototypeOf");
    b.call_method(1).load_local("proto").op(Opcode::StrictEq).export("same");

    let id = run(&mut vm, b);
    assert_eq!(vm.exported(id, "greeting").unwrap(), Value::from("hi"));
    assert_eq!(vm.exported(id, "same").unwrap(), Value::Boolean(true));
}

#[test]
fn test_keys_and_is_array() {
    let (mut vm, _) = vm_with_builtins();
    let mut b = ModuleBuilder::named("keys");
    b.op(Opcode::ObjAlloc).alloc_local("o");
    b.load_local("o").load_int(1).obj_store("a");
    b.load_local("o");
    b.load_local("Object");
    b.load_local("Object").obj_load("keys");
    b.call_method(1).alloc_local("keys");

    b.load_local("keys");
    b.load_local("Array");
    b.load_local("Array").obj_load("isArray");
    b.call_method(1).export("isArray");
    b.load_local("keys").obj_load("length").export("count");
    b.load_local("keys").load_int(0).op(Opcode::ObjLoadComputed).export("first");

    let id = run(&mut vm, b);
    assert_eq!(vm.exported(id, "isArray").unwrap(), Value::Boolean(true));
    assert_eq!(vm.exported(id, "count").unwrap(), Value::Number(1.0));
    assert_eq!(vm.exported(id, "first").unwrap(), Value::from("a"));
}
