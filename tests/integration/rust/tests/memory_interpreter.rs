//! Memory Manager and Interpreter Integration Tests
//!
//! Collections run between module executions and during them; whatever a
//! module scope, an export or a closure can still reach must survive.

use bytecode_system::{module_hash, ModuleBuilder, Opcode};
use core_types::Value;
use interpreter::{Vm, VmConfig};
use memory_manager::HeapRef;

fn run(vm: &mut Vm, b: ModuleBuilder) -> memory_manager::ModuleId {
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap();
    id
}

/// Test: an unreachable cycle is reclaimed in one collection
#[test]
fn test_unreachable_cycle_is_freed() {
    let mut vm = Vm::new(VmConfig::default().with_gc_threshold(0));
    let mut b = ModuleBuilder::named("cycle");
    b.op(Opcode::ObjAlloc).alloc_local("a");
    b.op(Opcode::ObjAlloc).alloc_local("b");
    b.load_local("a").load_local("b").obj_store("next");
    b.load_local("b").load_local("a").obj_store("next");
    b.op(Opcode::LoadNull).store_local("a");
    b.op(Opcode::LoadNull).store_local("b");
    run(&mut vm, b);

    let stats = vm.collect_garbage();
    assert_eq!(stats.last_freed, 2);
    assert_eq!(vm.collect_garbage().last_freed, 0);
}

/// Test: exports and closures stay usable across collections
#[test]
fn test_exports_and_closures_survive_collection() {
    let mut vm = Vm::new(VmConfig::default().with_gc_threshold(0));
    // let data = { v: 3 }; export function get() { return data.v }
    let mut b = ModuleBuilder::named("keeper");
    b.op(Opcode::ObjAlloc).alloc_local("data");
    b.load_local("data").load_int(3).obj_store("v");
    let get = b.begin_function(Some("get"));
    b.load_local("data").obj_load("v").op(Opcode::Return);
    b.end_function(get);
    b.export("get");
    let id = run(&mut vm, b);

    vm.collect_garbage();
    vm.collect_garbage();

    let get = vm.exported(id, "get").unwrap();
    let result = vm.call_function(&get, Value::Undefined, &[]).unwrap();
    assert_eq!(result, Value::Number(3.0));
}

/// Test: a collection between modules frees nothing another module can
/// still reach through the global scope
#[test]
fn test_globals_are_roots() {
    let mut vm = Vm::new(VmConfig::default().with_gc_threshold(0));
    let shared = vm.new_object();
    vm.define_global("shared", Value::Object(shared));

    let mut writer = ModuleBuilder::named("writer");
    writer.load_local("shared");
    writer.op(Opcode::ObjAlloc);
    writer.obj_store("inner");
    run(&mut vm, writer);

    vm.collect_garbage();
    assert!(vm.heap().is_live(HeapRef::Object(shared)));

    let mut reader = ModuleBuilder::named("reader");
    reader.load_local("shared").obj_load("inner").op(Opcode::TypeOf).export("t");
    let id = run(&mut vm, reader);
    assert_eq!(vm.exported(id, "t").unwrap(), Value::from("object"));
}

/// Test: automatic collections during a long allocation loop keep the
/// live set bounded
#[test]
fn test_threshold_collection_bounds_live_set() {
    let mut vm = Vm::new(VmConfig::default().with_gc_threshold(32));
    let mut b = ModuleBuilder::named("churn");
    b.load_int(0).alloc_local("i");
    let head = b.here();
    b.load_local("i").load_int(1000).op(Opcode::Lt);
    let exit = b.jump(Opcode::JumpIfFalse);
    b.op(Opcode::ObjAlloc).alloc_local("garbage");
    b.load_local("i").load_int(1).op(Opcode::Add).store_local("i");
    b.jump_to(Opcode::Jump, head);
    b.bind(exit);
    run(&mut vm, b);

    let stats = vm.gc_stats();
    assert!(stats.collections >= 10, "{:?}", stats);
    assert!(stats.live < 200, "{:?}", stats);
}

/// Test: a module loaded but never run is still rooted
#[test]
fn test_loaded_module_exports_are_roots() {
    let mut vm = Vm::new(VmConfig::default().with_gc_threshold(0));
    let mut b = ModuleBuilder::named("lazy");
    b.load_int(4).export("four");
    let id = vm.load_module(b.build().unwrap());

    vm.collect_garbage();
    let exports = vm.resolve_module(module_hash("lazy")).unwrap().unwrap();
    assert!(vm.heap().is_live(HeapRef::Object(exports)));
    assert_eq!(vm.exported(id, "four").unwrap(), Value::Number(4.0));
}
