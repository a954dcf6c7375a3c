//! Contract tests for the `module` object and the core native module

use super::{run, vm_with_builtins};
use bytecode_system::{module_hash, Bundle, ModuleBuilder, Opcode};
use core_types::{ErrorKind, Value};
use interpreter::{Vm, VmConfig};

#[test]
fn test_get_export_obj_returns_own_exports() {
    let (mut vm, _) = vm_with_builtins();
    let mut b = ModuleBuilder::named("exports");
    b.load_local("module");
    b.load_local("module").obj_load("getExportObj");
    b.call_method(0);
    b.load_int(5).obj_store("five");
    let id = run(&mut vm, b);
    assert_eq!(vm.exported(id, "five").unwrap(), Value::Number(5.0));
}

#[test]
fn test_require_runs_bundled_module_once() {
    let (mut vm, out) = vm_with_builtins();

    let mut lib = ModuleBuilder::named("lib");
    lib.load_string("lib loaded").load_local("print").call(1).op(Opcode::Pop);
    lib.load_int(7).export("seven");

    // let a = module.require("lib"); let b = module.require("lib"); a.seven + b.seven
    let mut main = ModuleBuilder::named("main");
    for binding in ["a", "b"] {
        main.load_string("lib");
        main.load_local("module");
        main.load_local("module").obj_load("require");
        main.call_method(1).alloc_local(binding);
    }
    main.load_local("a").obj_load("seven");
    main.load_local("b").obj_load("seven");
    main.op(Opcode::Add).export("total");

    let bundle = Bundle::new(module_hash("main"), vec![lib.build().unwrap(), main.build().unwrap()]).unwrap();
    let exports = vm.run_entry(bundle).unwrap();
    assert_eq!(
        vm.get_property(&Value::Object(exports), &"total".into()).unwrap(),
        Value::Number(14.0)
    );
    assert_eq!(out.contents(), "lib loaded\n");
}

#[test]
fn test_require_falls_back_to_core_module() {
    let (mut vm, _) = vm_with_builtins();
    let mut b = ModuleBuilder::named("uses-core");
    b.load_string(builtins::CORE_MODULE);
    b.load_local("module");
    b.load_local("module").obj_load("require");
    b.call_method(1).obj_load("print").op(Opcode::TypeOf).export("kind");
    let id = run(&mut vm, b);
    assert_eq!(vm.exported(id, "kind").unwrap(), Value::from("function"));
}

#[test]
fn test_require_unknown_module_throws() {
    let (mut vm, _) = vm_with_builtins();
    let mut b = ModuleBuilder::named("missing");
    b.load_string("nowhere");
    b.load_local("module");
    b.load_local("module").obj_load("require");
    b.call_method(1);
    let id = vm.load_module(b.build().unwrap());
    let error = vm.run_module(id).unwrap_err();
    let exception = error.exception().unwrap();
    assert_eq!(exception.kind, ErrorKind::Error);
    assert_eq!(exception.message, "Cannot find module 'nowhere'");
}

#[test]
fn test_required_module_collects_while_it_runs() {
    let mut vm = Vm::new(VmConfig::default().with_gc_threshold(8));
    builtins::install(&mut vm).unwrap();
    vm.collect_garbage();
    let before = vm.gc_stats().collections;

    // let kept = {}; kept.tag = 1; forty throwaway objects; export kept
    let mut lib = ModuleBuilder::named("allocates");
    lib.op(Opcode::ObjAlloc).alloc_local("kept");
    lib.load_local("kept").load_int(1).obj_store("tag");
    for _ in 0..40 {
        lib.op(Opcode::ObjAlloc).op(Opcode::Pop);
    }
    lib.load_local("kept").export("kept");

    // module.require("allocates").kept.tag
    let mut main = ModuleBuilder::named("main");
    main.load_string("allocates");
    main.load_local("module");
    main.load_local("module").obj_load("require");
    main.call_method(1).obj_load("kept").obj_load("tag").export("tag");

    let bundle = Bundle::new(module_hash("main"), vec![lib.build().unwrap(), main.build().unwrap()]).unwrap();
    let exports = vm.run_entry(bundle).unwrap();
    assert!(vm.gc_stats().collections - before >= 3);
    assert_eq!(
        vm.get_property(&Value::Object(exports), &"tag".into()).unwrap(),
        Value::Number(1.0)
    );
}
