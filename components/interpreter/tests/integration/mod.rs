//! Integration tests for interpreter
//!
//! Whole modules assembled with `ModuleBuilder` and run through the VM.

use bytecode_system::{Bundle, ModuleBuilder, Opcode};
use core_types::{ErrorKind, Value};
use interpreter::{FatalError, SharedOutput, Vm, VmConfig, VmError};
use memory_manager::ModuleId;
use std::io::Write;

fn run(b: ModuleBuilder) -> (Vm, ModuleId) {
    let mut vm = Vm::new(VmConfig::default());
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap();
    (vm, id)
}

fn run_err(b: ModuleBuilder) -> VmError {
    let mut vm = Vm::new(VmConfig::default());
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap_err()
}

// ============================================================================
// Arithmetic and comparison
// ============================================================================

#[test]
fn test_sum_export() {
    let mut b = ModuleBuilder::named("main");
    b.load_int(2).load_int(3).op(Opcode::Add).export("sum");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "sum").unwrap(), Value::Number(5.0));
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn test_complex_arithmetic() {
    // (10 + 5) * 3 - 2
    let mut b = ModuleBuilder::named("arith");
    b.load_int(10).load_int(5).op(Opcode::Add);
    b.load_int(3).op(Opcode::Mul);
    b.load_int(2).op(Opcode::Sub);
    b.export("result");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "result").unwrap(), Value::Number(43.0));
}

#[test]
fn test_numeric_special_cases() {
    let mut b = ModuleBuilder::named("special");
    b.load_int(1).load_int(0).op(Opcode::Div).export("inf");
    b.load_int(0).load_int(0).op(Opcode::Div).export("nan");
    b.load_int(-1).load_int(0).op(Opcode::UShr).export("ushr");
    b.load_double(0.1).load_double(0.2).op(Opcode::Add).export("tenths");
    b.load_string("1").load_int(1).op(Opcode::Add).export("concat");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "inf").unwrap(), Value::Number(f64::INFINITY));
    assert!(vm.exported(id, "nan").unwrap().as_number().unwrap().is_nan());
    assert_eq!(vm.exported(id, "ushr").unwrap(), Value::Number(4294967295.0));
    assert_eq!(vm.exported(id, "tenths").unwrap(), Value::Number(0.1 + 0.2));
    assert_eq!(vm.exported(id, "concat").unwrap(), Value::from("11"));
}

#[test]
fn test_equality_operators() {
    let mut b = ModuleBuilder::named("eq");
    b.op(Opcode::LoadNull).op(Opcode::LoadUndefined).op(Opcode::Eq).export("nullish");
    b.op(Opcode::LoadNull).op(Opcode::LoadUndefined).op(Opcode::StrictEq).export("strict_nullish");
    b.load_string("1").load_int(1).op(Opcode::Eq).export("loose");
    b.load_string("1").load_int(1).op(Opcode::StrictNe).export("strict_ne");
    b.load_int(0).load_int(0).op(Opcode::Div).op(Opcode::Dup).op(Opcode::StrictEq).export("nan");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "nullish").unwrap(), Value::Boolean(true));
    assert_eq!(vm.exported(id, "strict_nullish").unwrap(), Value::Boolean(false));
    assert_eq!(vm.exported(id, "loose").unwrap(), Value::Boolean(true));
    assert_eq!(vm.exported(id, "strict_ne").unwrap(), Value::Boolean(true));
    assert_eq!(vm.exported(id, "nan").unwrap(), Value::Boolean(false));
}

#[test]
fn test_typeof_and_not() {
    let mut b = ModuleBuilder::named("typeof");
    b.op(Opcode::LoadNull).op(Opcode::TypeOf).export("null");
    b.load_string("").op(Opcode::Not).export("empty");
    let f = b.begin_function(None);
    b.end_function(f);
    b.op(Opcode::TypeOf).export("function");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "null").unwrap(), Value::from("object"));
    assert_eq!(vm.exported(id, "empty").unwrap(), Value::Boolean(true));
    assert_eq!(vm.exported(id, "function").unwrap(), Value::from("function"));
}

// ============================================================================
// Control flow and scopes
// ============================================================================

#[test]
fn test_while_loop() {
    // let i = 0, total = 0; while (i < 5) { total = total + i; i = i + 1 }
    let mut b = ModuleBuilder::named("loop");
    b.load_int(0).alloc_local("i");
    b.load_int(0).alloc_local("total");
    let head = b.here();
    b.load_local("i").load_int(5).op(Opcode::Lt);
    let exit = b.jump(Opcode::JumpIfFalse);
    b.load_local("total").load_local("i").op(Opcode::Add).store_local("total");
    b.load_local("i").load_int(1).op(Opcode::Add).store_local("i");
    b.jump_to(Opcode::Jump, head);
    b.bind(exit);
    b.load_local("total").export("total");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "total").unwrap(), Value::Number(10.0));
}

#[test]
fn test_block_scope_shadowing() {
    let mut b = ModuleBuilder::named("shadow");
    b.load_int(1).alloc_local("x");
    b.op(Opcode::PushScope);
    b.load_int(2).alloc_local("x");
    b.load_local("x").export("inner");
    b.op(Opcode::PopScope);
    b.load_local("x").export("outer");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "inner").unwrap(), Value::Number(2.0));
    assert_eq!(vm.exported(id, "outer").unwrap(), Value::Number(1.0));
}

#[test]
fn test_store_assigns_enclosing_binding() {
    let mut b = ModuleBuilder::named("assign");
    b.load_int(1).alloc_local("x");
    b.op(Opcode::PushScope);
    b.load_int(9).store_local("x");
    b.op(Opcode::PopScope);
    b.load_local("x").export("x");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "x").unwrap(), Value::Number(9.0));
}

#[test]
fn test_globals_are_visible_to_modules() {
    let mut b = ModuleBuilder::named("globals");
    b.load_local("answer").export("answer");
    let mut vm = Vm::new(VmConfig::default());
    vm.define_global("answer", Value::from(42));
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap();
    assert_eq!(vm.exported(id, "answer").unwrap(), Value::Number(42.0));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_closure_counter_observes_mutation() {
    // function makeCounter() { let count = 0; return function () { count = count + 1; return count } }
    let mut b = ModuleBuilder::named("counter");
    let make = b.begin_function(Some("makeCounter"));
    b.load_int(0).alloc_local("count");
    let inner = b.begin_function(None);
    b.load_local("count").load_int(1).op(Opcode::Add).op(Opcode::Dup).store_local("count");
    b.op(Opcode::Return);
    b.end_function(inner);
    b.op(Opcode::Return);
    b.end_function(make);
    b.op(Opcode::Pop);

    b.load_local("makeCounter").call(0).alloc_local("c");
    b.load_local("c").call(0).op(Opcode::Pop);
    b.load_local("c").call(0).export("second");
    b.load_local("makeCounter").call(0).call(0).export("fresh");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "second").unwrap(), Value::Number(2.0));
    assert_eq!(vm.exported(id, "fresh").unwrap(), Value::Number(1.0));
}

#[test]
fn test_method_call_binds_this() {
    let mut b = ModuleBuilder::named("method");
    b.op(Opcode::ObjAlloc).alloc_local("o");
    b.load_local("o").load_int(10).obj_store("v");
    b.load_local("o");
    let get = b.begin_function(Some("get"));
    b.op(Opcode::LoadThis).obj_load("v").op(Opcode::Return);
    b.end_function(get);
    b.obj_store("get");

    b.load_local("o");
    b.load_local("o").obj_load("get");
    b.call_method(0).export("v");
    b.load_local("get").call(0).op(Opcode::TypeOf).export("unbound");
    let mut vm = Vm::new(VmConfig::default());
    let id = vm.load_module(b.build().unwrap());
    let error = vm.run_module(id).unwrap_err();
    // `this` is undefined in the plain call, so reading `v` throws
    assert_eq!(error.exception().unwrap().kind, ErrorKind::TypeError);
    assert_eq!(vm.exported(id, "v").unwrap(), Value::Number(10.0));
}

#[test]
fn test_missing_arguments_are_undefined() {
    let mut b = ModuleBuilder::named("args");
    b.load_int(1);
    let f = b.begin_function(None);
    b.load_arg(1).op(Opcode::TypeOf).op(Opcode::Return);
    b.end_function(f);
    b.call(1).export("second");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "second").unwrap(), Value::from("undefined"));
}

#[test]
fn test_function_without_return_value_yields_undefined() {
    let mut b = ModuleBuilder::named("void");
    let f = b.begin_function(None);
    b.load_int(1).alloc_local("unused");
    b.end_function(f);
    b.call(0).export("result");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "result").unwrap(), Value::Undefined);
}

#[test]
fn test_host_calls_exported_function() {
    let mut b = ModuleBuilder::named("lib");
    let f = b.begin_function(Some("pair"));
    b.load_arg(0).load_arg(1).op(Opcode::Sub).op(Opcode::Return);
    b.end_function(f);
    b.export("pair");
    let (mut vm, id) = run(b);
    let pair = vm.exported(id, "pair").unwrap();
    let result = vm
        .call_function(&pair, Value::Undefined, &[Value::from(10), Value::from(3)])
        .unwrap();
    assert_eq!(result, Value::Number(7.0));
    assert_eq!(vm.stack_depth(), 0);
    assert_eq!(vm.call_depth(), 0);
}

// ============================================================================
// Objects, arrays, symbols
// ============================================================================

#[test]
fn test_computed_access_and_array_length() {
    let mut b = ModuleBuilder::named("arrays");
    b.op(Opcode::ArrAlloc).alloc_local("a");
    b.load_string("x").load_local("a").load_int(0).op(Opcode::ObjStoreComputed);
    b.load_string("y").load_local("a").load_int(4).op(Opcode::ObjStoreComputed);
    b.load_local("a").obj_load("length").export("length");
    b.load_local("a").load_string("4").op(Opcode::ObjLoadComputed).export("last");
    b.load_local("a").load_int(2).op(Opcode::ObjLoadComputed).export("hole");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "length").unwrap(), Value::Number(5.0));
    assert_eq!(vm.exported(id, "last").unwrap(), Value::from("y"));
    assert_eq!(vm.exported(id, "hole").unwrap(), Value::Undefined);
}

#[test]
fn test_prototype_chain_of_primitives() {
    let mut b = ModuleBuilder::named("primitives");
    b.load_string("hello").obj_load("length").export("length");
    b.load_int(5);
    b.load_int(5).obj_load("toString");
    b.call_method(0).export("five");
    let (mut vm, id) = run(b);
    assert_eq!(vm.exported(id, "length").unwrap(), Value::Number(5.0));
    assert_eq!(vm.exported(id, "five").unwrap(), Value::from("5"));
}

#[test]
fn test_symbol_keyed_properties() {
    let mut vm = Vm::new(VmConfig::default());
    let key = vm.new_symbol("key");
    vm.define_global("key", key);

    let mut b = ModuleBuilder::named("symbols");
    b.op(Opcode::ObjAlloc).alloc_local("o");
    b.load_int(3).load_local("o").load_local("key").op(Opcode::ObjStoreSymbol);
    b.load_local("o").load_local("key").op(Opcode::ObjLoadSymbol).export("viaSymbol");
    b.load_local("o").load_string("key").op(Opcode::ObjLoadComputed).export("viaString");
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap();
    assert_eq!(vm.exported(id, "viaSymbol").unwrap(), Value::Number(3.0));
    assert_eq!(vm.exported(id, "viaString").unwrap(), Value::Undefined);
}

#[test]
fn test_to_primitive_symbol_drives_addition() {
    let mut vm = Vm::new(VmConfig::default());
    let to_primitive = Value::Symbol(vm.intrinsics().symbol_to_primitive);
    vm.define_global("toPrimitive", to_primitive);

    // o[Symbol.toPrimitive] = function (hint) { return hint === "number" ? 42 : "str" }
    let mut b = ModuleBuilder::named("toprimitive");
    b.op(Opcode::ObjAlloc).alloc_local("o");
    let f = b.begin_function(None);
    b.load_arg(0).load_string("number").op(Opcode::StrictEq);
    let other = b.jump(Opcode::JumpIfFalse);
    b.load_int(42).op(Opcode::Return);
    b.bind(other);
    b.load_string("str").op(Opcode::Return);
    b.end_function(f);
    b.load_local("o").load_local("toPrimitive").op(Opcode::ObjStoreSymbol);

    b.load_local("o").load_int(1).op(Opcode::Add).export("sum");
    b.load_local("o").load_int(1).op(Opcode::Mul).export("product");
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap();
    assert_eq!(vm.exported(id, "sum").unwrap(), Value::from("str1"));
    assert_eq!(vm.exported(id, "product").unwrap(), Value::Number(42.0));
}

// ============================================================================
// Modules, bundles and GC
// ============================================================================

#[test]
fn test_bundle_lookup_falls_back_to_native_modules() {
    let mut lib = ModuleBuilder::named("lib");
    lib.load_int(7).export("seven");
    let mut main = ModuleBuilder::named("main");
    main.load_int(1).export("one");
    let bundle = Bundle::new(
        bytecode_system::module_hash("main"),
        vec![lib.build().unwrap(), main.build().unwrap()],
    )
    .unwrap();

    let mut vm = Vm::new(VmConfig::default());
    let native = vm.new_object();
    vm.define_value(native, "name", Value::from("native")).unwrap();
    vm.register_native_module(bytecode_system::module_hash("native:test"), native);

    vm.run_entry(bundle).unwrap();
    let lib = vm.resolve_module(bytecode_system::module_hash("lib")).unwrap().unwrap();
    assert_eq!(
        vm.get_property(&Value::Object(lib), &"seven".into()).unwrap(),
        Value::Number(7.0)
    );
    let native_exports = vm
        .resolve_module(bytecode_system::module_hash("native:test"))
        .unwrap();
    assert_eq!(native_exports, Some(native));
}

#[test]
fn test_cleared_binding_is_collected() {
    let mut b = ModuleBuilder::named("gc");
    b.op(Opcode::ObjAlloc).alloc_local("tmp");
    b.op(Opcode::LoadNull).store_local("tmp");
    let (mut vm, _) = run(b);
    let live_before = vm.gc_stats().live;
    let stats = vm.collect_garbage();
    assert_eq!(stats.last_freed, 1);
    assert_eq!(stats.live, live_before - 1);
}

#[test]
fn test_threshold_collection_keeps_reachable_values() {
    let mut b = ModuleBuilder::named("churn");
    b.op(Opcode::ObjAlloc).alloc_local("keep");
    b.load_local("keep").load_int(1).obj_store("v");
    b.load_int(0).alloc_local("i");
    let head = b.here();
    b.load_local("i").load_int(200).op(Opcode::Lt);
    let exit = b.jump(Opcode::JumpIfFalse);
    b.op(Opcode::ObjAlloc).op(Opcode::Pop);
    b.load_local("i").load_int(1).op(Opcode::Add).store_local("i");
    b.jump_to(Opcode::Jump, head);
    b.bind(exit);
    b.load_local("keep").obj_load("v").export("v");

    let mut vm = Vm::new(VmConfig::default().with_gc_threshold(16));
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap();
    assert!(vm.gc_stats().collections > 0);
    assert_eq!(vm.exported(id, "v").unwrap(), Value::Number(1.0));
}

#[test]
fn test_collection_inside_to_string_keeps_popped_operands() {
    // let key = {}; key.toString = function () { forty objects; return "x" }
    let mut b = ModuleBuilder::named("coerce-gc");
    b.op(Opcode::ObjAlloc).alloc_local("key");
    b.load_local("key");
    let body = b.begin_function(None);
    for _ in 0..40 {
        b.op(Opcode::ObjAlloc).op(Opcode::Pop);
    }
    b.load_string("x").op(Opcode::Return);
    b.end_function(body);
    b.obj_store("toString");
    // ({ x: 5 })[key]
    b.op(Opcode::ObjAlloc).op(Opcode::Dup).load_int(5).obj_store("x");
    b.load_local("key").op(Opcode::ObjLoadComputed).export("value");

    let mut vm = Vm::new(VmConfig::default().with_gc_threshold(8));
    let id = vm.load_module(b.build().unwrap());
    vm.run_module(id).unwrap();
    assert!(vm.gc_stats().collections >= 3);
    assert_eq!(vm.exported(id, "value").unwrap(), Value::Number(5.0));
}

#[test]
fn test_output_can_be_captured() {
    let mut vm = Vm::new(VmConfig::default());
    let out = SharedOutput::new();
    vm.set_output(out.clone());
    writeln!(vm.output(), "captured").unwrap();
    assert_eq!(out.contents(), "captured\n");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_uncaught_exception_carries_stack() {
    // function thrower() { return missing }  function outer() { return thrower() }  outer()
    let mut b = ModuleBuilder::named("trace");
    let thrower = b.begin_function(Some("thrower"));
    b.load_local("missing").op(Opcode::Return);
    b.end_function(thrower);
    b.op(Opcode::Pop);
    let outer = b.begin_function(Some("outer"));
    b.load_local("thrower").call(0).op(Opcode::Return);
    b.end_function(outer);
    b.op(Opcode::Pop);
    b.load_local("outer").call(0);

    let error = run_err(b);
    let exception = error.exception().unwrap();
    assert_eq!(exception.kind, ErrorKind::ReferenceError);
    let names: Vec<_> = exception.stack.iter().map(|f| f.function_name.as_deref()).collect();
    assert_eq!(names, vec![Some("thrower"), Some("outer"), None]);
    let position = error.position().unwrap();
    assert_eq!(position.module_hash, bytecode_system::module_hash("trace"));
    assert_eq!(position.instruction, 1);
}

#[test]
fn test_reading_property_of_undefined() {
    let mut b = ModuleBuilder::named("undef");
    b.op(Opcode::LoadUndefined).obj_load("x");
    let error = run_err(b);
    let exception = error.exception().unwrap();
    assert_eq!(exception.kind, ErrorKind::TypeError);
    assert_eq!(exception.message, "Cannot read properties of undefined (reading 'x')");
}

#[test]
fn test_calling_non_function_is_fatal() {
    let mut b = ModuleBuilder::named("notfn");
    b.load_int(1).call(0);
    match run_err(b) {
        VmError::Fatal { error, position } => {
            assert_eq!(error, FatalError::NotCallable("number"));
            assert_eq!(position.unwrap().instruction, 1);
        }
        other => panic!("expected fatal error, got {other}"),
    }
}

#[test]
fn test_pop_scope_at_global_is_fatal() {
    let mut b = ModuleBuilder::named("underflow");
    b.op(Opcode::PopScope).op(Opcode::PopScope);
    match run_err(b) {
        VmError::Fatal { error, .. } => assert_eq!(error, FatalError::ScopeUnderflow),
        other => panic!("expected fatal error, got {other}"),
    }
}

#[test]
fn test_unbounded_recursion_hits_call_depth_limit() {
    let mut b = ModuleBuilder::named("recurse");
    let f = b.begin_function(Some("f"));
    b.load_local("f").call(0).op(Opcode::Return);
    b.end_function(f);
    b.call(0);
    let mut vm = Vm::new(VmConfig::default().with_max_call_depth(32));
    let id = vm.load_module(b.build().unwrap());
    let error = vm.run_module(id).unwrap_err();
    assert_eq!(error.exception().unwrap().kind, ErrorKind::RangeError);
    assert_eq!(vm.call_depth(), 0);
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn test_operand_stack_overflow_is_fatal() {
    let mut b = ModuleBuilder::named("overflow");
    for i in 0..8 {
        b.load_int(i);
    }
    let mut vm = Vm::new(VmConfig::default().with_stack_size(4));
    let id = vm.load_module(b.build().unwrap());
    match vm.run_module(id).unwrap_err() {
        VmError::Fatal { error, .. } => assert_eq!(error, FatalError::StackOverflow(4)),
        other => panic!("expected fatal error, got {other}"),
    }
}
