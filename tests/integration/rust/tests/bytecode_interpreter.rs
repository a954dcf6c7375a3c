//! Bytecode System and Interpreter Integration Tests
//!
//! Modules are encoded to their binary image, decoded again and executed,
//! so the interpreter only ever sees what a file on disk would contain.

use bytecode_system::{module_hash, Bundle, Module, ModuleBuilder, Opcode};
use core_types::{ErrorKind, Value};
use interpreter::{FatalError, Vm, VmConfig, VmError};

fn through_image(b: ModuleBuilder) -> Module {
    let bytes = b.build().unwrap().to_bytes();
    Module::from_bytes(&bytes).unwrap()
}

fn run_image(b: ModuleBuilder) -> (Vm, memory_manager::ModuleId) {
    let mut vm = Vm::new(VmConfig::default());
    let id = vm.load_module(through_image(b));
    vm.run_module(id).unwrap();
    (vm, id)
}

/// Test: loop with a forward exit and a backward jump survives encoding
#[test]
fn test_loop_from_image() {
    // let total = 0; let i = 1; while (i <= 10) { total = total + i; i = i + 1 }
    let mut b = ModuleBuilder::named("loop");
    b.load_int(0).alloc_local("total");
    b.load_int(1).alloc_local("i");
    let head = b.here();
    b.load_local("i").load_int(10).op(Opcode::Le);
    let exit = b.jump(Opcode::JumpIfFalse);
    b.load_local("total").load_local("i").op(Opcode::Add).store_local("total");
    b.load_local("i").load_int(1).op(Opcode::Add).store_local("i");
    b.jump_to(Opcode::Jump, head);
    b.bind(exit);
    b.load_local("total").export("total");

    let (mut vm, id) = run_image(b);
    assert_eq!(vm.exported(id, "total").unwrap(), Value::Number(55.0));
}

/// Test: recursion through a named function declaration
#[test]
fn test_recursive_fibonacci_from_image() {
    // function fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2) }
    let mut b = ModuleBuilder::named("fib");
    let fib = b.begin_function(Some("fib"));
    b.load_arg(0).load_int(2).op(Opcode::Lt);
    let recurse = b.jump(Opcode::JumpIfFalse);
    b.load_arg(0).op(Opcode::Return);
    b.bind(recurse);
    b.load_arg(0).load_int(1).op(Opcode::Sub).load_local("fib").call(1);
    b.load_arg(0).load_int(2).op(Opcode::Sub).load_local("fib").call(1);
    b.op(Opcode::Add).op(Opcode::Return);
    b.end_function(fib);
    b.op(Opcode::Pop);
    b.load_int(15).load_local("fib").call(1).export("fib15");

    let (mut vm, id) = run_image(b);
    assert_eq!(vm.exported(id, "fib15").unwrap(), Value::Number(610.0));
}

/// Test: string table entries decode to the same strings
#[test]
fn test_strings_from_image() {
    let mut b = ModuleBuilder::named("strings");
    b.load_string("héllo").load_string(", wörld").op(Opcode::Add).export("s");
    b.load_string("").op(Opcode::TypeOf).export("t");

    let (mut vm, id) = run_image(b);
    assert_eq!(vm.exported(id, "s").unwrap(), Value::from("héllo, wörld"));
    assert_eq!(vm.exported(id, "t").unwrap(), Value::from("string"));
}

/// Test: a decoded bundle runs its entry point, which reads another
/// module's exports after running it on demand
#[test]
fn test_bundle_image_cross_module() {
    let mut lib = ModuleBuilder::named("lib");
    let square = lib.begin_function(Some("square"));
    lib.load_arg(0).load_arg(0).op(Opcode::Mul).op(Opcode::Return);
    lib.end_function(square);
    lib.export("square");

    let mut main = ModuleBuilder::named("main");
    main.load_int(9);
    main.load_string("lib").load_local("require").call(1).obj_load("square");
    main.call(1).export("result");

    let bundle = Bundle::new(
        module_hash("main"),
        vec![lib.build().unwrap(), main.build().unwrap()],
    )
    .unwrap();
    let decoded = Bundle::from_bytes(&bundle.to_bytes()).unwrap();

    let mut vm = Vm::new(VmConfig::default());
    builtins::install(&mut vm).unwrap();
    // `require(name)` as a plain global for this test
    let module = vm.global("module").unwrap();
    let require = vm.get_property(&module, &"require".into()).unwrap();
    vm.define_global("require", require);

    let exports = vm.run_entry(decoded).unwrap();
    let result = vm
        .get_property(&Value::Object(exports), &"result".into())
        .unwrap();
    assert_eq!(result, Value::Number(81.0));
}

/// Test: a bundle whose entry point is missing is a fatal error
#[test]
fn test_bundle_without_entry() {
    let lib = ModuleBuilder::named("lib").build().unwrap();
    let bundle = Bundle::new(module_hash("absent"), vec![lib]).unwrap();
    let mut vm = Vm::new(VmConfig::default());
    let error = vm.run_entry(bundle).unwrap_err();
    assert!(matches!(
        error,
        VmError::Fatal { error: FatalError::UnknownModule(_), .. }
    ));
}

/// Test: exceptions thrown in one module carry that module's position
#[test]
fn test_exception_position_from_image() {
    let mut b = ModuleBuilder::new(0xabc);
    b.load_int(1).op(Opcode::Pop);
    b.op(Opcode::LoadNull).obj_load("missing");
    let mut vm = Vm::new(VmConfig::default());
    let id = vm.load_module(through_image(b));
    let error = vm.run_module(id).unwrap_err();

    let exception = error.exception().unwrap();
    assert_eq!(exception.kind, ErrorKind::TypeError);
    let position = error.position().unwrap();
    assert_eq!(position.module_hash, 0xabc);
    assert_eq!(position.instruction, 3);
}
