//! End-to-End CLI Integration Tests
//!
//! Images written to disk and run through the `vm_cli` runtime with the
//! built-ins installed. This is the highest level integration test.

use bytecode_system::{module_hash, Bundle, ModuleBuilder, Opcode};
use interpreter::{SharedOutput, VmConfig};
use std::io::Write;
use tempfile::NamedTempFile;
use vm_cli::{CliError, Runtime};

fn run_file(bytes: &[u8], config: VmConfig) -> (Result<(), CliError>, String) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();

    let mut runtime = Runtime::new(config).unwrap().with_print_exports(true);
    let out = SharedOutput::new();
    runtime.vm().set_output(out.clone());
    let result = runtime.execute_file(file.path()).map(|_| ());
    (result, out.contents())
}

/// Test: program using console, Object and Symbol through the core module
#[test]
fn test_e2e_core_module_program() {
    // const core = module.require("native:core");
    // const o = core.Object.create(null); o.x = 1;
    // core.console.log("keys", core.Object.keys(o).length);
    let mut main = ModuleBuilder::named("main");
    main.load_string(builtins::CORE_MODULE);
    main.load_local("module");
    main.load_local("module").obj_load("require");
    main.call_method(1).alloc_local("core");

    main.op(Opcode::LoadNull);
    main.load_local("core").obj_load("Object");
    main.load_local("core").obj_load("Object").obj_load("create");
    main.call_method(1).alloc_local("o");
    main.load_local("o").load_int(1).obj_store("x");

    main.load_local("o");
    main.load_local("core").obj_load("Object");
    main.load_local("core").obj_load("Object").obj_load("keys");
    main.call_method(1).obj_load("length");
    main.load_string("keys");
    main.load_local("core").obj_load("console");
    main.load_local("core").obj_load("console").obj_load("log");
    main.call_method(2).op(Opcode::Pop);
    main.load_local("o").obj_load("x").export("x");

    let bundle = Bundle::new(module_hash("main"), vec![main.build().unwrap()]).unwrap();
    let (result, output) = run_file(&bundle.to_bytes(), VmConfig::default());
    result.unwrap();
    assert_eq!(output, "keys 1\nx: 1\n");
}

/// Test: deep recursion is a catchable RangeError, not a host crash
#[test]
fn test_e2e_runaway_recursion() {
    let mut b = ModuleBuilder::named("runaway");
    let f = b.begin_function(Some("f"));
    b.load_local("f").call(0).op(Opcode::Return);
    b.end_function(f);
    b.op(Opcode::Pop);
    b.load_local("f").call(0);

    let config = VmConfig::default().with_max_call_depth(50);
    let (result, _) = run_file(&b.build().unwrap().to_bytes(), config);
    let Err(CliError::Vm(error)) = result else {
        panic!("expected a VM error");
    };
    let exception = error.exception().unwrap();
    assert_eq!(exception.kind, core_types::ErrorKind::RangeError);
    assert_eq!(CliError::Vm(error).exit_code(), 70);
}

/// Test: `gc()` from script runs a collection
#[test]
fn test_e2e_script_requested_collection() {
    let mut b = ModuleBuilder::named("gc-call");
    b.op(Opcode::ObjAlloc).op(Opcode::Pop);
    b.load_local("gc").call(0).op(Opcode::Pop);
    b.load_int(1).export("ran");

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&b.build().unwrap().to_bytes()).unwrap();
    let mut runtime = Runtime::new(VmConfig::default()).unwrap();
    runtime.execute_file(file.path()).unwrap();
    assert!(runtime.vm().gc_stats().collections >= 1);
}
