//! Module and bundle format tests

use bytecode_system::{
    detect_image, module_hash, Bundle, FormatError, ImageKind, Instruction, Module, ModuleBuilder,
    Opcode, StringTable,
};

fn sum_module() -> Module {
    let mut b = ModuleBuilder::named("sum");
    b.load_int(2).load_int(3).op(Opcode::Add).export("sum");
    b.build().unwrap()
}

#[test]
fn test_module_image_layout() {
    let bytes = sum_module().to_bytes();
    // header 22 + string table (8 + 4 + 3) + data (8 + 5 + 5 + 1 + 3)
    assert_eq!(bytes.len(), 22 + 15 + 22);
    let data_offset = u32::from_le_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]);
    assert_eq!(data_offset, 37);
    let hash = u64::from_le_bytes(bytes[6..14].try_into().unwrap());
    assert_eq!(hash, module_hash("sum"));
}

#[test]
fn test_module_decodes_to_equal_module() {
    let module = sum_module();
    let decoded = Module::from_bytes(&module.to_bytes()).unwrap();
    assert_eq!(decoded, module);
    assert_eq!(decoded.string(0).map(|s| s.as_str()), Some("sum"));
}

#[test]
fn test_data_length_mismatch_is_rejected() {
    let mut bytes = sum_module().to_bytes();
    // Inflate the declared data section length.
    bytes[37] = bytes[37].wrapping_add(1);
    assert!(matches!(
        Module::from_bytes(&bytes),
        Err(FormatError::MalformedSection { section: "data", .. })
    ));
}

#[test]
fn test_empty_input_is_truncated() {
    assert!(matches!(Module::from_bytes(&[]), Err(FormatError::Truncated { .. })));
    assert!(matches!(Bundle::from_bytes(b".Ax"), Err(FormatError::Truncated { .. })));
}

#[test]
fn test_bundle_sorts_and_detects() {
    let other = Module::new(1, StringTable::new(), vec![Instruction::new(Opcode::Nop)]).unwrap();
    let main = sum_module();
    let bundle = Bundle::new(main.hash(), vec![main.clone(), other]).unwrap();
    let bytes = bundle.to_bytes();
    assert_eq!(detect_image(&bytes), Some(ImageKind::Bundle));
    assert_eq!(detect_image(&main.to_bytes()), Some(ImageKind::Module));

    let decoded = Bundle::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.modules()[0].hash(), 1);
    assert_eq!(decoded.entry(), Some(&main));
}
