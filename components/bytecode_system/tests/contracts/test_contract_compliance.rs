//! Contract compliance tests for bytecode_system
//!
//! These pin the binary format other tools produce and consume.

use bytecode_system::{Bundle, Module, ModuleBuilder, Opcode, BUNDLE_MAGIC, MODULE_MAGIC};

/// Contract: magic bytes are ".AxM" and ".AxB"
#[test]
fn contract_magic_bytes() {
    assert_eq!(&MODULE_MAGIC, b".AxM");
    assert_eq!(&BUNDLE_MAGIC, b".AxB");
}

/// Contract: a hand-written version-2 image decodes
#[test]
fn contract_decodes_hand_written_module() {
    let mut image = Vec::new();
    image.extend_from_slice(b".AxM");
    image.extend_from_slice(&2u16.to_le_bytes());
    image.extend_from_slice(&0x0000_0002_0000_0001u64.to_le_bytes());
    image.extend_from_slice(&22u32.to_le_bytes());
    image.extend_from_slice(&(22u32 + 13).to_le_bytes());
    // string table: length 13, one entry "x"
    image.extend_from_slice(&13u32.to_le_bytes());
    image.extend_from_slice(&1u32.to_le_bytes());
    image.extend_from_slice(&0u32.to_le_bytes());
    image.push(b'x');
    // data: LD_INT 7; ALLOC_LOCAL 0
    image.extend_from_slice(&(8u32 + 5 + 3).to_le_bytes());
    image.extend_from_slice(&2u32.to_le_bytes());
    image.push(Opcode::LoadInt.byte());
    image.extend_from_slice(&7i32.to_le_bytes());
    image.push(Opcode::AllocLocal.byte());
    image.extend_from_slice(&0u16.to_le_bytes());

    let module = Module::from_bytes(&image).unwrap();
    assert_eq!(module.hash(), 0x0000_0002_0000_0001);
    assert_eq!(module.len(), 2);
    assert_eq!(module.string(0).map(|s| s.as_str()), Some("x"));
    assert_eq!(module.to_bytes(), image);
}

/// Contract: bundle header is magic, version 1, entry hash, u16 count
#[test]
fn contract_bundle_header() {
    let module = ModuleBuilder::new(42).build().unwrap();
    let bytes = Bundle::new(42, vec![module]).unwrap().to_bytes();
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 1);
    assert_eq!(u64::from_le_bytes(bytes[6..14].try_into().unwrap()), 42);
    assert_eq!(u16::from_le_bytes([bytes[14], bytes[15]]), 1);
}
