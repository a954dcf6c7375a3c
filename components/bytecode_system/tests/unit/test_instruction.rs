//! Instruction encoding tests

use bytecode_system::{Instruction, Opcode, Operand};

#[test]
fn test_encoded_lengths() {
    assert_eq!(Instruction::new(Opcode::Add).encoded_len(), 1);
    assert_eq!(Instruction::load_int(0).encoded_len(), 5);
    assert_eq!(Instruction::load_double(0.0).encoded_len(), 9);
    assert_eq!(Instruction::with_u16(Opcode::Jump, 0).encoded_len(), 3);
}

#[test]
fn test_double_is_little_endian() {
    let mut out = Vec::new();
    Instruction::load_double(1.0).encode(&mut out);
    assert_eq!(&out[1..], &1.0f64.to_le_bytes());
}

#[test]
fn test_u16_operand_accessor() {
    assert_eq!(Instruction::with_u16(Opcode::LoadArg, 3).u16_operand(), Some(3));
    assert_eq!(
        Instruction::with_u16_pair(Opcode::FuncDecl, 4, 9).u16_operand(),
        Some(4)
    );
    assert_eq!(Instruction::new(Opcode::Pop).u16_operand(), None);
    assert_eq!(Instruction::new(Opcode::Pop).operand, Operand::None);
}
