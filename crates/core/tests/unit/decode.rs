//! Decode Table Tests.
//!
//! Checks that representative encodings land on the right operation, format,
//! and occupancy, and that unrecognized words come back handler-less.

use rvpipe_core::core::exec::decode;
use rvpipe_core::isa::instruction::{sign_extend, InstructionBits};
use rvpipe_core::isa::operation::{Format, Opcode};

use crate::common::InstructionBuilder;

#[test]
fn addi_decodes_as_register_immediate() {
    // addi x10, x0, 10
    let d = decode(0x00A0_0513);
    assert_eq!(d.op, Opcode::Addi);
    assert_eq!(d.format, Format::I);
    assert!(d.handler.is_some());
    assert_eq!(d.cycles, 0);
}

#[test]
fn drain_word_decodes_as_add() {
    // add x0, x0, x0 — the drain no-operation.
    let d = decode(0x0000_0033);
    assert_eq!(d.op, Opcode::Add);
    assert_eq!(d.format, Format::R);
}

#[test]
fn branch_and_store_formats() {
    let beq = decode(InstructionBuilder::new().beq(1, 2, 8).build());
    assert_eq!(beq.op, Opcode::Beq);
    assert_eq!(beq.format, Format::B);

    let sw = decode(InstructionBuilder::new().sw(1, 2, -12).build());
    assert_eq!(sw.op, Opcode::Sw);
    assert_eq!(sw.format, Format::S);
}

#[test]
fn fused_ops_occupy_execute_longer() {
    let d = decode(InstructionBuilder::new().fmadd_s(2, 1, 1, 1).build());
    assert_eq!(d.op, Opcode::FmaddS);
    assert_eq!(d.format, Format::R4);
    assert_eq!(d.cycles, 2);
}

#[test]
fn unrecognized_words_are_handler_less() {
    for word in [0x0000_0000, 0xFFFF_FFFF, 0x0000_0057] {
        let d = decode(word);
        assert_eq!(d.op, Opcode::Illegal, "word {word:#010x}");
        assert!(d.handler.is_none(), "word {word:#010x}");
    }
}

#[test]
fn srai_distinguished_from_srli_by_funct7() {
    // srli x1, x1, 3  /  srai x1, x1, 3
    let srli = decode((3 << 20) | (1 << 15) | (0b101 << 12) | (1 << 7) | 0b0010011);
    let srai = decode((0b0100000 << 25) | (3 << 20) | (1 << 15) | (0b101 << 12) | (1 << 7) | 0b0010011);
    assert_eq!(srli.op, Opcode::Srli);
    assert_eq!(srai.op, Opcode::Srai);
}

#[test]
fn branch_immediate_fields_round_trip() {
    let word = InstructionBuilder::new().beq(3, 4, -8).build();
    let imm = (word.b_imm_12() << 12)
        | (word.b_imm_11() << 11)
        | (word.b_imm_10_5() << 5)
        | (word.b_imm_4_1() << 1);
    assert_eq!(sign_extend(imm, 13), -8);
    assert_eq!(word.rs1(), 3);
    assert_eq!(word.rs2(), 4);
}

#[test]
fn jump_immediate_fields_round_trip() {
    let word = InstructionBuilder::new().jal(1, -4).build();
    let imm = (word.j_imm_20() << 20)
        | (word.j_imm_19_12() << 12)
        | (word.j_imm_11() << 11)
        | (word.j_imm_10_1() << 1);
    assert_eq!(sign_extend(imm, 21), -4);
    assert_eq!(word.rd(), 1);
}
