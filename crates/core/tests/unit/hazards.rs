//! Hazard Classifier and Stall Calculator Tests.
//!
//! Verifies the opcode partition of the classifier functions and the exact
//! stall policy: 2 cycles for a load feeding a branch, 1 cycle for a load
//! feeding any other register reader, 1 cycle for a forwarded arithmetic
//! result feeding a branch, 0 otherwise.

use proptest::prelude::*;
use rstest::rstest;
use rvpipe_core::core::pipeline::{hazards, StageEntry};
use rvpipe_core::isa::operation::{Format, Opcode};

/// A stage entry carrying just what the hazard logic reads: opcode + raw word.
fn stage(op: Opcode, inst: u32) -> StageEntry {
    StageEntry {
        inst,
        op,
        format: Format::N,
        handler: None,
        cycles: 0,
        fetched_pc: 0,
    }
}

/// Raw word with only the rd field set (producer side).
fn writing_to(rd: u32) -> u32 {
    rd << 7
}

/// Raw word with only the source register fields set (consumer side).
fn reading(rs1: u32, rs2: u32) -> u32 {
    (rs1 << 15) | (rs2 << 20)
}

// ══════════════════════════════════════════════════════════
// 1. Classifier partitions
// ══════════════════════════════════════════════════════════

#[test]
fn branches_are_exactly_the_six_conditional_ops() {
    let branches = [
        Opcode::Beq,
        Opcode::Bne,
        Opcode::Blt,
        Opcode::Bge,
        Opcode::Bltu,
        Opcode::Bgeu,
    ];
    for op in branches {
        assert!(hazards::is_branch(op), "{} must classify as branch", op.mnemonic());
    }
    let total = Opcode::ALL.iter().filter(|op| hazards::is_branch(**op)).count();
    assert_eq!(total, 6, "no other opcode may classify as branch");
}

#[test]
fn loads_include_integer_and_fp_loads() {
    let loads = [
        Opcode::Lb,
        Opcode::Lh,
        Opcode::Lw,
        Opcode::Lbu,
        Opcode::Lhu,
        Opcode::Flw,
        Opcode::Fld,
    ];
    for op in loads {
        assert!(hazards::is_load(op), "{} must classify as load", op.mnemonic());
    }
    let total = Opcode::ALL.iter().filter(|op| hazards::is_load(**op)).count();
    assert_eq!(total, 7);
}

#[test]
fn read_arity_partition() {
    // rs1-only: indirect jump, immediate arithmetic, every load.
    for op in [Opcode::Jalr, Opcode::Lw, Opcode::Flw, Opcode::Addi, Opcode::Srai] {
        assert_eq!(hazards::reg_read_arity(op), 1, "{}", op.mnemonic());
    }
    // rs1+rs2: branches, stores, register-register arithmetic.
    for op in [Opcode::Beq, Opcode::Sw, Opcode::Fsd, Opcode::Add, Opcode::Sra] {
        assert_eq!(hazards::reg_read_arity(op), 2, "{}", op.mnemonic());
    }
    // No integer sources.
    for op in [Opcode::Lui, Opcode::Auipc, Opcode::Jal, Opcode::Fence, Opcode::FmaddS] {
        assert_eq!(hazards::reg_read_arity(op), 0, "{}", op.mnemonic());
    }

    let ones = Opcode::ALL.iter().filter(|op| hazards::reg_read_arity(**op) == 1).count();
    let twos = Opcode::ALL.iter().filter(|op| hazards::reg_read_arity(**op) == 2).count();
    assert_eq!(ones, 17);
    assert_eq!(twos, 21);
}

#[test]
fn register_writers_exclude_upper_immediates_jumps_and_loads() {
    for op in [Opcode::Addi, Opcode::Slli, Opcode::Add, Opcode::And] {
        assert!(hazards::writes_reg(op), "{}", op.mnemonic());
    }
    for op in [Opcode::Lui, Opcode::Auipc, Opcode::Jal, Opcode::Jalr, Opcode::Lw, Opcode::Flw] {
        assert!(!hazards::writes_reg(op), "{}", op.mnemonic());
    }
    let total = Opcode::ALL.iter().filter(|op| hazards::writes_reg(**op)).count();
    assert_eq!(total, 19);
}

// ══════════════════════════════════════════════════════════
// 2. Stall policy table
// ══════════════════════════════════════════════════════════

#[rstest]
// Load feeding a branch: 2 cycles, on either source.
#[case(Opcode::Lw, Opcode::Beq, 5, 5, 0, 2)]
#[case(Opcode::Lw, Opcode::Bne, 7, 0, 7, 2)]
#[case(Opcode::Fld, Opcode::Bgeu, 9, 9, 9, 2)]
// Load feeding an rs1-only reader: 1 cycle, rs1 only.
#[case(Opcode::Lw, Opcode::Addi, 5, 5, 0, 1)]
#[case(Opcode::Lbu, Opcode::Jalr, 3, 3, 0, 1)]
#[case(Opcode::Flw, Opcode::Srai, 12, 12, 0, 1)]
// Load feeding a two-source reader: 1 cycle, either source.
#[case(Opcode::Lw, Opcode::Add, 5, 0, 5, 1)]
#[case(Opcode::Lh, Opcode::Sw, 8, 8, 0, 1)]
#[case(Opcode::Lw, Opcode::Bltu, 4, 0, 0, 0)]
// Forwarded arithmetic feeding a branch: 1 cycle.
#[case(Opcode::Add, Opcode::Beq, 6, 6, 0, 1)]
#[case(Opcode::Addi, Opcode::Blt, 2, 0, 2, 1)]
// Forwarded arithmetic feeding a non-branch: no stall.
#[case(Opcode::Add, Opcode::Add, 6, 6, 6, 0)]
#[case(Opcode::Addi, Opcode::Sw, 2, 2, 2, 0)]
// Producers without a stall rule of their own.
#[case(Opcode::Lui, Opcode::Beq, 6, 6, 0, 0)]
#[case(Opcode::Jal, Opcode::Beq, 1, 1, 0, 0)]
// Independent registers.
#[case(Opcode::Lw, Opcode::Beq, 5, 6, 7, 0)]
#[case(Opcode::Add, Opcode::Beq, 5, 6, 7, 0)]
fn stall_policy(
    #[case] producer: Opcode,
    #[case] consumer: Opcode,
    #[case] rd: u32,
    #[case] rs1: u32,
    #[case] rs2: u32,
    #[case] expected: u64,
) {
    let decode = stage(producer, writing_to(rd));
    let fetch = stage(consumer, reading(rs1, rs2));
    assert_eq!(
        hazards::stall_cycles(&decode, &fetch),
        expected,
        "{} -> {} (rd={rd}, rs1={rs1}, rs2={rs2})",
        producer.mnemonic(),
        consumer.mnemonic(),
    );
}

/// Register fields are read at fixed offsets from the raw words, so other
/// bits in the encodings must never affect the result.
#[test]
fn stall_ignores_unrelated_bits() {
    // Fill the immediate, funct3, opcode, and rd fields with noise.
    let decode = stage(Opcode::Lw, writing_to(5) | 0xFFF0_0000 | (0x7 << 12) | 0x7F);
    let fetch = stage(Opcode::Beq, reading(5, 31) | (0x1F << 7) | (0x7 << 12) | 0x7F);
    assert_eq!(hazards::stall_cycles(&decode, &fetch), 2);
}

// ══════════════════════════════════════════════════════════
// 3. Policy over the whole register space
// ══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn load_to_branch_is_two_or_zero(rd in 0u32..32, rs1 in 0u32..32, rs2 in 0u32..32) {
        let decode = stage(Opcode::Lw, writing_to(rd));
        let fetch = stage(Opcode::Beq, reading(rs1, rs2));
        let expected = if rs1 == rd || rs2 == rd { 2 } else { 0 };
        prop_assert_eq!(hazards::stall_cycles(&decode, &fetch), expected);
    }

    #[test]
    fn load_to_rs1_reader_is_one_or_zero(rd in 0u32..32, rs1 in 0u32..32, rs2 in 0u32..32) {
        let decode = stage(Opcode::Lw, writing_to(rd));
        // rs2 bits overlap the immediate for rs1-only readers and must not count.
        let fetch = stage(Opcode::Addi, reading(rs1, rs2));
        let expected = u64::from(rs1 == rd);
        prop_assert_eq!(hazards::stall_cycles(&decode, &fetch), expected);
    }

    #[test]
    fn load_to_two_source_reader_is_one_or_zero(rd in 0u32..32, rs1 in 0u32..32, rs2 in 0u32..32) {
        let decode = stage(Opcode::Fld, writing_to(rd));
        let fetch = stage(Opcode::Sub, reading(rs1, rs2));
        let expected = u64::from(rs1 == rd || rs2 == rd);
        prop_assert_eq!(hazards::stall_cycles(&decode, &fetch), expected);
    }

    #[test]
    fn writer_to_branch_is_one_or_zero(rd in 0u32..32, rs1 in 0u32..32, rs2 in 0u32..32) {
        let decode = stage(Opcode::Xor, writing_to(rd));
        let fetch = stage(Opcode::Bge, reading(rs1, rs2));
        let expected = u64::from(rs1 == rd || rs2 == rd);
        prop_assert_eq!(hazards::stall_cycles(&decode, &fetch), expected);
    }

    #[test]
    fn writer_to_non_branch_never_stalls(rd in 0u32..32, rs1 in 0u32..32, rs2 in 0u32..32) {
        let decode = stage(Opcode::Add, writing_to(rd));
        let fetch = stage(Opcode::And, reading(rs1, rs2));
        prop_assert_eq!(hazards::stall_cycles(&decode, &fetch), 0);
    }
}
