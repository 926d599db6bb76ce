//! Driver Equivalence Tests.
//!
//! The pipelined and fast drivers disagree about cycle counts by design, but
//! they must agree about architecture: the same program leaves the same
//! register file and memory behind either way.

use pretty_assertions::assert_eq;

use crate::common::{InstructionBuilder, TestBed};

/// Arithmetic, memory traffic, a taken branch, FP, and a terminal self-loop.
fn mixed_program() -> Vec<u32> {
    vec![
        InstructionBuilder::new().addi(1, 0, 5).build(),        //  0
        InstructionBuilder::new().addi(2, 0, 7).build(),        //  4
        InstructionBuilder::new().add(3, 1, 2).build(),         //  8: x3 = 12
        InstructionBuilder::new().sw(0, 3, 0x100).build(),      // 12
        InstructionBuilder::new().lw(4, 0, 0x100).build(),      // 16: x4 = 12
        InstructionBuilder::new().beq(4, 3, 4).build(),         // 20: taken, skips 24
        InstructionBuilder::new().addi(5, 0, 99).build(),       // 24: never executes
        InstructionBuilder::new().addi(6, 0, 1).build(),        // 28
        InstructionBuilder::new().sub(7, 2, 1).build(),         // 32: x7 = 2
        InstructionBuilder::new().xori(8, 7, 255).build(),      // 36: x8 = 253
        InstructionBuilder::new().lui(9, 0x40490).build(),      // 40: x9 = pi bits
        InstructionBuilder::new().sw(0, 9, 0x104).build(),      // 44
        InstructionBuilder::new().flw(1, 0, 0x104).build(),     // 48: f1 = pi
        InstructionBuilder::new().fmadd_s(2, 1, 1, 1).build(),  // 52: f2 = pi*pi+pi
        InstructionBuilder::new().fsw(0, 2, 0x108).build(),     // 56
        InstructionBuilder::new().jal(0, -4).build(),           // 60: spin here
    ]
}

fn assert_same_architectural_state(a: &mut TestBed, b: &mut TestBed) {
    for reg in 0..32 {
        assert_eq!(a.reg(reg), b.reg(reg), "x{reg} differs between drivers");
    }
    for freg in 0..32 {
        assert_eq!(
            a.cpu.hart.fpr.read_bits(freg),
            b.cpu.hart.fpr.read_bits(freg),
            "f{freg} differs between drivers"
        );
    }
    for addr in [0x100, 0x104, 0x108] {
        assert_eq!(a.read_mem(addr), b.read_mem(addr), "mem[{addr:#x}] differs");
    }
}

#[test]
fn fast_and_pipelined_agree_on_a_looping_program() {
    let mut fast = TestBed::new().load_program(0, &mixed_program());
    let mut piped = TestBed::new().load_program(0, &mixed_program());

    fast.fast_run(80);
    piped.run(160);

    assert_same_architectural_state(&mut fast, &mut piped);
    assert_eq!(fast.reg(5), 0, "branch shadow must not execute");
    assert_eq!(fast.read_mem(0x100), 12);
    // Cycle counts differ; that is the whole point of the fast driver.
    assert!(piped.cpu.stats.cycles > fast.cpu.stats.instructions);
}

#[test]
fn fast_and_drained_pipeline_agree_on_a_straight_line_program() {
    let program = vec![
        InstructionBuilder::new().addi(1, 0, 3).build(),
        InstructionBuilder::new().addi(2, 0, 4).build(),
        InstructionBuilder::new().add(3, 1, 2).build(),   // 7
        InstructionBuilder::new().sub(4, 2, 1).build(),   // 1
        InstructionBuilder::new().xori(5, 3, 0xF0).build(), // 247
        InstructionBuilder::new().sw(0, 3, 0x200).build(),
        InstructionBuilder::new().lw(6, 0, 0x200).build(), // 7
        InstructionBuilder::new().add(7, 6, 3).build(),   // 14
    ];

    let mut fast = TestBed::new().load_program(0, &program);
    let mut piped = TestBed::new().load_program(0, &program);

    fast.fast_run(8);
    // Fetch the whole program, then drain the bank empty of real work.
    piped.run(8);
    piped.drain(12);

    assert_same_architectural_state(&mut fast, &mut piped);
    assert_eq!(fast.reg(7), 14);
    assert_eq!(fast.cpu.stats.instructions, 8);
}
