//! Hazard classification and stall computation.
//!
//! Pure functions over operation codes plus the stall calculator the stage
//! advancer runs once per decode-to-execute handoff. The modeled machine
//! forwards arithmetic results and resolves branches in decode, which fixes
//! the stall table:
//!
//! - a load feeding a branch costs 2 cycles (the value exists only after
//!   memory access, the branch tests it in decode);
//! - a load feeding any other register reader costs 1 cycle;
//! - a forwarded arithmetic result feeding a branch costs 1 cycle;
//! - everything else proceeds without stalling.

use crate::core::pipeline::StageEntry;
use crate::isa::instruction::InstructionBits;
use crate::isa::operation::Opcode;

/// Whether `op` is one of the six conditional branches.
pub fn is_branch(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bge | Opcode::Bltu | Opcode::Bgeu
    )
}

/// Whether `op` is an integer or floating-point load.
pub fn is_load(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::Lb | Opcode::Lh | Opcode::Lw | Opcode::Lbu | Opcode::Lhu | Opcode::Flw | Opcode::Fld
    )
}

/// Number of integer source registers `op` reads: 1 for rs1-only consumers
/// (indirect jump, immediate arithmetic, all loads), 2 for rs1+rs2 consumers
/// (branches, stores, register-register arithmetic), 0 otherwise.
pub fn reg_read_arity(op: Opcode) -> u8 {
    match op {
        Opcode::Jalr
        | Opcode::Lb
        | Opcode::Lh
        | Opcode::Lw
        | Opcode::Lbu
        | Opcode::Lhu
        | Opcode::Flw
        | Opcode::Fld
        | Opcode::Addi
        | Opcode::Slti
        | Opcode::Sltiu
        | Opcode::Xori
        | Opcode::Ori
        | Opcode::Andi
        | Opcode::Slli
        | Opcode::Srli
        | Opcode::Srai => 1,
        Opcode::Beq
        | Opcode::Bne
        | Opcode::Blt
        | Opcode::Bge
        | Opcode::Bltu
        | Opcode::Bgeu
        | Opcode::Sb
        | Opcode::Sh
        | Opcode::Sw
        | Opcode::Fsw
        | Opcode::Fsd
        | Opcode::Add
        | Opcode::Sub
        | Opcode::Sll
        | Opcode::Slt
        | Opcode::Sltu
        | Opcode::Xor
        | Opcode::Srl
        | Opcode::Sra
        | Opcode::Or
        | Opcode::And => 2,
        _ => 0,
    }
}

/// Whether `op` produces an integer result a following branch would have to
/// wait one cycle for.
///
/// Upper-immediates resolve by the end of decode, jumps stall on their own
/// rule, and loads carry their own stall tests, so none of them are listed.
pub fn writes_reg(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::Addi
            | Opcode::Slti
            | Opcode::Sltiu
            | Opcode::Xori
            | Opcode::Ori
            | Opcode::Andi
            | Opcode::Slli
            | Opcode::Srli
            | Opcode::Srai
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Sll
            | Opcode::Slt
            | Opcode::Sltu
            | Opcode::Xor
            | Opcode::Srl
            | Opcode::Sra
            | Opcode::Or
            | Opcode::And
    )
}

/// Cycles the fetch stage must hold because of `fetch`'s dependence on
/// `decode`, computed as `decode` moves into execute.
///
/// Register fields are read straight out of the raw words at their fixed
/// offsets; the classification of the two operations decides whether those
/// fields are live.
pub fn stall_cycles(decode: &StageEntry, fetch: &StageEntry) -> u64 {
    let id_rd = decode.inst.rd();
    let if_rs1 = fetch.inst.rs1();
    let if_rs2 = fetch.inst.rs2();

    if is_load(decode.op) {
        if is_branch(fetch.op) {
            if if_rs1 == id_rd || if_rs2 == id_rd {
                return 2;
            }
        } else if reg_read_arity(fetch.op) == 1 {
            if if_rs1 == id_rd {
                return 1;
            }
        } else if reg_read_arity(fetch.op) == 2 && (if_rs1 == id_rd || if_rs2 == id_rd) {
            return 1;
        }
    }
    if writes_reg(decode.op) && is_branch(fetch.op) && (if_rs1 == id_rd || if_rs2 == id_rd) {
        return 1;
    }

    0
}
