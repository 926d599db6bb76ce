//! Per-opcode semantic handlers.
//!
//! Each handler receives the raw operand fields of its format, exactly as
//! split out of the instruction word; immediates are assembled and
//! sign-extended here. On entry the hart's PC holds the address one slot past
//! the instruction (both stepping engines arrange this before dispatch), so
//! taken branches and JAL add their encoded offset to that value, and link
//! writes take it as-is.

use crate::core::hart::Hart;
use crate::isa::instruction::sign_extend;

// ── register-register ──────────────────────────────────────────

pub(super) fn add(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = h.gpr.read(rs1).wrapping_add(h.gpr.read(rs2));
    h.gpr.write(rd, v);
}

pub(super) fn sub(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = h.gpr.read(rs1).wrapping_sub(h.gpr.read(rs2));
    h.gpr.write(rd, v);
}

pub(super) fn sll(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = h.gpr.read(rs1) << (h.gpr.read(rs2) & 0x1F);
    h.gpr.write(rd, v);
}

pub(super) fn slt(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = u32::from((h.gpr.read(rs1) as i32) < (h.gpr.read(rs2) as i32));
    h.gpr.write(rd, v);
}

pub(super) fn sltu(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = u32::from(h.gpr.read(rs1) < h.gpr.read(rs2));
    h.gpr.write(rd, v);
}

pub(super) fn xor(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = h.gpr.read(rs1) ^ h.gpr.read(rs2);
    h.gpr.write(rd, v);
}

pub(super) fn srl(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = h.gpr.read(rs1) >> (h.gpr.read(rs2) & 0x1F);
    h.gpr.write(rd, v);
}

pub(super) fn sra(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = (h.gpr.read(rs1) as i32) >> (h.gpr.read(rs2) & 0x1F);
    h.gpr.write(rd, v as u32);
}

pub(super) fn or(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = h.gpr.read(rs1) | h.gpr.read(rs2);
    h.gpr.write(rd, v);
}

pub(super) fn and(h: &mut Hart, rs1: usize, rs2: usize, rd: usize) {
    let v = h.gpr.read(rs1) & h.gpr.read(rs2);
    h.gpr.write(rd, v);
}

// ── register-immediate ─────────────────────────────────────────

pub(super) fn addi(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.gpr.read(rs1).wrapping_add(sign_extend(imm, 12) as u32);
    h.gpr.write(rd, v);
}

pub(super) fn slti(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = u32::from((h.gpr.read(rs1) as i32) < sign_extend(imm, 12));
    h.gpr.write(rd, v);
}

pub(super) fn sltiu(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = u32::from(h.gpr.read(rs1) < sign_extend(imm, 12) as u32);
    h.gpr.write(rd, v);
}

pub(super) fn xori(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.gpr.read(rs1) ^ sign_extend(imm, 12) as u32;
    h.gpr.write(rd, v);
}

pub(super) fn ori(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.gpr.read(rs1) | sign_extend(imm, 12) as u32;
    h.gpr.write(rd, v);
}

pub(super) fn andi(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.gpr.read(rs1) & sign_extend(imm, 12) as u32;
    h.gpr.write(rd, v);
}

pub(super) fn slli(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.gpr.read(rs1) << (imm & 0x1F);
    h.gpr.write(rd, v);
}

pub(super) fn srli(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.gpr.read(rs1) >> (imm & 0x1F);
    h.gpr.write(rd, v);
}

pub(super) fn srai(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = (h.gpr.read(rs1) as i32) >> (imm & 0x1F);
    h.gpr.write(rd, v as u32);
}

pub(super) fn jalr(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let target = h.gpr.read(rs1).wrapping_add(sign_extend(imm, 12) as u32) & !1;
    h.gpr.write(rd, h.pc);
    h.pc = target;
}

// ── loads ──────────────────────────────────────────────────────

fn load_addr(h: &Hart, rs1: usize, imm: u32) -> u32 {
    h.gpr.read(rs1).wrapping_add(sign_extend(imm, 12) as u32)
}

pub(super) fn lb(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.bus.read_u8(load_addr(h, rs1, imm));
    h.gpr.write(rd, i32::from(v as i8) as u32);
}

pub(super) fn lh(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.bus.read_u16(load_addr(h, rs1, imm));
    h.gpr.write(rd, i32::from(v as i16) as u32);
}

pub(super) fn lw(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.bus.read_u32(load_addr(h, rs1, imm));
    h.gpr.write(rd, v);
}

pub(super) fn lbu(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.bus.read_u8(load_addr(h, rs1, imm));
    h.gpr.write(rd, u32::from(v));
}

pub(super) fn lhu(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let v = h.bus.read_u16(load_addr(h, rs1, imm));
    h.gpr.write(rd, u32::from(v));
}

pub(super) fn flw(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let bits = h.bus.read_u32(load_addr(h, rs1, imm));
    h.fpr.write_f32(rd, f32::from_bits(bits));
}

pub(super) fn fld(h: &mut Hart, rs1: usize, rd: usize, imm: u32) {
    let bits = h.bus.read_u64(load_addr(h, rs1, imm));
    h.fpr.write_bits(rd, bits);
}

// ── stores ─────────────────────────────────────────────────────

fn store_addr(h: &Hart, rs1: usize, imm_lo: u32, imm_hi: u32) -> u32 {
    let imm = (imm_hi << 5) | imm_lo;
    h.gpr.read(rs1).wrapping_add(sign_extend(imm, 12) as u32)
}

pub(super) fn sb(h: &mut Hart, rs1: usize, rs2: usize, imm_lo: u32, imm_hi: u32) {
    let addr = store_addr(h, rs1, imm_lo, imm_hi);
    let val = h.gpr.read(rs2) as u8;
    h.bus.write_u8(addr, val);
}

pub(super) fn sh(h: &mut Hart, rs1: usize, rs2: usize, imm_lo: u32, imm_hi: u32) {
    let addr = store_addr(h, rs1, imm_lo, imm_hi);
    let val = h.gpr.read(rs2) as u16;
    h.bus.write_u16(addr, val);
}

pub(super) fn sw(h: &mut Hart, rs1: usize, rs2: usize, imm_lo: u32, imm_hi: u32) {
    let addr = store_addr(h, rs1, imm_lo, imm_hi);
    let val = h.gpr.read(rs2);
    h.bus.write_u32(addr, val);
}

pub(super) fn fsw(h: &mut Hart, rs1: usize, rs2: usize, imm_lo: u32, imm_hi: u32) {
    let addr = store_addr(h, rs1, imm_lo, imm_hi);
    let bits = h.fpr.read_bits(rs2) as u32;
    h.bus.write_u32(addr, bits);
}

pub(super) fn fsd(h: &mut Hart, rs1: usize, rs2: usize, imm_lo: u32, imm_hi: u32) {
    let addr = store_addr(h, rs1, imm_lo, imm_hi);
    let bits = h.fpr.read_bits(rs2);
    h.bus.write_u64(addr, bits);
}

// ── branches ───────────────────────────────────────────────────

fn branch_offset(imm_4_1: u32, imm_10_5: u32, imm_11: u32, imm_12: u32) -> i32 {
    sign_extend(
        (imm_12 << 12) | (imm_11 << 11) | (imm_10_5 << 5) | (imm_4_1 << 1),
        13,
    )
}

macro_rules! branch {
    ($name:ident, |$a:ident, $b:ident| $taken:expr) => {
        pub(super) fn $name(
            h: &mut Hart,
            rs1: usize,
            rs2: usize,
            imm_4_1: u32,
            imm_10_5: u32,
            imm_11: u32,
            imm_12: u32,
        ) {
            let $a = h.gpr.read(rs1);
            let $b = h.gpr.read(rs2);
            if $taken {
                let off = branch_offset(imm_4_1, imm_10_5, imm_11, imm_12);
                h.pc = h.pc.wrapping_add(off as u32);
            }
        }
    };
}

branch!(beq, |a, b| a == b);
branch!(bne, |a, b| a != b);
branch!(blt, |a, b| (a as i32) < (b as i32));
branch!(bge, |a, b| (a as i32) >= (b as i32));
branch!(bltu, |a, b| a < b);
branch!(bgeu, |a, b| a >= b);

// ── upper immediate ────────────────────────────────────────────

pub(super) fn lui(h: &mut Hart, rd: usize, imm: u32) {
    h.gpr.write(rd, imm << 12);
}

pub(super) fn auipc(h: &mut Hart, rd: usize, imm: u32) {
    // PC sits one slot past the instruction when handlers run.
    let v = h.pc.wrapping_sub(4).wrapping_add(imm << 12);
    h.gpr.write(rd, v);
}

// ── jump ───────────────────────────────────────────────────────

pub(super) fn jal(h: &mut Hart, rd: usize, imm_10_1: u32, imm_11: u32, imm_19_12: u32, imm_20: u32) {
    let off = sign_extend(
        (imm_20 << 20) | (imm_19_12 << 12) | (imm_11 << 11) | (imm_10_1 << 1),
        21,
    );
    h.gpr.write(rd, h.pc);
    h.pc = h.pc.wrapping_add(off as u32);
}

// ── fused multiply-add ─────────────────────────────────────────
//
// The rounding-mode field is accepted but the host's round-to-nearest is
// used for all of them.

pub(super) fn fmadd_s(h: &mut Hart, rs1: usize, rs2: usize, rs3: usize, _rm: u32, rd: usize) {
    let v = h.fpr.read_f32(rs1).mul_add(h.fpr.read_f32(rs2), h.fpr.read_f32(rs3));
    h.fpr.write_f32(rd, v);
}

pub(super) fn fmsub_s(h: &mut Hart, rs1: usize, rs2: usize, rs3: usize, _rm: u32, rd: usize) {
    let v = h.fpr.read_f32(rs1).mul_add(h.fpr.read_f32(rs2), -h.fpr.read_f32(rs3));
    h.fpr.write_f32(rd, v);
}

pub(super) fn fnmsub_s(h: &mut Hart, rs1: usize, rs2: usize, rs3: usize, _rm: u32, rd: usize) {
    let v = (-h.fpr.read_f32(rs1)).mul_add(h.fpr.read_f32(rs2), h.fpr.read_f32(rs3));
    h.fpr.write_f32(rd, v);
}

pub(super) fn fnmadd_s(h: &mut Hart, rs1: usize, rs2: usize, rs3: usize, _rm: u32, rd: usize) {
    let v = (-h.fpr.read_f32(rs1)).mul_add(h.fpr.read_f32(rs2), -h.fpr.read_f32(rs3));
    h.fpr.write_f32(rd, v);
}

// ── no-operand ─────────────────────────────────────────────────

/// FENCE, ECALL and EBREAK: memory ordering and environment traps are outside
/// this core's model, so all three retire as single-cycle no-operations.
pub(super) fn nop(_h: &mut Hart) {}
