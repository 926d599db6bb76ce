//! Operation decode and handler dispatch.
//!
//! [`decode`] turns a raw instruction word into a [`DecodedOp`]: the
//! operation code, its format, its execute-stage occupancy, and the semantic
//! handler to run. Handlers are tagged by format in [`Handler`], so the
//! operand extraction for each format lives next to the table that selects
//! it, and a handler can only ever be called with the operand set its format
//! defines. Unrecognized encodings decode to a handler-less entry; the
//! pipeline faults when one reaches execute.

mod handlers;

use crate::core::hart::Hart;
use crate::isa::instruction::InstructionBits;
use crate::isa::opcodes::{self, funct3, funct7};
use crate::isa::operation::{Format, Opcode};

/// A format-tagged semantic handler.
///
/// The variant fixes both the operand extraction and the call signature; see
/// [`Format`] for the field layouts.
#[derive(Clone, Copy)]
pub enum Handler {
    /// rs1, rs2, rd.
    R(fn(&mut Hart, usize, usize, usize)),
    /// rs1, rd, imm\[11:0\].
    I(fn(&mut Hart, usize, usize, u32)),
    /// rs1, rs2, imm\[4:0\], imm\[11:5\].
    S(fn(&mut Hart, usize, usize, u32, u32)),
    /// rs1, rs2, imm\[4:1\], imm\[10:5\], imm\[11\], imm\[12\].
    B(fn(&mut Hart, usize, usize, u32, u32, u32, u32)),
    /// rd, imm\[31:12\].
    U(fn(&mut Hart, usize, u32)),
    /// rd, imm\[10:1\], imm\[11\], imm\[19:12\], imm\[20\].
    J(fn(&mut Hart, usize, u32, u32, u32, u32)),
    /// rs1, rs2, rs3, rounding mode, rd.
    R4(fn(&mut Hart, usize, usize, usize, u32, usize)),
    /// No operands.
    N(fn(&mut Hart)),
}

impl Handler {
    /// Extracts the operand fields for this handler's format from `inst` and
    /// runs the handler against `hart`.
    pub fn dispatch(self, hart: &mut Hart, inst: u32) {
        match self {
            Self::R(f) => f(hart, inst.rs1(), inst.rs2(), inst.rd()),
            Self::I(f) => f(hart, inst.rs1(), inst.rd(), inst.imm_i()),
            Self::S(f) => f(hart, inst.rs1(), inst.rs2(), inst.s_imm_lo(), inst.s_imm_hi()),
            Self::B(f) => f(
                hart,
                inst.rs1(),
                inst.rs2(),
                inst.b_imm_4_1(),
                inst.b_imm_10_5(),
                inst.b_imm_11(),
                inst.b_imm_12(),
            ),
            Self::U(f) => f(hart, inst.rd(), inst.u_imm()),
            Self::J(f) => f(
                hart,
                inst.rd(),
                inst.j_imm_10_1(),
                inst.j_imm_11(),
                inst.j_imm_19_12(),
                inst.j_imm_20(),
            ),
            Self::R4(f) => f(hart, inst.rs1(), inst.rs2(), inst.rs3(), inst.rm(), inst.rd()),
            Self::N(f) => f(hart),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::R(_) => "R",
            Self::I(_) => "I",
            Self::S(_) => "S",
            Self::B(_) => "B",
            Self::U(_) => "U",
            Self::J(_) => "J",
            Self::R4(_) => "R4",
            Self::N(_) => "N",
        };
        write!(f, "Handler::{name}")
    }
}

/// The decode result for one instruction word.
#[derive(Clone, Copy, Debug)]
pub struct DecodedOp {
    /// Operation code.
    pub op: Opcode,
    /// Instruction format.
    pub format: Format,
    /// Semantic handler; `None` marks an illegal instruction.
    pub handler: Option<Handler>,
    /// Execute-stage occupancy beyond a single cycle.
    pub cycles: u64,
}

fn entry(op: Opcode, format: Format, handler: Handler) -> DecodedOp {
    DecodedOp {
        op,
        format,
        handler: Some(handler),
        cycles: 0,
    }
}

/// Fused ops hold execute for one extra cycle.
fn fused(op: Opcode, handler: Handler) -> DecodedOp {
    DecodedOp {
        op,
        format: Format::R4,
        handler: Some(handler),
        cycles: 2,
    }
}

fn illegal() -> DecodedOp {
    DecodedOp {
        op: Opcode::Illegal,
        format: Format::N,
        handler: None,
        cycles: 0,
    }
}

/// Decodes a raw instruction word.
///
/// Pure and total: every word decodes, and illegal encodings come back as
/// handler-less [`Opcode::Illegal`] entries rather than an error, so the
/// fetch stage can always be refilled and the fault surfaces at execute with
/// the offending PC attached.
pub fn decode(inst: u32) -> DecodedOp {
    use Handler::{B, I, J, N, R, R4, S, U};

    match inst.opcode() {
        opcodes::OP_LUI => entry(Opcode::Lui, Format::U, U(handlers::lui)),
        opcodes::OP_AUIPC => entry(Opcode::Auipc, Format::U, U(handlers::auipc)),
        opcodes::OP_JAL => entry(Opcode::Jal, Format::J, J(handlers::jal)),
        opcodes::OP_JALR => match inst.funct3() {
            0 => entry(Opcode::Jalr, Format::I, I(handlers::jalr)),
            _ => illegal(),
        },
        opcodes::OP_BRANCH => match inst.funct3() {
            funct3::BEQ => entry(Opcode::Beq, Format::B, B(handlers::beq)),
            funct3::BNE => entry(Opcode::Bne, Format::B, B(handlers::bne)),
            funct3::BLT => entry(Opcode::Blt, Format::B, B(handlers::blt)),
            funct3::BGE => entry(Opcode::Bge, Format::B, B(handlers::bge)),
            funct3::BLTU => entry(Opcode::Bltu, Format::B, B(handlers::bltu)),
            funct3::BGEU => entry(Opcode::Bgeu, Format::B, B(handlers::bgeu)),
            _ => illegal(),
        },
        opcodes::OP_LOAD => match inst.funct3() {
            funct3::LB => entry(Opcode::Lb, Format::I, I(handlers::lb)),
            funct3::LH => entry(Opcode::Lh, Format::I, I(handlers::lh)),
            funct3::LW => entry(Opcode::Lw, Format::I, I(handlers::lw)),
            funct3::LBU => entry(Opcode::Lbu, Format::I, I(handlers::lbu)),
            funct3::LHU => entry(Opcode::Lhu, Format::I, I(handlers::lhu)),
            _ => illegal(),
        },
        opcodes::OP_LOAD_FP => match inst.funct3() {
            funct3::FLW => entry(Opcode::Flw, Format::I, I(handlers::flw)),
            funct3::FLD => entry(Opcode::Fld, Format::I, I(handlers::fld)),
            _ => illegal(),
        },
        opcodes::OP_STORE => match inst.funct3() {
            funct3::SB => entry(Opcode::Sb, Format::S, S(handlers::sb)),
            funct3::SH => entry(Opcode::Sh, Format::S, S(handlers::sh)),
            funct3::SW => entry(Opcode::Sw, Format::S, S(handlers::sw)),
            _ => illegal(),
        },
        opcodes::OP_STORE_FP => match inst.funct3() {
            funct3::FSW => entry(Opcode::Fsw, Format::S, S(handlers::fsw)),
            funct3::FSD => entry(Opcode::Fsd, Format::S, S(handlers::fsd)),
            _ => illegal(),
        },
        opcodes::OP_IMM => match inst.funct3() {
            funct3::ADD => entry(Opcode::Addi, Format::I, I(handlers::addi)),
            funct3::SLT => entry(Opcode::Slti, Format::I, I(handlers::slti)),
            funct3::SLTU => entry(Opcode::Sltiu, Format::I, I(handlers::sltiu)),
            funct3::XOR => entry(Opcode::Xori, Format::I, I(handlers::xori)),
            funct3::OR => entry(Opcode::Ori, Format::I, I(handlers::ori)),
            funct3::AND => entry(Opcode::Andi, Format::I, I(handlers::andi)),
            funct3::SLL => match inst.funct7() {
                funct7::BASE => entry(Opcode::Slli, Format::I, I(handlers::slli)),
                _ => illegal(),
            },
            funct3::SR => match inst.funct7() {
                funct7::BASE => entry(Opcode::Srli, Format::I, I(handlers::srli)),
                funct7::ALT => entry(Opcode::Srai, Format::I, I(handlers::srai)),
                _ => illegal(),
            },
            _ => illegal(),
        },
        opcodes::OP_REG => match (inst.funct3(), inst.funct7()) {
            (funct3::ADD, funct7::BASE) => entry(Opcode::Add, Format::R, R(handlers::add)),
            (funct3::ADD, funct7::ALT) => entry(Opcode::Sub, Format::R, R(handlers::sub)),
            (funct3::SLL, funct7::BASE) => entry(Opcode::Sll, Format::R, R(handlers::sll)),
            (funct3::SLT, funct7::BASE) => entry(Opcode::Slt, Format::R, R(handlers::slt)),
            (funct3::SLTU, funct7::BASE) => entry(Opcode::Sltu, Format::R, R(handlers::sltu)),
            (funct3::XOR, funct7::BASE) => entry(Opcode::Xor, Format::R, R(handlers::xor)),
            (funct3::SR, funct7::BASE) => entry(Opcode::Srl, Format::R, R(handlers::srl)),
            (funct3::SR, funct7::ALT) => entry(Opcode::Sra, Format::R, R(handlers::sra)),
            (funct3::OR, funct7::BASE) => entry(Opcode::Or, Format::R, R(handlers::or)),
            (funct3::AND, funct7::BASE) => entry(Opcode::And, Format::R, R(handlers::and)),
            _ => illegal(),
        },
        opcodes::OP_MISC_MEM => match inst.funct3() {
            0 => entry(Opcode::Fence, Format::N, N(handlers::nop)),
            _ => illegal(),
        },
        opcodes::OP_SYSTEM => match (inst.funct3(), inst.imm_i()) {
            (0, 0) => entry(Opcode::Ecall, Format::N, N(handlers::nop)),
            (0, 1) => entry(Opcode::Ebreak, Format::N, N(handlers::nop)),
            _ => illegal(),
        },
        // Fused ops: bits 25-26 select the precision; only single is wired.
        opcodes::OP_MADD => match inst.funct7() & 0x3 {
            0 => fused(Opcode::FmaddS, R4(handlers::fmadd_s)),
            _ => illegal(),
        },
        opcodes::OP_MSUB => match inst.funct7() & 0x3 {
            0 => fused(Opcode::FmsubS, R4(handlers::fmsub_s)),
            _ => illegal(),
        },
        opcodes::OP_NMSUB => match inst.funct7() & 0x3 {
            0 => fused(Opcode::FnmsubS, R4(handlers::fnmsub_s)),
            _ => illegal(),
        },
        opcodes::OP_NMADD => match inst.funct7() & 0x3 {
            0 => fused(Opcode::FnmaddS, R4(handlers::fnmadd_s)),
            _ => illegal(),
        },
        _ => illegal(),
    }
}
