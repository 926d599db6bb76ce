//! RV32 major opcodes and function codes.
//!
//! Defines the major opcodes (bits 6-0) and the `funct3`/`funct7` values used
//! to tell instructions apart within a major opcode.

/// Load instructions (LB, LH, LW, LBU, LHU).
pub const OP_LOAD: u32 = 0b0000011;

/// Floating-point load instructions (FLW, FLD).
pub const OP_LOAD_FP: u32 = 0b0000111;

/// Memory ordering instructions (FENCE).
pub const OP_MISC_MEM: u32 = 0b0001111;

/// Immediate arithmetic instructions (ADDI, ANDI, SLLI, etc.).
pub const OP_IMM: u32 = 0b0010011;

/// Add Upper Immediate to PC (AUIPC).
pub const OP_AUIPC: u32 = 0b0010111;

/// Store instructions (SB, SH, SW).
pub const OP_STORE: u32 = 0b0100011;

/// Floating-point store instructions (FSW, FSD).
pub const OP_STORE_FP: u32 = 0b0100111;

/// Register-register arithmetic (ADD, SUB, SLL, etc.).
pub const OP_REG: u32 = 0b0110011;

/// Load Upper Immediate (LUI).
pub const OP_LUI: u32 = 0b0110111;

/// Fused multiply-add (FMADD.S).
pub const OP_MADD: u32 = 0b1000011;

/// Fused multiply-subtract (FMSUB.S).
pub const OP_MSUB: u32 = 0b1000111;

/// Fused negated multiply-subtract (FNMSUB.S).
pub const OP_NMSUB: u32 = 0b1001011;

/// Fused negated multiply-add (FNMADD.S).
pub const OP_NMADD: u32 = 0b1001111;

/// Conditional branch instructions (BEQ, BNE, etc.).
pub const OP_BRANCH: u32 = 0b1100011;

/// Jump and Link Register (JALR).
pub const OP_JALR: u32 = 0b1100111;

/// Jump and Link (JAL).
pub const OP_JAL: u32 = 0b1101111;

/// Environment instructions (ECALL, EBREAK).
pub const OP_SYSTEM: u32 = 0b1110011;

/// `funct3` values for loads, stores, branches, and arithmetic.
pub mod funct3 {
    /// Load Byte (signed).
    pub const LB: u32 = 0b000;
    /// Load Halfword (signed).
    pub const LH: u32 = 0b001;
    /// Load Word.
    pub const LW: u32 = 0b010;
    /// Load Byte Unsigned.
    pub const LBU: u32 = 0b100;
    /// Load Halfword Unsigned.
    pub const LHU: u32 = 0b101;

    /// FP Load Word (single precision).
    pub const FLW: u32 = 0b010;
    /// FP Load Doubleword (double precision).
    pub const FLD: u32 = 0b011;

    /// Store Byte.
    pub const SB: u32 = 0b000;
    /// Store Halfword.
    pub const SH: u32 = 0b001;
    /// Store Word.
    pub const SW: u32 = 0b010;

    /// FP Store Word.
    pub const FSW: u32 = 0b010;
    /// FP Store Doubleword.
    pub const FSD: u32 = 0b011;

    /// Branch Equal.
    pub const BEQ: u32 = 0b000;
    /// Branch Not Equal.
    pub const BNE: u32 = 0b001;
    /// Branch Less Than (signed).
    pub const BLT: u32 = 0b100;
    /// Branch Greater or Equal (signed).
    pub const BGE: u32 = 0b101;
    /// Branch Less Than Unsigned.
    pub const BLTU: u32 = 0b110;
    /// Branch Greater or Equal Unsigned.
    pub const BGEU: u32 = 0b111;

    /// ADDI / ADD / SUB.
    pub const ADD: u32 = 0b000;
    /// SLLI / SLL.
    pub const SLL: u32 = 0b001;
    /// SLTI / SLT.
    pub const SLT: u32 = 0b010;
    /// SLTIU / SLTU.
    pub const SLTU: u32 = 0b011;
    /// XORI / XOR.
    pub const XOR: u32 = 0b100;
    /// SRLI / SRAI / SRL / SRA.
    pub const SR: u32 = 0b101;
    /// ORI / OR.
    pub const OR: u32 = 0b110;
    /// ANDI / AND.
    pub const AND: u32 = 0b111;
}

/// `funct7` values distinguishing base from alternate encodings.
pub mod funct7 {
    /// Standard encoding (ADD, SRL, SLLI, SRLI).
    pub const BASE: u32 = 0b0000000;
    /// Alternate encoding (SUB, SRA, SRAI).
    pub const ALT: u32 = 0b0100000;
}
