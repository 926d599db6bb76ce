//! Instruction Set Architecture (ISA) definitions.
//!
//! Contains the encoding-level view of the RV32 instruction stream:
//! 1. **Opcodes:** Major opcode and function-code constants.
//! 2. **Instruction:** Bit-exact field extraction for every instruction format.
//! 3. **Operation:** The operation-level `Opcode` enum, format tags, and mnemonics.

/// Bit-exact instruction field extraction utilities.
pub mod instruction;

/// Major-opcode and funct3/funct7 constants.
pub mod opcodes;

/// Operation codes, format tags, and mnemonics.
pub mod operation;
