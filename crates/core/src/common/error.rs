//! Fatal simulation errors.
//!
//! Hazards, stalls, and control-flow flushes are ordinary outcomes of every
//! cycle and never surface here. The only fatal condition this core raises is
//! an instruction without semantics reaching the execute stage; the stepping
//! functions mark the processor non-runnable before returning it.

use thiserror::Error;

/// Errors that terminate a simulated processor's stepping loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    /// A valid execute-stage instruction has no semantic handler.
    ///
    /// Covers every unrecognized encoding: decode produces handler-less
    /// entries for those, and the fault fires when one reaches execute.
    #[error("illegal instruction at PC {pc:#010x} (encoding {inst:#010x})")]
    IllegalInstruction {
        /// Program counter the instruction was fetched at.
        pc: u32,
        /// The raw instruction word.
        inst: u32,
    },
}
