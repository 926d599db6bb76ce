//! Processor core implementation.
//!
//! This module contains the simulated processor:
//! 1. **Arch:** Architectural register files.
//! 2. **Hart:** The architectural state bundle handlers execute against.
//! 3. **Exec:** Operation decode and per-opcode semantic handlers.
//! 4. **Pipeline:** Stage slots, the register bank, and hazard logic.
//! 5. **Processor:** The per-cycle stage advancer and the fast functional path.

/// Architectural register files.
pub mod arch;

/// Operation decode and semantic handlers.
pub mod exec;

/// Architectural state bundle (registers, PC, bus).
pub mod hart;

/// Pipeline register bank and hazard logic.
pub mod pipeline;

/// The stepping engine.
pub mod processor;

pub use hart::Hart;
pub use processor::{Processor, StepMode};
