//! Architectural state bundle.

use std::fmt;

use crate::core::arch::{Fpr, Gpr};
use crate::soc::Bus;

/// Architectural state of one hardware thread: the register files, the
/// program counter, and the memory subsystem behind it.
///
/// Semantic handlers run against a `Hart` with the PC already advanced one
/// slot past the instruction being executed; control-flow handlers apply
/// their offsets to that value.
pub struct Hart {
    /// Integer register file.
    pub gpr: Gpr,
    /// Floating-point register file.
    pub fpr: Fpr,
    /// Program counter.
    pub pc: u32,
    /// Memory subsystem.
    pub bus: Box<dyn Bus>,
}

impl Hart {
    /// Creates a hart at PC 0 over the given memory subsystem.
    pub fn new(bus: Box<dyn Bus>) -> Self {
        Self {
            gpr: Gpr::default(),
            fpr: Fpr::default(),
            pc: 0,
            bus,
        }
    }
}

impl fmt::Debug for Hart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hart")
            .field("pc", &self.pc)
            .field("gpr", &self.gpr)
            .field("fpr", &self.fpr)
            .finish_non_exhaustive()
    }
}
