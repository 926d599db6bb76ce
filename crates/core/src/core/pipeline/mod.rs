//! Pipeline register bank.
//!
//! Five named stage slots — fetch, decode, execute, memory-access,
//! write-back — each holding at most one in-flight instruction, plus the
//! fetch-stall counter. Instructions move between adjacent slots by ownership
//! transfer: the source slot is emptied in the same operation that fills the
//! destination, so an instruction can never exist in two stages at once.

/// Hazard classification and stall computation.
pub mod hazards;

use crate::core::exec::{DecodedOp, Handler};
use crate::isa::operation::{Format, Opcode};

/// One in-flight instruction's decoded state.
#[derive(Clone, Copy, Debug)]
pub struct StageEntry {
    /// Raw 32-bit instruction word.
    pub inst: u32,
    /// Operation code.
    pub op: Opcode,
    /// Instruction format.
    pub format: Format,
    /// Semantic handler; `None` faults when the entry reaches execute.
    pub handler: Option<Handler>,
    /// Remaining stage-occupancy cycles.
    pub cycles: u64,
    /// Program counter the instruction was fetched at.
    pub fetched_pc: u32,
}

impl StageEntry {
    /// Builds a stage entry from a decode result.
    pub fn from_decode(inst: u32, decoded: DecodedOp, fetched_pc: u32) -> Self {
        Self {
            inst,
            op: decoded.op,
            format: decoded.format,
            handler: decoded.handler,
            cycles: decoded.cycles,
            fetched_pc,
        }
    }
}

/// One pipeline register.
///
/// Besides the occupant, the slot remembers the raw word of the last
/// instruction it held; transition counting charges the bits that flip when
/// the next occupant arrives.
#[derive(Clone, Copy, Debug, Default)]
pub struct StageSlot {
    entry: Option<StageEntry>,
    last_inst: u32,
}

impl StageSlot {
    /// The current occupant, if any.
    #[inline]
    pub fn entry(&self) -> Option<&StageEntry> {
        self.entry.as_ref()
    }

    /// Mutable access to the current occupant.
    #[inline]
    pub fn entry_mut(&mut self) -> Option<&mut StageEntry> {
        self.entry.as_mut()
    }

    /// Whether the slot is free.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// Raw word of the current or most recent occupant.
    #[inline]
    pub fn last_inst(&self) -> u32 {
        self.last_inst
    }

    /// Moves `entry` into the slot.
    #[inline]
    pub fn fill(&mut self, entry: StageEntry) {
        debug_assert!(self.entry.is_none(), "stage slot overwritten while occupied");
        self.last_inst = entry.inst;
        self.entry = Some(entry);
    }

    /// Takes the occupant out, leaving the slot empty.
    #[inline]
    pub fn take(&mut self) -> Option<StageEntry> {
        self.entry.take()
    }

    /// Discards the occupant.
    #[inline]
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

/// The five-stage pipeline register bank.
#[derive(Clone, Debug, Default)]
pub struct PipelineRegs {
    /// Instruction fetch slot.
    pub fetch: StageSlot,
    /// Instruction decode slot.
    pub decode: StageSlot,
    /// Execute slot.
    pub execute: StageSlot,
    /// Memory-access slot.
    pub mem_access: StageSlot,
    /// Write-back slot.
    pub write_back: StageSlot,
    /// Cycles the fetch stage must hold before handing off to decode.
    pub fetch_stall_cycles: u64,
}

impl PipelineRegs {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every slot and clears the fetch stall.
    ///
    /// Counters in the surrounding processor state are untouched; after a
    /// flush the bank behaves exactly like a freshly constructed one.
    pub fn flush(&mut self) {
        for slot in [
            &mut self.fetch,
            &mut self.decode,
            &mut self.execute,
            &mut self.mem_access,
            &mut self.write_back,
        ] {
            slot.invalidate();
        }
        self.fetch_stall_cycles = 0;
    }
}
