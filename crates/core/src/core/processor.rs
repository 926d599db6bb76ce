//! The stepping engine.
//!
//! [`Processor::step`] advances the five-stage pipeline one clock cycle at a
//! time: instructions drain toward retirement before new ones are admitted,
//! hazards between decode and fetch stall the front end, and taken control
//! flow squashes the speculatively fetched wrong path. [`Processor::fast_step`]
//! is the alternate driver for functional-only runs: one instruction per
//! iteration, no stage modeling.
//!
//! Within one cycle the stage boundaries are serviced in a fixed order —
//! write-back, memory-access, execute, the fetch-stall counter, decode,
//! fetch handoff, fetch refill — so at most one instruction crosses each
//! boundary per cycle and no slot is overwritten before it has drained.

use std::fmt::Write as _;

use tracing::{debug, error, trace};

use crate::common::energy::{bit_flips_32, PowerModel};
use crate::common::error::SimError;
use crate::config::Config;
use crate::core::exec;
use crate::core::hart::Hart;
use crate::core::pipeline::{hazards, PipelineRegs, StageEntry, StageSlot};
use crate::engine::Engine;
use crate::isa::operation::{Format, Opcode};
use crate::soc::Bus;
use crate::stats::SimStats;

/// `add x0, x0, x0`: the no-operation injected while draining the pipeline.
const DRAIN_NOP: u32 = 0x0000_0033;

/// Instruction width in bytes.
const INST_BYTES: u32 = 4;

/// Stepping mode for the pipelined driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMode {
    /// Fetch from memory at the program counter.
    Run,
    /// Inject no-operations instead of fetching, to empty in-flight state.
    Drain,
}

/// One simulated processor node.
pub struct Processor {
    /// Architectural state.
    pub hart: Hart,
    /// Pipeline register bank.
    pub pipe: PipelineRegs,
    /// Per-node statistics.
    pub stats: SimStats,
    /// Local clock in picoseconds.
    pub time_psec: f64,
    /// Clock period in picoseconds.
    pub cycle_time_psec: f64,
    /// Cleared when the node halts (fatal error or external stop).
    pub runnable: bool,
    /// Emit a pipeline snapshot to stderr after every cycle.
    pub show_pipe: bool,
    /// Count pipeline-register bit transitions each cycle.
    pub bitflip_analysis: bool,
    /// Node identifier, used in diagnostics.
    pub node_id: usize,
    /// Optional stall-energy accounting hook.
    pub power: Option<Box<dyn PowerModel>>,
}

impl Processor {
    /// Creates a node at PC 0 over the given memory subsystem.
    pub fn new(bus: Box<dyn Bus>, config: &Config) -> Self {
        Self {
            hart: Hart::new(bus),
            pipe: PipelineRegs::new(),
            stats: SimStats::default(),
            time_psec: 0.0,
            cycle_time_psec: config.cycle_time_psec,
            runnable: true,
            show_pipe: config.show_pipe,
            bitflip_analysis: config.bitflip_analysis,
            node_id: 0,
            power: None,
        }
    }

    /// Runs up to `quantum` pipelined cycles and returns the iterations
    /// consumed.
    ///
    /// Each round is gated on the engine's event-readiness check unless
    /// draining; rounds spent waiting for global time still count against the
    /// quantum. The engine's global clock is advanced provisionally while the
    /// quantum runs and restored before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IllegalInstruction`] when an instruction without
    /// semantics reaches the execute stage. The node is marked non-runnable
    /// first, and no stage movement for the faulting cycle has happened yet.
    pub fn step(
        &mut self,
        engine: &mut Engine,
        quantum: u64,
        mode: StepMode,
    ) -> Result<u64, SimError> {
        let saved_global = engine.global_time_psec;
        let mut consumed = 0;

        for _ in 0..quantum {
            if !engine.on || !self.runnable {
                break;
            }
            consumed += 1;

            if mode == StepMode::Run && !engine.event_ready(self.time_psec, self.cycle_time_psec) {
                engine.advance_past(self.time_psec, self.cycle_time_psec);
                continue;
            }

            if let Err(e) = self.cycle(mode) {
                engine.global_time_psec = saved_global;
                return Err(e);
            }
            engine.advance_past(self.time_psec, self.cycle_time_psec);
        }

        engine.global_time_psec = saved_global;
        Ok(consumed)
    }

    /// Advances the pipeline by exactly one clock cycle.
    fn cycle(&mut self, mode: StepMode) -> Result<(), SimError> {
        let bitflip = self.bitflip_analysis;
        let pc_at_cycle_start = self.hart.pc;

        // Write-back retires: last cycle's occupant has already committed.
        self.pipe.write_back.invalidate();

        // Memory-access countdown. A held cycle costs a no-operation.
        let mut stall_charged = false;
        if let Some(entry) = self.pipe.mem_access.entry_mut() {
            if entry.cycles > 0 {
                entry.cycles -= 1;
                if let Some(power) = self.power.as_mut() {
                    power.charge_stall_cycle();
                }
                stall_charged = true;
            }
        }

        // Memory-access hands off to write-back.
        if self.pipe.write_back.is_empty()
            && self.pipe.mem_access.entry().is_some_and(|e| e.cycles == 0)
        {
            if let Some(entry) = self.pipe.mem_access.take() {
                if bitflip {
                    self.stats.cycle_trans +=
                        bit_flips_32(entry.inst, self.pipe.write_back.last_inst());
                }
                self.pipe.write_back.fill(entry);
            }
        }

        // Execute countdown.
        if let Some(entry) = self.pipe.execute.entry_mut() {
            if entry.cycles > 0 {
                entry.cycles -= 1;
            }
        }

        // An occupant without semantics is an illegal instruction; halt the
        // node before any execute-stage movement begins.
        if let Some(entry) = self.pipe.execute.entry() {
            if entry.handler.is_none() {
                let (pc, inst) = (entry.fetched_pc, entry.inst);
                error!(pc, inst, "illegal instruction reached execute");
                self.runnable = false;
                return Err(SimError::IllegalInstruction { pc, inst });
            }
        }

        // Execute resolves, runs, and hands off to memory-access.
        if self.pipe.mem_access.is_empty()
            && self.pipe.execute.entry().is_some_and(|e| e.cycles == 0)
        {
            if let Some(entry) = self.pipe.execute.take() {
                if entry.op == Opcode::Jalr || hazards::is_branch(entry.op) {
                    // The two slots behind a resolving jump or branch hold
                    // the sequential path, which is assumed wrong; rewind the
                    // PC so the handler redirects from the instruction's own
                    // successor.
                    let corrected = entry.fetched_pc.wrapping_add(INST_BYTES);
                    if bitflip {
                        self.stats.cycle_trans += bit_flips_32(corrected, self.hart.pc);
                    }
                    self.hart.pc = corrected;
                    self.pipe.decode.invalidate();
                    self.pipe.fetch.invalidate();
                    self.stats.stalls_control += 2;
                    debug!(
                        op = entry.op.mnemonic(),
                        pc = entry.fetched_pc,
                        "control flow resolved in execute; squashing decode and fetch"
                    );
                }

                // JAL already ran when it left decode; everything else
                // executes here.
                if entry.format != Format::J {
                    if let Some(handler) = entry.handler {
                        handler.dispatch(&mut self.hart, entry.inst);
                    }
                    self.stats.instructions += 1;
                    self.stats.record_op(entry.op);
                }

                if bitflip {
                    self.stats.cycle_trans +=
                        bit_flips_32(entry.inst, self.pipe.mem_access.last_inst());
                }
                self.pipe.mem_access.fill(entry);
            }
        }

        // Stalled fetch unit waits a cycle. If nothing was charged above,
        // this cycle costs a no-operation.
        if self.pipe.fetch_stall_cycles > 0 {
            self.pipe.fetch_stall_cycles -= 1;
            if !stall_charged {
                if let Some(power) = self.power.as_mut() {
                    power.charge_stall_cycle();
                }
            }
        }

        // Decode hands off to execute, computing the stall the instruction
        // behind it will incur.
        if self.pipe.fetch_stall_cycles == 0
            && self.pipe.execute.is_empty()
            && !self.pipe.decode.is_empty()
        {
            let stalls = match (self.pipe.decode.entry(), self.pipe.fetch.entry()) {
                (Some(d), Some(f)) => hazards::stall_cycles(d, f),
                _ => 0,
            };
            self.pipe.fetch_stall_cycles += stalls;
            self.stats.stalls_data += stalls;
            if stalls > 0 {
                debug!(stalls, "data hazard: holding fetch");
            }

            if let Some(entry) = self.pipe.decode.take() {
                if bitflip {
                    self.stats.cycle_trans +=
                        bit_flips_32(entry.inst, self.pipe.execute.last_inst());
                }

                if entry.op == Opcode::Jal {
                    // JAL computes its target here in decode; its
                    // sequentially fetched successor is on the wrong path.
                    let corrected = entry.fetched_pc.wrapping_add(INST_BYTES);
                    if bitflip {
                        self.stats.cycle_trans += bit_flips_32(corrected, self.hart.pc);
                    }
                    self.hart.pc = corrected;
                    if let Some(handler) = entry.handler {
                        handler.dispatch(&mut self.hart, entry.inst);
                    }
                    self.stats.instructions += 1;
                    self.stats.record_op(entry.op);
                    self.pipe.fetch.invalidate();
                    self.stats.stalls_control += 1;
                    debug!(
                        pc = entry.fetched_pc,
                        target = self.hart.pc,
                        "jump resolved in decode; squashing fetch"
                    );
                }

                self.pipe.execute.fill(entry);
            }
        }

        // Fetch hands off to decode.
        if self.pipe.decode.is_empty()
            && !self.pipe.fetch.is_empty()
            && self.pipe.fetch_stall_cycles == 0
        {
            if let Some(entry) = self.pipe.fetch.take() {
                if bitflip {
                    self.stats.cycle_trans +=
                        bit_flips_32(self.pipe.decode.last_inst(), entry.inst);
                }
                self.pipe.decode.fill(entry);
            }
        }

        // Refill fetch: from memory, or with no-operations while draining.
        if self.pipe.fetch.is_empty() {
            let word = match mode {
                StepMode::Drain => DRAIN_NOP,
                StepMode::Run => {
                    let w = self.hart.bus.read_u32(self.hart.pc);
                    self.stats.fetched += 1;
                    w
                }
            };
            if bitflip {
                self.stats.cycle_trans += bit_flips_32(self.pipe.fetch.last_inst(), word);
            }
            let decoded = exec::decode(word);
            trace!(pc = self.hart.pc, op = decoded.op.mnemonic(), "fetched");
            self.pipe
                .fetch
                .fill(StageEntry::from_decode(word, decoded, self.hart.pc));
            if mode == StepMode::Run {
                self.hart.pc = self.hart.pc.wrapping_add(INST_BYTES);
            }
        }

        self.stats.cycles += 1;
        self.time_psec += self.cycle_time_psec;

        if self.show_pipe {
            eprintln!("{}", self.dump_pipe());
        }

        if bitflip {
            self.stats.cycle_trans += bit_flips_32(pc_at_cycle_start, self.hart.pc);
            self.stats.ntrans += self.stats.cycle_trans;
            self.stats.cycle_trans = 0;
        }

        Ok(())
    }

    /// Runs up to `quantum` instructions without pipeline timing and returns
    /// the iterations consumed.
    ///
    /// One fetch-decode-execute round per iteration: no stages, no stalls, no
    /// flushing. Cycle counts from this driver reflect instruction counts,
    /// not timing.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IllegalInstruction`] directly at the faulting
    /// instruction; the node is marked non-runnable first.
    pub fn fast_step(&mut self, engine: &mut Engine, quantum: u64) -> Result<u64, SimError> {
        let saved_global = engine.global_time_psec;
        let mut consumed = 0;

        for _ in 0..quantum {
            if !engine.on || !self.runnable {
                break;
            }
            consumed += 1;

            if !engine.event_ready(self.time_psec, self.cycle_time_psec) {
                engine.advance_past(self.time_psec, self.cycle_time_psec);
                continue;
            }

            let pc_before = self.hart.pc;
            let word = self.hart.bus.read_u32(self.hart.pc);
            let decoded = exec::decode(word);
            self.stats.record_op(decoded.op);

            self.hart.pc = self.hart.pc.wrapping_add(INST_BYTES);
            self.stats.cycles += 1;
            self.stats.instructions += 1;
            self.time_psec += self.cycle_time_psec;

            let Some(handler) = decoded.handler else {
                error!(pc = pc_before, inst = word, "illegal instruction");
                self.runnable = false;
                self.stats.last_step_cycles = consumed;
                engine.global_time_psec = saved_global;
                return Err(SimError::IllegalInstruction {
                    pc: pc_before,
                    inst: word,
                });
            };
            handler.dispatch(&mut self.hart, word);

            if self.bitflip_analysis {
                // The PC transition count is folded and immediately discarded
                // on this path; ntrans only advances under pipelined stepping.
                self.stats.cycle_trans += bit_flips_32(pc_before, self.hart.pc);
                self.stats.cycle_trans = 0;
            }

            engine.advance_past(self.time_psec, self.cycle_time_psec);
        }

        engine.global_time_psec = saved_global;
        self.stats.last_step_cycles = consumed;
        Ok(consumed)
    }

    /// Empties every pipeline slot and clears the fetch stall.
    ///
    /// Statistics and architectural state are untouched. Transition counting
    /// charges the bits cleared out of each register.
    pub fn flush_pipe(&mut self) {
        if self.bitflip_analysis {
            for slot in [
                &self.pipe.fetch,
                &self.pipe.decode,
                &self.pipe.execute,
                &self.pipe.mem_access,
                &self.pipe.write_back,
            ] {
                self.stats.cycle_trans += bit_flips_32(slot.last_inst(), 0);
            }
        }
        self.pipe.flush();
    }

    /// Renders a snapshot of the five stage slots.
    pub fn dump_pipe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "node ID={}, PC={:#010x}, cycles={}.",
            self.node_id, self.hart.pc, self.stats.cycles
        );
        Self::dump_slot(&mut out, "WB", &self.pipe.write_back);
        Self::dump_slot(&mut out, "MA", &self.pipe.mem_access);
        Self::dump_slot(&mut out, "EX", &self.pipe.execute);
        Self::dump_slot(&mut out, "ID", &self.pipe.decode);
        Self::dump_slot(&mut out, "IF", &self.pipe.fetch);
        out
    }

    fn dump_slot(out: &mut String, name: &str, slot: &StageSlot) {
        match slot.entry() {
            Some(entry) => {
                let _ = writeln!(
                    out,
                    "{}: [{}]\tinstr: [{}]\tfetched: [{:#010x}]",
                    name,
                    entry.op.mnemonic(),
                    group_fields(entry.inst),
                    entry.fetched_pc
                );
            }
            None => {
                let _ = writeln!(out, "{name}: []");
            }
        }
    }

    /// Renders the per-opcode occurrence table.
    pub fn dump_distribution(&self) -> String {
        let mut out = String::new();
        for op in Opcode::ALL {
            let _ = writeln!(
                out,
                "{:<8} {{{}}}",
                op.mnemonic(),
                self.stats.distribution[op as usize]
            );
        }
        out
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("node_id", &self.node_id)
            .field("hart", &self.hart)
            .field("pipe", &self.pipe)
            .field("runnable", &self.runnable)
            .finish_non_exhaustive()
    }
}

/// Binary rendering of an instruction word, split at the register-format
/// field boundaries (funct7 | rs2 | rs1 | funct3 | rd | opcode).
fn group_fields(inst: u32) -> String {
    let mut out = String::with_capacity(37);
    for i in 0..32 {
        let bit = (inst >> (31 - i)) & 1;
        out.push(if bit == 1 { '1' } else { '0' });
        if matches!(i, 6 | 11 | 16 | 19 | 24) {
            out.push(' ');
        }
    }
    out
}
