//! Simulation statistics collection and reporting.
//!
//! Tracks what the stepping engines produce each cycle:
//! 1. **Cycle and instruction counts:** Total cycles, dynamic instructions,
//!    fetched instructions.
//! 2. **Instruction mix:** A fixed-size occurrence table indexed by opcode.
//! 3. **Stalls:** Data-hazard and control-flush stall cycles.
//! 4. **Bit transitions:** A per-cycle accumulator folded into a running
//!    total, for switching-activity analysis.

use crate::isa::operation::Opcode;

/// Statistics for one simulated processor.
#[derive(Debug, Clone)]
pub struct SimStats {
    /// Total simulated cycles.
    pub cycles: u64,
    /// Dynamic instruction count (instructions actually executed).
    pub instructions: u64,
    /// Instructions fetched from memory (drain no-ops excluded).
    pub fetched: u64,
    /// Iterations consumed by the most recent fast-stepping call.
    pub last_step_cycles: u64,
    /// Stall cycles inserted for data hazards.
    pub stalls_data: u64,
    /// Cycles lost to control-flow flushes.
    pub stalls_control: u64,
    /// Running total of pipeline-register bit transitions.
    pub ntrans: u64,
    /// Bit transitions accumulated within the current cycle.
    pub cycle_trans: u64,
    /// Occurrence count per operation.
    pub distribution: [u64; Opcode::COUNT],
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            cycles: 0,
            instructions: 0,
            fetched: 0,
            last_step_cycles: 0,
            stalls_data: 0,
            stalls_control: 0,
            ntrans: 0,
            cycle_trans: 0,
            distribution: [0; Opcode::COUNT],
        }
    }
}

impl SimStats {
    /// Counts one occurrence of `op`.
    #[inline]
    pub fn record_op(&mut self, op: Opcode) {
        self.distribution[op as usize] += 1;
    }

    /// Prints a summary to stdout.
    pub fn print(&self) {
        let cyc = self.cycles.max(1);
        println!("--------------------------------------------");
        println!("sim_cycles        {}", self.cycles);
        println!("sim_insts         {}", self.instructions);
        println!("sim_fetched       {}", self.fetched);
        println!(
            "sim_ipc           {:.4}",
            self.instructions as f64 / cyc as f64
        );
        println!(
            "stalls.data       {} ({:.2}%)",
            self.stalls_data,
            (self.stalls_data as f64 / cyc as f64) * 100.0
        );
        println!(
            "stalls.control    {} ({:.2}%)",
            self.stalls_control,
            (self.stalls_control as f64 / cyc as f64) * 100.0
        );
        println!("bit_transitions   {}", self.ntrans);
        println!("--------------------------------------------");
    }
}
