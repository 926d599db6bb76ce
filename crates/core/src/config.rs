//! Simulator configuration.
//!
//! Parameters for one simulated processor node. Supplied as JSON by embedding
//! frontends or via [`Config::default`] for direct use.

use serde::Deserialize;

/// Default configuration constants.
mod defaults {
    /// Cycles a single stepping call may execute before yielding to the
    /// outer scheduler.
    pub const QUANTUM: u64 = 1024;

    /// Clock period in picoseconds (100 MHz).
    pub const CYCLE_TIME_PSEC: f64 = 10_000.0;
}

/// Per-node simulation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum cycles per stepping call.
    pub quantum: u64,
    /// Clock period in picoseconds.
    pub cycle_time_psec: f64,
    /// Emit a pipeline snapshot to stderr after every cycle.
    pub show_pipe: bool,
    /// Count bit transitions in the pipeline registers each cycle.
    pub bitflip_analysis: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quantum: defaults::QUANTUM,
            cycle_time_psec: defaults::CYCLE_TIME_PSEC,
            show_pipe: false,
            bitflip_analysis: false,
        }
    }
}
