//! Architectural register files.

/// Floating-point register file.
pub mod fpr;

/// Integer register file.
pub mod gpr;

pub use fpr::Fpr;
pub use gpr::Gpr;
