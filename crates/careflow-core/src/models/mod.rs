//! Domain models for the analysis gateway.

mod analysis;
mod patient;

pub use analysis::*;
pub use patient::*;
