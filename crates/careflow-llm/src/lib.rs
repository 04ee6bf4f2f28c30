//! Generative-oracle plumbing for patient analysis.
//!
//! This crate renders prompts, talks to the text-generation service, and
//! turns its untrusted free text back into an [`AnalysisResponse`].
//!
//! [`AnalysisResponse`]: careflow_core::AnalysisResponse

pub mod extraction;
pub mod gemini;
pub mod oracle;
pub mod prompts;

pub use extraction::*;
pub use gemini::*;
pub use oracle::*;
pub use prompts::*;
