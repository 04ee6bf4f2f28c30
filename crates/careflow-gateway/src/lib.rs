//! Patient analysis gateway.
//!
//! Accepts a patient record or a chat question, asks a generative oracle for
//! a structured recommendation, and always hands back a renderable
//! [`AnalysisResponse`](careflow_core::AnalysisResponse).
//!
//! # Modules
//!
//! - [`gateway`]: request decoding and the analysis pipeline
//! - [`http`]: axum router, CORS and handlers
//! - [`config`]: command-line and environment configuration
//! - [`error`]: failure taxonomy

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{AnalysisRequest, Gateway};
pub use http::router;
