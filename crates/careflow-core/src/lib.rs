//! Careflow Core Library
//!
//! Domain types shared by the patient analysis gateway and its consumers.
//!
//! # Architecture
//!
//! ```text
//! PatientRecord ──► prompt ──► generative oracle ──► free text
//!                                                       │
//!                                         ┌─────────────┼─────────────┐
//!                                         ▼             ▼             ▼
//!                                    well-formed    malformed     no braces
//!                                      (as-is)    (conf = 75)   (conf = 80)
//!                                         └─────────────┼─────────────┘
//!                                                       ▼
//!                                               AnalysisResponse
//! ```
//!
//! Nothing here is persisted. Every type is built per request.
//!
//! # Modules
//!
//! - [`models`]: Domain types (PatientRecord, LabResult, AnalysisResponse, etc.)

pub mod models;

// Re-export commonly used types
pub use models::{
    AnalysisResponse, LabPanel, LabResult, LabValue, PatientRecord, Priority, RecommendedAction,
    Severity, ValidationError, ValidationResult, CLIENT_FALLBACK_CONFIDENCE, FAILURE_ANALYSIS,
    FAILURE_CONFIDENCE, MALFORMED_REPLY_CONFIDENCE, UNSTRUCTURED_REPLY_CONFIDENCE,
};
