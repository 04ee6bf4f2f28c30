//! Gateway errors.

use careflow_core::ValidationError;
use careflow_llm::OracleError;
use thiserror::Error;

/// Everything that ends a request in the failure shape.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Malformed request body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid patient record: {0}")]
    InvalidPatient(#[from] ValidationError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
