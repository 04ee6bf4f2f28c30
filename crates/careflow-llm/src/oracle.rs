//! The generative-text oracle seam.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Fatal failures of a single oracle call. None are retried.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("{0} is not set")]
    MissingCredential(String),

    #[error("Oracle transport error: {0}")]
    Transport(reqwest::Error),

    #[error("Oracle API error: {status}")]
    Status { status: u16, body: String },

    #[error("Unreadable oracle response: {0}")]
    Decode(String),

    #[error("No response from oracle")]
    EmptyGeneration,
}

pub type OracleResult<T> = Result<T, OracleError>;

impl From<reqwest::Error> for OracleError {
    /// Drops the request URL so nothing in it reaches messages or logs.
    fn from(e: reqwest::Error) -> Self {
        OracleError::Transport(e.without_url())
    }
}

/// An opaque text-generation service.
///
/// Output is untrusted free text; callers must not assume it is valid JSON.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(&self, prompt: &str) -> OracleResult<String>;
}

/// What a [`ScriptedOracle`] answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum Script {
    Reply(String),
    MissingCredential(String),
    Status(u16),
    Empty,
}

/// Oracle that answers every prompt with a fixed script.
///
/// Used for tests and offline runs; it records every prompt it receives.
pub struct ScriptedOracle {
    script: Script,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Oracle that always replies with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(Script::Reply(text.into()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, prompt: &str) -> OracleResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        match &self.script {
            Script::Reply(text) if text.is_empty() => Err(OracleError::EmptyGeneration),
            Script::Reply(text) => Ok(text.clone()),
            Script::MissingCredential(var) => Err(OracleError::MissingCredential(var.clone())),
            Script::Status(status) => Err(OracleError::Status {
                status: *status,
                body: String::new(),
            }),
            Script::Empty => Err(OracleError::EmptyGeneration),
        }
    }
}
