//! Command-line and environment configuration.
//!
//! Every setting is a flag with an environment fallback. The API key is the
//! exception: only the NAME of its variable is configurable, and the value is
//! read from the environment on each oracle call.

use careflow_llm::{
    Credential, GeminiConfig, GeminiOracle, GenerationConfig, Oracle, OracleResult,
    ScriptedOracle, DEFAULT_API_BASE, DEFAULT_CREDENTIAL_VAR, DEFAULT_MODEL,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default listen address for `serve`.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

#[derive(Debug, Parser)]
#[command(name = "careflow", version, about = "Patient analysis gateway")]
pub struct Cli {
    #[command(flatten)]
    pub oracle: OracleArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP gateway
    Serve {
        #[arg(long, env = "CAREFLOW_BIND", default_value = DEFAULT_BIND)]
        bind: String,
    },
    /// Analyze a patient record stored as JSON and print the response
    Analyze { path: PathBuf },
    /// Ask the medical assistant a question and print the response
    Chat { question: String },
}

/// Oracle selection and client settings.
#[derive(Debug, Clone, Args)]
pub struct OracleArgs {
    /// Generative model name
    #[arg(long, global = true, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API root, without the model path
    #[arg(long, global = true, env = "GEMINI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Bound on a single oracle call, in seconds
    #[arg(long, global = true, env = "CAREFLOW_ORACLE_TIMEOUT_SECS", default_value_t = 20)]
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    #[arg(long, global = true, default_value = DEFAULT_CREDENTIAL_VAR)]
    pub credential_var: String,

    /// Answer every prompt with this text instead of calling the API
    #[arg(long, global = true, env = "CAREFLOW_SCRIPTED_REPLY")]
    pub scripted_reply: Option<String>,
}

impl OracleArgs {
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_base: self.api_base.clone(),
            model: self.model.clone(),
            credential: Credential::Env(self.credential_var.clone()),
            timeout: Duration::from_secs(self.timeout_secs),
            generation: GenerationConfig::default(),
        }
    }

    /// Build the configured oracle.
    pub fn build_oracle(&self) -> OracleResult<Arc<dyn Oracle>> {
        match &self.scripted_reply {
            Some(reply) => Ok(Arc::new(ScriptedOracle::replying(reply.clone()))),
            None => Ok(Arc::new(GeminiOracle::new(self.gemini_config())?)),
        }
    }
}
