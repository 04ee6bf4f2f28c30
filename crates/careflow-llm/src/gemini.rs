//! Gemini `generateContent` client.

use crate::oracle::{Oracle, OracleError, OracleResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default API root.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the API key by default.
pub const DEFAULT_CREDENTIAL_VAR: &str = "GEMINI_API_KEY";

/// Header carrying the API key. Keeping it out of the URL keeps it out of errors.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Default bound on a single call, connect time included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sampling parameters. Low temperature biases toward structured output.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_k: 32,
            top_p: 1.0,
            max_output_tokens: 1024,
        }
    }
}

/// Where the API key comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    /// Read from this environment variable on every call
    Env(String),
    /// Fixed key
    Static(String),
}

impl Credential {
    /// Resolve the key now. Missing and empty are the same failure.
    pub fn resolve(&self) -> OracleResult<String> {
        match self {
            Credential::Env(var) => std::env::var(var)
                .ok()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| OracleError::MissingCredential(var.clone())),
            Credential::Static(key) if key.is_empty() => {
                Err(OracleError::MissingCredential("API key".into()))
            }
            Credential::Static(key) => Ok(key.clone()),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    pub credential: Credential,
    pub timeout: Duration,
    pub generation: GenerationConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            model: DEFAULT_MODEL.into(),
            credential: Credential::Env(DEFAULT_CREDENTIAL_VAR.into()),
            timeout: DEFAULT_TIMEOUT,
            generation: GenerationConfig::default(),
        }
    }
}

impl GeminiConfig {
    /// Full `generateContent` URL, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-empty.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

/// Oracle backed by the Gemini REST API.
pub struct GeminiOracle {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiOracle {
    pub fn new(config: GeminiConfig) -> OracleResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(config.timeout))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn generate(&self, prompt: &str) -> OracleResult<String> {
        let key = self.config.credential.resolve()?;

        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: &self.config.generation,
        };

        info!(model = %self.config.model, "Calling generative oracle");

        let response = self
            .client
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GenerateResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Decode(e.without_url().to_string()))?;
        debug!(?envelope, "Oracle response");

        envelope.into_text().ok_or(OracleError::EmptyGeneration)
    }
}
