//! The patient analysis gateway.
//!
//! Stateless between calls: each request renders its own prompt, makes one
//! oracle call, and extracts a response. Fatal errors are converted into the
//! failure payload at [`Gateway::respond`], never propagated past it.

use crate::error::{GatewayError, GatewayResult};
use careflow_core::{AnalysisResponse, PatientRecord};
use careflow_llm::{extract_analysis, make_analysis_prompt, make_chat_prompt, Oracle};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// A decoded gateway request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    /// `{ "patient": PatientRecord }`
    Patient(PatientRecord),
    /// `{ "prompt": "...", "type": "chat" }`
    Chat(String),
}

#[derive(Deserialize)]
struct RawRequest {
    patient: Option<PatientRecord>,
    prompt: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl AnalysisRequest {
    /// Decode a JSON request body.
    pub fn from_slice(body: &[u8]) -> GatewayResult<Self> {
        let raw: RawRequest = serde_json::from_slice(body)?;

        if raw.kind.as_deref() == Some("chat") {
            return raw.prompt.map(AnalysisRequest::Chat).ok_or_else(|| {
                GatewayError::InvalidRequest("chat request is missing \"prompt\"".into())
            });
        }

        if let Some(kind) = raw.kind {
            return Err(GatewayError::InvalidRequest(format!(
                "unknown request type \"{}\"",
                kind
            )));
        }

        raw.patient
            .map(AnalysisRequest::Patient)
            .ok_or_else(|| GatewayError::InvalidRequest("request is missing \"patient\"".into()))
    }
}

/// Turns patient records and chat questions into analysis responses.
#[derive(Clone)]
pub struct Gateway {
    oracle: Arc<dyn Oracle>,
}

impl Gateway {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Analyze one patient record.
    #[instrument(skip_all, fields(patient_id = %patient.id))]
    pub async fn analyze_patient(&self, patient: &PatientRecord) -> GatewayResult<AnalysisResponse> {
        patient.validate()?;
        if let Some(worst) = patient.highest_lab_status() {
            debug!(%worst, labs = patient.lab_results.len(), "Upstream lab statuses");
        }

        let prompt = make_analysis_prompt(patient);
        let text = self.oracle.generate(&prompt).await?;

        let extraction = extract_analysis(&text);
        info!(
            outcome = extraction.kind(),
            confidence = extraction.confidence(),
            "Analysis extracted"
        );
        Ok(extraction.into_response())
    }

    /// Answer a free-form question. The reply is never parsed for structure.
    #[instrument(skip_all)]
    pub async fn chat(&self, question: &str) -> GatewayResult<AnalysisResponse> {
        if question.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("chat prompt is empty".into()));
        }

        let text = self.oracle.generate(&make_chat_prompt(question)).await?;
        Ok(AnalysisResponse::chat_reply(text))
    }

    pub async fn handle(&self, request: &AnalysisRequest) -> GatewayResult<AnalysisResponse> {
        match request {
            AnalysisRequest::Patient(patient) => self.analyze_patient(patient).await,
            AnalysisRequest::Chat(question) => self.chat(question).await,
        }
    }

    /// Serve a request, converting any fatal error into the failure payload.
    pub async fn respond(&self, request: &AnalysisRequest) -> AnalysisResponse {
        match self.handle(request).await {
            Ok(response) => response,
            Err(e) => failure(e),
        }
    }

    /// Decode and serve a raw request body.
    pub async fn respond_to_body(&self, body: &[u8]) -> AnalysisResponse {
        match AnalysisRequest::from_slice(body) {
            Ok(request) => self.respond(&request).await,
            Err(e) => failure(e),
        }
    }
}

fn failure(e: GatewayError) -> AnalysisResponse {
    error!(error = %e, "Analysis request failed");
    AnalysisResponse::failure(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use careflow_core::Severity;
    use careflow_llm::{Script, ScriptedOracle};

    fn patient_body() -> &'static str {
        r#"{"patient": {
            "id": "P002",
            "name": "Sarah Chen",
            "age": 45,
            "conditions": ["Asthma"],
            "lastVisit": "2024-09-18",
            "labResults": {
                "peakFlow": { "value": 85, "normal": ">80%", "status": "routine" }
            }
        }}"#
    }

    #[test]
    fn test_decode_patient_request() {
        match AnalysisRequest::from_slice(patient_body().as_bytes()).unwrap() {
            AnalysisRequest::Patient(p) => assert_eq!(p.name, "Sarah Chen"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_chat_request() {
        let body = br#"{"prompt": "Is 180 mg/dL glucose high?", "type": "chat"}"#;
        assert_eq!(
            AnalysisRequest::from_slice(body).unwrap(),
            AnalysisRequest::Chat("Is 180 mg/dL glucose high?".into())
        );
    }

    #[test]
    fn test_decode_rejects_bad_bodies() {
        let bodies: [&[u8]; 5] = [
            b"not json",
            br#"{}"#,
            br#"{"type": "chat"}"#,
            br#"{"prompt": "hi", "type": "sms"}"#,
            br#"{"patient": {"id": "P1", "name": "A", "age": -4, "lastVisit": "x"}}"#,
        ];
        for body in bodies {
            assert!(AnalysisRequest::from_slice(body).is_err());
        }
    }

    #[tokio::test]
    async fn test_analyze_patient_uses_oracle_reply() {
        let oracle = Arc::new(ScriptedOracle::replying(
            r#"Sure! {"analysis":"Stable asthma","severity":"routine","confidence":91,"actions":[]}"#,
        ));
        let gateway = Gateway::new(oracle.clone());

        let response = gateway.respond_to_body(patient_body().as_bytes()).await;
        assert_eq!(response.analysis, "Stable asthma");
        assert_eq!(response.confidence, 91);
        assert_eq!(oracle.call_count(), 1);
        assert!(oracle.prompts()[0].contains("peakFlow: 85 (Normal: >80%) - Status: routine"));
    }

    #[tokio::test]
    async fn test_invalid_patient_skips_oracle() {
        let oracle = Arc::new(ScriptedOracle::replying("unused"));
        let gateway = Gateway::new(oracle.clone());

        let body = br#"{"patient": {"id": "P1", "name": "A", "age": 0, "lastVisit": "x"}}"#;
        let response = gateway.respond_to_body(body).await;
        assert!(response.is_failure());
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_is_failure() {
        let gateway = Gateway::new(Arc::new(ScriptedOracle::new(Script::MissingCredential(
            "GEMINI_API_KEY".into(),
        ))));

        let response = gateway.respond_to_body(patient_body().as_bytes()).await;
        assert_eq!(response.error.as_deref(), Some("GEMINI_API_KEY is not set"));
        assert_eq!(response.confidence, 0);
        assert_eq!(response.severity, Severity::Routine);
        assert!(response.actions.is_empty());
    }

    #[tokio::test]
    async fn test_chat_returns_text_verbatim() {
        let reply = "A fasting glucose of 180 mg/dL is high. {See your doctor}";
        let oracle = Arc::new(ScriptedOracle::replying(reply));
        let gateway = Gateway::new(oracle.clone());

        let response = gateway
            .handle(&AnalysisRequest::Chat("Is 180 high?".into()))
            .await
            .unwrap();
        assert_eq!(response.analysis, reply);
        assert_eq!(response.confidence, 80);
        assert!(response.actions.is_empty());
        assert!(oracle.prompts()[0].ends_with("User question: Is 180 high?"));
    }

    #[tokio::test]
    async fn test_empty_chat_rejected() {
        let gateway = Gateway::new(Arc::new(ScriptedOracle::replying("unused")));
        let result = gateway.handle(&AnalysisRequest::Chat("   ".into())).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }
}
