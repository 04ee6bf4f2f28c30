//! Analysis response models.
//!
//! The confidence score doubles as a diagnostic code: the fallback paths each
//! stamp a fixed value so operators can tell which recovery fired.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Confidence stamped when the oracle replied with text but no JSON braces.
pub const UNSTRUCTURED_REPLY_CONFIDENCE: u8 = 80;

/// Confidence stamped when the oracle's braced region failed to parse.
pub const MALFORMED_REPLY_CONFIDENCE: u8 = 75;

/// Confidence stamped by the dashboard when the gateway is unreachable.
pub const CLIENT_FALLBACK_CONFIDENCE: u8 = 50;

/// Confidence carried by a total-failure payload.
pub const FAILURE_CONFIDENCE: u8 = 0;

/// Analysis text carried by a total-failure payload.
pub const FAILURE_ANALYSIS: &str = "Unable to analyze patient data at this time.";

/// Severity of a patient's state, also used for lab statuses.
///
/// Ordered from least to most urgent so `max()` picks the worst.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Routine,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Routine => "routine",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a recommended action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A follow-up action suggested by the analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedAction {
    /// Free-form tag (e.g. "notify_doctor")
    #[serde(rename = "type")]
    pub action_type: String,
    /// Delivery method (e.g. "slack_api", "twilio_sms")
    pub method: String,
    pub message: String,
    pub priority: Priority,
    /// Display string (e.g. "< 1 min")
    #[serde(default)]
    pub estimated_time: String,
}

impl RecommendedAction {
    /// The generic action attached to every recovered reply.
    pub fn manual_review() -> Self {
        Self {
            action_type: "review_needed".into(),
            method: "manual_review".into(),
            message: "Manual review required".into(),
            priority: Priority::Medium,
            estimated_time: "5-10 min".into(),
        }
    }
}

/// The gateway's answer for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResponse {
    /// Present only on total failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub analysis: String,
    pub severity: Severity,
    /// 0-100
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub actions: Vec<RecommendedAction>,
}

impl AnalysisResponse {
    /// Reply recovered from free text: routine, one manual-review action.
    pub fn review_needed(text: impl Into<String>, confidence: u8) -> Self {
        Self {
            error: None,
            analysis: text.into(),
            severity: Severity::Routine,
            confidence,
            actions: vec![RecommendedAction::manual_review()],
        }
    }

    /// Terminal payload returned when the request could not be served at all.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            analysis: FAILURE_ANALYSIS.into(),
            severity: Severity::Routine,
            confidence: FAILURE_CONFIDENCE,
            actions: Vec::new(),
        }
    }

    /// Conversational answer; carries no structured actions.
    pub fn chat_reply(text: impl Into<String>) -> Self {
        Self {
            error: None,
            analysis: text.into(),
            severity: Severity::Routine,
            confidence: UNSTRUCTURED_REPLY_CONFIDENCE,
            actions: Vec::new(),
        }
    }

    /// What a dashboard shows when it cannot reach the gateway.
    pub fn client_fallback(message: impl Into<String>) -> Self {
        Self {
            error: None,
            analysis: message.into(),
            severity: Severity::Routine,
            confidence: CLIENT_FALLBACK_CONFIDENCE,
            actions: Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Actions with the given priority, in reply order.
    pub fn actions_with_priority(&self, priority: Priority) -> impl Iterator<Item = &RecommendedAction> {
        self.actions.iter().filter(move |a| a.priority == priority)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Accept any JSON number in [0, 100]; fractional scores are rounded.
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || !(0.0..=100.0).contains(&raw) {
        return Err(de::Error::custom(format!(
            "confidence {} is outside 0-100",
            raw
        )));
    }
    Ok(raw.round() as u8)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RecommendedAction>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RecommendedAction>>::deserialize(deserializer)?.unwrap_or_default())
}
