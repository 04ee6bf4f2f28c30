//! Analysis extraction from oracle output.
//!
//! The oracle is asked for a JSON object but answers in free text. The reply
//! is classified into one of three outcomes, and each outcome maps to a fixed
//! confidence so the recovery path stays visible downstream.

use careflow_core::{
    AnalysisResponse, MALFORMED_REPLY_CONFIDENCE, UNSTRUCTURED_REPLY_CONFIDENCE,
};
use tracing::warn;

/// Outcome of extracting an analysis from generated text.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The braced region parsed as an analysis.
    Structured(AnalysisResponse),
    /// Braces were present but the region did not parse.
    Malformed { text: String, reason: String },
    /// No braces at all.
    Unstructured { text: String },
}

impl Extraction {
    /// Confidence the resulting response will carry.
    pub fn confidence(&self) -> u8 {
        match self {
            Extraction::Structured(response) => response.confidence,
            Extraction::Malformed { .. } => MALFORMED_REPLY_CONFIDENCE,
            Extraction::Unstructured { .. } => UNSTRUCTURED_REPLY_CONFIDENCE,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Extraction::Structured(_) => "structured",
            Extraction::Malformed { .. } => "malformed",
            Extraction::Unstructured { .. } => "unstructured",
        }
    }

    /// Collapse into the response returned to the caller.
    pub fn into_response(self) -> AnalysisResponse {
        match self {
            Extraction::Structured(response) => response,
            Extraction::Malformed { text, .. } => {
                AnalysisResponse::review_needed(text, MALFORMED_REPLY_CONFIDENCE)
            }
            Extraction::Unstructured { text } => {
                AnalysisResponse::review_needed(text, UNSTRUCTURED_REPLY_CONFIDENCE)
            }
        }
    }
}

/// Locate the greedy span from the first `{` to the last `}`.
///
/// Commentary containing stray braces before or after the real object widens
/// the span and breaks the parse. This matches what deployed clients expect.
pub fn locate_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Classify generated text and parse any embedded analysis.
pub fn extract_analysis(text: &str) -> Extraction {
    let has_braces = text.contains('{') || text.contains('}');
    if !has_braces {
        return Extraction::Unstructured {
            text: text.to_string(),
        };
    }

    let Some(span) = locate_json_span(text) else {
        warn!("Oracle reply has unbalanced braces");
        return Extraction::Malformed {
            text: text.to_string(),
            reason: "No complete JSON object found in response".into(),
        };
    };

    match serde_json::from_str::<AnalysisResponse>(span) {
        Ok(mut response) => {
            // Only total failures carry an error; never trust one from the oracle.
            response.error = None;
            Extraction::Structured(response)
        }
        Err(e) => {
            warn!(error = %e, "JSON parse error in oracle reply");
            Extraction::Malformed {
                text: text.to_string(),
                reason: e.to_string(),
            }
        }
    }
}
