//! Prompts for patient analysis and chat.
//!
//! Rendering is deterministic: the same record always yields the same prompt.

use careflow_core::{LabResult, PatientRecord};

/// Opening line of every patient analysis prompt.
pub const ANALYSIS_PREAMBLE: &str =
    "You are a Healthcare Workflow Orchestrator AI analyzing patient data.";

/// Instructions describing the JSON object the oracle must return.
pub const RESPONSE_FORMAT: &str = r#"Provide a JSON response with:
1. Clinical analysis of the patient's condition
2. Severity level (critical/warning/routine)
3. Confidence score (0-100)
4. Specific automated actions to take

Response format:
{
  "analysis": "Clinical analysis text",
  "severity": "critical|warning|routine",
  "confidence": 85,
  "actions": [
    {
      "type": "notify_doctor",
      "method": "slack_api",
      "message": "Alert message",
      "priority": "high|medium|low",
      "estimated_time": "< 1 min"
    }
  ]
}

Focus on patient safety and provide actionable medical workflow recommendations."#;

/// Instructions wrapped around a free-form chat question.
pub const CHAT_PREAMBLE: &str = "You are a helpful medical assistant. Answer the user's question clearly and concisely, and recommend consulting a clinician where appropriate.";

/// One line per lab test: `<test>: <value> (Normal: <range>) - Status: <status>`.
pub fn make_lab_line(test: &str, result: &LabResult) -> String {
    format!(
        "{}: {} (Normal: {}) - Status: {}",
        test, result.value, result.normal, result.status
    )
}

/// Render the analysis prompt for a patient record.
pub fn make_analysis_prompt(patient: &PatientRecord) -> String {
    let labs = patient
        .lab_results
        .iter()
        .map(|(test, result)| make_lab_line(test, result))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{preamble}

Patient: {name}, Age: {age}
Conditions: {conditions}
Last Visit: {last_visit}

Lab Results:
{labs}

{format}"#,
        preamble = ANALYSIS_PREAMBLE,
        name = patient.name,
        age = patient.age,
        conditions = patient.conditions.join(", "),
        last_visit = patient.last_visit,
        labs = labs,
        format = RESPONSE_FORMAT,
    )
}

/// Render the prompt for a chat question.
pub fn make_chat_prompt(question: &str) -> String {
    format!("{}\n\nUser question: {}", CHAT_PREAMBLE, question.trim())
}
