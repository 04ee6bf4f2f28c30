//! Patient models.

use super::Severity;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Record validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Patient age must be a positive integer")]
    NonPositiveAge,

    #[error("Patient name must not be empty")]
    EmptyName,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// A patient record as supplied by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Caller-assigned identifier (e.g. "P001")
    pub id: String,
    /// Patient name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Condition labels, in the caller's order
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Date of the last visit, as the caller renders it
    pub last_visit: String,
    /// Lab results keyed by test name, in the caller's order
    #[serde(default)]
    pub lab_results: LabPanel,
}

impl PatientRecord {
    /// Check the invariants the gateway relies on.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.age == 0 {
            return Err(ValidationError::NonPositiveAge);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Most severe upstream-assigned lab status, if any labs are present.
    pub fn highest_lab_status(&self) -> Option<Severity> {
        self.lab_results.values().map(|r| r.status).max()
    }

    /// Names of the tests flagged with the given status.
    pub fn labs_with_status(&self, status: Severity) -> Vec<&str> {
        self.lab_results
            .iter()
            .filter(|(_, r)| r.status == status)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Lab results keyed by test name.
///
/// Keeps the order the caller sent them in, so prompts list tests the way the
/// dashboard does. A repeated name replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabPanel {
    entries: Vec<(String, LabResult)>,
}

impl LabPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a result. Returns the replaced one.
    pub fn insert(&mut self, test: impl Into<String>, result: LabResult) -> Option<LabResult> {
        let test = test.into();
        match self.entries.iter_mut().find(|(name, _)| *name == test) {
            Some((_, existing)) => Some(std::mem::replace(existing, result)),
            None => {
                self.entries.push((test, result));
                None
            }
        }
    }

    pub fn get(&self, test: &str) -> Option<&LabResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == test)
            .map(|(_, result)| result)
    }

    pub fn remove(&mut self, test: &str) -> Option<LabResult> {
        let pos = self.entries.iter().position(|(name, _)| name == test)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    pub fn values(&self) -> impl Iterator<Item = &LabResult> {
        self.entries.iter().map(|(_, result)| result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Index<&str> for LabPanel {
    type Output = LabResult;

    fn index(&self, test: &str) -> &LabResult {
        match self.get(test) {
            Some(result) => result,
            None => panic!("no lab result named {}", test),
        }
    }
}

impl Serialize for LabPanel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabPanel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PanelVisitor;

        impl<'de> Visitor<'de> for PanelVisitor {
            type Value = LabPanel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of test name to lab result")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LabPanel, A::Error> {
                let mut panel = LabPanel::new();
                while let Some((name, result)) = access.next_entry::<String, LabResult>()? {
                    panel.insert(name, result);
                }
                Ok(panel)
            }
        }

        deserializer.deserialize_map(PanelVisitor)
    }
}

/// A single lab result. The status is assigned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabResult {
    pub value: LabValue,
    /// Normal range descriptor (e.g. "70-100", "<140/90")
    pub normal: String,
    pub status: Severity,
}

/// Lab values are either numeric (180, 2.1) or textual ("150/95").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LabValue {
    Numeric(serde_json::Number),
    Text(String),
}

impl fmt::Display for LabValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabValue::Numeric(n) => write!(f, "{}", n),
            LabValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for LabValue {
    fn from(s: &str) -> Self {
        LabValue::Text(s.to_string())
    }
}

impl From<u64> for LabValue {
    fn from(n: u64) -> Self {
        LabValue::Numeric(n.into())
    }
}
