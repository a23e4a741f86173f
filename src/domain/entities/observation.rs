use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a recorded observation. Closed set: consumers must handle
/// every case, no loose strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Concern,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Concern => "concern",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A finding recorded during a visit, attached to a visit and usually to a
/// flock. Both references may be temp ids while the parents are pending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    pub id: String,
    pub visit_id: String,
    pub flock_id: Option<String>,
    pub category: Option<String>,
    pub severity: Severity,
    pub note: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(Severity::Concern).unwrap(),
            serde_json::json!("concern")
        );
    }

    #[test]
    fn observation_decodes_with_defaults() {
        let obs: Observation =
            serde_json::from_value(serde_json::json!({"id": "o1", "visit_id": "v1"})).unwrap();
        assert_eq!(obs.severity, Severity::Info);
        assert!(obs.flock_id.is_none());
    }
}
