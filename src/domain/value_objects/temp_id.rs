use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const TEMP_PREFIX: &str = "TEMP_";

/// Client-synthesized placeholder identifier for an entity that does not
/// exist server-side yet.
///
/// Assigned at enqueue time for CREATE entries, used as the pending item's
/// own id and injected into payloads of later entries that reference it.
/// Never durable, never unique across sessions: once the create is
/// confirmed, every queued occurrence is rewritten to the canonical id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempId(String);

impl TempId {
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let fragment = Uuid::new_v4().simple().to_string();
        Self(format!("{TEMP_PREFIX}{millis}_{}", &fragment[..8]))
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        if !Self::is_temp(value) {
            return Err(format!("Not a temporary identifier: {value}"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for any identifier string minted by [`TempId::generate`].
    pub fn is_temp(value: &str) -> bool {
        value.starts_with(TEMP_PREFIX)
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TempId> for String {
    fn from(value: TempId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_the_prefix() {
        let id = TempId::generate();
        assert!(TempId::is_temp(id.as_str()));
        assert!(id.as_str().len() > TEMP_PREFIX.len());
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(TempId::generate(), TempId::generate());
    }

    #[test]
    fn parse_rejects_canonical_ids() {
        assert!(TempId::parse("1234").is_err());
        assert!(TempId::parse("TEMP_1_abc").is_ok());
    }
}
