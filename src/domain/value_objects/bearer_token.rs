use serde::{Deserialize, Serialize};

/// Bearer credential attached to every remote request.
///
/// Its absence is an authentication failure, never a transport failure,
/// and is surfaced before any request goes out.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err("Bearer token cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Keep the secret out of debug logs.
impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_token() {
        assert!(BearerToken::new("  ").is_err());
    }

    #[test]
    fn builds_header_value() {
        let token = BearerToken::new("abc123").unwrap();
        assert_eq!(token.header_value(), "Bearer abc123");
    }

    #[test]
    fn debug_redacts() {
        let token = BearerToken::new("secret").unwrap();
        assert_eq!(format!("{token:?}"), "BearerToken(***)");
    }
}
