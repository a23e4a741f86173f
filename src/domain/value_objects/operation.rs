use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of write a queue entry intends.
///
/// Custom server actions (`Close`, `Reopen`) are first-class variants so
/// every consumer has to handle them explicitly instead of sniffing loose
/// strings. Operation strings persisted by an older app version that this
/// build no longer knows load as `Unknown` and are surfaced, not replayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Replace,
    Delete,
    Close,
    Reopen,
    Unknown(String),
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
            Operation::Close => "close",
            Operation::Reopen => "reopen",
            Operation::Unknown(value) => value.as_str(),
        }
    }

    /// HTTP method the remote service contract assigns to this operation.
    /// `Unknown` carries no method; the engine discards such entries.
    pub fn http_method(&self) -> Option<&'static str> {
        match self {
            Operation::Create | Operation::Close | Operation::Reopen => Some("POST"),
            Operation::Update => Some("PATCH"),
            Operation::Replace => Some("PUT"),
            Operation::Delete => Some("DELETE"),
            Operation::Unknown(_) => None,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Operation::Create)
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Operation::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Operation {
    fn from(value: &str) -> Self {
        match value {
            "create" => Operation::Create,
            "update" => Operation::Update,
            "replace" => Operation::Replace,
            "delete" => Operation::Delete,
            "close" => Operation::Close,
            "reopen" => Operation::Reopen,
            other => Operation::Unknown(other.to_string()),
        }
    }
}
