use super::operation::Operation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How a reconciled item is tagged while its queued write is unconfirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    Create,
    Update,
    Delete,
    Close,
    Reopen,
}

impl PendingAction {
    pub fn from_operation(operation: &Operation) -> Option<Self> {
        match operation {
            Operation::Create => Some(PendingAction::Create),
            Operation::Update | Operation::Replace => Some(PendingAction::Update),
            Operation::Delete => Some(PendingAction::Delete),
            Operation::Close => Some(PendingAction::Close),
            Operation::Reopen => Some(PendingAction::Reopen),
            Operation::Unknown(_) => None,
        }
    }

    /// Field a custom action forces on the merged item regardless of the
    /// payload, e.g. closing a visit sets `closed` even when the queued
    /// body carries only a note.
    pub fn forced_field(&self) -> Option<(&'static str, Value)> {
        match self {
            PendingAction::Close => Some(("closed", Value::Bool(true))),
            PendingAction::Reopen => Some(("closed", Value::Bool(false))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PendingAction::Create => "create",
            PendingAction::Update => "update",
            PendingAction::Delete => "delete",
            PendingAction::Close => "close",
            PendingAction::Reopen => "reopen",
        }
    }
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
