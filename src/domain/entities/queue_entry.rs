use crate::domain::value_objects::{Operation, ResourcePath, TempId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One intended write, as stored in the mutation log.
///
/// Entries are totally ordered by `id` (assigned at enqueue time) and are
/// never reordered or batched out of order during replay: later entries may
/// structurally depend on earlier ones. `attempt_count` and `last_error`
/// are diagnostic, not authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub resource: ResourcePath,
    pub operation: Operation,
    pub payload: Value,
    /// Set for CREATE entries; the placeholder identity of the entity
    /// until the server assigns a canonical one.
    pub temp_id: Option<TempId>,
    pub enqueued_at: DateTime<Utc>,
    pub attempt_count: i32,
    pub last_error: Option<String>,
}

impl QueueEntry {
    /// The identifier a reconciler should match this entry against: the
    /// item segment of the resource path, or the temp id for creates.
    pub fn target_id(&self) -> Option<&str> {
        self.resource
            .item_id()
            .or_else(|| self.temp_id.as_ref().map(TempId::as_str))
    }
}

/// A write as handed to the mutation log by a screen or view-model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationDraft {
    pub resource: ResourcePath,
    pub operation: Operation,
    pub payload: Value,
}

impl MutationDraft {
    pub fn new(resource: ResourcePath, operation: Operation, payload: Value) -> Self {
        Self {
            resource,
            operation,
            payload,
        }
    }

    pub fn create(collection: ResourcePath, payload: Value) -> Self {
        Self::new(collection, Operation::Create, payload)
    }

    pub fn update(item: ResourcePath, payload: Value) -> Self {
        Self::new(item, Operation::Update, payload)
    }

    pub fn delete(item: ResourcePath) -> Self {
        Self::new(item, Operation::Delete, Value::Object(Default::default()))
    }
}
