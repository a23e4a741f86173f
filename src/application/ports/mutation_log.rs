use crate::domain::entities::{MutationDraft, QueueEntry};
use crate::domain::value_objects::TempId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, ordered, append-only log of pending writes.
///
/// The log is the source of truth for "what has not yet reached the
/// server" and must survive process restart. Any component may enqueue;
/// only the sync engine removes entries (single-writer-for-removal). No
/// deduplication is performed: two visually identical writes produce two
/// entries, because "retry of the same intent" cannot be told apart from a
/// second legitimate edit, and dropping a legitimate edit is worse than
/// replaying twice.
#[async_trait]
pub trait MutationLog: Send + Sync {
    /// Append a draft. Assigns the log id and the enqueue timestamp, and
    /// synthesizes a temporary identity when the operation is a create.
    /// Touches only local storage, never the network.
    async fn enqueue(&self, draft: MutationDraft) -> Result<QueueEntry, AppError>;

    /// All pending entries in enqueue order.
    async fn entries(&self) -> Result<Vec<QueueEntry>, AppError>;

    /// The front of the log, if any.
    async fn peek_next(&self) -> Result<Option<QueueEntry>, AppError>;

    /// Remove one entry. Called by the sync engine only, after the entry
    /// succeeded or was definitively rejected.
    async fn remove(&self, id: i64) -> Result<(), AppError>;

    /// Record a failed attempt (diagnostic): bumps the attempt counter and
    /// stores the error text. The entry stays queued.
    async fn record_failure(&self, id: i64, error: &str) -> Result<(), AppError>;

    /// Replace every occurrence of `temp` inside still-queued payloads with
    /// the canonical identifier the server assigned. Runs the moment a
    /// create succeeds, before the next entry is attempted, so dependent
    /// writes go out with real references. Returns the number of rewritten
    /// entries.
    async fn rewrite_temp_id(&self, temp: &TempId, canonical: &str) -> Result<u64, AppError>;

    async fn len(&self) -> Result<u64, AppError>;

    async fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len().await? == 0)
    }
}
