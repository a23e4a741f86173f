use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::ResourcePath;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// Terminal result of replaying one queue entry against the server.
///
/// A definitive rejection is data, not an `AppError`: the request reached
/// the server and was judged invalid, so retrying it as-is cannot succeed.
/// Transport and authentication failures surface as `AppError` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Applied {
        /// Canonical identifier of a created entity, when the server
        /// returned one. Used to rewrite temp-id references in the rest of
        /// the queue.
        canonical_id: Option<String>,
    },
    Rejected {
        status: u16,
        message: String,
    },
}

/// The remote HTTP/JSON service, consumed but not owned by this core.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Fetch one collection snapshot. The envelope exposes members under a
    /// conventional key; implementations fall back to treating the whole
    /// response as the member list.
    async fn fetch_collection(&self, resource: &ResourcePath) -> Result<Vec<Value>, AppError>;

    /// Issue the write an entry intends, with the verb its operation maps
    /// to. Every request carries the bearer credential; a missing or
    /// rejected credential is `AppError::Auth`, never a transport failure.
    async fn execute(&self, entry: &QueueEntry) -> Result<WriteOutcome, AppError>;
}
