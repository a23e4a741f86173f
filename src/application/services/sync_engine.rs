use crate::application::ports::{ConnectivityMonitor, MutationLog, RemoteService, WriteOutcome};
use crate::domain::entities::{MutationDraft, QueueEntry};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Draining,
}

/// Snapshot of the engine for the user-facing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEngineStatus {
    pub state: EngineState,
    pub pending: u64,
    pub last_drain: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// A definitive server rejection, surfaced for the operator to correct and
/// resubmit. The entry has already been removed from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedMutation {
    pub entry: QueueEntry,
    pub status: u16,
    pub message: String,
}

/// What one drain cycle accomplished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainReport {
    /// Entries confirmed by the server and removed from the log.
    pub sent: u32,
    /// Entries the server definitively rejected (also removed).
    pub rejected: Vec<RejectedMutation>,
    /// Queued payload rewrites performed after creates were confirmed.
    pub rewritten_references: u64,
    /// A transport failure (or missing credential) stopped the drain with
    /// the remainder of the log unchanged.
    pub halted: bool,
    /// The halt was caused by a missing or rejected bearer credential.
    pub auth_required: bool,
    /// Another drain was already in flight; nothing was attempted.
    pub already_draining: bool,
}

/// Result of the optimistic submit path.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Enqueued only; the device is (or believes itself) offline.
    Queued(QueueEntry),
    /// Enqueued and a drain was attempted immediately.
    Attempted(QueueEntry, DrainReport),
}

impl SubmitOutcome {
    pub fn entry(&self) -> &QueueEntry {
        match self {
            SubmitOutcome::Queued(entry) => entry,
            SubmitOutcome::Attempted(entry, _) => entry,
        }
    }
}

/// Drains the mutation log strictly front-to-back against the remote
/// service, one in-flight request at a time.
///
/// Sequential draining is mandatory: parallel replay would let a dependent
/// write ("create flock in building B") race its prerequisite ("create
/// building B"). Both drain triggers — the connectivity-restored edge and
/// the enqueue-then-try-now path — converge on the same single-flight
/// guard, so two triggers never produce two concurrent drains.
pub struct SyncEngine {
    log: Arc<dyn MutationLog>,
    remote: Arc<dyn RemoteService>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    drain_on_enqueue: bool,
    status: Arc<RwLock<SyncEngineStatus>>,
}

impl SyncEngine {
    pub fn new(
        log: Arc<dyn MutationLog>,
        remote: Arc<dyn RemoteService>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        Self {
            log,
            remote,
            connectivity,
            drain_on_enqueue: true,
            status: Arc::new(RwLock::new(SyncEngineStatus {
                state: EngineState::Idle,
                pending: 0,
                last_drain: None,
                last_error: None,
            })),
        }
    }

    pub fn with_drain_on_enqueue(mut self, enabled: bool) -> Self {
        self.drain_on_enqueue = enabled;
        self
    }

    /// Optimistic write path: always enqueue first, then try to send right
    /// away when the connectivity signal reads online. The write is never
    /// lost — a failed immediate send just leaves it queued.
    pub async fn submit(&self, draft: MutationDraft) -> Result<SubmitOutcome, AppError> {
        let entry = self.log.enqueue(draft).await?;
        debug!(
            entry_id = entry.id,
            resource = %entry.resource,
            operation = %entry.operation,
            "mutation enqueued"
        );

        if self.drain_on_enqueue && self.connectivity.is_online() {
            let report = self.drain().await?;
            Ok(SubmitOutcome::Attempted(entry, report))
        } else {
            self.refresh_pending().await?;
            Ok(SubmitOutcome::Queued(entry))
        }
    }

    /// Edge-triggered entry point for the host's "became online" event.
    pub async fn handle_online(&self) -> Result<DrainReport, AppError> {
        info!("connectivity restored, draining mutation log");
        self.drain().await
    }

    /// Drain the log front-to-back. Succeeded entries are removed;
    /// definitively rejected entries are removed and surfaced; a transport
    /// failure halts the cycle with the log otherwise unchanged.
    pub async fn drain(&self) -> Result<DrainReport, AppError> {
        {
            let mut status = self.status.write().await;
            if status.state == EngineState::Draining {
                return Ok(DrainReport {
                    already_draining: true,
                    ..DrainReport::default()
                });
            }
            status.state = EngineState::Draining;
        }

        let mut report = DrainReport::default();
        let result = self.drain_loop(&mut report).await;

        let mut status = self.status.write().await;
        status.state = EngineState::Idle;
        status.pending = self.log.len().await.unwrap_or(status.pending);
        status.last_drain = Some(Utc::now());
        status.last_error = match &result {
            Err(err) => Some(err.to_string()),
            Ok(()) if report.halted => Some("drain halted before the log emptied".to_string()),
            Ok(()) => None,
        };
        drop(status);

        result?;
        Ok(report)
    }

    async fn drain_loop(&self, report: &mut DrainReport) -> Result<(), AppError> {
        loop {
            if !self.connectivity.is_online() {
                report.halted = true;
                return Ok(());
            }

            let entry = match self.log.peek_next().await? {
                Some(entry) => entry,
                None => return Ok(()),
            };

            if entry.operation.http_method().is_none() {
                // Enqueued by a version of the app this build does not
                // know. Replaying it blind would wedge the queue; surface
                // it like a rejection instead.
                warn!(entry_id = entry.id, operation = %entry.operation, "discarding unsupported queued operation");
                self.log.remove(entry.id).await?;
                report.rejected.push(RejectedMutation {
                    status: 0,
                    message: format!("unsupported operation '{}'", entry.operation),
                    entry,
                });
                continue;
            }

            match self.remote.execute(&entry).await {
                Ok(WriteOutcome::Applied { canonical_id }) => {
                    if let (Some(temp), Some(canonical)) = (&entry.temp_id, &canonical_id) {
                        // Rewrite dependent payloads before anything else is
                        // attempted, so the next entry already carries the
                        // canonical reference.
                        let rewritten = self.log.rewrite_temp_id(temp, canonical).await?;
                        if rewritten > 0 {
                            debug!(
                                temp = %temp,
                                canonical = %canonical,
                                entries = rewritten,
                                "rewrote temporary references"
                            );
                        }
                        report.rewritten_references += rewritten;
                    }
                    self.log.remove(entry.id).await?;
                    report.sent += 1;
                }
                Ok(WriteOutcome::Rejected { status, message }) => {
                    warn!(
                        entry_id = entry.id,
                        status, message, "server rejected queued mutation"
                    );
                    self.log.remove(entry.id).await?;
                    report.rejected.push(RejectedMutation {
                        status,
                        message,
                        entry,
                    });
                }
                Err(AppError::Auth(message)) => {
                    // The credential is the problem, not the entry; keep it
                    // queued and stop until the operator re-authenticates.
                    warn!(entry_id = entry.id, %message, "authentication failure during drain");
                    report.halted = true;
                    report.auth_required = true;
                    return Ok(());
                }
                Err(err) if err.is_retryable() => {
                    debug!(entry_id = entry.id, error = %err, "transport failure, halting drain");
                    self.log.record_failure(entry.id, &err.to_string()).await?;
                    report.halted = true;
                    return Ok(());
                }
                Err(err) => {
                    self.log.record_failure(entry.id, &err.to_string()).await?;
                    report.halted = true;
                    return Err(err);
                }
            }
        }
    }

    pub async fn status(&self) -> SyncEngineStatus {
        self.status.read().await.clone()
    }

    async fn refresh_pending(&self) -> Result<(), AppError> {
        let pending = self.log.len().await?;
        self.status.write().await.pending = pending;
        Ok(())
    }
}
