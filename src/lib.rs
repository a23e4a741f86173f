//! Offline-first core for the farm visit app: a durable mutation queue,
//! a strictly ordered sync engine, and an optimistic reconciler that
//! overlays queued mutations onto server snapshots.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{ConnectivityMonitor, MutationLog, RemoteService, WriteOutcome};
pub use application::services::{DrainReport, SubmitOutcome, SyncEngine, SyncEngineStatus};
pub use shared::{AppConfig, AppError, Result};
