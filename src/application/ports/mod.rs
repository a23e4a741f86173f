pub mod connectivity;
pub mod mutation_log;
pub mod remote_service;

pub use connectivity::ConnectivityMonitor;
pub use mutation_log::MutationLog;
pub use remote_service::{RemoteService, WriteOutcome};
