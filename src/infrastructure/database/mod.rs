pub mod sqlite_log;

pub use sqlite_log::SqliteMutationLog;
