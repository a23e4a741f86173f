pub mod reconciler;
pub mod sync_engine;

pub use sync_engine::{
    DrainReport, EngineState, RejectedMutation, SubmitOutcome, SyncEngine, SyncEngineStatus,
};
