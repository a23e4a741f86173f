pub mod building;
pub mod flock;
pub mod observation;
pub mod queue_entry;
pub mod visit;

pub use building::Building;
pub use flock::Flock;
pub use observation::{Observation, Severity};
pub use queue_entry::{MutationDraft, QueueEntry};
pub use visit::Visit;
