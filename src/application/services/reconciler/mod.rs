pub mod collections;
pub mod descriptor;
pub mod merge;
pub mod stats;
pub mod visit_aggregate;

pub use collections::{reconcile_collection, BUILDINGS, FLOCKS, OBSERVATIONS, VISITS};
pub use descriptor::{CollectionDescriptor, LookupSpec, LookupTables};
pub use merge::{ReconciledItem, UNRESOLVED_LABEL};
pub use stats::{dashboard_stats, DashboardStats};
pub use visit_aggregate::{
    reconcile_visit_aggregate, BuildingNode, FlockNode, VisitAggregate, VisitSnapshots,
};
