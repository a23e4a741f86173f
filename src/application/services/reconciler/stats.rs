use super::merge::ReconciledItem;
use crate::domain::entities::{Flock, Observation, Severity};
use serde::{Deserialize, Serialize};

/// Aggregate numbers for the dashboard, computed over reconciled views so
/// pending work is counted exactly like confirmed data.
///
/// Recomputed from scratch on every relevant change; the reconciler being
/// pure makes the redundant invocations (one per widget) safe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub flock_count: usize,
    pub animal_total: i64,
    pub pending_items: usize,
    pub observation_count: usize,
    pub concern_count: usize,
    pub critical_count: usize,
    /// Length of the mutation log at computation time.
    pub queued_mutations: u64,
}

pub fn dashboard_stats(
    flocks: &[ReconciledItem],
    observations: &[ReconciledItem],
    queued_mutations: u64,
) -> DashboardStats {
    let mut stats = DashboardStats {
        queued_mutations,
        ..DashboardStats::default()
    };

    for item in flocks {
        stats.flock_count += 1;
        if item.is_pending() {
            stats.pending_items += 1;
        }
        // Malformed bodies count as a flock of zero animals rather than
        // poisoning the whole dashboard.
        if let Some(flock) = item.decode::<Flock>() {
            stats.animal_total += flock.animal_count.max(0);
        }
    }

    for item in observations {
        stats.observation_count += 1;
        if item.is_pending() {
            stats.pending_items += 1;
        }
        if let Some(observation) = item.decode::<Observation>() {
            match observation.severity {
                Severity::Concern => stats.concern_count += 1,
                Severity::Critical => stats.critical_count += 1,
                Severity::Info => {}
            }
        }
    }

    stats
}
