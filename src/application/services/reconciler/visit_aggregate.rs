use super::collections::{reconcile_collection, BUILDINGS, FLOCKS, OBSERVATIONS, VISITS};
use super::descriptor::LookupTables;
use super::merge::ReconciledItem;
use crate::domain::entities::QueueEntry;
use serde_json::Value;
use std::collections::HashSet;

/// Raw server snapshots feeding one visit screen.
#[derive(Debug, Clone, Default)]
pub struct VisitSnapshots {
    /// The visit itself, when already known to the server (absent for a
    /// visit recorded entirely offline).
    pub visit: Option<Value>,
    pub buildings: Vec<Value>,
    pub flocks: Vec<Value>,
    pub observations: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingNode {
    pub building: ReconciledItem,
    pub flocks: Vec<FlockNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlockNode {
    pub flock: ReconciledItem,
    pub observations: Vec<ReconciledItem>,
}

/// The merged, display-ready tree for one visit: buildings with their
/// flocks and per-flock observations, pending writes included.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitAggregate {
    /// Absent when the visit is deleted by a pending entry.
    pub visit: Option<ReconciledItem>,
    pub buildings: Vec<BuildingNode>,
    /// Flocks whose parent reference matches no reconciled building.
    /// Degradation bucket — never an error.
    pub orphan_flocks: Vec<FlockNode>,
    /// Observations whose parent flock could not be found.
    pub orphan_observations: Vec<ReconciledItem>,
}

/// Reconcile a whole visit/customer aggregate in one combined pass, in
/// dependency order: buildings first, then flocks, then observations.
///
/// Running parents before children is what lets a pending flock whose
/// `building_id` is a pending building's temporary identity nest under the
/// synthesized building instead of rendering as an orphan.
pub fn reconcile_visit_aggregate(
    snapshots: &VisitSnapshots,
    entries: &[QueueEntry],
    customer_id: &str,
    visit_id: &str,
    lookups: &LookupTables,
) -> VisitAggregate {
    let customer_scope = Value::String(customer_id.to_string());
    let visit_scope = Value::String(visit_id.to_string());

    let visit_snapshot: Vec<Value> = snapshots.visit.iter().cloned().collect();
    let visit = reconcile_collection(
        &visit_snapshot,
        entries,
        &VISITS,
        Some(&customer_scope),
        lookups,
    )
    .into_iter()
    .find(|item| item.id == visit_id);

    let buildings = reconcile_collection(
        &snapshots.buildings,
        entries,
        &BUILDINGS,
        Some(&customer_scope),
        lookups,
    );

    let flocks = reconcile_collection(
        &snapshots.flocks,
        entries,
        &FLOCKS,
        Some(&customer_scope),
        lookups,
    );

    let observations = reconcile_collection(
        &snapshots.observations,
        entries,
        &OBSERVATIONS,
        Some(&visit_scope),
        lookups,
    );

    // Nest flocks under their (possibly synthesized) buildings.
    let building_ids: HashSet<&str> = buildings.iter().map(|b| b.id.as_str()).collect();
    let flock_parent = |flock: &ReconciledItem| -> Option<String> {
        FLOCKS
            .parent_field
            .and_then(|field| flock.field_str(field))
            .map(str::to_string)
    };

    let mut flock_nodes: Vec<FlockNode> = Vec::with_capacity(flocks.len());
    let mut orphan_flocks: Vec<FlockNode> = Vec::new();
    let flock_ids: HashSet<String> = flocks.iter().map(|f| f.id.clone()).collect();

    // Attach observations to flocks first so orphan flocks keep theirs.
    let mut orphan_observations: Vec<ReconciledItem> = Vec::new();
    let mut observations_by_flock: std::collections::HashMap<String, Vec<ReconciledItem>> =
        std::collections::HashMap::new();
    for observation in observations {
        let parent = OBSERVATIONS
            .parent_field
            .and_then(|field| observation.field_str(field))
            .map(str::to_string);
        match parent {
            Some(flock_id) if flock_ids.contains(&flock_id) => {
                observations_by_flock
                    .entry(flock_id)
                    .or_default()
                    .push(observation);
            }
            _ => orphan_observations.push(observation),
        }
    }

    for flock in flocks {
        let observations = observations_by_flock.remove(&flock.id).unwrap_or_default();
        let node = FlockNode {
            observations,
            flock,
        };
        let parent_known = flock_parent(&node.flock)
            .map(|parent| building_ids.contains(parent.as_str()))
            .unwrap_or(false);
        if parent_known {
            flock_nodes.push(node);
        } else {
            orphan_flocks.push(node);
        }
    }

    let buildings = buildings
        .into_iter()
        .map(|building| {
            let flocks = flock_nodes
                .iter()
                .filter(|node| flock_parent(&node.flock).as_deref() == Some(building.id.as_str()))
                .cloned()
                .collect();
            BuildingNode { building, flocks }
        })
        .collect();

    VisitAggregate {
        visit,
        buildings,
        orphan_flocks,
        orphan_observations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MutationDraft;
    use crate::domain::value_objects::{PendingAction, ResourcePath, TempId};
    use chrono::Utc;
    use serde_json::json;

    fn entry_from(id: i64, draft: MutationDraft) -> QueueEntry {
        let temp_id = draft.operation.is_create().then(TempId::generate);
        QueueEntry {
            id,
            resource: draft.resource,
            operation: draft.operation,
            payload: draft.payload,
            temp_id,
            enqueued_at: Utc::now(),
            attempt_count: 0,
            last_error: None,
        }
    }

    fn base_snapshots() -> VisitSnapshots {
        VisitSnapshots {
            visit: Some(json!({"id": "v1", "customer_id": "c1", "closed": false})),
            buildings: vec![json!({"id": "b1", "customer_id": "c1", "name": "Barn 1"})],
            flocks: vec![json!({"id": "f1", "building_id": "b1", "name": "Lot A"})],
            observations: vec![
                json!({"id": "o1", "visit_id": "v1", "flock_id": "f1", "severity": "info"}),
            ],
        }
    }

    #[test]
    fn clean_snapshot_nests_without_tags() {
        let aggregate = reconcile_visit_aggregate(
            &base_snapshots(),
            &[],
            "c1",
            "v1",
            &LookupTables::new(),
        );
        assert!(aggregate.visit.as_ref().unwrap().pending.is_none());
        assert_eq!(aggregate.buildings.len(), 1);
        assert_eq!(aggregate.buildings[0].flocks.len(), 1);
        assert_eq!(aggregate.buildings[0].flocks[0].observations.len(), 1);
        assert!(aggregate.orphan_flocks.is_empty());
        assert!(aggregate.orphan_observations.is_empty());
    }

    #[test]
    fn pending_flock_nests_under_pending_building() {
        // The scenario from the field: a building and a flock inside it
        // are both created while offline; the flock references the
        // building only by its temporary identity.
        let building = entry_from(
            1,
            MutationDraft::create(
                ResourcePath::new("buildings").unwrap(),
                json!({"name": "New barn", "customer_id": "c1"}),
            ),
        );
        let temp = building.temp_id.clone().unwrap();
        let flock = entry_from(
            2,
            MutationDraft::create(
                ResourcePath::new("flocks").unwrap(),
                json!({"name": "Lot X", "customer_id": "c1", "building_id": temp.as_str()}),
            ),
        );

        let aggregate = reconcile_visit_aggregate(
            &base_snapshots(),
            &[building, flock],
            "c1",
            "v1",
            &LookupTables::new(),
        );

        assert_eq!(aggregate.buildings.len(), 2);
        let pending_building = &aggregate.buildings[0];
        assert_eq!(pending_building.building.id, temp.to_string());
        assert_eq!(pending_building.building.pending, Some(PendingAction::Create));
        assert_eq!(pending_building.flocks.len(), 1);
        assert_eq!(
            pending_building.flocks[0].flock.field_str("name"),
            Some("Lot X")
        );
        assert!(aggregate.orphan_flocks.is_empty());
    }

    #[test]
    fn pending_observation_nests_under_pending_flock() {
        let flock = entry_from(
            1,
            MutationDraft::create(
                ResourcePath::new("flocks").unwrap(),
                json!({"name": "Lot Y", "customer_id": "c1", "building_id": "b1"}),
            ),
        );
        let flock_temp = flock.temp_id.clone().unwrap();
        let observation = entry_from(
            2,
            MutationDraft::create(
                ResourcePath::new("observations").unwrap(),
                json!({
                    "visit_id": "v1",
                    "flock_id": flock_temp.as_str(),
                    "severity": "concern",
                    "note": "coughing"
                }),
            ),
        );

        let aggregate = reconcile_visit_aggregate(
            &base_snapshots(),
            &[flock, observation],
            "c1",
            "v1",
            &LookupTables::new(),
        );

        let barn = aggregate
            .buildings
            .iter()
            .find(|node| node.building.id == "b1")
            .unwrap();
        let pending_flock = barn
            .flocks
            .iter()
            .find(|node| node.flock.id == flock_temp.to_string())
            .unwrap();
        assert_eq!(pending_flock.observations.len(), 1);
        assert_eq!(
            pending_flock.observations[0].field_str("note"),
            Some("coughing")
        );
        assert!(aggregate.orphan_observations.is_empty());
    }

    #[test]
    fn unresolvable_parent_degrades_to_orphan_bucket() {
        let flock = entry_from(
            1,
            MutationDraft::create(
                ResourcePath::new("flocks").unwrap(),
                json!({"name": "Stray", "customer_id": "c1", "building_id": "TEMP_gone"}),
            ),
        );
        let aggregate = reconcile_visit_aggregate(
            &base_snapshots(),
            &[flock],
            "c1",
            "v1",
            &LookupTables::new(),
        );
        assert_eq!(aggregate.orphan_flocks.len(), 1);
        assert_eq!(
            aggregate.orphan_flocks[0].flock.field_str("name"),
            Some("Stray")
        );
    }

    #[test]
    fn pending_visit_delete_removes_the_visit() {
        let delete = entry_from(
            1,
            MutationDraft::delete(ResourcePath::new("visits/v1").unwrap()),
        );
        let aggregate = reconcile_visit_aggregate(
            &base_snapshots(),
            &[delete],
            "c1",
            "v1",
            &LookupTables::new(),
        );
        assert!(aggregate.visit.is_none());
    }

    #[test]
    fn offline_created_visit_is_synthesized() {
        let visit = entry_from(
            1,
            MutationDraft::create(
                ResourcePath::new("visits").unwrap(),
                json!({"customer_id": "c1", "date": "2026-03-02"}),
            ),
        );
        let temp = visit.temp_id.clone().unwrap();
        let snapshots = VisitSnapshots {
            visit: None,
            ..Default::default()
        };
        let aggregate = reconcile_visit_aggregate(
            &snapshots,
            &[visit],
            "c1",
            temp.as_str(),
            &LookupTables::new(),
        );
        let reconciled = aggregate.visit.unwrap();
        assert_eq!(reconciled.pending, Some(PendingAction::Create));
        assert_eq!(reconciled.id, temp.to_string());
    }
}
