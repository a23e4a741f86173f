use super::descriptor::{CollectionDescriptor, LookupSpec, LookupTables};
use super::merge::{
    id_text, latest_pending_patch, matches_scope, overlay_item, pending_deletions, shallow_merge,
    synthesize_create, ReconciledItem,
};
use crate::domain::entities::QueueEntry;
use serde_json::Value;

/// Buildings of a customer's farm.
pub const BUILDINGS: CollectionDescriptor = CollectionDescriptor {
    collection: "buildings",
    id_field: "id",
    parent_field: None,
    scope_field: Some("customer_id"),
    lookups: &[],
};

/// Flocks, parented by a building (possibly one that is itself pending).
pub const FLOCKS: CollectionDescriptor = CollectionDescriptor {
    collection: "flocks",
    id_field: "id",
    parent_field: Some("building_id"),
    scope_field: Some("customer_id"),
    lookups: &[LookupSpec {
        ref_field: "species_id",
        label_field: "species_name",
        source: "species",
        source_label_field: "name",
    }],
};

/// Observations, parented by a flock and scoped to a visit.
pub const OBSERVATIONS: CollectionDescriptor = CollectionDescriptor {
    collection: "observations",
    id_field: "id",
    parent_field: Some("flock_id"),
    scope_field: Some("visit_id"),
    lookups: &[],
};

/// Visits themselves; closing/reopening are pending custom actions.
pub const VISITS: CollectionDescriptor = CollectionDescriptor {
    collection: "visits",
    id_field: "id",
    parent_field: None,
    scope_field: Some("customer_id"),
    lookups: &[],
};

/// Overlay the mutation log onto one collection snapshot.
///
/// Pure and re-entrant: no side effects, cheap enough to re-run on every
/// snapshot or log change, and malformed input degrades to placeholders
/// instead of failing — a screen must always render something.
///
/// Order of operations:
/// 1. drop snapshot items targeted by pending deletes (deletion beats any
///    earlier pending update on the same item);
/// 2. merge the latest pending update/custom action into each survivor;
/// 3. synthesize items for pending creates matching this collection and
///    the active scope, prepended newest-first so unsynced work surfaces
///    at the top. Later pending entries addressed to a create's temporary
///    identity apply to the synthesized item the same way: a delete
///    suppresses it, an update or custom action merges into it.
pub fn reconcile_collection(
    snapshot: &[Value],
    entries: &[QueueEntry],
    descriptor: &CollectionDescriptor,
    scope: Option<&Value>,
    lookups: &LookupTables,
) -> Vec<ReconciledItem> {
    let deleted = pending_deletions(entries, descriptor);

    let survivors = snapshot.iter().filter(|item| {
        item.get(descriptor.id_field)
            .and_then(id_text)
            .map(|id| !deleted.contains(&id))
            .unwrap_or(true)
    });

    let mut result: Vec<ReconciledItem> = entries
        .iter()
        .rev()
        .filter(|entry| entry.operation.is_create())
        .filter(|entry| entry.resource.is_in_collection(descriptor.collection))
        .filter(|entry| matches_scope(entry, descriptor, scope))
        .filter_map(|entry| synthesize_create(entry, descriptor, lookups))
        .filter(|item| !deleted.contains(&item.id))
        .map(|mut item| {
            if let Some((patch, action)) = latest_pending_patch(entries, descriptor, &item.id) {
                shallow_merge(&mut item.body, &patch.payload);
                if let Some((field, value)) = action.forced_field() {
                    item.body.insert(field.to_string(), value);
                }
            }
            item
        })
        .collect();

    result.extend(survivors.map(|item| overlay_item(item, entries, descriptor)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MutationDraft;
    use crate::domain::value_objects::{Operation, PendingAction, ResourcePath, TempId};
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

    fn flocks_snapshot() -> Vec<Value> {
        vec![
            json!({"id": "f1", "name": "Lot A", "animal_count": 120}),
            json!({"id": "f2", "name": "Lot B", "animal_count": 80}),
        ]
    }

    #[test]
    fn pending_delete_suppresses_item() {
        let entries = vec![entry_from(
            1,
            MutationDraft::delete(ResourcePath::new("flocks/f2").unwrap()),
        )];
        let view = reconcile_collection(
            &flocks_snapshot(),
            &entries,
            &FLOCKS,
            None,
            &LookupTables::new(),
        );
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "f1");
    }

    #[test]
    fn delete_beats_earlier_update() {
        let entries = vec![
            entry_from(
                1,
                MutationDraft::update(
                    ResourcePath::new("flocks/f1").unwrap(),
                    json!({"name": "renamed"}),
                ),
            ),
            entry_from(
                2,
                MutationDraft::delete(ResourcePath::new("flocks/f1").unwrap()),
            ),
        ];
        let view = reconcile_collection(
            &flocks_snapshot(),
            &entries,
            &FLOCKS,
            None,
            &LookupTables::new(),
        );
        assert!(view.iter().all(|item| item.id != "f1"));
    }

    #[test]
    fn pending_creates_are_prepended_newest_first() {
        let entries = vec![
            entry_from(
                1,
                MutationDraft::create(
                    ResourcePath::new("flocks").unwrap(),
                    json!({"name": "First new", "customer_id": "c1"}),
                ),
            ),
            entry_from(
                2,
                MutationDraft::create(
                    ResourcePath::new("flocks").unwrap(),
                    json!({"name": "Second new", "customer_id": "c1"}),
                ),
            ),
        ];
        let scope = json!("c1");
        let view = reconcile_collection(
            &flocks_snapshot(),
            &entries,
            &FLOCKS,
            Some(&scope),
            &LookupTables::new(),
        );
        assert_eq!(view.len(), 4);
        assert_eq!(view[0].field_str("name"), Some("Second new"));
        assert_eq!(view[1].field_str("name"), Some("First new"));
        assert!(view[0].is_pending());
        assert_eq!(view[2].id, "f1");
    }

    #[test]
    fn creates_outside_scope_are_excluded() {
        let entries = vec![entry_from(
            1,
            MutationDraft::create(
                ResourcePath::new("flocks").unwrap(),
                json!({"name": "Other customer", "customer_id": "c2"}),
            ),
        )];
        let scope = json!("c1");
        let view = reconcile_collection(
            &flocks_snapshot(),
            &entries,
            &FLOCKS,
            Some(&scope),
            &LookupTables::new(),
        );
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let entries = vec![
            entry_from(
                1,
                MutationDraft::create(
                    ResourcePath::new("flocks").unwrap(),
                    json!({"name": "New lot", "species_id": "s1"}),
                ),
            ),
            entry_from(
                2,
                MutationDraft::update(
                    ResourcePath::new("flocks/f1").unwrap(),
                    json!({"animal_count": 115}),
                ),
            ),
        ];
        let mut lookups = LookupTables::new();
        lookups.insert("species", vec![json!({"id": "s1", "name": "Broiler"})]);

        let snapshot = flocks_snapshot();
        let first = reconcile_collection(&snapshot, &entries, &FLOCKS, None, &lookups);
        let second = reconcile_collection(&snapshot, &entries, &FLOCKS, None, &lookups);
        assert_eq!(first, second);
        assert_eq!(first[0].field_str("species_name"), Some("Broiler"));
    }

    #[test]
    fn unknown_operations_are_ignored_by_the_view() {
        let entries = vec![entry_from(
            1,
            MutationDraft::new(
                ResourcePath::new("flocks/f1").unwrap(),
                Operation::Unknown("archive".into()),
                json!({"name": "should not appear"}),
            ),
        )];
        let view = reconcile_collection(
            &flocks_snapshot(),
            &entries,
            &FLOCKS,
            None,
            &LookupTables::new(),
        );
        assert_eq!(view[0].field_str("name"), Some("Lot A"));
        assert_eq!(view[0].pending, None);
    }

    #[test]
    fn close_tags_visit_via_custom_action() {
        let entries = vec![entry_from(
            1,
            MutationDraft::new(
                ResourcePath::new("visits/v1/close").unwrap(),
                Operation::Close,
                json!({}),
            ),
        )];
        let snapshot = vec![json!({"id": "v1", "closed": false, "customer_id": "c1"})];
        let view = reconcile_collection(&snapshot, &entries, &VISITS, None, &LookupTables::new());
        assert_eq!(view[0].pending, Some(PendingAction::Close));
        assert_eq!(view[0].body["closed"], json!(true));
    }

    #[test]
    fn delete_of_pending_create_suppresses_it() {
        let create = entry_from(
            1,
            MutationDraft::create(
                ResourcePath::new("flocks").unwrap(),
                json!({"name": "Short-lived"}),
            ),
        );
        let temp = create.temp_id.clone().unwrap();
        let entries = vec![
            create,
            entry_from(
                2,
                MutationDraft::delete(
                    ResourcePath::new(format!("flocks/{}", temp.as_str())).unwrap(),
                ),
            ),
        ];
        let view = reconcile_collection(&[], &entries, &FLOCKS, None, &LookupTables::new());
        assert!(view.is_empty(), "deleted pending create still renders: {view:?}");
    }

    #[test]
    fn update_on_pending_create_merges_into_synthesized_item() {
        let create = entry_from(
            1,
            MutationDraft::create(
                ResourcePath::new("flocks").unwrap(),
                json!({"name": "First draft", "animal_count": 100}),
            ),
        );
        let temp = create.temp_id.clone().unwrap();
        let entries = vec![
            create,
            entry_from(
                2,
                MutationDraft::update(
                    ResourcePath::new(format!("flocks/{}", temp.as_str())).unwrap(),
                    json!({"name": "Corrected"}),
                ),
            ),
        ];
        let view = reconcile_collection(&[], &entries, &FLOCKS, None, &LookupTables::new());
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].field_str("name"), Some("Corrected"));
        assert_eq!(view[0].body["animal_count"], json!(100));
        // Still an unsynced create as far as the server is concerned.
        assert_eq!(view[0].pending, Some(PendingAction::Create));
    }

    #[test]
    fn numeric_snapshot_ids_still_match_pending_entries() {
        let snapshot = vec![
            json!({"id": 1, "name": "Lot A"}),
            json!({"id": 2, "name": "Lot B"}),
        ];
        let entries = vec![
            entry_from(
                1,
                MutationDraft::update(
                    ResourcePath::new("flocks/1").unwrap(),
                    json!({"name": "renamed"}),
                ),
            ),
            entry_from(
                2,
                MutationDraft::delete(ResourcePath::new("flocks/2").unwrap()),
            ),
        ];
        let view = reconcile_collection(&snapshot, &entries, &FLOCKS, None, &LookupTables::new());
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "1");
        assert_eq!(view[0].field_str("name"), Some("renamed"));
    }
}
