use super::descriptor::{CollectionDescriptor, LookupTables};
use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::PendingAction;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Label substituted when a payload reference cannot be resolved from the
/// loaded lookup collections.
pub const UNRESOLVED_LABEL: &str = "(unresolved)";

/// One display-ready item of a reconciled view: server state with the
/// relevant pending writes overlaid. Never persisted, recomputed on every
/// render.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledItem {
    pub id: String,
    /// `Some` while a queued write targeting this item is unconfirmed.
    pub pending: Option<PendingAction>,
    pub body: Map<String, Value>,
}

impl ReconciledItem {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// Decode into a typed entity. Degrades to `None` on malformed bodies
    /// instead of failing — reconciliation must always produce something a
    /// screen can show.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(Value::Object(self.body.clone())).ok()
    }
}

/// Identifier field as text. Some resources come back with numeric ids;
/// queue entries always address items by string, so both forms normalize
/// to text before matching.
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Identifiers targeted by pending DELETE entries of this collection.
pub fn pending_deletions(entries: &[QueueEntry], descriptor: &CollectionDescriptor) -> HashSet<String> {
    entries
        .iter()
        .filter(|entry| entry.operation.is_delete())
        .filter(|entry| entry.resource.is_in_collection(descriptor.collection))
        .filter_map(|entry| entry.target_id())
        .map(str::to_string)
        .collect()
}

/// The latest pending UPDATE or custom-action entry targeting `id`, if
/// any. Later entries win: the operator's newest intent is what the view
/// shows.
pub fn latest_pending_patch<'a>(
    entries: &'a [QueueEntry],
    descriptor: &CollectionDescriptor,
    id: &str,
) -> Option<(&'a QueueEntry, PendingAction)> {
    entries
        .iter()
        .rev()
        .filter(|entry| entry.resource.is_in_collection(descriptor.collection))
        .filter(|entry| entry.target_id() == Some(id))
        .find_map(|entry| {
            match PendingAction::from_operation(&entry.operation) {
                Some(action @ (PendingAction::Update | PendingAction::Close | PendingAction::Reopen)) => {
                    Some((entry, action))
                }
                _ => None,
            }
        })
}

/// Shallow-merge a patch object's top-level fields onto a base object.
/// Non-object patches are ignored (degradation, not an error).
pub fn shallow_merge(base: &mut Map<String, Value>, patch: &Value) {
    if let Some(fields) = patch.as_object() {
        for (key, value) in fields {
            base.insert(key.clone(), value.clone());
        }
    }
}

/// Overlay the latest pending patch (if any) onto one snapshot item.
pub fn overlay_item(
    item: &Value,
    entries: &[QueueEntry],
    descriptor: &CollectionDescriptor,
) -> ReconciledItem {
    let mut body = item.as_object().cloned().unwrap_or_default();
    let id = body
        .get(descriptor.id_field)
        .and_then(id_text)
        .unwrap_or_default();

    let mut pending = None;
    if !id.is_empty() {
        if let Some((entry, action)) = latest_pending_patch(entries, descriptor, &id) {
            shallow_merge(&mut body, &entry.payload);
            // Custom actions force their field regardless of the payload.
            if let Some((field, value)) = action.forced_field() {
                body.insert(field.to_string(), value);
            }
            pending = Some(action);
        }
    }

    ReconciledItem { id, pending, body }
}

/// Build a display item for one pending CREATE entry: copy the payload,
/// assign the temporary identity, and resolve referenced display names
/// from the loaded lookup collections, falling back to a placeholder.
pub fn synthesize_create(
    entry: &QueueEntry,
    descriptor: &CollectionDescriptor,
    lookups: &LookupTables,
) -> Option<ReconciledItem> {
    let temp = entry.temp_id.as_ref()?;
    let mut body = entry.payload.as_object().cloned().unwrap_or_default();
    body.insert(
        descriptor.id_field.to_string(),
        Value::String(temp.to_string()),
    );

    for spec in descriptor.lookups {
        if let Some(reference) = body.get(spec.ref_field).and_then(Value::as_str) {
            let label = lookups
                .label(spec, reference)
                .unwrap_or_else(|| UNRESOLVED_LABEL.to_string());
            body.insert(spec.label_field.to_string(), Value::String(label));
        }
    }

    Some(ReconciledItem {
        id: temp.to_string(),
        pending: Some(PendingAction::Create),
        body,
    })
}

/// True when a pending create belongs to the active screen scope. With no
/// scope given everything matches; with a scope, a payload missing the
/// scope field does not match.
pub fn matches_scope(
    entry: &QueueEntry,
    descriptor: &CollectionDescriptor,
    scope: Option<&Value>,
) -> bool {
    let (Some(scope_field), Some(expected)) = (descriptor.scope_field, scope) else {
        return true;
    };
    entry.payload.get(scope_field) == Some(expected)
}
