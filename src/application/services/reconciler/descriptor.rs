use serde_json::Value;
use std::collections::HashMap;

/// How to resolve a human-readable label for a reference field when
/// synthesizing a pending create, e.g. fill `species_name` from the
/// `species` lookup collection based on `species_id`.
#[derive(Debug, Clone, Copy)]
pub struct LookupSpec {
    /// Reference field on the payload, e.g. `species_id`.
    pub ref_field: &'static str,
    /// Display field to fill on the synthesized item, e.g. `species_name`.
    pub label_field: &'static str,
    /// Lookup collection resource, e.g. `species`.
    pub source: &'static str,
    /// Display field on the lookup item, e.g. `name`.
    pub source_label_field: &'static str,
}

/// Describes one entity collection to the shared reconciler: where its
/// identifier lives, how it references a parent, how pending creates are
/// scoped to the active screen, and which display names to resolve.
///
/// One parametrized descriptor per entity type replaces the per-screen
/// overlay copies the design notes call out.
#[derive(Debug, Clone)]
pub struct CollectionDescriptor {
    /// Collection segment of the resource path, e.g. `flocks`.
    pub collection: &'static str,
    pub id_field: &'static str,
    /// Field referencing the parent entity (`building_id` on flocks).
    pub parent_field: Option<&'static str>,
    /// Field a pending create is matched against the active screen scope
    /// with (`customer_id` on buildings, `visit_id` on observations).
    pub scope_field: Option<&'static str>,
    pub lookups: &'static [LookupSpec],
}

/// Already-loaded lookup collections, keyed by resource. Resolution that
/// misses here degrades to a placeholder label, never an error — a screen
/// must render even when background lookups have not loaded yet.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    tables: HashMap<String, Vec<Value>>,
}

impl LookupTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: impl Into<String>, items: Vec<Value>) {
        self.tables.insert(resource.into(), items);
    }

    pub fn label(&self, spec: &LookupSpec, reference: &str) -> Option<String> {
        let items = self.tables.get(spec.source)?;
        items
            .iter()
            .find(|item| {
                item.get("id").and_then(super::merge::id_text).as_deref() == Some(reference)
            })
            .and_then(|item| item.get(spec.source_label_field))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
