use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A livestock lot. Belongs to a building, which may itself still be a
/// pending create (referenced by temp id until the building syncs).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Flock {
    pub id: String,
    pub building_id: Option<String>,
    pub name: String,
    pub species_id: Option<String>,
    /// Resolved display name for `species_id`; filled from the species
    /// lookup collection during reconciliation.
    pub species_name: Option<String>,
    pub animal_count: i64,
    pub arrival_date: Option<NaiveDate>,
}
