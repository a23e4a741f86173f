use serde::{Deserialize, Serialize};

/// A stable or barn on a customer's farm; flocks are housed in buildings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Building {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub capacity: Option<i64>,
}
