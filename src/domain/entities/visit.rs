use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A technician's visit to a customer's farm.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Visit {
    pub id: String,
    pub customer_id: String,
    pub date: Option<NaiveDate>,
    pub closed: bool,
    pub notes: Option<String>,
}

impl Visit {
    pub fn is_open(&self) -> bool {
        !self.closed
    }
}
