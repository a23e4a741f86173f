use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical relative path of a remote resource.
///
/// A path addresses a collection (`flocks`), an item (`flocks/17`), or a
/// custom action endpoint (`visits/42/close`). Paths are stored without
/// leading or trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePath(String);

impl ResourcePath {
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        let trimmed = value.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err("Resource path cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading collection segment, e.g. `flocks` for `flocks/17`.
    pub fn collection(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// The item identifier segment, if the path addresses an item or an
    /// action on an item.
    pub fn item_id(&self) -> Option<&str> {
        self.0.split('/').nth(1)
    }

    /// An item path underneath this collection path.
    pub fn item(&self, id: &str) -> ResourcePath {
        ResourcePath(format!("{}/{}", self.0, id))
    }

    /// An action path underneath an item of this collection.
    pub fn action(&self, id: &str, action: &str) -> ResourcePath {
        ResourcePath(format!("{}/{}/{}", self.0, id, action))
    }

    /// True when this path targets the given collection, either as the
    /// collection itself or as one of its items/actions.
    pub fn is_in_collection(&self, collection: &str) -> bool {
        self.collection() == collection
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ResourcePath> for String {
    fn from(value: ResourcePath) -> Self {
        value.0
    }
}
