use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// Primary identifier, assigned on add.
pub const ID_FIELD: &str = "_id";
/// Millisecond creation timestamp, preserved across edits.
pub const CREATED_FIELD: &str = "_created";
/// Millisecond last-write timestamp, refreshed on every add/edit.
pub const UPDATED_FIELD: &str = "_updated";

pub(crate) fn is_reserved(field: &str) -> bool {
    matches!(field, ID_FIELD | CREATED_FIELD | UPDATED_FIELD)
}

/// A schemaless document: an unordered map of string fields to string values.
///
/// The three reserved fields (`_id`, `_created`, `_updated`) are managed by
/// the database; anything a caller puts there is overwritten on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Doc(BTreeMap<String, String>);

impl Doc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert for literal-style construction.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether the document carries a non-empty value for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| !v.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to the stored representation (a BSON document of strings).
    pub fn to_bytes(&self) -> Result<Vec<u8>, DbError> {
        Ok(bson::to_vec(self)?)
    }

    /// Deserialize the stored representation. Lossy: bytes that do not
    /// decode to a string document yield an empty document, which readers
    /// treat as "skip".
    pub fn from_bytes(bytes: &[u8]) -> Doc {
        bson::from_slice(bytes).unwrap_or_default()
    }
}

impl From<BTreeMap<String, String>> for Doc {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Doc {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl FromIterator<(String, String)> for Doc {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Doc {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
