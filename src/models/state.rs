use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::EntityKey;

/// Last observed status per entity, keyed by normalized name.
///
/// Keys are re-normalized when a record is built from an arbitrary map, so a
/// hand-edited state file with `"Cyprus 🇨🇾"` still resolves to `cyprus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct StateRecord {
    entries: BTreeMap<String, String>,
}

impl StateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &EntityKey) -> Option<&str> {
        self.entries.get(key.as_str()).map(String::as_str)
    }

    /// Stores `status` for `key`, returning whether the stored value changed.
    pub fn set(&mut self, key: &EntityKey, status: &str) -> bool {
        if self.get(key) == Some(status) {
            return false;
        }
        self.entries.insert(key.as_str().to_string(), status.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for StateRecord {
    fn from(map: BTreeMap<String, String>) -> Self {
        let entries = map
            .into_iter()
            .filter_map(|(name, status)| {
                let key = EntityKey::from_raw(&name);
                (!key.is_empty()).then(|| (key.as_str().to_string(), status))
            })
            .collect();
        Self { entries }
    }
}

impl From<StateRecord> for BTreeMap<String, String> {
    fn from(record: StateRecord) -> Self {
        record.entries
    }
}

impl<const N: usize> From<[(&str, &str); N]> for StateRecord {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>()
            .into()
    }
}
