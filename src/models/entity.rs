use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parsers::normalize_name;

// NewType pattern so raw names never leak into state lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn from_raw(raw: &str) -> Self {
        Self(normalize_name(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A destination the watcher reports on, as configured by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEntity {
    pub name: String,
    pub key: EntityKey,
}

impl TrackedEntity {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        let key = EntityKey::from_raw(&name);
        Self { name, key }
    }
}

/// One `(name, status)` pair pulled out of a listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRow {
    pub name: String,
    pub status: String,
}

impl ObservationRow {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::from_raw(&self.name)
    }
}
