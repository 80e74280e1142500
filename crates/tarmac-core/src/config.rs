//! Process configuration snapshot
//!
//! Configuration is loaded once at startup from a YAML file into an
//! immutable tree and read through colon-separated keys, e.g.
//! `docker:memory` or `routers:web:type`. Readers share the snapshot
//! behind an `Arc`; there is no locking and no reload.
//!
//! An absent subtree is distinguishable from an empty one: `subtree`
//! returns `None` when the key does not resolve to a mapping at all,
//! and `Some` (possibly empty) when it does.

use std::path::Path;

use serde_json::{Map, Value};

use crate::{PlanError, Result};

/// Immutable view over the process configuration tree.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    root: Value,
}

impl ConfigSnapshot {
    /// An empty snapshot; every lookup misses.
    pub fn empty() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Build a snapshot from an already-parsed configuration tree.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parse a YAML document into a snapshot.
    pub fn from_yaml(input: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(input)
            .map_err(|e| PlanError::Config(format!("invalid configuration: {}", e)))?;
        Ok(Self { root })
    }

    /// Load and parse a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| {
            PlanError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&input)
    }

    /// Resolve a colon-separated key to its value, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for part in key.split(':') {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// String value at `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Integer value at `key`, if present and an integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }

    /// The mapping under `key`.
    ///
    /// `None` when the key is absent or does not name a mapping;
    /// `Some` with an empty map when the mapping exists but has no children.
    pub fn subtree(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key)?.as_object()
    }
}
