//! # Core configuration
//!
//! A minimal, framework-agnostic configuration system based on a simple
//! string key/value store, in the style of Feathers' `app.set()`/`app.get()`.
//! Used to carry the tunables named explicitly elsewhere: backoff base/
//! factor/cap, confirmation deadline, reconciliation attempt budget, lease
//! heartbeat interval. Higher-level loaders (TOML/JSON/env) are intentionally
//! kept out of this crate; an application wires those in before handing a
//! `CoreConfigSnapshot` to the queue/chain crates.
//!
//! ```rust
//! use steward_core::CoreConfig;
//! let mut config = CoreConfig::new();
//! config.set("backoff.base_ms", "1000");
//! config.set("backoff.cap_ms", "60000");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get_usize("backoff.base_ms"), Some(1000));
//! ```

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CoreConfig {
    values: HashMap<String, String>,
}

impl CoreConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> CoreConfigSnapshot {
        CoreConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoreConfigSnapshot {
    map: HashMap<String, String>,
}

impl CoreConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }
}
