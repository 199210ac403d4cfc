//! # Configuration
//!
//! A flat string key/value store, set through `app.set(key, value)` and read
//! through `app.get(key)`. Keys are dotted (`http.port`, `tenants.seed`).
//! Loading from the environment or files is left to the application; hooks
//! read a [`ConfigSnapshot`] taken when the call started.
//!
//! ```rust
//! use tenantry_core::TenantryApp;
//! let app = TenantryApp::<(), ()>::new();
//!
//! app.set("http.port", "3000");
//! assert_eq!(app.get("http.port"), Some("3000".to_string()));
//! ```

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TenantryConfig {
    values: HashMap<String, String>,
}

impl TenantryConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(self.values.clone())
    }
}

/// Read-only copy of the config handed to hooks.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let mut cfg = TenantryConfig::new();
        cfg.set("members.search", "true");
        let snap = cfg.snapshot();
        cfg.set("members.search", "false");

        assert_eq!(snap.get_bool("members.search"), Some(true));
        assert_eq!(cfg.get("members.search"), Some("false"));
        assert!(cfg.has("members.search"));
        assert_eq!(snap.get_bool("missing"), None);
    }
}
