//! Key-value persistence behind the diagram: layouts, transforms, configs
//! and the opened-group stack, all namespaced `diagrams.<id>.<path>`.
//!
//! The store itself is a trivial collaborator (localStorage in the browser
//! host); everything interesting is the keying and the tolerant parsing:
//! malformed persisted JSON is logged and treated as absent.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

pub const KEY_PREFIX: &str = "diagrams";

pub fn diagram_key(id: &str, path: &str) -> String {
    format!("{KEY_PREFIX}.{id}.{path}")
}

pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-memory store; the default for headless use and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Reads and parses a persisted value; malformed JSON is recoverable and
/// reported once at the warn level.
pub fn get_parsed<T: DeserializeOwned>(store: &dyn Store, id: &str, path: &str) -> Option<T> {
    let key = diagram_key(id, path);
    let raw = store.get(&key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "malformed persisted JSON; using defaults");
            None
        }
    }
}

pub fn set_serialized<T: Serialize>(store: &mut dyn Store, id: &str, path: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => store.set(&diagram_key(id, path), &json),
        Err(err) => tracing::warn!(path, error = %err, "failed to serialize persisted value"),
    }
}

/// Drops every `diagrams.*` key that does not belong to one of `keep_ids`.
pub fn purge(store: &mut dyn Store, keep_ids: &[String]) {
    let except: Vec<String> = keep_ids.iter().map(|id| diagram_key(id, "")).collect();
    for key in store.keys() {
        if !key.starts_with(&format!("{KEY_PREFIX}.")) {
            continue;
        }
        if except.iter().any(|prefix| key.starts_with(prefix)) {
            continue;
        }
        store.remove(&key);
    }
}
