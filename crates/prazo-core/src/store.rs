use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::registry::Registry;
use crate::task::{Stage, TaskRecord};

pub const TASKS_KEY: &str = "tasks";
pub const DARK_MODE_KEY: &str = "dark-mode";

/// String key-value backend scoped to one user, in the shape of the
/// browser's `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Serializes the whole registry under [`TASKS_KEY`].
#[derive(Debug)]
pub struct TaskStore<S> {
    backend: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    #[tracing::instrument(skip_all, fields(tasks = registry.len()))]
    pub fn save(&mut self, registry: &Registry) -> Result<(), StorageError> {
        let payload = serde_json::to_string(registry).map_err(|source| StorageError::Encode {
            key: TASKS_KEY.to_string(),
            source,
        })?;
        self.backend.set_item(TASKS_KEY, &payload)?;
        debug!(bytes = payload.len(), "saved task registry");
        Ok(())
    }

    /// Never fails: an absent or unreadable payload yields an empty registry.
    #[tracing::instrument(skip_all)]
    pub fn load(&self) -> Registry {
        let raw = match self.backend.get_item(TASKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("no persisted tasks, starting empty");
                return Registry::new();
            }
            Err(err) => {
                warn!(error = %err, "task storage unreadable, starting empty");
                return Registry::new();
            }
        };

        match parse_registry(&raw) {
            Ok(registry) => {
                debug!(tasks = registry.len(), "loaded task registry");
                registry
            }
            Err(err) => {
                warn!(error = %err, "persisted tasks unparsable, starting empty");
                Registry::new()
            }
        }
    }
}

/// Parses a persisted payload, dropping entries that are not well-formed
/// task records instead of rejecting the whole registry.
pub fn parse_registry(raw: &str) -> Result<Registry, StorageError> {
    let root: Value = serde_json::from_str(raw).map_err(|source| StorageError::Malformed {
        key: TASKS_KEY.to_string(),
        source,
    })?;

    let mut registry = Registry::new();
    let Value::Object(map) = root else {
        warn!("persisted tasks are not an object, ignoring");
        return Ok(registry);
    };

    for stage in Stage::ALL {
        let entries = match map.get(stage.storage_key()) {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) | None => continue,
            Some(_) => {
                warn!(stage = %stage, "stage entry is not a list, ignoring");
                continue;
            }
        };

        for (idx, entry) in entries.iter().enumerate() {
            match serde_json::from_value::<TaskRecord>(entry.clone()) {
                Ok(record) => {
                    registry.insert(stage, record);
                }
                Err(err) => {
                    warn!(stage = %stage, index = idx, error = %err, "dropping malformed task");
                }
            }
        }
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_stage_lists_are_empty() {
        let registry = parse_registry(r#"{"todo": []}"#).expect("parse");
        assert!(registry.is_empty());
    }

    #[test]
    fn malformed_entries_are_dropped_individually() {
        let raw = r#"{
            "todo": [
                {"text": "ok", "timestamp": "2026-03-01T10:00:00.000Z", "deadline": "2026-03-01T10:05:00.000Z"},
                {"text": 42, "timestamp": "2026-03-01T10:00:01.000Z", "deadline": "2026-03-01T10:05:00.000Z"},
                {"text": "no deadline", "timestamp": "2026-03-01T10:00:02.000Z"}
            ],
            "inProgress": "nope",
            "completed": [
                {"text": "", "timestamp": "2026-03-01T10:00:03.000Z", "deadline": "2026-03-01T10:05:00.000Z"}
            ]
        }"#;
        let registry = parse_registry(raw).expect("parse");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stage(Stage::Todo)[0].text, "ok");
    }

    #[test]
    fn non_object_payload_is_empty() {
        let registry = parse_registry("[1, 2, 3]").expect("parse");
        assert!(registry.is_empty());
        assert!(parse_registry("{not json").is_err());
    }
}
