/// Persistent keyed storage
///
/// Wraps one storage area with get/set/clear. Faults are never propagated:
/// reads fall back to the default, writes and removals report `false`.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::codec::{JsonCodec, PayloadCodec};
use super::driver::{KeyValueStore, StorageBackend, StorageScope};
use crate::error::StorageError;

const LOG_TARGET: &str = "form_steps_wizard::storage";

/// Storage options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    /// Pass payloads through the codec instead of plain JSON
    pub encrypted: bool,
    pub scope: StorageScope,
}

#[derive(Clone)]
pub struct BrowserStorage {
    options: StorageOptions,
    backend: Arc<dyn StorageBackend>,
    codec: Arc<dyn PayloadCodec>,
}

impl BrowserStorage {
    pub fn new(options: StorageOptions, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            options,
            backend,
            codec: Arc::new(JsonCodec),
        }
    }

    /// Replace the payload transform used in encrypted mode
    pub fn with_codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn options(&self) -> StorageOptions {
        self.options
    }

    /// Read `key`. When nothing is stored and a default is given, the default
    /// is written back first so later reads see it.
    pub fn get(&self, key: &str, default: Option<Value>) -> Option<Value> {
        let raw = self.area().and_then(|area| match area.get_item(key) {
            Ok(None) => {
                if let Some(default) = default.as_ref() {
                    self.heal(area.as_ref(), key, default);
                }
                None
            }
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, "Read of {} failed ({}), treating as empty", key, err.name());
                None
            }
        });

        if self.options.encrypted {
            return match raw {
                Some(payload) => match self.codec.decode(&payload) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        tracing::warn!(target: LOG_TARGET, "Failed to decode {}: {}", key, err);
                        default
                    }
                },
                None => default,
            };
        }

        match raw {
            Some(payload) if !payload.is_empty() => match serde_json::from_str(&payload) {
                Ok(value) => Some(value),
                // Not JSON: hand back the raw string
                Err(_) => Some(Value::String(payload)),
            },
            _ => default,
        }
    }

    /// The payload stored under `key`, exactly as written. Nothing is parsed,
    /// decoded or healed.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        let area = self.area()?;
        match area.get_item(key) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, "Read of {} failed ({}), treating as empty", key, err.name());
                None
            }
        }
    }

    /// Write `value` under `key`. Returns false for null values, on any
    /// storage fault, or outside a browser context.
    pub fn set(&self, key: &str, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }

        let Some(area) = self.area() else {
            return false;
        };

        let Some(payload) = self.encode(key, value) else {
            return false;
        };

        match area.set_item(key, &payload) {
            Ok(()) => true,
            Err(StorageError::QuotaExceeded) => {
                tracing::warn!(target: LOG_TARGET, "Quota exceeded while writing {}", key);
                false
            }
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, "Write of {} failed: {}", key, err);
                false
            }
        }
    }

    /// Remove `key`
    pub fn clear(&self, key: &str) -> bool {
        let Some(area) = self.area() else {
            return false;
        };

        match area.remove_item(key) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, "Removal of {} failed: {}", key, err);
                false
            }
        }
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key, None)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn set_as<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.set(key, &value),
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, "Cannot serialize value for {}: {}", key, err);
                false
            }
        }
    }

    fn area(&self) -> Option<Arc<dyn KeyValueStore>> {
        match self.backend.area(self.options.scope) {
            Ok(area) => Some(area),
            Err(err) => {
                tracing::debug!(target: LOG_TARGET, "No {:?} storage area: {}", self.options.scope, err);
                None
            }
        }
    }

    fn encode(&self, key: &str, value: &Value) -> Option<String> {
        if self.options.encrypted {
            return match self.codec.encode(value) {
                Ok(payload) => Some(payload),
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, "Failed to encode {}: {}", key, err);
                    None
                }
            };
        }

        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            other => serde_json::to_string(other).ok(),
        }
    }

    fn heal(&self, area: &dyn KeyValueStore, key: &str, default: &Value) {
        if default.is_null() {
            return;
        }
        let Some(payload) = self.encode(key, default) else {
            return;
        };
        if let Err(err) = area.set_item(key, &payload) {
            tracing::warn!(target: LOG_TARGET, "Could not seed default for {}: {}", key, err);
        }
    }
}

impl std::fmt::Debug for BrowserStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserStorage")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, MemoryStore};
    use serde_json::json;

    fn session(backend: &Arc<MemoryBackend>) -> BrowserStorage {
        BrowserStorage::new(StorageOptions::default(), backend.clone())
    }

    #[test]
    fn test_set_then_get_returns_equal_value() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);

        for value in [
            json!({"name": "Ada", "tags": ["a", "b"]}),
            json!([1, 2, 3]),
            json!(true),
            json!(42),
            json!("plain text"),
        ] {
            assert!(storage.set("k", &value));
            assert_eq!(storage.get("k", None), Some(value));
        }
    }

    #[test]
    fn test_primitives_are_stored_unquoted() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);

        storage.set("name", &json!("intro"));
        storage.set("count", &json!(3));
        let store = backend.store(StorageScope::Session);
        assert_eq!(store.raw("name"), Some("intro".to_string()));
        assert_eq!(store.raw("count"), Some("3".to_string()));
    }

    #[test]
    fn test_numeric_string_comes_back_as_number() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);

        storage.set("step", &json!("2"));
        assert_eq!(storage.get("step", None), Some(json!(2)));
    }

    #[test]
    fn test_get_raw_keeps_payload_text() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);

        storage.set("version", &json!("1.10"));
        assert_eq!(storage.get("version", None), Some(json!(1.1)));
        assert_eq!(storage.get_raw("version").as_deref(), Some("1.10"));
        assert_eq!(storage.get_raw("missing"), None);
        assert!(backend.store(StorageScope::Session).raw("missing").is_none());
    }

    #[test]
    fn test_get_heals_empty_store() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);

        for (key, default) in [
            ("object", json!({"a": 1})),
            ("array", json!([1, 2])),
            ("text", json!("intro")),
            ("number", json!(7)),
        ] {
            assert_eq!(storage.get(key, Some(default.clone())), Some(default.clone()));
            assert_eq!(storage.get(key, None), Some(default));
        }
    }

    #[test]
    fn test_get_without_default_on_empty_store() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);
        assert_eq!(storage.get("missing", None), None);
        assert!(backend.store(StorageScope::Session).is_empty());
    }

    #[test]
    fn test_get_prefers_stored_value_over_default() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);
        storage.set("k", &json!({"a": 1}));
        assert_eq!(storage.get("k", Some(json!({"b": 2}))), Some(json!({"a": 1})));
    }

    #[test]
    fn test_unparsable_payload_returned_raw() {
        let backend = MemoryBackend::new();
        backend
            .store(StorageScope::Session)
            .set_item("k", "{broken")
            .unwrap();

        let storage = session(&backend);
        assert_eq!(storage.get("k", Some(json!(1))), Some(json!("{broken")));
    }

    #[test]
    fn test_empty_payload_falls_back_to_default() {
        let backend = MemoryBackend::new();
        backend.store(StorageScope::Session).set_item("k", "").unwrap();

        let storage = session(&backend);
        assert_eq!(storage.get("k", Some(json!("d"))), Some(json!("d")));
    }

    #[test]
    fn test_security_error_on_read_yields_default() {
        let backend = MemoryBackend::new();
        let store = backend.store(StorageScope::Session);
        store.set_item("k", "stored").unwrap();
        store.fail_reads_with(Some(StorageError::Security));

        let storage = session(&backend);
        assert_eq!(storage.get("k", Some(json!("fallback"))), Some(json!("fallback")));
    }

    #[test]
    fn test_quota_failure_surfaces_as_false() {
        let backend = MemoryBackend::new();
        backend
            .store(StorageScope::Session)
            .fail_writes_with(Some(StorageError::QuotaExceeded));

        let storage = session(&backend);
        assert!(!storage.set("k", &json!({"big": "payload"})));
    }

    #[test]
    fn test_real_quota_limit() {
        let store = MemoryStore::with_quota(8);
        let backend = MemoryBackend::with_areas(store, MemoryStore::new());
        let storage = session(&backend);

        assert!(storage.set("k", &json!("short")));
        assert!(!storage.set("k", &json!("much too long")));
    }

    #[test]
    fn test_null_is_refused() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);
        assert!(!storage.set("k", &Value::Null));
        assert!(backend.store(StorageScope::Session).is_empty());
    }

    #[test]
    fn test_outside_browser_context() {
        let backend = MemoryBackend::detached();
        let storage = BrowserStorage::new(StorageOptions::default(), backend);

        assert!(!storage.set("k", &json!(1)));
        assert!(!storage.clear("k"));
        assert_eq!(storage.get("k", Some(json!(5))), Some(json!(5)));
    }

    #[test]
    fn test_clear() {
        let backend = MemoryBackend::new();
        let storage = session(&backend);
        storage.set("k", &json!(1));

        assert!(storage.clear("k"));
        assert_eq!(storage.get("k", None), None);

        backend
            .store(StorageScope::Session)
            .fail_removals_with(Some(StorageError::Other("locked".into())));
        assert!(!storage.clear("k"));
    }

    #[test]
    fn test_scope_is_respected() {
        let backend = MemoryBackend::new();
        let local = BrowserStorage::new(
            StorageOptions {
                scope: StorageScope::Local,
                ..Default::default()
            },
            backend.clone(),
        );

        local.set("k", &json!(1));
        assert_eq!(session(&backend).get("k", None), None);
        assert_eq!(local.get("k", None), Some(json!(1)));
    }

    #[test]
    fn test_encrypted_mode_uses_codec() {
        let backend = MemoryBackend::new();
        let storage = BrowserStorage::new(
            StorageOptions {
                encrypted: true,
                ..Default::default()
            },
            backend.clone(),
        );

        assert!(storage.set("k", &json!("intro")));
        assert_eq!(
            backend.store(StorageScope::Session).raw("k"),
            Some("\"intro\"".to_string())
        );
        assert_eq!(storage.get("k", None), Some(json!("intro")));
    }

    #[test]
    fn test_encrypted_mode_decode_failure_yields_default() {
        let backend = MemoryBackend::new();
        backend
            .store(StorageScope::Session)
            .set_item("k", "not json")
            .unwrap();
        let storage = BrowserStorage::new(
            StorageOptions {
                encrypted: true,
                ..Default::default()
            },
            backend,
        );

        assert_eq!(storage.get("k", Some(json!(0))), Some(json!(0)));
    }

    #[test]
    fn test_typed_helpers() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Draft {
            email: String,
            age: u32,
        }

        let backend = MemoryBackend::new();
        let storage = session(&backend);
        let draft = Draft {
            email: "ada@example.com".to_string(),
            age: 36,
        };

        assert!(storage.set_as("draft", &draft));
        assert_eq!(storage.get_as::<Draft>("draft"), Some(draft));
    }
}
