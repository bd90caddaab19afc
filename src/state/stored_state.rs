/// Storage-backed state
///
/// A value that is seeded from storage, written back to storage on every
/// change, and cleared from storage when the window closes.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::unload::UnloadWatch;
use crate::storage::{BrowserStorage, StorageBackend, StorageOptions, StorageScope};
use crate::window::BrowserWindow;

const LOG_TARGET: &str = "form_steps_wizard::state";

/// Whether changes are written to storage automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageMode {
    /// Start from the default and never write; callers persist manually
    BypassEffect,
    /// Start from storage and write every change back
    #[default]
    EnforceEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredStateOptions {
    pub scope: StorageScope,
    pub mode: StorageMode,
}

impl Default for StoredStateOptions {
    fn default() -> Self {
        Self {
            scope: StorageScope::Local,
            mode: StorageMode::EnforceEffect,
        }
    }
}

/// Options for [`StoredState::set_value`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// Merge into the stored value instead of replacing it
    pub append: bool,
}

impl SetOptions {
    pub fn append() -> Self {
        Self { append: true }
    }
}

pub struct StoredState<T> {
    key: String,
    mode: StorageMode,
    storage: BrowserStorage,
    value: T,
    /// JSON of the last value handed to storage
    persisted: Option<String>,
    _unload: UnloadWatch,
}

impl<T> StoredState<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn init(
        key: impl Into<String>,
        default: T,
        options: StoredStateOptions,
        backend: Arc<dyn StorageBackend>,
        window: &Arc<dyn BrowserWindow>,
    ) -> Self {
        let key = key.into();
        let storage = BrowserStorage::new(
            StorageOptions {
                encrypted: false,
                scope: options.scope,
            },
            backend,
        );

        let value = match options.mode {
            StorageMode::BypassEffect => default,
            StorageMode::EnforceEffect => {
                let seed = serde_json::to_value(&default).ok();
                storage
                    .get(&key, seed)
                    .and_then(|value| coerce(value, || storage.get_raw(&key)))
                    .unwrap_or(default)
            }
        };

        let cleanup_storage = storage.clone();
        let cleanup_key = key.clone();
        let unload = UnloadWatch::new(window, !key.is_empty(), "", move |window| {
            let was_closed = window.is_closed();
            let weak = Arc::downgrade(window);
            let storage = cleanup_storage.clone();
            let key = cleanup_key.clone();

            // The window may be gone by the time the deferred check runs
            window.defer(Box::new(move || {
                let closed_now = weak.upgrade().map_or(true, |w| w.is_closed());
                if was_closed || closed_now {
                    tracing::debug!(target: LOG_TARGET, "Window closed, clearing {}", key);
                    storage.clear(&key);
                }
            }));
        });

        let mut state = Self {
            key,
            mode: options.mode,
            storage,
            value,
            persisted: None,
            _unload: unload,
        };
        state.persist();
        state
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Direct access to the underlying keyed storage
    pub fn storage(&self) -> &BrowserStorage {
        &self.storage
    }

    /// Update the value. Returns whether the state changed.
    pub fn set_value(&mut self, next: T, options: SetOptions) -> bool {
        let previous_json = serde_json::to_string(&self.value).ok();
        let next_json = serde_json::to_string(&next).ok();
        if previous_json.is_some() && previous_json == next_json {
            return false;
        }

        if options.append {
            let fresh = match self.mode {
                StorageMode::BypassEffect => serde_json::to_value(&self.value).ok(),
                StorageMode::EnforceEffect => self.storage.get(&self.key, None),
            };
            let incoming = serde_json::to_value(&next).ok();

            if let (Some(fresh), Some(incoming)) = (fresh, incoming) {
                if let Some(merged) = append_merge(&fresh, &incoming) {
                    if merged == fresh {
                        tracing::debug!(target: LOG_TARGET, "Append to {} changes nothing", self.key);
                        return false;
                    }
                    match coerce::<T>(merged, || None) {
                        Some(value) => {
                            self.value = value;
                            self.persist();
                            return true;
                        }
                        None => {
                            tracing::warn!(target: LOG_TARGET, "Merged value for {} does not fit its type, replacing", self.key);
                        }
                    }
                }
            }
        }

        self.value = next;
        self.persist();
        true
    }

    fn persist(&mut self) {
        if self.mode != StorageMode::EnforceEffect {
            return;
        }

        let Ok(value) = serde_json::to_value(&self.value) else {
            tracing::warn!(target: LOG_TARGET, "Cannot serialize state for {}", self.key);
            return;
        };
        let json = value.to_string();
        if self.persisted.as_deref() == Some(json.as_str()) {
            return;
        }

        if !self.storage.set(&self.key, &value) {
            tracing::debug!(target: LOG_TARGET, "State for {} was not written", self.key);
        }
        self.persisted = Some(json);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StoredState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredState")
            .field("key", &self.key)
            .field("mode", &self.mode)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// Combine a stored value with an incoming one.
///
/// Arrays concatenate (stored first); objects shallow-merge with the incoming
/// keys winning. Any other pairing is not mergeable.
pub fn append_merge(stored: &Value, incoming: &Value) -> Option<Value> {
    match (stored, incoming) {
        (Value::Array(stored), Value::Array(incoming)) => {
            let mut merged = stored.clone();
            merged.extend(incoming.iter().cloned());
            Some(Value::Array(merged))
        }
        (Value::Object(stored), Value::Object(incoming)) => {
            let mut merged = stored.clone();
            for (key, value) in incoming {
                merged.insert(key.clone(), value.clone());
            }
            Some(Value::Object(merged))
        }
        _ => None,
    }
}

/// Deserialize a stored value. A scalar that does not fit `T` is retried as
/// the raw payload text, so string state keeps `"1.10"` or `"null"` verbatim.
fn coerce<T: DeserializeOwned>(value: Value, raw: impl FnOnce() -> Option<String>) -> Option<T> {
    let scalar = matches!(value, Value::Number(_) | Value::Bool(_) | Value::Null);

    match serde_json::from_value(value) {
        Ok(value) => Some(value),
        Err(_) if scalar => raw().and_then(|text| serde_json::from_value(Value::String(text)).ok()),
        Err(_) => None,
    }
}
