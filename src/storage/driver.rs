/// Storage drivers
///
/// A driver is one browser-style key/value area (`sessionStorage` or
/// `localStorage`). A backend hands out the area for a scope, or
/// `StorageError::Unavailable` when the code is not running inside a browser
/// context.
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Which storage area to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    #[default]
    Session,
    Local,
}

impl std::fmt::Display for StorageScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageScope::Session => write!(f, "session"),
            StorageScope::Local => write!(f, "local"),
        }
    }
}

/// Browser-style key/value area
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Resolves the storage area for a scope
pub trait StorageBackend: Send + Sync {
    /// `Err(StorageError::Unavailable)` when there is no browser context
    fn area(&self, scope: StorageScope) -> Result<Arc<dyn KeyValueStore>, StorageError>;
}

/// In-memory storage area with fault injection
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
    quota_bytes: RwLock<Option<usize>>,
    read_fault: RwLock<Option<StorageError>>,
    write_fault: RwLock<Option<StorageError>>,
    remove_fault: RwLock<Option<StorageError>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Limit the total size (keys plus values, in bytes) of stored items
    pub fn with_quota(quota_bytes: usize) -> Arc<Self> {
        let store = Self::default();
        *store.quota_bytes.write() = Some(quota_bytes);
        Arc::new(store)
    }

    pub fn fail_reads_with(&self, fault: Option<StorageError>) {
        *self.read_fault.write() = fault;
    }

    pub fn fail_writes_with(&self, fault: Option<StorageError>) {
        *self.write_fault.write() = fault;
    }

    pub fn fail_removals_with(&self, fault: Option<StorageError>) {
        *self.remove_fault.write() = fault;
    }

    /// Raw stored string, bypassing fault injection
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn used_bytes_without(&self, items: &HashMap<String, String>, key: &str) -> usize {
        items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if let Some(fault) = self.read_fault.read().clone() {
            return Err(fault);
        }
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(fault) = self.write_fault.read().clone() {
            return Err(fault);
        }

        let mut items = self.items.write();
        if let Some(quota) = *self.quota_bytes.read() {
            let needed = self.used_bytes_without(&items, key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if let Some(fault) = self.remove_fault.read().clone() {
            return Err(fault);
        }
        self.items.write().remove(key);
        Ok(())
    }
}

/// In-memory backend holding one session and one local area
pub struct MemoryBackend {
    session: Arc<MemoryStore>,
    local: Arc<MemoryStore>,
    attached: bool,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            session: MemoryStore::new(),
            local: MemoryStore::new(),
            attached: true,
        })
    }

    /// Build a backend from existing areas
    pub fn with_areas(session: Arc<MemoryStore>, local: Arc<MemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            session,
            local,
            attached: true,
        })
    }

    /// Backend that behaves as if running outside a browser
    pub fn detached() -> Arc<Self> {
        Arc::new(Self {
            session: MemoryStore::new(),
            local: MemoryStore::new(),
            attached: false,
        })
    }

    pub fn store(&self, scope: StorageScope) -> &Arc<MemoryStore> {
        match scope {
            StorageScope::Session => &self.session,
            StorageScope::Local => &self.local,
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn area(&self, scope: StorageScope) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        if !self.attached {
            return Err(StorageError::Unavailable);
        }
        let store: Arc<dyn KeyValueStore> = self.store(scope).clone();
        Ok(store)
    }
}
