/// Browser-style key/value persistence
///
/// ## Architecture
///
/// ```text
/// BrowserStorage (get / set / clear, never fails loudly)
///   ├── StorageBackend  (resolves the area for a scope, None outside a browser)
///   │     └── KeyValueStore (getItem / setItem / removeItem)
///   └── PayloadCodec    (encrypted mode transform, JSON by default)
/// ```

pub mod codec;
pub mod driver;
pub mod keyed;

// Re-export commonly used types
pub use codec::{JsonCodec, PayloadCodec};
pub use driver::{KeyValueStore, MemoryBackend, MemoryStore, StorageBackend, StorageScope};
pub use keyed::{BrowserStorage, StorageOptions};
