/// Storage-backed state
///
/// Persists a value under a storage key and cleans it up when the page
/// closes.

pub mod stored_state;
pub mod unload;

pub use stored_state::{append_merge, SetOptions, StorageMode, StoredState, StoredStateOptions};
pub use unload::UnloadWatch;
