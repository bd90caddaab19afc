//! Multi-step form wizard with hash-based navigation and storage-backed state.
//!
//! - [`storage`] keyed get/set over session or local storage areas
//! - [`state`] values that persist themselves and clean up on window close
//! - [`wizard`] the step orchestrator driven by a [`router::Router`]

pub mod config;
pub mod error;
pub mod messaging;
pub mod router;
pub mod state;
pub mod storage;
pub mod window;
pub mod wizard;

pub use config::WizardConfig;
pub use error::{AppResult, ConfigError, NavigationError, StepChangeError, StorageError, WizardError};
pub use wizard::{StepHooks, Wizard, WizardProps};
