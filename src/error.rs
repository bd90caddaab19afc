use thiserror::Error;

/// Crate-level errors using thiserror for structured error handling.
///
/// Storage and codec faults never escape the storage layer; they are
/// converted into boolean results or fallback values there. Navigation and
/// wizard errors are the only ones returned to host code.

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Storage access denied")]
    Security,

    #[error("Storage is not available outside a browser context")]
    Unavailable,

    #[error("Storage operation failed: {0}")]
    Other(String),
}

impl StorageError {
    /// Browser-style error name (`QuotaExceededError`, `SecurityError`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            StorageError::QuotaExceeded => "QuotaExceededError",
            StorageError::Security => "SecurityError",
            StorageError::Unavailable => "NotSupportedError",
            StorageError::Other(_) => "Error",
        }
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode stored payload")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode stored payload")]
    Decode(#[source] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Navigation was aborted, either by a listener or by the router itself
    #[error("Navigation cancelled")]
    Cancelled,

    #[error("Navigation failed: {0}")]
    Failed(String),
}

impl NavigationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NavigationError::Cancelled)
    }
}

/// Errors raised by the host's step change callback
#[derive(Error, Debug)]
pub enum StepChangeError {
    #[error("Step change rejected: {0}")]
    Rejected(String),

    #[error("Step change failed")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Wizard requires at least one step")]
    EmptySteps,

    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Invalid step id: {0:?}")]
    InvalidStepId(String),

    #[error("Navigation to the next step failed")]
    Navigation(#[from] NavigationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

/// Result alias for wizard operations
pub type WizardResult<T> = Result<T, WizardError>;
