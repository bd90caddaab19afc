/// Wizard step identity
///
/// Steps are addressed by a canonical string id that doubles as the URL
/// fragment. Numeric addressing is accepted only when choosing the initial
/// step and is resolved to an id straight away.
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::render::StepProps;
use crate::error::{WizardError, WizardResult};

static STEP_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.~-]+$").expect("step id pattern is valid"));

/// Step identifier, usable as a URL fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> WizardResult<Self> {
        let id = id.into();
        if STEP_ID_PATTERN.is_match(&id) {
            Ok(Self(id))
        } else {
            Err(WizardError::InvalidStepId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StepId {
    type Error = WizardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StepId> for String {
    fn from(id: StepId) -> Self {
        id.0
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for StepId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// How the host names the initial step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRef {
    Id(String),
    /// Zero-based; clamped to the last step
    Index(usize),
}

impl From<&str> for StepRef {
    fn from(id: &str) -> Self {
        StepRef::Id(id.to_string())
    }
}

impl From<usize> for StepRef {
    fn from(index: usize) -> Self {
        StepRef::Index(index)
    }
}

/// Where the wizard currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPosition {
    At(usize),
    /// One past the last step
    Finished,
}

impl StepPosition {
    pub fn index(&self) -> Option<usize> {
        match self {
            StepPosition::At(index) => Some(*index),
            StepPosition::Finished => None,
        }
    }

    /// Index of the step to show; the last step once finished
    pub fn clamped_index(&self, steps_total: usize) -> usize {
        match self {
            StepPosition::At(index) => (*index).min(steps_total.saturating_sub(1)),
            StepPosition::Finished => steps_total.saturating_sub(1),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, StepPosition::Finished)
    }
}

/// Renders one step
pub type StepComponent<V> = Arc<dyn Fn(&StepProps<V>) -> V + Send + Sync>;

/// Ordered step mapping; insertion order is step order
pub type Steps<V> = IndexMap<StepId, StepComponent<V>>;

/// Wrap a closure as a [`StepComponent`]
pub fn step<V, F>(render: F) -> StepComponent<V>
where
    F: Fn(&StepProps<V>) -> V + Send + Sync + 'static,
{
    Arc::new(render)
}

/// Resolve the initial step against the step order
pub fn resolve_initial(initial: &StepRef, step_ids: &[StepId]) -> WizardResult<usize> {
    if step_ids.is_empty() {
        return Err(WizardError::EmptySteps);
    }

    match initial {
        StepRef::Index(index) => Ok((*index).min(step_ids.len() - 1)),
        StepRef::Id(id) => step_ids
            .iter()
            .position(|step| step == id.as_str())
            .ok_or_else(|| WizardError::UnknownStep(id.clone())),
    }
}
