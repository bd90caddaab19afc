/// Wizard state management
///
/// The current position and the per-step completion map live in separate
/// cells. Updating completion never counts as a view change.

use std::collections::HashMap;

use super::steps::StepPosition;

/// View state: where the wizard is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    position: StepPosition,
}

impl WizardState {
    pub fn new(initial_index: usize) -> Self {
        Self {
            position: StepPosition::At(initial_index),
        }
    }

    pub fn position(&self) -> StepPosition {
        self.position
    }

    /// Move to a step; returns whether the position changed
    pub fn enter(&mut self, index: usize) -> bool {
        let next = StepPosition::At(index);
        if self.position == next {
            return false;
        }
        self.position = next;
        true
    }

    pub fn finish(&mut self) {
        self.position = StepPosition::Finished;
    }

    pub fn is_finished(&self) -> bool {
        self.position.is_finished()
    }
}

/// Completion percentage per step, keyed by hash suffix
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    entries: HashMap<String, u8>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, suffix: &str) -> Option<u8> {
        self.entries.get(suffix).copied()
    }

    /// Current percentage, 0 when untracked
    pub fn percentage(&self, suffix: &str) -> u8 {
        self.get(suffix).unwrap_or(0)
    }

    pub fn set(&mut self, suffix: &str, percentage: u8) {
        self.entries.insert(suffix.to_string(), percentage.min(100));
    }

    /// Start tracking a step at 0 unless it is already tracked
    pub fn track(&mut self, suffix: &str) {
        self.entries.entry(suffix.to_string()).or_insert(0);
    }

    pub fn reset(&mut self, suffix: &str) {
        self.entries.insert(suffix.to_string(), 0);
    }

    pub fn remove(&mut self, suffix: &str) -> Option<u8> {
        self.entries.remove(suffix)
    }

    /// Whether leaving the step would lose partially entered data
    pub fn has_unsaved(&self, suffix: &str) -> bool {
        self.percentage(suffix) > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
