/// Wizard progress persistence
///
/// Remembers which step the user reached so a reload can resume there.
use std::sync::Arc;

use super::flow::Wizard;
use crate::state::{SetOptions, StoredState, StoredStateOptions};
use crate::storage::StorageBackend;
use crate::window::BrowserWindow;

pub const FORM_STEPS_KEY: &str = "$__formSteps";
pub const DEFAULT_STEP_ID: &str = "0";

const LOG_TARGET: &str = "form_steps_wizard::wizard";

/// Current step id kept in local storage under [`FORM_STEPS_KEY`]
#[derive(Debug)]
pub struct FormWizardSteps {
    last_step_id: String,
    state: StoredState<String>,
}

impl FormWizardSteps {
    pub fn new(
        last_step_id: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        window: &Arc<dyn BrowserWindow>,
    ) -> Self {
        Self::with_default(last_step_id, DEFAULT_STEP_ID, backend, window)
    }

    pub fn with_default(
        last_step_id: impl Into<String>,
        default_step_id: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        window: &Arc<dyn BrowserWindow>,
    ) -> Self {
        let state = StoredState::init(
            FORM_STEPS_KEY,
            default_step_id.into(),
            StoredStateOptions::default(),
            backend,
            window,
        );
        tracing::debug!(target: LOG_TARGET, "Resuming form steps at {:?}", state.value());

        Self {
            last_step_id: last_step_id.into(),
            state,
        }
    }

    pub fn current_step_id(&self) -> &str {
        self.state.value()
    }

    /// Returns whether the stored id changed
    pub fn set_current_step_id(&mut self, id: impl Into<String>) -> bool {
        self.state.set_value(id.into(), SetOptions::default())
    }

    pub fn last_step_id(&self) -> &str {
        &self.last_step_id
    }

    pub fn is_on_last_step(&self) -> bool {
        self.current_step_id() == self.last_step_id
    }

    /// Record the wizard's current step; a finished wizard records the last step
    pub fn sync_with<V: 'static>(&mut self, wizard: &Wizard<V>) -> bool {
        let id = match wizard.current_step_id() {
            Some(id) => id.to_string(),
            None => self.last_step_id.clone(),
        };
        self.set_current_step_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, StorageScope};
    use crate::window::MemoryWindow;

    fn window() -> Arc<dyn BrowserWindow> {
        MemoryWindow::new("https://app.test/signup/#intro")
    }

    #[test]
    fn test_defaults_to_zero() {
        let backend = MemoryBackend::new();
        let steps = FormWizardSteps::new("confirm", backend.clone(), &window());

        assert_eq!(steps.current_step_id(), "0");
        assert_eq!(
            backend.store(StorageScope::Local).raw(FORM_STEPS_KEY).as_deref(),
            Some("0")
        );
    }

    #[test]
    fn test_set_and_resume() {
        let backend = MemoryBackend::new();
        let window = window();

        let mut steps = FormWizardSteps::new("confirm", backend.clone(), &window);
        assert!(steps.set_current_step_id("details"));
        assert!(!steps.set_current_step_id("details"));
        assert!(!steps.is_on_last_step());
        drop(steps);

        let resumed = FormWizardSteps::new("confirm", backend, &window);
        assert_eq!(resumed.current_step_id(), "details");
    }

    #[test]
    fn test_numeric_looking_ids_resume_exactly() {
        let backend = MemoryBackend::new();
        let window = window();

        for id in ["1.10", "null"] {
            let mut steps = FormWizardSteps::new("confirm", backend.clone(), &window);
            steps.set_current_step_id(id);
            drop(steps);

            let resumed = FormWizardSteps::new("confirm", backend.clone(), &window);
            assert_eq!(resumed.current_step_id(), id);
        }
    }

    #[test]
    fn test_last_step() {
        let backend = MemoryBackend::new();
        let mut steps = FormWizardSteps::with_default("confirm", "intro", backend, &window());
        assert_eq!(steps.current_step_id(), "intro");
        assert_eq!(steps.last_step_id(), "confirm");

        steps.set_current_step_id("confirm");
        assert!(steps.is_on_last_step());
    }

    #[test]
    fn test_cleared_when_window_closes() {
        let backend = MemoryBackend::new();
        let memory = MemoryWindow::new("https://app.test/signup/#intro");
        let window: Arc<dyn BrowserWindow> = memory.clone();

        let mut steps = FormWizardSteps::new("confirm", backend.clone(), &window);
        steps.set_current_step_id("details");

        memory.set_closed(true);
        memory.unload();
        memory.run_deferred();

        assert_eq!(backend.store(StorageScope::Local).raw(FORM_STEPS_KEY), None);
    }
}
