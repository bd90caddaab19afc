/// Multi-step form wizard
///
/// Provides hash-addressed step navigation with a discard guard for
/// partially filled steps.
///
/// ## Architecture
///
/// ```text
/// Wizard<V>
///   ├── WizardState (current position: a step or finished)
///   ├── CompletionTracker (per-step fill percentage)
///   ├── StepHooks (host validation / submission)
///   ├── Router (navigate + hash change events)
///   └── BrowserWindow (location, confirm, scroll)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let wizard = Wizard::new(props, router, window)?;
/// wizard.mount();
///
/// // From a step's submit handler
/// if wizard.on_step_change_triggered(data, false, true).await? {
///     // advanced, or finished after the last step
/// }
///
/// let view = wizard.render(&[progress_bar]);
/// ```
///
/// ## Transitions
///
/// 1. **on_step_change_triggered** - host callback, then router navigation
/// 2. **HashChangeStart** - discard prompt when the step has unsaved input
/// 3. **HashChangeComplete / HashChange** - enter the step named by the URL
/// 4. **mount** - add the initial step fragment when the location has none

pub mod flow;
pub mod form;
pub mod paths;
pub mod persistence;
pub mod render;
pub mod state;
pub mod steps;

// Re-export commonly used types
pub use flow::{
    ClassNames, DerivedView, RouteInput, StepHooks, Wizard, WizardProps, DEFAULT_DISCARD_PROMPT,
    DEFAULT_PATHNAME_PATTERN,
};
pub use form::{ElementKind, FormElement, FormSnapshot};
pub use paths::StepPathnames;
pub use persistence::{FormWizardSteps, FORM_STEPS_KEY};
pub use render::{child, ChildComponent, ChildProps, StepMarker, StepProps, WizardView};
pub use state::{CompletionTracker, WizardState};
pub use steps::{step, StepComponent, StepId, StepPosition, StepRef, Steps};
