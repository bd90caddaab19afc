/// Wizard flow management
///
/// [`Wizard`] owns the authoritative current step. Step changes go through
/// the host's [`StepHooks::on_step_change`] and then through the router; the
/// router's hash-change events (fed back via [`Wizard::dispatch`]) are what
/// actually move the wizard to another step.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::form::FormSnapshot;
use super::paths::{derive_pathnames, destination_step, pathname_prefix, StepPathnames};
use super::render::StepMarker;
use super::state::{CompletionTracker, WizardState};
use super::steps::{resolve_initial, StepComponent, StepId, StepPosition, StepRef, Steps};
use crate::config::WizardConfig;
use crate::error::{NavigationError, StepChangeError, WizardResult};
use crate::messaging::{EventBus, ListenerId, WizardEvent};
use crate::router::{NavigationTarget, Router, RouterEventKind};
use crate::window::{without_fragment, BrowserWindow};

const LOG_TARGET: &str = "form_steps_wizard::wizard";

pub const DEFAULT_PATHNAME_PATTERN: &str = "/<folder>/";
pub const DEFAULT_DISCARD_PROMPT: &str = "Are you sure you wish to discard unsaved changes ?";

/// Host callbacks
#[async_trait]
pub trait StepHooks: Send + Sync {
    /// Validate or submit the current step. `Ok(true)` lets the wizard advance.
    async fn on_step_change(
        &self,
        data: Value,
        current_index: usize,
        disable_form_submission: bool,
    ) -> Result<bool, StepChangeError>;

    /// The user agreed to leave a partially filled step
    fn on_step_change_discarded(&self);

    fn on_step_change_error(&self, error: &StepChangeError);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    pub class_name: String,
    pub wrapper_class_name: String,
    pub steps_box_class_name: String,
}

/// Everything needed to build a [`Wizard`] apart from its collaborators
pub struct WizardProps<V> {
    pub initial_step: StepRef,
    pub steps: Steps<V>,
    pub steps_pathname_pattern: String,
    pub discard_prompt: String,
    pub class_names: ClassNames,
    pub hooks: Arc<dyn StepHooks>,
}

impl<V> WizardProps<V> {
    pub fn new(initial_step: impl Into<StepRef>, steps: Steps<V>, hooks: Arc<dyn StepHooks>) -> Self {
        Self {
            initial_step: initial_step.into(),
            steps,
            steps_pathname_pattern: DEFAULT_PATHNAME_PATTERN.to_string(),
            discard_prompt: DEFAULT_DISCARD_PROMPT.to_string(),
            class_names: ClassNames::default(),
            hooks,
        }
    }

    /// Take pattern, prompt and class names from a loaded config
    pub fn from_config(
        config: &WizardConfig,
        initial_step: impl Into<StepRef>,
        steps: Steps<V>,
        hooks: Arc<dyn StepHooks>,
    ) -> Self {
        Self {
            steps_pathname_pattern: config.steps_pathname_pattern.clone(),
            discard_prompt: config.discard_prompt.clone(),
            class_names: ClassNames {
                class_name: config.class_name.clone(),
                wrapper_class_name: config.wrapper_class_name.clone(),
                steps_box_class_name: config.steps_box_class_name.clone(),
            },
            ..Self::new(initial_step, steps, hooks)
        }
    }

    pub fn with_pathname_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.steps_pathname_pattern = pattern.into();
        self
    }

    pub fn with_class_names(mut self, class_names: ClassNames) -> Self {
        self.class_names = class_names;
        self
    }
}

/// Router and window input driving the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteInput {
    /// Before a hash navigation; may be vetoed
    HashChangeStart { url: String },
    HashChangeComplete { url: String },
    /// Raw window `hashchange`
    HashChange { new_url: String },
}

/// Snapshot of everything a render needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedView {
    pub step_ids: Vec<StepId>,
    /// `None` once finished
    pub current_index: Option<usize>,
    pub current_step: StepMarker,
    pub steps_total: usize,
    pub paths: StepPathnames,
    pub finished: bool,
}

struct Inner<V> {
    step_ids: Vec<StepId>,
    steps: Steps<V>,
    prefix: String,
    initial_index: usize,
    discard_prompt: String,
    class_names: ClassNames,
    hooks: Arc<dyn StepHooks>,
    router: Arc<dyn Router>,
    window: Arc<dyn BrowserWindow>,
    state: Mutex<WizardState>,
    completion: Mutex<CompletionTracker>,
    in_flight: AtomicBool,
    listeners: Mutex<Vec<(RouterEventKind, ListenerId)>>,
    events: EventBus<WizardEvent>,
}

impl<V> Inner<V> {
    fn detach(&self) -> usize {
        let registered: Vec<_> = self.listeners.lock().drain(..).collect();
        let events = self.router.events();
        for (kind, id) in &registered {
            events.off(*kind, *id);
        }
        registered.len()
    }
}

impl<V> Drop for Inner<V> {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Clears the in-flight flag when a step change settles
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Multi-step form wizard. Clones share state.
pub struct Wizard<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for Wizard<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: 'static> Wizard<V> {
    pub fn new(
        props: WizardProps<V>,
        router: Arc<dyn Router>,
        window: Arc<dyn BrowserWindow>,
    ) -> WizardResult<Self> {
        let step_ids: Vec<StepId> = props.steps.keys().cloned().collect();
        let initial_index = resolve_initial(&props.initial_step, &step_ids)?;
        let prefix = pathname_prefix(&props.steps_pathname_pattern);

        tracing::info!(
            target: LOG_TARGET,
            "Wizard created with {} steps under {:?}, starting at {}",
            step_ids.len(),
            prefix,
            step_ids[initial_index]
        );

        Ok(Self {
            inner: Arc::new(Inner {
                step_ids,
                steps: props.steps,
                prefix,
                initial_index,
                discard_prompt: props.discard_prompt,
                class_names: props.class_names,
                hooks: props.hooks,
                router,
                window,
                state: Mutex::new(WizardState::new(initial_index)),
                completion: Mutex::new(CompletionTracker::new()),
                in_flight: AtomicBool::new(false),
                listeners: Mutex::new(Vec::new()),
                events: EventBus::new(),
            }),
        })
    }

    pub fn step_ids(&self) -> &[StepId] {
        &self.inner.step_ids
    }

    pub fn steps_total(&self) -> usize {
        self.inner.step_ids.len()
    }

    pub fn position(&self) -> StepPosition {
        self.inner.state.lock().position()
    }

    /// `None` once finished
    pub fn current_step_id(&self) -> Option<StepId> {
        self.position()
            .index()
            .map(|index| self.inner.step_ids[index].clone())
    }

    pub fn pathname_prefix(&self) -> &str {
        &self.inner.prefix
    }

    pub fn class_names(&self) -> &ClassNames {
        &self.inner.class_names
    }

    pub fn events(&self) -> &EventBus<WizardEvent> {
        &self.inner.events
    }

    /// Completion percentage tracked for a step
    pub fn completion(&self, step_id: &str) -> Option<u8> {
        self.inner.completion.lock().get(step_id)
    }

    pub fn is_mounted(&self) -> bool {
        !self.inner.listeners.lock().is_empty()
    }

    pub fn derived_view(&self) -> DerivedView {
        let position = self.position();
        let step_ids = self.inner.step_ids.clone();
        let steps_total = step_ids.len();

        let current_step = match position {
            StepPosition::At(index) => StepMarker::Id(step_ids[index].clone()),
            StepPosition::Finished => StepMarker::Number(steps_total),
        };
        let paths = derive_pathnames(position, &step_ids, &self.inner.prefix);

        DerivedView {
            current_index: position.index(),
            current_step,
            steps_total,
            paths,
            finished: position.is_finished(),
            step_ids,
        }
    }

    /// Component for a step index; the last step past the end
    pub(super) fn step_component(&self, index: usize) -> StepComponent<V> {
        let index = index.min(self.steps_total() - 1);
        Arc::clone(&self.inner.steps[index])
    }

    /// Hash suffix of the current step, if not finished
    fn current_suffix(&self) -> Option<String> {
        self.current_step_id().map(String::from)
    }

    /// Hand the current step's data to the host and, on success, move on.
    ///
    /// Resolves to whether the step change went through. Host errors are
    /// routed to [`StepHooks::on_step_change_error`]; a cancelled navigation
    /// resolves to `false`. A call made while another is still running
    /// resolves to `false` without reaching the host.
    pub async fn on_step_change_triggered(
        &self,
        data: Value,
        disable_form_submission: bool,
        navigate: bool,
    ) -> WizardResult<bool> {
        let Some(_in_flight) = InFlight::acquire(&self.inner.in_flight) else {
            tracing::debug!(target: LOG_TARGET, "Step change already in progress, ignoring");
            return Ok(false);
        };

        let position = self.position();
        let index = position.clamped_index(self.steps_total());
        let paths = derive_pathnames(position, &self.inner.step_ids, &self.inner.prefix);

        if let Some(suffix) = self.current_suffix() {
            self.inner.completion.lock().remove(&suffix);
        }

        match self
            .inner
            .hooks
            .on_step_change(data, index, disable_form_submission)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(target: LOG_TARGET, "Host declined step change at #{}", index);
                return Ok(false);
            }
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, "Step change at #{} failed: {}", index, err);
                self.inner.hooks.on_step_change_error(&err);
                return Ok(false);
            }
        }

        if !navigate {
            return Ok(true);
        }

        match paths.next {
            Some(next) => match self.inner.router.navigate(NavigationTarget::parse(&next)).await {
                Ok(()) => Ok(true),
                Err(err) if err.is_cancelled() => {
                    tracing::debug!(target: LOG_TARGET, "Navigation to {} cancelled", next);
                    Ok(false)
                }
                Err(err) => {
                    tracing::warn!(target: LOG_TARGET, "Navigation to {} failed: {}", next, err);
                    Err(err.into())
                }
            },
            None => {
                self.inner.state.lock().finish();
                let steps_total = self.steps_total();
                tracing::info!(target: LOG_TARGET, "Wizard finished after {} steps", steps_total);
                self.inner.events.publish(WizardEvent::Finished { steps_total });
                Ok(true)
            }
        }
    }

    /// Record how much of the current step's form is filled in
    pub fn on_form_change_triggered(&self, form: &FormSnapshot) -> u8 {
        let Some(suffix) = self.current_suffix() else {
            return 0;
        };

        let percentage = form.completion_percentage();
        self.inner.completion.lock().set(&suffix, percentage);
        tracing::debug!(target: LOG_TARGET, "Step {} is {}% complete", suffix, percentage);
        self.inner.events.publish(WizardEvent::CompletionChanged {
            step_id: suffix,
            percentage,
        });
        percentage
    }

    /// Feed a router or window event into the state machine
    pub fn dispatch(&self, input: RouteInput) -> Result<(), NavigationError> {
        match input {
            RouteInput::HashChangeStart { url } => self.guard_departure(&url),
            RouteInput::HashChangeComplete { url } => {
                self.arrive(&url);
                Ok(())
            }
            RouteInput::HashChange { new_url } => {
                self.apply_location(&new_url);
                Ok(())
            }
        }
    }

    /// Navigation finished: back to the top of the page, then onto the step
    fn arrive(&self, url: &str) {
        self.inner.window.scroll_to_top();
        self.apply_location(url);
    }

    /// Ask before leaving a step with unsaved input
    fn guard_departure(&self, url: &str) -> Result<(), NavigationError> {
        let Some(suffix) = self.current_suffix() else {
            return Ok(());
        };
        if !self.inner.completion.lock().has_unsaved(&suffix) {
            return Ok(());
        }

        let window = &self.inner.window;
        if window.confirm(&self.inner.discard_prompt) {
            tracing::info!(target: LOG_TARGET, "Discarding unsaved changes on {}", suffix);
            self.inner.hooks.on_step_change_discarded();
            self.inner
                .events
                .publish(WizardEvent::StepChangeDiscarded { step_id: suffix });
            return Ok(());
        }

        let href = window.href();
        if !href.ends_with(&suffix) {
            window.assign(&format!("{}#{}", without_fragment(&href), suffix));
        }
        tracing::debug!(target: LOG_TARGET, "Staying on {} instead of {}", suffix, url);
        self.inner
            .events
            .publish(WizardEvent::NavigationAborted { step_id: suffix });
        Err(NavigationError::Cancelled)
    }

    /// Move to the step a URL points at
    fn apply_location(&self, url: &str) {
        let step_ids = &self.inner.step_ids;
        let Some(destination) = destination_step(url, &self.inner.prefix, step_ids) else {
            tracing::debug!(target: LOG_TARGET, "{} is outside the wizard", url);
            return;
        };
        let Some(index) = step_ids.iter().position(|id| id == destination) else {
            tracing::warn!(target: LOG_TARGET, "Ignoring unknown step {:?}", destination);
            return;
        };

        let entered = self.inner.state.lock().enter(index);
        {
            let mut completion = self.inner.completion.lock();
            if entered {
                completion.reset(destination);
            } else {
                completion.track(destination);
            }
        }

        if entered {
            tracing::debug!(target: LOG_TARGET, "Entered step {} (#{})", destination, index);
            self.inner.events.publish(WizardEvent::StepEntered {
                step_id: destination.to_string(),
                index,
            });
        }
    }

    /// Start listening to the router and give the location a step fragment.
    ///
    /// Calling it again while mounted does nothing.
    pub fn mount(&self) {
        {
            let mut listeners = self.inner.listeners.lock();
            if !listeners.is_empty() {
                return;
            }

            let events = self.inner.router.events();

            let weak = Arc::downgrade(&self.inner);
            let start = events.on_hash_change_start(move |url| match weak.upgrade() {
                Some(inner) => Wizard { inner }.dispatch(RouteInput::HashChangeStart { url: url.clone() }),
                None => Ok(()),
            });

            let weak = Arc::downgrade(&self.inner);
            let complete = events.on_hash_change_complete(move |url| {
                if let Some(inner) = weak.upgrade() {
                    Wizard { inner }.arrive(url);
                }
            });

            let weak = Arc::downgrade(&self.inner);
            let raw = events.on_hash_change(move |change| {
                if let Some(inner) = weak.upgrade() {
                    Wizard { inner }.apply_location(&change.new_url);
                }
            });

            listeners.extend([
                (RouterEventKind::HashChangeStart, start),
                (RouterEventKind::HashChangeComplete, complete),
                (RouterEventKind::HashChange, raw),
            ]);
        }

        let window = &self.inner.window;
        let hash = window.hash();
        let href = window.href();
        if hash.is_empty() || hash == "#" {
            let initial = &self.inner.step_ids[self.inner.initial_index];
            let target = format!("{}#{}", without_fragment(&href), initial);
            tracing::debug!(target: LOG_TARGET, "No step in location, replacing with {}", target);
            window.replace(&target);
        } else {
            self.apply_location(&href);
        }
        tracing::info!(target: LOG_TARGET, "Wizard mounted at {}", window.href());
    }

    /// Stop listening to the router
    pub fn unmount(&self) {
        let removed = self.inner.detach();
        if removed > 0 {
            tracing::info!(target: LOG_TARGET, "Wizard unmounted");
        }
    }
}
