//! Browser window collaborator.
//!
//! The wizard and the stored-state watcher only need a narrow slice of the
//! window: the location, the closed flag, a confirm prompt, before-unload
//! registration and a zero-delay task queue. [`MemoryWindow`] implements that
//! slice in memory for headless hosts and tests.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::messaging::Listeners;

/// Task scheduled with a zero delay
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Payload of a before-unload event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeforeUnload {
    /// Location at the time the page started unloading
    pub href: String,
}

/// Before-unload handlers answer with an optional prompt message; any
/// `Some` prevents the default unload and asks the user to confirm.
pub type UnloadListeners = Listeners<BeforeUnload, Option<String>>;

pub trait BrowserWindow: Send + Sync {
    /// Full location, including any fragment
    fn href(&self) -> String;

    /// Location fragment including the leading `#`, or an empty string
    fn hash(&self) -> String {
        let href = self.href();
        match href.find('#') {
            Some(pos) => href[pos..].to_string(),
            None => String::new(),
        }
    }

    /// Replace the current history entry
    fn replace(&self, href: &str);

    /// Navigate, pushing a history entry
    fn assign(&self, href: &str);

    fn is_closed(&self) -> bool;

    /// Blocking yes/no prompt
    fn confirm(&self, message: &str) -> bool;

    fn scroll_to_top(&self) {}

    /// Run `task` after the current event handler returns
    fn defer(&self, task: DeferredTask);

    fn before_unload(&self) -> &UnloadListeners;
}

/// Strip the fragment (if any) from a location
pub fn without_fragment(href: &str) -> &str {
    match href.split_once('#') {
        Some((base, _)) => base,
        None => href,
    }
}

/// In-memory window used by headless hosts and tests
pub struct MemoryWindow {
    href: RwLock<String>,
    history: RwLock<Vec<String>>,
    closed: RwLock<bool>,
    confirm_answer: RwLock<bool>,
    prompts: RwLock<Vec<String>>,
    scrolls: RwLock<usize>,
    deferred: Mutex<VecDeque<DeferredTask>>,
    unload: UnloadListeners,
}

impl MemoryWindow {
    pub fn new(href: impl Into<String>) -> Arc<Self> {
        let href = href.into();
        Arc::new(Self {
            history: RwLock::new(vec![href.clone()]),
            href: RwLock::new(href),
            closed: RwLock::new(false),
            confirm_answer: RwLock::new(true),
            prompts: RwLock::new(Vec::new()),
            scrolls: RwLock::new(0),
            deferred: Mutex::new(VecDeque::new()),
            unload: Listeners::new(),
        })
    }

    /// Answer returned by subsequent `confirm` prompts
    pub fn answer_confirm_with(&self, answer: bool) {
        *self.confirm_answer.write() = answer;
    }

    /// Messages shown through `confirm`, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().clone()
    }

    /// Pushed history entries, including the initial location
    pub fn history(&self) -> Vec<String> {
        self.history.read().clone()
    }

    pub fn scroll_count(&self) -> usize {
        *self.scrolls.read()
    }

    pub fn set_closed(&self, closed: bool) {
        *self.closed.write() = closed;
    }

    /// Fire before-unload and return the prompt message, if any handler asked for one
    pub fn unload(&self) -> Option<String> {
        let event = BeforeUnload { href: self.href() };
        self.unload.emit(&event).into_iter().flatten().last()
    }

    /// Drain the zero-delay task queue. Returns the number of tasks run.
    pub fn run_deferred(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop before running so tasks may schedule more tasks
            let task = self.deferred.lock().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl BrowserWindow for MemoryWindow {
    fn href(&self) -> String {
        self.href.read().clone()
    }

    fn replace(&self, href: &str) {
        *self.href.write() = href.to_string();
        if let Some(last) = self.history.write().last_mut() {
            *last = href.to_string();
        }
    }

    fn assign(&self, href: &str) {
        *self.href.write() = href.to_string();
        self.history.write().push(href.to_string());
    }

    fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompts.write().push(message.to_string());
        *self.confirm_answer.read()
    }

    fn scroll_to_top(&self) {
        *self.scrolls.write() += 1;
    }

    fn defer(&self, task: DeferredTask) {
        self.deferred.lock().push_back(task);
    }

    fn before_unload(&self) -> &UnloadListeners {
        &self.unload
    }
}
