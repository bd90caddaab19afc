/// Callback registry with add/remove semantics
///
/// Where [`EventBus`](super::EventBus) queues events for later, `Listeners`
/// calls handlers synchronously so they can veto the event (router guards)
/// or answer it (before-unload prompts).
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Listener ID returned by [`Listeners::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Handler<E, R> = Arc<dyn Fn(&E) -> R + Send + Sync>;

struct Entry<E, R> {
    id: ListenerId,
    once: bool,
    handler: Handler<E, R>,
}

impl<E, R> Clone for Entry<E, R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            once: self.once,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Ordered set of handlers for one event type
pub struct Listeners<E, R = ()> {
    entries: Arc<RwLock<Vec<Entry<E, R>>>>,
    next_id: Arc<AtomicUsize>,
}

impl<E, R> Listeners<E, R> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a handler
    pub fn on<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        self.insert(false, Arc::new(handler))
    }

    /// Register a handler that is removed after its first call
    pub fn once<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        self.insert(true, Arc::new(handler))
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.read().iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Call every handler in registration order and collect the answers.
    pub fn emit(&self, event: &E) -> Vec<R> {
        self.snapshot()
            .into_iter()
            .map(|entry| (entry.handler)(event))
            .collect()
    }

    fn insert(&self, once: bool, handler: Handler<E, R>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push(Entry { id, once, handler });
        id
    }

    // Handlers run without the lock held so they may call `on`/`off`.
    fn snapshot(&self) -> Vec<Entry<E, R>> {
        let mut entries = self.entries.write();
        let snapshot = entries.clone();
        entries.retain(|e| !e.once);
        snapshot
    }
}

impl<E, X> Listeners<E, Result<(), X>> {
    /// Call handlers in order, stopping at the first one that fails.
    pub fn try_emit(&self, event: &E) -> Result<(), X> {
        for entry in self.snapshot() {
            (entry.handler)(event)?;
        }
        Ok(())
    }
}

impl<E, R> Default for Listeners<E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, R> Clone for Listeners<E, R> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            next_id: Arc::clone(&self.next_id),
        }
    }
}
