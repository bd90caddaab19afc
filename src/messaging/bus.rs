/// Queued broadcast of wizard events
///
/// Every subscriber gets its own bounded queue, so a UI layer that polls
/// between frames never blocks the wizard. When a queue is full the newest
/// event is dropped for that subscriber only. A subscriber whose receiver was
/// dropped is pruned on the next publish.
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

const LOG_TARGET: &str = "form_steps_wizard::messaging";

/// Events held per subscriber before new ones are dropped
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

pub struct EventBus<E> {
    subscribers: Mutex<Vec<Sender<E>>>,
    capacity: usize,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Bus whose subscriber queues hold at most `capacity` events (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// Start receiving events published from now on. Drop the receiver to
    /// unsubscribe.
    pub fn subscribe(&self) -> Receiver<E> {
        let (sender, receiver) = bounded(self.capacity);
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Queue `event` for every live subscriber. Returns how many received it.
    pub fn publish(&self, event: E) -> usize {
        let mut subscribers = self.subscribers.lock();
        let mut delivered = 0;

        subscribers.retain(|sender| match sender.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::debug!(target: LOG_TARGET, "Subscriber queue full, event dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });

        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.lock().len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
