/// Before-unload watcher
///
/// Registers a one-shot before-unload handler on a window and removes it
/// again when dropped.
use std::sync::{Arc, Weak};

use crate::messaging::ListenerId;
use crate::window::BrowserWindow;

pub struct UnloadWatch {
    window: Weak<dyn BrowserWindow>,
    listener: Option<ListenerId>,
}

impl UnloadWatch {
    /// Watch for the page unloading.
    ///
    /// When `when` is false nothing is registered. When the handler fires it
    /// calls `callback`, unregisters itself and, if `message` is non-empty,
    /// asks the user to confirm leaving with that message.
    pub fn new<F>(window: &Arc<dyn BrowserWindow>, when: bool, message: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Arc<dyn BrowserWindow>) + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(window);
        if !when {
            return Self {
                window: weak,
                listener: None,
            };
        }

        let message = message.into();
        let target = weak.clone();
        let listener = window.before_unload().once(move |_event| {
            if let Some(window) = target.upgrade() {
                callback(&window);
            }
            if message.is_empty() {
                None
            } else {
                Some(message.clone())
            }
        });

        Self {
            window: weak,
            listener: Some(listener),
        }
    }

    pub fn is_armed(&self) -> bool {
        match (self.listener, self.window.upgrade()) {
            (Some(id), Some(window)) => window.before_unload().contains(id),
            _ => false,
        }
    }
}

impl Drop for UnloadWatch {
    fn drop(&mut self) {
        if let (Some(id), Some(window)) = (self.listener.take(), self.window.upgrade()) {
            window.before_unload().off(id);
        }
    }
}

impl std::fmt::Debug for UnloadWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnloadWatch")
            .field("listener", &self.listener)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::MemoryWindow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn window() -> (Arc<MemoryWindow>, Arc<dyn BrowserWindow>) {
        let memory = MemoryWindow::new("https://app.test/form/");
        let window: Arc<dyn BrowserWindow> = memory.clone();
        (memory, window)
    }

    #[test]
    fn test_disabled_watch_registers_nothing() {
        let (memory, window) = window();
        let watch = UnloadWatch::new(&window, false, "", |_| {});
        assert!(!watch.is_armed());
        assert!(memory.before_unload().is_empty());
    }

    #[test]
    fn test_fires_once_and_returns_message() {
        let (memory, window) = window();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let watch = UnloadWatch::new(&window, true, "Leave the form?", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(watch.is_armed());

        assert_eq!(memory.unload(), Some("Leave the form?".to_string()));
        assert_eq!(memory.unload(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!watch.is_armed());
    }

    #[test]
    fn test_drop_unregisters() {
        let (memory, window) = window();
        let watch = UnloadWatch::new(&window, true, "", |_| {});
        assert_eq!(memory.before_unload().len(), 1);

        drop(watch);
        assert!(memory.before_unload().is_empty());
    }
}
