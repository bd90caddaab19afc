//! Client-side router collaborator.
//!
//! The wizard needs two things from a router: a way to navigate to
//! `pathname#hash`, and named hash-change events it can listen to. Listeners
//! on `hashChangeStart` may veto the navigation by returning an error.

mod memory;

pub use memory::MemoryRouter;

use async_trait::async_trait;

use crate::error::NavigationError;
use crate::messaging::{ListenerId, Listeners};

/// Where to navigate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub pathname: String,
    /// Fragment without the leading `#`
    pub hash: String,
}

impl NavigationTarget {
    /// Split `pathname#hash`
    pub fn parse(pathname: &str) -> Self {
        match pathname.split_once('#') {
            Some((pathname, hash)) => Self {
                pathname: pathname.to_string(),
                hash: hash.to_string(),
            },
            None => Self {
                pathname: pathname.to_string(),
                hash: String::new(),
            },
        }
    }

    pub fn to_path(&self) -> String {
        if self.hash.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}#{}", self.pathname, self.hash)
        }
    }
}

/// Low-level hash change, as reported by the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashChange {
    pub old_url: String,
    pub new_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterEventKind {
    HashChangeStart,
    HashChangeComplete,
    /// Raw window `hashchange`
    HashChange,
}

impl RouterEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterEventKind::HashChangeStart => "hashChangeStart",
            RouterEventKind::HashChangeComplete => "hashChangeComplete",
            RouterEventKind::HashChange => "hashchange",
        }
    }
}

/// Named router events with add/remove registration
#[derive(Clone, Default)]
pub struct RouterEvents {
    hash_change_start: Listeners<String, Result<(), NavigationError>>,
    hash_change_complete: Listeners<String>,
    hash_change: Listeners<HashChange>,
}

impl RouterEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the destination URL before a hash navigation; an error aborts it
    pub fn on_hash_change_start<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&String) -> Result<(), NavigationError> + Send + Sync + 'static,
    {
        self.hash_change_start.on(handler)
    }

    /// Called with the destination URL after a hash navigation
    pub fn on_hash_change_complete<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&String) + Send + Sync + 'static,
    {
        self.hash_change_complete.on(handler)
    }

    pub fn on_hash_change<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&HashChange) + Send + Sync + 'static,
    {
        self.hash_change.on(handler)
    }

    pub fn off(&self, kind: RouterEventKind, id: ListenerId) -> bool {
        match kind {
            RouterEventKind::HashChangeStart => self.hash_change_start.off(id),
            RouterEventKind::HashChangeComplete => self.hash_change_complete.off(id),
            RouterEventKind::HashChange => self.hash_change.off(id),
        }
    }

    pub fn listener_count(&self, kind: RouterEventKind) -> usize {
        match kind {
            RouterEventKind::HashChangeStart => self.hash_change_start.len(),
            RouterEventKind::HashChangeComplete => self.hash_change_complete.len(),
            RouterEventKind::HashChange => self.hash_change.len(),
        }
    }

    pub fn emit_hash_change_start(&self, url: &str) -> Result<(), NavigationError> {
        self.hash_change_start.try_emit(&url.to_string())
    }

    pub fn emit_hash_change_complete(&self, url: &str) {
        self.hash_change_complete.emit(&url.to_string());
    }

    pub fn emit_hash_change(&self, change: &HashChange) {
        self.hash_change.emit(change);
    }
}

#[async_trait]
pub trait Router: Send + Sync {
    async fn navigate(&self, target: NavigationTarget) -> Result<(), NavigationError>;

    fn events(&self) -> &RouterEvents;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        let target = NavigationTarget::parse("/signup/#details");
        assert_eq!(target.pathname, "/signup/");
        assert_eq!(target.hash, "details");
        assert_eq!(target.to_path(), "/signup/#details");

        let target = NavigationTarget::parse("/signup/");
        assert_eq!(target.hash, "");
        assert_eq!(target.to_path(), "/signup/");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(RouterEventKind::HashChangeStart.as_str(), "hashChangeStart");
        assert_eq!(RouterEventKind::HashChangeComplete.as_str(), "hashChangeComplete");
    }

    #[test]
    fn test_off_is_scoped_to_event_kind() {
        let events = RouterEvents::new();
        let start = events.on_hash_change_start(|_| Ok(()));
        events.on_hash_change_complete(|_| {});

        assert_eq!(events.listener_count(RouterEventKind::HashChangeStart), 1);
        assert!(events.off(RouterEventKind::HashChangeStart, start));
        assert_eq!(events.listener_count(RouterEventKind::HashChangeStart), 0);
        assert_eq!(events.listener_count(RouterEventKind::HashChangeComplete), 1);
    }

    #[test]
    fn test_start_listener_can_abort() {
        let events = RouterEvents::new();
        events.on_hash_change_start(|url| {
            if url.ends_with("#locked") {
                Err(NavigationError::Cancelled)
            } else {
                Ok(())
            }
        });

        assert!(events.emit_hash_change_start("/f/#open").is_ok());
        assert_eq!(
            events.emit_hash_change_start("/f/#locked"),
            Err(NavigationError::Cancelled)
        );
    }
}
