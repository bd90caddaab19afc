use std::sync::Arc;

use async_trait::async_trait;

use super::{HashChange, NavigationTarget, Router, RouterEvents};
use crate::error::NavigationError;
use crate::window::{without_fragment, BrowserWindow};

const LOG_TARGET: &str = "form_steps_wizard::router";

/// Hash router driving a [`BrowserWindow`]'s location.
///
/// `navigate` emits `hashChangeStart` (which may abort), updates the
/// location, then emits the raw `hashchange` and `hashChangeComplete`.
pub struct MemoryRouter {
    window: Arc<dyn BrowserWindow>,
    events: RouterEvents,
}

impl MemoryRouter {
    pub fn new(window: Arc<dyn BrowserWindow>) -> Arc<Self> {
        Arc::new(Self {
            window,
            events: RouterEvents::new(),
        })
    }

    /// Hash change initiated outside the router (back button, typed URL)
    pub fn visit_hash(&self, hash: &str) {
        let old_url = self.window.href();
        let new_url = format!("{}#{}", without_fragment(&old_url), hash.trim_start_matches('#'));
        self.window.assign(&new_url);
        self.events.emit_hash_change(&HashChange {
            old_url,
            new_url: new_url.clone(),
        });
    }

    fn resolve(&self, target: &NavigationTarget) -> String {
        let current = self.window.href();
        format!("{}{}", origin_of(&current), target.to_path())
    }
}

#[async_trait]
impl Router for MemoryRouter {
    async fn navigate(&self, target: NavigationTarget) -> Result<(), NavigationError> {
        let old_url = self.window.href();
        let new_url = self.resolve(&target);
        tracing::debug!(target: LOG_TARGET, "Navigating {} -> {}", old_url, new_url);

        if let Err(err) = self.events.emit_hash_change_start(&new_url) {
            tracing::debug!(target: LOG_TARGET, "Navigation to {} aborted: {}", new_url, err);
            return Err(err);
        }

        self.window.assign(&new_url);
        self.events.emit_hash_change(&HashChange {
            old_url,
            new_url: new_url.clone(),
        });
        self.events.emit_hash_change_complete(&new_url);
        Ok(())
    }

    fn events(&self) -> &RouterEvents {
        &self.events
    }
}

/// `scheme://host[:port]` part of a URL, or an empty string for bare paths
fn origin_of(href: &str) -> &str {
    let Some(scheme_end) = href.find("://") else {
        return "";
    };
    let rest = &href[scheme_end + 3..];
    match rest.find('/') {
        Some(pos) => &href[..scheme_end + 3 + pos],
        None => without_fragment(href),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::MemoryWindow;
    use parking_lot::Mutex;

    #[test]
    fn test_origin_of() {
        assert_eq!(origin_of("https://app.test/signup/#a"), "https://app.test");
        assert_eq!(origin_of("http://localhost:3000"), "http://localhost:3000");
        assert_eq!(origin_of("/signup/"), "");
    }

    #[tokio::test]
    async fn test_navigate_updates_location_and_emits_events() {
        let window = MemoryWindow::new("https://app.test/signup/#intro");
        let router = MemoryRouter::new(window.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        router.events().on_hash_change_start(move |url| {
            log.lock().push(format!("start {}", url));
            Ok(())
        });
        let log = Arc::clone(&seen);
        router.events().on_hash_change(move |change| {
            log.lock().push(format!("raw {}", change.new_url));
        });
        let log = Arc::clone(&seen);
        router.events().on_hash_change_complete(move |url| {
            log.lock().push(format!("complete {}", url));
        });

        router
            .navigate(NavigationTarget::parse("/signup/#details"))
            .await
            .unwrap();

        assert_eq!(window.href(), "https://app.test/signup/#details");
        assert_eq!(
            *seen.lock(),
            vec![
                "start https://app.test/signup/#details",
                "raw https://app.test/signup/#details",
                "complete https://app.test/signup/#details",
            ]
        );
    }

    #[tokio::test]
    async fn test_aborted_navigation_keeps_location() {
        let window = MemoryWindow::new("https://app.test/signup/#intro");
        let router = MemoryRouter::new(window.clone());
        router
            .events()
            .on_hash_change_start(|_| Err(NavigationError::Cancelled));

        let result = router
            .navigate(NavigationTarget::parse("/signup/#details"))
            .await;

        assert_eq!(result, Err(NavigationError::Cancelled));
        assert_eq!(window.href(), "https://app.test/signup/#intro");
    }

    #[test]
    fn test_visit_hash_only_emits_raw_event() {
        let window = MemoryWindow::new("https://app.test/signup/#intro");
        let router = MemoryRouter::new(window.clone());

        let raw = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&raw);
        router.events().on_hash_change(move |change| {
            *slot.lock() = Some(change.clone());
        });

        router.visit_hash("#confirm");
        assert_eq!(window.href(), "https://app.test/signup/#confirm");
        assert_eq!(
            raw.lock().as_ref().map(|c| c.old_url.as_str()),
            Some("https://app.test/signup/#intro")
        );
    }
}
