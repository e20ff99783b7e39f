//! Network-idle detection.
//!
//! The DevTools protocol has no single "network idle" event. Browser sessions
//! follow `Network.requestWillBeSent` / `loadingFinished` / `loadingFailed`
//! into an [`InFlightRequests`] set and poll `document.readyState`. The page
//! counts as idle once it is fully loaded and no more than
//! [`MAX_IDLE_CONNECTIONS`] requests have been in flight for
//! [`NETWORK_IDLE_WINDOW`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Quiet period after which the network is considered idle.
pub const NETWORK_IDLE_WINDOW: Duration = Duration::from_millis(500);

/// Interval between page polls.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// In-flight requests still tolerated by an idle page.
pub const MAX_IDLE_CONNECTIONS: usize = 2;

/// Expression evaluated in the page on each poll; `true` once the document
/// has finished loading.
pub const DOCUMENT_READY_SCRIPT: &str = "document.readyState === 'complete'";

/// Request ids the page has sent but not yet finished.
///
/// Cloning shares the set, so one clone can live in a DevTools event
/// listener while the session polls another. Redirects reuse their request
/// id and are counted once.
///
/// ```rust
/// use page2pdf_api::page::InFlightRequests;
///
/// let requests = InFlightRequests::new();
/// let listener = requests.clone();
///
/// listener.started("1");
/// listener.started("2");
/// listener.finished("1");
/// assert_eq!(requests.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InFlightRequests {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlightRequests {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request leaving the page.
    pub fn started(&self, request_id: &str) {
        self.ids().insert(request_id.to_string());
    }

    /// Record a request finishing or failing.
    pub fn finished(&self, request_id: &str) {
        self.ids().remove(request_id);
    }

    /// Forget every request, e.g. before a new navigation.
    pub fn clear(&self) {
        self.ids().clear();
    }

    /// Number of requests in flight.
    pub fn count(&self) -> usize {
        self.ids().len()
    }

    fn ids(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a listener panicked mid-update.
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Tracks poll results until the page settles.
///
/// Each observation is `None` while the document is still loading, otherwise
/// the number of requests in flight.
///
/// # Example
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use page2pdf_api::page::IdleTracker;
///
/// let start = Instant::now();
/// let mut tracker = IdleTracker::new(Duration::from_millis(500), 2);
///
/// assert!(!tracker.observe(None, start));                               // still loading
/// assert!(!tracker.observe(Some(6), start + Duration::from_millis(100))); // busy
/// assert!(!tracker.observe(Some(1), start + Duration::from_millis(200))); // quiet
/// assert!(tracker.observe(Some(2), start + Duration::from_millis(700)));  // quiet for 500ms
/// ```
#[derive(Debug, Clone)]
pub struct IdleTracker {
    window: Duration,
    max_in_flight: usize,
    quiet_since: Option<Instant>,
}

impl IdleTracker {
    /// Create a tracker requiring `window` with at most `max_in_flight`
    /// requests outstanding.
    pub fn new(window: Duration, max_in_flight: usize) -> Self {
        Self {
            window,
            max_in_flight,
            quiet_since: None,
        }
    }

    /// Record a poll taken at `now`; returns `true` once idle.
    ///
    /// A loading document or more than `max_in_flight` requests resets the
    /// quiet period.
    pub fn observe(&mut self, in_flight: Option<usize>, now: Instant) -> bool {
        match in_flight {
            Some(count) if count <= self.max_in_flight => {
                let since = *self.quiet_since.get_or_insert(now);
                now.duration_since(since) >= self.window
            }
            _ => {
                self.quiet_since = None;
                false
            }
        }
    }
}

impl Default for IdleTracker {
    fn default() -> Self {
        Self::new(NETWORK_IDLE_WINDOW, MAX_IDLE_CONNECTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    #[test]
    fn test_loading_document_is_never_idle() {
        let start = Instant::now();
        let mut tracker = IdleTracker::default();

        for ms in (0..5000).step_by(100) {
            assert!(!tracker.observe(None, at(start, ms)));
        }
    }

    #[test]
    fn test_idle_after_quiet_window() {
        let start = Instant::now();
        let mut tracker = IdleTracker::default();

        assert!(!tracker.observe(Some(0), at(start, 0)));
        assert!(!tracker.observe(Some(0), at(start, 400)));
        assert!(tracker.observe(Some(0), at(start, 500)));
    }

    #[test]
    fn test_two_long_lived_requests_still_idle() {
        let start = Instant::now();
        let mut tracker = IdleTracker::default();

        assert!(!tracker.observe(Some(2), at(start, 0)));
        assert!(tracker.observe(Some(2), at(start, 600)));
    }

    #[test]
    fn test_busy_network_is_never_idle() {
        let start = Instant::now();
        let mut tracker = IdleTracker::default();

        // Requests still outstanding keep the page busy regardless of how
        // long nothing new has started.
        for ms in (0..5000).step_by(100) {
            assert!(!tracker.observe(Some(3), at(start, ms)));
        }
    }

    #[test]
    fn test_burst_of_requests_resets_window() {
        let start = Instant::now();
        let mut tracker = IdleTracker::default();

        assert!(!tracker.observe(Some(1), at(start, 0)));
        assert!(!tracker.observe(Some(5), at(start, 450)));
        assert!(!tracker.observe(Some(0), at(start, 500)));
        assert!(!tracker.observe(Some(0), at(start, 900)));
        assert!(tracker.observe(Some(0), at(start, 1000)));
    }

    #[test]
    fn test_navigation_back_to_loading_resets() {
        let start = Instant::now();
        let mut tracker = IdleTracker::default();

        assert!(!tracker.observe(Some(0), at(start, 0)));
        assert!(!tracker.observe(None, at(start, 300)));
        assert!(!tracker.observe(Some(0), at(start, 600)));
        assert!(!tracker.observe(Some(0), at(start, 1000)));
        assert!(tracker.observe(Some(0), at(start, 1100)));
    }

    #[test]
    fn test_in_flight_requests_follow_events() {
        let requests = InFlightRequests::new();
        let listener = requests.clone();

        for id in 0..300 {
            listener.started(&id.to_string());
        }
        assert_eq!(requests.count(), 300);

        // A redirect reuses the id of the original request.
        listener.started("7");
        assert_eq!(requests.count(), 300);

        for id in 0..299 {
            listener.finished(&id.to_string());
        }
        assert_eq!(requests.count(), 1);

        listener.finished("unknown");
        assert_eq!(requests.count(), 1);

        requests.clear();
        assert_eq!(listener.count(), 0);
    }

    #[test]
    fn test_slow_request_blocks_idle_until_finished() {
        let start = Instant::now();
        let requests = InFlightRequests::new();
        let mut tracker = IdleTracker::default();

        for id in ["doc", "xhr-1", "xhr-2", "xhr-slow"] {
            requests.started(id);
        }
        requests.finished("doc");

        assert!(!tracker.observe(Some(requests.count()), at(start, 0)));
        assert!(!tracker.observe(Some(requests.count()), at(start, 2000)));

        requests.finished("xhr-slow");
        assert!(!tracker.observe(Some(requests.count()), at(start, 2100)));
        assert!(tracker.observe(Some(requests.count()), at(start, 2600)));
    }
}
