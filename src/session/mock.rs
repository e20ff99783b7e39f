//! Mock sessions for testing.
//!
//! This module provides [`MockSessionFactory`], which produces in-memory
//! [`MockSession`]s. They need no Chrome installation, follow a scripted
//! [`MockBehavior`], and count every acquisition and release so tests can
//! assert that sessions never leak.
//!
//! # Availability
//!
//! Available in unit tests and with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! page2pdf-api = { version = "0.1", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use page2pdf_api::backend::BrowserBackend;
//! use page2pdf_api::session::mock::{MockBehavior, MockSessionFactory};
//!
//! let factory = MockSessionFactory::with_behavior(MockBehavior {
//!     fail_navigation: Some("net::ERR_CONNECTION_REFUSED".into()),
//!     ..Default::default()
//! });
//! let counters = factory.counters();
//! let backend = BrowserBackend::new(factory, settings);
//!
//! assert!(backend.render("https://example.com", &options).is_err());
//! assert_eq!(counters.closed(), 1);
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{PageSession, SessionFactory};
use crate::error::{BackendError, Result};
use crate::page::{ExpandAction, PageStyleOverride, PdfRenderOptions};

/// Bytes returned by a successful mock export.
pub const MOCK_PDF: &[u8] = b"%PDF-1.7\n% page2pdf mock document\n%%EOF\n";

/// Script controlling how mock sessions behave.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// Fail `open()` with `BackendUnavailable(msg)`.
    pub fail_open: Option<String>,
    /// Fail `navigate()` with `Navigation(msg)`.
    pub fail_navigation: Option<String>,
    /// Fail `find_targets()` with `Render(msg)`.
    pub fail_query: Option<String>,
    /// Fail `inject_style()` with `Render(msg)`.
    pub fail_style: Option<String>,
    /// Fail `print_pdf()` with `Render(msg)`.
    pub fail_print: Option<String>,
    /// Fail `close()` (the release is still counted).
    pub fail_close: bool,
    /// Elements matched by every selector.
    pub targets_per_selector: usize,
    /// Indices whose `apply()` fails.
    pub broken_targets: HashSet<usize>,
    /// Whether the page shows a password field.
    pub password_field: bool,
    /// Time spent inside `navigate()`.
    pub navigation_delay: Duration,
    /// Bytes returned by `print_pdf()`.
    pub pdf: Vec<u8>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            fail_open: None,
            fail_navigation: None,
            fail_query: None,
            fail_style: None,
            fail_print: None,
            fail_close: false,
            targets_per_selector: 2,
            broken_targets: HashSet::new(),
            password_field: false,
            navigation_delay: Duration::ZERO,
            pdf: MOCK_PDF.to_vec(),
        }
    }
}

/// Counters shared by a factory and all sessions it produced.
#[derive(Debug, Default)]
pub struct MockCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    applied: AtomicUsize,
    failed_applies: AtomicUsize,
    passwords_submitted: AtomicUsize,
    styles_injected: AtomicUsize,
    prints: AtomicUsize,
    navigated: Mutex<Vec<String>>,
}

impl MockCounters {
    /// Sessions acquired.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Sessions released.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Successful expansion actions.
    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    /// Expansion actions that failed.
    pub fn failed_applies(&self) -> usize {
        self.failed_applies.load(Ordering::SeqCst)
    }

    /// Password submissions.
    pub fn passwords_submitted(&self) -> usize {
        self.passwords_submitted.load(Ordering::SeqCst)
    }

    /// Stylesheet injections.
    pub fn styles_injected(&self) -> usize {
        self.styles_injected.load(Ordering::SeqCst)
    }

    /// PDF exports.
    pub fn prints(&self) -> usize {
        self.prints.load(Ordering::SeqCst)
    }

    /// URLs passed to `navigate()`, in order.
    pub fn navigated(&self) -> Vec<String> {
        self.navigated
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

/// Factory producing [`MockSession`]s.
#[derive(Debug, Default)]
pub struct MockSessionFactory {
    behavior: MockBehavior,
    counters: Arc<MockCounters>,
}

impl MockSessionFactory {
    /// Factory whose sessions always succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory following `behavior`.
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            counters: Arc::new(MockCounters::default()),
        }
    }

    /// Factory whose `open()` always fails.
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::with_behavior(MockBehavior {
            fail_open: Some(message.into()),
            ..Default::default()
        })
    }

    /// Shared counters, usable after the factory moved into a backend.
    pub fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }

    /// Sessions acquired so far.
    pub fn opened_count(&self) -> usize {
        self.counters.opened()
    }

    /// Sessions released so far.
    pub fn closed_count(&self) -> usize {
        self.counters.closed()
    }
}

impl SessionFactory for MockSessionFactory {
    type Session = MockSession;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn open(&self) -> Result<MockSession> {
        if let Some(msg) = &self.behavior.fail_open {
            log::debug!("MockSessionFactory: Returning configured open failure");
            return Err(BackendError::BackendUnavailable(msg.clone()));
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            behavior: self.behavior.clone(),
            counters: Arc::clone(&self.counters),
        })
    }
}

/// Element handle produced by [`MockSession::find_targets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTarget {
    /// Selector that matched.
    pub selector: String,
    /// Position among the matches.
    pub index: usize,
}

/// In-memory session following a [`MockBehavior`].
#[derive(Debug)]
pub struct MockSession {
    behavior: MockBehavior,
    counters: Arc<MockCounters>,
}

impl PageSession for MockSession {
    type Target<'a> = MockTarget;

    fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        if let Ok(mut urls) = self.counters.navigated.lock() {
            urls.push(url.to_string());
        }

        if !self.behavior.navigation_delay.is_zero() {
            std::thread::sleep(self.behavior.navigation_delay.min(timeout));
            if self.behavior.navigation_delay > timeout {
                return Err(BackendError::Navigation(format!(
                    "timed out after {:?} waiting for network idle",
                    timeout
                )));
            }
        }

        match &self.behavior.fail_navigation {
            Some(msg) => Err(BackendError::Navigation(msg.clone())),
            None => Ok(()),
        }
    }

    fn submit_password(&self, _password: &str, _timeout: Duration) -> Result<bool> {
        if !self.behavior.password_field {
            return Ok(false);
        }
        self.counters.passwords_submitted.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn find_targets(&self, selector: &str) -> Result<Vec<MockTarget>> {
        if let Some(msg) = &self.behavior.fail_query {
            return Err(BackendError::Render(msg.clone()));
        }

        Ok((0..self.behavior.targets_per_selector)
            .map(|index| MockTarget {
                selector: selector.to_string(),
                index,
            })
            .collect())
    }

    fn apply(&self, target: &MockTarget, action: ExpandAction) -> Result<()> {
        if self.behavior.broken_targets.contains(&target.index) {
            self.counters.failed_applies.fetch_add(1, Ordering::SeqCst);
            return Err(BackendError::Render(format!(
                "{:?} failed on '{}' #{}: element is not clickable",
                action, target.selector, target.index
            )));
        }

        self.counters.applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn inject_style(&self, _style: &PageStyleOverride) -> Result<()> {
        if let Some(msg) = &self.behavior.fail_style {
            return Err(BackendError::Render(msg.clone()));
        }
        self.counters.styles_injected.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn print_pdf(&self, _options: &PdfRenderOptions) -> Result<Vec<u8>> {
        if let Some(msg) = &self.behavior.fail_print {
            return Err(BackendError::Render(msg.clone()));
        }
        self.counters.prints.fetch_add(1, Ordering::SeqCst);
        Ok(self.behavior.pdf.clone())
    }

    fn close(self) -> Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        if self.behavior.fail_close {
            return Err(BackendError::Render("connection already closed".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_factory_counts_sessions() {
        let factory = MockSessionFactory::new();

        let a = factory.open().unwrap();
        let b = factory.open().unwrap();
        assert_eq!(factory.opened_count(), 2);

        a.close().unwrap();
        b.close().unwrap();
        assert_eq!(factory.closed_count(), 2);
    }

    #[test]
    fn test_mock_factory_unavailable() {
        let factory = MockSessionFactory::unavailable("chrome not installed");

        match factory.open() {
            Err(BackendError::BackendUnavailable(msg)) => {
                assert_eq!(msg, "chrome not installed")
            }
            other => panic!("Expected BackendUnavailable, got {:?}", other.map(|_| ())),
        }
        assert_eq!(factory.opened_count(), 0);
    }

    #[test]
    fn test_mock_session_broken_targets() {
        let factory = MockSessionFactory::with_behavior(MockBehavior {
            targets_per_selector: 3,
            broken_targets: HashSet::from([1]),
            ..Default::default()
        });
        let session = factory.open().unwrap();

        let targets = session.find_targets(".collapsed").unwrap();
        assert_eq!(targets.len(), 3);
        assert!(session.apply(&targets[0], ExpandAction::Click).is_ok());
        assert!(session.apply(&targets[1], ExpandAction::Click).is_err());
        assert!(session.apply(&targets[2], ExpandAction::Click).is_ok());
    }

    #[test]
    fn test_mock_session_records_navigation() {
        let factory = MockSessionFactory::new();
        let counters = factory.counters();
        let session = factory.open().unwrap();

        session
            .navigate("https://example.com/docs", Duration::from_secs(1))
            .unwrap();

        assert_eq!(counters.navigated(), vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_mock_session_navigation_timeout() {
        let factory = MockSessionFactory::with_behavior(MockBehavior {
            navigation_delay: Duration::from_millis(50),
            ..Default::default()
        });
        let session = factory.open().unwrap();

        let result = session.navigate("https://slow.example.com", Duration::from_millis(10));
        assert!(matches!(result, Err(BackendError::Navigation(_))));
    }

    #[test]
    fn test_mock_pdf_has_signature() {
        assert!(MOCK_PDF.starts_with(b"%PDF-"));
    }
}
