//! Conversion procedure over a browser session.
//!
//! [`BrowserBackend`] drives any [`SessionFactory`] through the fixed
//! sequence:
//!
//! ```text
//! open session ─► navigate + network idle ─► [site gate] ─► expand content
//!      │                                                          │
//!      │             release session ◄─ export PDF ◄─ inject CSS ◄─ settle
//!      └────────────────────► (released on every exit path)
//! ```
//!
//! The session is held by a [`SessionGuard`] so it is released exactly once
//! on success, on failure, and while unwinding.

use std::time::{Duration, Instant};

use super::RenderBackend;
use crate::config::ConverterConfig;
use crate::error::Result;
use crate::page::{PageStyleOverride, PdfRenderOptions, expand_page};
use crate::session::{PageSession, SessionFactory, SessionGuard};

/// Timing and page-preparation settings shared by browser backends.
#[derive(Clone)]
pub struct BrowserSettings {
    /// Limit for navigation including network idle.
    pub navigation_timeout: Duration,
    /// Grace delay after expansion.
    pub settle_delay: Duration,
    /// Stylesheet injected before export.
    pub style: PageStyleOverride,
    /// Password for gated sites.
    pub site_password: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

impl BrowserSettings {
    /// Settings derived from converter configuration.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            navigation_timeout: config.navigation_timeout,
            settle_delay: config.settle_delay,
            style: PageStyleOverride {
                show_link_urls: config.show_link_urls,
            },
            site_password: config.site_password.clone(),
        }
    }
}

impl std::fmt::Debug for BrowserSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSettings")
            .field("navigation_timeout", &self.navigation_timeout)
            .field("settle_delay", &self.settle_delay)
            .field("style", &self.style)
            .field("site_password", &self.site_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Renders pages through sessions produced by `F`.
///
/// # Example
///
/// ```rust,ignore
/// use page2pdf_api::backend::{BrowserBackend, BrowserSettings, LocalChromeFactory, RenderBackend};
/// use page2pdf_api::page::PdfRenderOptions;
///
/// let backend = BrowserBackend::new(LocalChromeFactory::with_defaults(), BrowserSettings::default());
/// let pdf = backend.render("https://example.com", &PdfRenderOptions::default())?;
/// ```
pub struct BrowserBackend<F: SessionFactory> {
    factory: F,
    settings: BrowserSettings,
}

impl<F: SessionFactory> BrowserBackend<F> {
    /// Create a backend from a session factory and settings.
    pub fn new(factory: F, settings: BrowserSettings) -> Self {
        Self { factory, settings }
    }

    /// The settings in use.
    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    fn run_steps<S: PageSession>(
        &self,
        session: &S,
        url: &str,
        options: &PdfRenderOptions,
        id: &str,
    ) -> Result<Vec<u8>> {
        let timeout = self.settings.navigation_timeout;

        log::debug!("[{}] Loading page", id);
        let nav_start = Instant::now();
        session.navigate(url, timeout).map_err(|e| {
            log::error!("[{}] ❌ Navigation failed: {}", id, e);
            e
        })?;
        log::debug!("[{}] Page loaded in {:?}", id, nav_start.elapsed());

        if let Some(password) = &self.settings.site_password {
            if session.submit_password(password, timeout)? {
                log::info!("[{}] Submitted site password", id);
            } else {
                log::trace!("[{}] No password field on page", id);
            }
        }

        log::debug!("[{}] Expanding collapsed content", id);
        let outcome = expand_page(session).map_err(|e| {
            log::error!("[{}] ❌ Expansion pass failed: {}", id, e);
            e
        })?;
        log::trace!(
            "[{}] Expansion: {} attempted, {} skipped",
            id,
            outcome.attempted,
            outcome.failed
        );

        if !self.settings.settle_delay.is_zero() {
            log::trace!("[{}] Settling for {:?}", id, self.settings.settle_delay);
            std::thread::sleep(self.settings.settle_delay);
        }

        log::debug!("[{}] Adding print styles", id);
        session.inject_style(&self.settings.style).map_err(|e| {
            log::error!("[{}] ❌ Style injection failed: {}", id, e);
            e
        })?;

        log::debug!("[{}] Generating PDF", id);
        let pdf_start = Instant::now();
        let pdf = session.print_pdf(options).map_err(|e| {
            log::error!("[{}] ❌ PDF export failed: {}", id, e);
            e
        })?;
        log::debug!(
            "[{}] PDF exported in {:?} ({} bytes)",
            id,
            pdf_start.elapsed(),
            pdf.len()
        );

        Ok(pdf)
    }
}

impl<F: SessionFactory> RenderBackend for BrowserBackend<F> {
    fn name(&self) -> &'static str {
        self.factory.name()
    }

    fn render_as(&self, id: &str, url: &str, options: &PdfRenderOptions) -> Result<Vec<u8>> {
        let start = Instant::now();

        log::debug!("[{}] Acquiring {} browser session", id, self.factory.name());
        let session = self.factory.open().map_err(|e| {
            log::error!("[{}] ❌ Could not acquire browser session: {}", id, e);
            e
        })?;

        let guard = SessionGuard::new(session, id);
        let result = self.run_steps(guard.session(), url, options, id);
        guard.release();

        log::debug!("[{}] Conversion finished in {:?}", id, start.elapsed());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::session::mock::{MockBehavior, MockCounters, MockSessionFactory};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn fast_settings() -> BrowserSettings {
        BrowserSettings {
            navigation_timeout: Duration::from_secs(1),
            settle_delay: Duration::ZERO,
            style: PageStyleOverride::default(),
            site_password: None,
        }
    }

    fn backend(behavior: MockBehavior) -> (BrowserBackend<MockSessionFactory>, Arc<MockCounters>) {
        let factory = MockSessionFactory::with_behavior(behavior);
        let counters = factory.counters();
        (BrowserBackend::new(factory, fast_settings()), counters)
    }

    #[test]
    fn test_success_runs_every_step_and_releases() {
        let (backend, counters) = backend(MockBehavior::default());

        let pdf = backend
            .render("https://example.com", &PdfRenderOptions::default())
            .unwrap();

        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(counters.navigated(), vec!["https://example.com"]);
        assert_eq!(counters.styles_injected(), 1);
        assert_eq!(counters.prints(), 1);
        assert_eq!(counters.opened(), 1);
        assert_eq!(counters.closed(), 1);
    }

    #[test]
    fn test_navigation_failure_releases_session() {
        let (backend, counters) = backend(MockBehavior {
            fail_navigation: Some("net::ERR_NAME_NOT_RESOLVED".to_string()),
            ..Default::default()
        });

        let result = backend.render("https://unreachable.invalid", &PdfRenderOptions::default());

        assert!(matches!(result, Err(BackendError::Navigation(_))));
        assert_eq!(counters.prints(), 0);
        assert_eq!(counters.closed(), 1);
    }

    #[test]
    fn test_render_failure_releases_session() {
        let (backend, counters) = backend(MockBehavior {
            fail_print: Some("Printing failed".to_string()),
            ..Default::default()
        });

        let result = backend.render("https://example.com", &PdfRenderOptions::default());

        assert!(matches!(result, Err(BackendError::Render(_))));
        assert_eq!(counters.closed(), 1);
    }

    #[test]
    fn test_style_failure_releases_session() {
        let (backend, counters) = backend(MockBehavior {
            fail_style: Some("Execution context was destroyed".to_string()),
            ..Default::default()
        });

        let result = backend.render("https://example.com", &PdfRenderOptions::default());

        assert!(matches!(result, Err(BackendError::Render(_))));
        assert_eq!(counters.prints(), 0);
        assert_eq!(counters.closed(), 1);
    }

    #[test]
    fn test_expansion_query_failure_is_fatal() {
        let (backend, counters) = backend(MockBehavior {
            fail_query: Some("target closed".to_string()),
            ..Default::default()
        });

        let result = backend.render("https://example.com", &PdfRenderOptions::default());

        assert!(matches!(result, Err(BackendError::Render(_))));
        assert_eq!(counters.closed(), 1);
    }

    #[test]
    fn test_broken_expand_control_does_not_abort() {
        let (backend, counters) = backend(MockBehavior {
            targets_per_selector: 4,
            broken_targets: HashSet::from([2]),
            ..Default::default()
        });

        let result = backend.render("https://example.com", &PdfRenderOptions::default());

        assert!(result.is_ok());
        // One broken element per selector, the rest expanded.
        assert_eq!(counters.failed_applies(), 3);
        assert_eq!(counters.applied(), 9);
        assert_eq!(counters.closed(), 1);
    }

    #[test]
    fn test_open_failure_has_nothing_to_release() {
        let factory = MockSessionFactory::unavailable("chrome not found");
        let counters = factory.counters();
        let backend = BrowserBackend::new(factory, fast_settings());

        let result = backend.render("https://example.com", &PdfRenderOptions::default());

        assert!(matches!(result, Err(BackendError::BackendUnavailable(_))));
        assert_eq!(counters.opened(), 0);
        assert_eq!(counters.closed(), 0);
    }

    #[test]
    fn test_site_password_submitted_when_configured() {
        let factory = MockSessionFactory::with_behavior(MockBehavior {
            password_field: true,
            ..Default::default()
        });
        let counters = factory.counters();
        let backend = BrowserBackend::new(
            factory,
            BrowserSettings {
                site_password: Some("from-env".to_string()),
                ..fast_settings()
            },
        );

        backend
            .render("https://gated.example.com", &PdfRenderOptions::default())
            .unwrap();

        assert_eq!(counters.passwords_submitted(), 1);
    }

    #[test]
    fn test_site_password_skipped_without_configuration() {
        let (backend, counters) = backend(MockBehavior {
            password_field: true,
            ..Default::default()
        });

        backend
            .render("https://gated.example.com", &PdfRenderOptions::default())
            .unwrap();

        assert_eq!(counters.passwords_submitted(), 0);
    }

    #[test]
    fn test_release_failure_keeps_original_result() {
        let (backend, counters) = backend(MockBehavior {
            fail_navigation: Some("timeout".to_string()),
            fail_close: true,
            ..Default::default()
        });

        let result = backend.render("https://example.com", &PdfRenderOptions::default());

        match result {
            Err(BackendError::Navigation(msg)) => assert_eq!(msg, "timeout"),
            other => panic!("Expected the navigation error, got {:?}", other),
        }
        assert_eq!(counters.closed(), 1);
    }

    #[test]
    fn test_settings_from_config() {
        let config = crate::ConverterConfigBuilder::new()
            .show_link_urls(false)
            .site_password("pw")
            .build()
            .unwrap();

        let settings = BrowserSettings::from_config(&config);

        assert!(!settings.style.show_link_urls);
        assert_eq!(settings.site_password.as_deref(), Some("pw"));
        assert_eq!(settings.navigation_timeout, Duration::from_secs(30));
        assert!(!format!("{:?}", settings).contains("pw\""));
    }
}
