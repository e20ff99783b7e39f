//! Error types for rendering backends.
//!
//! This module provides [`BackendError`], the error type returned by every
//! [`RenderBackend`](crate::backend::RenderBackend) and
//! [`PageSession`](crate::session::PageSession), and a convenient [`Result`]
//! type alias.
//!
//! Backend errors are mapped onto the HTTP-facing taxonomy by
//! [`PdfServiceError`](crate::service::PdfServiceError).
//!
//! # Example
//!
//! ```rust
//! use page2pdf_api::{BackendError, Result};
//!
//! fn render() -> Result<Vec<u8>> {
//!     Err(BackendError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()))
//! }
//!
//! match render() {
//!     Ok(pdf) => println!("Generated {} bytes", pdf.len()),
//!     Err(BackendError::BackendUnavailable(msg)) => eprintln!("No backend: {}", msg),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

/// Errors that can occur while a backend renders a page.
///
/// Each variant corresponds to the stage of the conversion procedure that
/// failed. None of them are retried.
///
/// # Example
///
/// ```rust
/// use page2pdf_api::BackendError;
///
/// fn describe(error: &BackendError) -> &'static str {
///     match error {
///         BackendError::BackendUnavailable(_) => "could not acquire a browser session",
///         BackendError::Navigation(_) => "the page did not load",
///         BackendError::Render(_) => "the loaded page could not be exported",
///         BackendError::Configuration(_) => "the backend is misconfigured",
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// No browser session could be acquired.
    ///
    /// # Common Causes
    ///
    /// - Chrome/Chromium binary not found or failed to launch
    /// - Remote browser endpoint unreachable or refusing the connection
    /// - Missing access token for a hosted backend
    ///
    /// # Example
    ///
    /// ```rust
    /// use page2pdf_api::BackendError;
    ///
    /// let error = BackendError::BackendUnavailable("BROWSERLESS_TOKEN is not set".to_string());
    /// assert_eq!(error.to_string(), "Backend unavailable: BROWSERLESS_TOKEN is not set");
    /// ```
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The target page could not be loaded.
    ///
    /// Covers DNS and connection errors, the navigation timeout, never
    /// reaching network idle, and a failed site-gate login.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The page loaded but could not be prepared or exported.
    ///
    /// Covers DOM-expansion setup, stylesheet injection and PDF export
    /// failures, and payloads that are not PDFs.
    #[error("Render failed: {0}")]
    Render(String),

    /// Invalid backend configuration.
    ///
    /// # Common Causes
    ///
    /// - Unparseable endpoint URL
    /// - Chrome launch options rejected
    /// - Zero-length timeouts
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Convenience conversion from [`String`] to [`BackendError::Configuration`].
///
/// # Example
///
/// ```rust
/// use page2pdf_api::BackendError;
///
/// let error: BackendError = "invalid endpoint".to_string().into();
/// assert!(matches!(error, BackendError::Configuration(_)));
/// ```
impl From<String> for BackendError {
    fn from(msg: String) -> Self {
        BackendError::Configuration(msg)
    }
}

/// Convenience conversion from `&str` to [`BackendError::Configuration`].
impl From<&str> for BackendError {
    fn from(msg: &str) -> Self {
        BackendError::Configuration(msg.to_string())
    }
}

/// Result type alias using [`BackendError`].
pub type Result<T> = std::result::Result<T, BackendError>;

// ============================================================================
// Unit Tests
// ============================================================================
