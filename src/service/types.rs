//! Shared types for the conversion service.
//!
//! Framework-agnostic types used by every integration. They define the API
//! contract of the conversion endpoint.
//!
//! # Overview
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ConversionRequest`] | Query parameters of `GET /pdf` |
//! | [`PdfResponse`] | Successful conversion result |
//! | [`PdfServiceError`] | Error types with HTTP status mapping |
//! | [`ErrorResponse`] | JSON error body for API clients |
//! | [`HealthResponse`] | Health check body |
//!
//! # Error Handling
//!
//! ```rust
//! use page2pdf_api::service::{ErrorResponse, PdfServiceError};
//!
//! let err = PdfServiceError::NavigationFailure("net::ERR_NAME_NOT_RESOLVED".into());
//! assert_eq!(err.status_code(), 500);
//!
//! let body = ErrorResponse::from(&err);
//! assert_eq!(body.error, "Failed to generate PDF");
//! assert!(body.details.unwrap().contains("ERR_NAME_NOT_RESOLVED"));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Filename announced in `Content-Disposition`.
pub const DEFAULT_FILENAME: &str = "documentation.pdf";

/// Error message returned when `url` is missing.
pub const MISSING_URL_MESSAGE: &str = "Please provide a URL";

/// Error message returned for every conversion failure.
pub const FAILURE_MESSAGE: &str = "Failed to generate PDF";

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "page2pdf-api";

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters of the conversion endpoint.
///
/// ```text
/// GET /pdf?url=https://docs.example.com/guide
/// ```
///
/// `url` is optional at the type level so a missing parameter reaches the
/// handler and gets the documented 400 body instead of a framework error.
///
/// # Example
///
/// ```rust
/// use page2pdf_api::service::ConversionRequest;
///
/// let request = ConversionRequest::new("  https://example.com ");
/// assert_eq!(request.target(), Some("https://example.com"));
///
/// assert_eq!(ConversionRequest::default().target(), None);
/// assert_eq!(ConversionRequest::new("   ").target(), None);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Absolute URL of the page to convert.
    pub url: Option<String>,
}

impl ConversionRequest {
    /// Request for `url`.
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    /// Parse a raw query string, keeping the first `url` value.
    ///
    /// Never fails: repeated, unknown or malformed parameters cannot turn
    /// into a framework rejection, so every error reaches the caller through
    /// [`PdfServiceError`].
    ///
    /// ```rust
    /// use page2pdf_api::service::ConversionRequest;
    ///
    /// let request = ConversionRequest::from_query("url=https%3A%2F%2Fa.example.com&url=b");
    /// assert_eq!(request.target(), Some("https://a.example.com"));
    ///
    /// assert_eq!(ConversionRequest::from_query("").target(), None);
    /// ```
    pub fn from_query(query: &str) -> Self {
        let url = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "url")
            .map(|(_, value)| value.into_owned());
        Self { url }
    }

    /// The trimmed URL, or `None` when missing or blank.
    pub fn target(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// A generated PDF.
///
/// Always served as a download:
///
/// ```text
/// Content-Type: application/pdf
/// Content-Disposition: attachment; filename="documentation.pdf"
/// Cache-Control: no-cache
/// ```
#[derive(Debug, Clone)]
pub struct PdfResponse {
    /// Raw PDF bytes, starting with `%PDF-`.
    pub data: Vec<u8>,

    /// Filename announced to the client.
    pub filename: String,
}

impl PdfResponse {
    /// Response carrying `data` under the default filename.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            filename: DEFAULT_FILENAME.to_string(),
        }
    }

    /// The `Content-Disposition` header value.
    ///
    /// ```rust
    /// use page2pdf_api::service::PdfResponse;
    ///
    /// let response = PdfResponse::new(b"%PDF-1.7".to_vec());
    /// assert_eq!(response.content_disposition(), "attachment; filename=\"documentation.pdf\"");
    /// ```
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// Size of the PDF in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,

    /// Service name.
    pub service: String,

    /// Configured rendering backend.
    pub backend: String,
}

impl HealthResponse {
    /// Healthy status for a service using `backend`.
    pub fn new<S: Into<String>>(backend: S) -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            backend: backend.into(),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors reported by the conversion service.
///
/// | Variant | HTTP | Code |
/// |---------|------|------|
/// | `MissingParameter` | 400 | `MISSING_PARAMETER` |
/// | `NavigationFailure` | 500 | `NAVIGATION_FAILURE` |
/// | `RenderFailure` | 500 | `RENDER_FAILURE` |
/// | `BackendUnavailable` | 500 | `BACKEND_UNAVAILABLE` |
/// | `Timeout` | 500 | `TIMEOUT` |
/// | `Internal` | 500 | `INTERNAL_ERROR` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfServiceError {
    /// The `url` parameter is missing or blank.
    MissingParameter,

    /// The URL is invalid, unreachable, or did not settle in time.
    NavigationFailure(String),

    /// Preparing or exporting the page failed, or the output is not a PDF.
    RenderFailure(String),

    /// No browser could be launched or reached.
    BackendUnavailable(String),

    /// The request deadline passed before the conversion finished.
    Timeout(String),

    /// Unexpected failure (blocking task panicked or was cancelled).
    Internal(String),
}

impl std::fmt::Display for PdfServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParameter => write!(f, "{}", MISSING_URL_MESSAGE),
            Self::NavigationFailure(msg) => write!(f, "Navigation failed: {}", msg),
            Self::RenderFailure(msg) => write!(f, "Render failed: {}", msg),
            Self::BackendUnavailable(msg) => write!(f, "Backend unavailable: {}", msg),
            Self::Timeout(msg) => write!(f, "Operation timeout: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for PdfServiceError {}

impl PdfServiceError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingParameter => 400,
            Self::NavigationFailure(_)
            | Self::RenderFailure(_)
            | Self::BackendUnavailable(_)
            | Self::Timeout(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code, used in logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingParameter => "MISSING_PARAMETER",
            Self::NavigationFailure(_) => "NAVIGATION_FAILURE",
            Self::RenderFailure(_) => "RENDER_FAILURE",
            Self::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<BackendError> for PdfServiceError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::BackendUnavailable(msg) => Self::BackendUnavailable(msg),
            BackendError::Navigation(msg) => Self::NavigationFailure(msg),
            BackendError::Render(msg) => Self::RenderFailure(msg),
            BackendError::Configuration(msg) => Self::BackendUnavailable(msg),
        }
    }
}

/// JSON error body.
///
/// ```json
/// { "error": "Please provide a URL" }
/// { "error": "Failed to generate PDF", "details": "Navigation failed: ..." }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error message.
    pub error: String,

    /// Underlying failure, present on 500 responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&PdfServiceError> for ErrorResponse {
    fn from(err: &PdfServiceError) -> Self {
        match err {
            PdfServiceError::MissingParameter => Self {
                error: MISSING_URL_MESSAGE.to_string(),
                details: None,
            },
            other => Self {
                error: FAILURE_MESSAGE.to_string(),
                details: Some(other.to_string()),
            },
        }
    }
}

impl From<PdfServiceError> for ErrorResponse {
    fn from(err: PdfServiceError) -> Self {
        Self::from(&err)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
