//! Core conversion logic.
//!
//! Framework-agnostic and blocking: integrations run [`convert`] on a
//! blocking thread under the request deadline.
//!
//! # Flow
//!
//! ```text
//! ConversionRequest
//!        │
//!        ▼
//! ┌──────────────┐  missing/blank  ┌───────────────────────┐
//! │ validate_url │ ──────────────► │ 400 MissingParameter  │
//! └──────┬───────┘  unparsable     │ 500 NavigationFailure │
//!        │          ─────────────► └───────────────────────┘
//!        ▼
//! ┌──────────────────────┐
//! │ RenderBackend.render │ ──► BackendError ──► PdfServiceError (500)
//! └──────┬───────────────┘
//!        ▼
//! ┌──────────────┐  no %PDF- header
//! │ validate_pdf │ ──────────────► 500 RenderFailure
//! └──────┬───────┘
//!        ▼
//!   PdfResponse
//! ```

use std::time::Instant;

use crate::backend::{RenderBackend, conversion_id};
use crate::page::PdfRenderOptions;
use crate::service::types::{ConversionRequest, PdfResponse, PdfServiceError};

/// Leading bytes of every PDF document.
pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Convert the page named by `request` with `backend`.
///
/// This function blocks for the whole conversion. Call it from
/// `spawn_blocking` or `web::block` in async contexts.
///
/// # Errors
///
/// - [`PdfServiceError::MissingParameter`] if `url` is missing or blank
///   (no browser work is done)
/// - [`PdfServiceError::NavigationFailure`] if the URL is invalid or the page
///   could not be loaded
/// - [`PdfServiceError::RenderFailure`] if preparing or exporting failed, or
///   the output is not a PDF
/// - [`PdfServiceError::BackendUnavailable`] if no browser could be acquired
///
/// # Example
///
/// ```rust,ignore
/// use page2pdf_api::service::{ConversionRequest, convert};
///
/// let response = convert(backend.as_ref(), &ConversionRequest::new("https://example.com"))?;
/// assert!(response.data.starts_with(b"%PDF-"));
/// ```
pub fn convert(
    backend: &dyn RenderBackend,
    request: &ConversionRequest,
) -> Result<PdfResponse, PdfServiceError> {
    let target = request.target().ok_or_else(|| {
        log::debug!("Rejecting request without url");
        PdfServiceError::MissingParameter
    })?;
    let url = validate_url(target)?;

    let id = conversion_id();
    let start = Instant::now();
    log::info!(
        "[{}] Converting {} with {} backend",
        id,
        truncate_url(&url, 100),
        backend.name()
    );

    let data = backend
        .render_as(&id, &url, &PdfRenderOptions::default())
        .map_err(|e| {
            log::error!("[{}] ❌ Conversion failed after {:?}: {}", id, start.elapsed(), e);
            PdfServiceError::from(e)
        })?;

    validate_pdf(&data)?;

    log::info!(
        "[{}] ✅ Converted in {:?} ({} bytes)",
        id,
        start.elapsed(),
        data.len()
    );
    Ok(PdfResponse::new(data))
}

/// Parse `url` and require an `http` or `https` scheme.
///
/// Returns the normalized URL.
///
/// # Examples
///
/// ```rust
/// use page2pdf_api::service::validate_url;
///
/// assert!(validate_url("https://example.com/docs").is_ok());
/// assert!(validate_url("example.com").is_err());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url: &str) -> Result<String, PdfServiceError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(PdfServiceError::MissingParameter);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| {
        log::debug!("URL validation failed for '{}': {}", trimmed, e);
        PdfServiceError::NavigationFailure(format!("Invalid URL: {}", e))
    })?;

    match parsed.scheme() {
        "http" | "https" => {
            log::trace!("URL validated successfully: {}", parsed);
            Ok(parsed.to_string())
        }
        scheme => {
            log::debug!("URL validation failed for '{}': scheme {}", trimmed, scheme);
            Err(PdfServiceError::NavigationFailure(format!(
                "Invalid URL: unsupported scheme '{}'",
                scheme
            )))
        }
    }
}

/// Require `data` to start with the PDF signature.
pub fn validate_pdf(data: &[u8]) -> Result<(), PdfServiceError> {
    if data.starts_with(PDF_SIGNATURE) {
        Ok(())
    } else {
        Err(PdfServiceError::RenderFailure(format!(
            "renderer returned {} bytes that are not a PDF document",
            data.len()
        )))
    }
}

/// Truncate a URL for log output.
fn truncate_url(url: &str, max_len: usize) -> String {
    match url.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_string(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
