//! Conversion service module.
//!
//! The **framework-agnostic core** of the HTTP API: request/response types,
//! the error taxonomy with its HTTP mapping, and the blocking [`convert`]
//! entry point reused by every integration.
//!
//! # Module Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       service module                          │
//! │  ┌──────────────────────┐    ┌─────────────────────────────┐  │
//! │  │      types.rs        │    │          pdf.rs             │  │
//! │  │  ConversionRequest   │    │  convert()                  │  │
//! │  │  PdfResponse         │    │  validate_url()             │  │
//! │  │  PdfServiceError     │    │  validate_pdf()             │  │
//! │  │  ErrorResponse       │    │                             │  │
//! │  │  HealthResponse      │    │                             │  │
//! │  └──────────────────────┘    └─────────────────────────────┘  │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 │ used by
//!                                 ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    integrations module                        │
//! │         axum.rs (handlers)        actix.rs (handlers)         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design
//!
//! | Layer | Responsibility |
//! |-------|----------------|
//! | **Service** | Validation, conversion, error mapping |
//! | **Handler** | Blocking offload, deadline, HTTP response building |
//!
//! # Custom Handlers
//!
//! ```rust,ignore
//! use page2pdf_api::service::{self, ConversionRequest, ErrorResponse};
//!
//! let backend = backend.clone();
//! let result = tokio::task::spawn_blocking(move || {
//!     service::convert(backend.as_ref(), &ConversionRequest::new(url))
//! })
//! .await;
//! ```

mod pdf;
mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::{
    ConversionRequest, DEFAULT_FILENAME, ErrorResponse, FAILURE_MESSAGE, HealthResponse,
    MISSING_URL_MESSAGE, PdfResponse, PdfServiceError, SERVICE_NAME,
};

pub use pdf::{PDF_SIGNATURE, convert, validate_pdf, validate_url};
