//! # page2pdf-api
//!
//! Convert live web pages into print-styled PDF documents with every
//! collapsed section expanded.
//!
//! A request names a URL; the service loads it in headless Chrome (launched
//! locally or hosted), waits for the network to go idle, opens accordions and
//! disclosure widgets, injects a print stylesheet and returns an A4 PDF with
//! page-number footers.
//!
//! ## Features
//!
//! - **One browser per request**: sessions are never pooled or shared
//! - **Guaranteed release**: every session is closed exactly once, on
//!   success, failure and panic
//! - **Best-effort expansion**: a broken widget never fails the document
//! - **Pluggable backends**: local Chrome, remote Chrome over WebSocket, or a
//!   hosted `/pdf` endpoint behind one [`RenderBackend`] trait
//! - **Web Framework Integration**: Axum (default) and Actix-web handlers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │   HTTP  GET /pdf?url=...  (Axum / Actix)    │
//! └─────────────────┬───────────────────────────┘
//!                   │ spawn_blocking + deadline
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │   service::convert                          │
//! │   validate url ─► render ─► check %PDF-     │
//! └─────────────────┬───────────────────────────┘
//!                   │ Arc<dyn RenderBackend>
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │   BrowserBackend<F: SessionFactory>         │
//! │   open ─► navigate ─► expand ─► settle ─►   │
//! │   style ─► print ─► release (SessionGuard)  │
//! └─────────────────┬───────────────────────────┘
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │   Headless Chrome (local or remote)         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use page2pdf_api::prelude::*;
//! use page2pdf_api::service::{ConversionRequest, convert};
//!
//! let config = ConverterConfigBuilder::new()
//!     .backend(BackendKind::Local)
//!     .build()?;
//! let backend = backend_from_config(&config)?;
//!
//! let response = convert(backend.as_ref(), &ConversionRequest::new("https://example.com/docs"))?;
//! std::fs::write(&response.filename, &response.data)?;
//! ```
//!
//! ## Environment Configuration
//!
//! With the `env-config` feature, [`config::env::from_env`] reads settings
//! from `app.env` (when present) and the process environment:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PDF_BACKEND` | `local` | `local`, `remote` or `hosted` |
//! | `PDF_NAVIGATION_TIMEOUT_SECONDS` | 30 | Page load limit |
//! | `PDF_SETTLE_DELAY_MS` | 2000 | Delay after expansion |
//! | `PDF_REQUEST_TIMEOUT_SECONDS` | 90 | Whole-request deadline |
//! | `PDF_SHOW_LINK_URLS` | true | Print link targets |
//! | `CHROME_PATH` | auto | Chrome binary for `local` |
//! | `BROWSERLESS_ENDPOINT` | `wss://chrome.browserless.io` | Endpoint for `remote` |
//! | `BROWSERLESS_PDF_ENDPOINT` | `https://chrome.browserless.io/pdf` | Endpoint for `hosted` |
//! | `BROWSERLESS_TOKEN` | none | Access token for `remote`/`hosted` |
//! | `SITE_PASSWORD` | none | Password for gated sites |
//! | `BIND_ADDRESS` | `0.0.0.0:3000` | Listen address of the binary |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `server` | `page2pdf` binary (Axum + env_logger), default |
//! | `hosted-backend` | Hosted `/pdf` endpoint backend, default |
//! | `env-config` | Environment-based configuration |
//! | `axum-integration` | Axum handlers |
//! | `actix-integration` | Actix-web handlers |
//! | `test-utils` | Mock sessions for testing |

#![doc(html_root_url = "https://docs.rs/page2pdf-api/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod backend;
pub mod config;
pub mod error;
pub mod integrations;
pub mod page;
pub mod prelude;
pub mod service;
pub mod session;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

pub use backend::{RenderBackend, SharedBackend, backend_from_config};
pub use config::{BackendKind, ConverterConfig, ConverterConfigBuilder};
pub use error::{BackendError, Result};
pub use integrations::AppState;
pub use page::{PageStyleOverride, PdfRenderOptions};
pub use session::{PageSession, SessionFactory, SessionGuard};

#[cfg(feature = "env-config")]
pub use config::env::from_env;
