//! Convenient imports for common usage patterns.
//!
//! ```rust,ignore
//! use page2pdf_api::prelude::*;
//! ```
//!
//! This imports:
//!
//! - [`ConverterConfig`] / [`ConverterConfigBuilder`] / [`BackendKind`] - configuration
//! - [`BackendError`] / [`Result`] - backend errors
//! - [`RenderBackend`] / [`SharedBackend`] / [`backend_from_config`] - backends
//! - [`BrowserBackend`] / [`BrowserSettings`] - the browser conversion procedure
//! - [`LocalChromeFactory`] / [`RemoteChromeFactory`] - Chrome session factories
//! - [`PdfRenderOptions`] - PDF layout
//! - [`AppState`] - handler state
//!
//! # Example
//!
//! ```rust,ignore
//! use page2pdf_api::prelude::*;
//!
//! let backend = BrowserBackend::new(
//!     LocalChromeFactory::with_path("/usr/bin/chromium".to_string()),
//!     BrowserSettings::default(),
//! );
//! let pdf = backend.render("https://example.com", &PdfRenderOptions::default())?;
//! ```

pub use crate::AppState;
pub use crate::backend::{
    BrowserBackend, BrowserSettings, LocalChromeFactory, RemoteChromeFactory, RenderBackend,
    SharedBackend, backend_from_config,
};
pub use crate::config::{BackendKind, ConverterConfig, ConverterConfigBuilder};
pub use crate::error::{BackendError, Result};
pub use crate::page::PdfRenderOptions;

#[cfg(feature = "env-config")]
pub use crate::config::env::from_env;

pub use std::sync::Arc;
