//! Web framework integrations.
//!
//! Ready-made handlers exposing the conversion service over HTTP.
//!
//! # Available Integrations
//!
//! | Framework | Feature Flag | Module |
//! |-----------|--------------|--------|
//! | Axum | `axum-integration` (part of `server`) | `axum` |
//! | Actix-web | `actix-integration` | `actix` |
//!
//! # Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET` | `/pdf?url=...` | PDF download, or JSON error |
//! | `GET` | `/?url=...` | Same as `/pdf` |
//! | `GET` | `/health` | [`HealthResponse`](crate::service::HealthResponse) |
//!
//! # Common Pattern
//!
//! 1. Build a [`ConverterConfig`] (usually with `config::env::from_env()`)
//! 2. Create [`AppState`] from it
//! 3. Mount the integration's routes with that state
//!
//! ```rust,ignore
//! use page2pdf_api::prelude::*;
//!
//! let config = page2pdf_api::config::env::from_env()?;
//! let state = AppState::from_config(&config)?;
//! // Pass `state` to your web framework...
//! ```

#[cfg(feature = "actix-integration")]
pub mod actix;

#[cfg(feature = "axum-integration")]
pub mod axum;

use std::time::Duration;

use crate::backend::{SharedBackend, backend_from_config};
use crate::config::ConverterConfig;
use crate::error::Result;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backend performing conversions.
    pub backend: SharedBackend,

    /// Deadline for one conversion, measured by the handler.
    pub request_timeout: Duration,
}

impl AppState {
    /// State using `backend` with `request_timeout`.
    pub fn new(backend: SharedBackend, request_timeout: Duration) -> Self {
        Self {
            backend,
            request_timeout,
        }
    }

    /// State for the backend selected by `config`.
    pub fn from_config(config: &ConverterConfig) -> Result<Self> {
        Ok(Self::new(backend_from_config(config)?, config.request_timeout))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.backend.name())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
