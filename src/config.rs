//! Configuration for the page-to-PDF converter.
//!
//! This module provides [`ConverterConfig`] and [`ConverterConfigBuilder`]
//! for choosing the rendering backend and its timing parameters.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use page2pdf_api::{BackendKind, ConverterConfigBuilder};
//!
//! let config = ConverterConfigBuilder::new()
//!     .backend(BackendKind::Remote)
//!     .access_token("secret")
//!     .navigation_timeout(Duration::from_secs(20))
//!     .build()
//!     .expect("Invalid configuration");
//!
//! assert_eq!(config.backend, BackendKind::Remote);
//! ```
//!
//! # Environment Configuration
//!
//! When the `env-config` feature is enabled, configuration can be loaded from
//! environment variables and an optional `app.env` file:
//!
//! ```rust,ignore
//! use page2pdf_api::config::env::from_env;
//!
//! let config = from_env()?;
//! ```
//!
//! See [`mod@env`] module for available environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default hosted browser websocket endpoint.
pub const DEFAULT_REMOTE_ENDPOINT: &str = "wss://chrome.browserless.io";

/// Default hosted PDF-rendering endpoint.
pub const DEFAULT_HOSTED_PDF_ENDPOINT: &str = "https://chrome.browserless.io/pdf";

/// Which browser-automation approach renders pages.
///
/// # Example
///
/// ```rust
/// use page2pdf_api::BackendKind;
///
/// let kind: BackendKind = "hosted".parse().unwrap();
/// assert_eq!(kind, BackendKind::Hosted);
/// assert_eq!(kind.to_string(), "hosted");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Launch a headless Chrome process for each request.
    #[default]
    Local,
    /// Connect to a hosted browser over the DevTools websocket protocol.
    Remote,
    /// Delegate the whole procedure to a hosted PDF-rendering endpoint.
    Hosted,
}

impl BackendKind {
    /// Whether this backend needs an access token to reach its service.
    pub fn requires_token(&self) -> bool {
        !matches!(self, BackendKind::Local)
    }

    /// Lowercase name used in configuration and health responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
            BackendKind::Hosted => "hosted",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "remote" => Ok(BackendKind::Remote),
            "hosted" => Ok(BackendKind::Hosted),
            other => Err(format!(
                "unknown backend '{}' (expected local, remote or hosted)",
                other
            )),
        }
    }
}

/// Configuration for the converter and its backend.
///
/// Use [`ConverterConfigBuilder`] for validation and convenience.
///
/// # Fields Overview
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `backend` | `Local` | Which backend renders pages |
/// | `navigation_timeout` | 30s | Limit for page load + network idle |
/// | `settle_delay` | 2s | Grace delay after expanding content |
/// | `request_timeout` | 90s | Overall HTTP request deadline |
/// | `show_link_urls` | true | Print link targets after external links |
/// | `chrome_path` | auto | Local Chrome binary |
/// | `remote_endpoint` | browserless | CDP websocket endpoint |
/// | `hosted_pdf_endpoint` | browserless | Hosted PDF endpoint |
/// | `access_token` | none | Token for remote/hosted backends |
/// | `site_password` | none | Password for gated sites |
#[derive(Clone)]
pub struct ConverterConfig {
    /// Which backend renders pages.
    pub backend: BackendKind,

    /// Time allowed for navigation, including the wait for network idle.
    ///
    /// # Default
    ///
    /// 30 seconds
    pub navigation_timeout: Duration,

    /// Fixed delay after the DOM expansion pass so client-side animations can
    /// finish before export.
    ///
    /// # Default
    ///
    /// 2 seconds
    pub settle_delay: Duration,

    /// Deadline for a whole HTTP request.
    ///
    /// When it expires the client receives an error, but the blocking render
    /// keeps running until its session is released.
    ///
    /// # Default
    ///
    /// 90 seconds
    pub request_timeout: Duration,

    /// Append ` (href)` after external links in the printed output.
    pub show_link_urls: bool,

    /// Custom Chrome binary for the local backend. `None` auto-detects.
    pub chrome_path: Option<String>,

    /// DevTools websocket endpoint for the remote backend.
    pub remote_endpoint: String,

    /// Endpoint for the hosted PDF backend.
    pub hosted_pdf_endpoint: String,

    /// Access token for the remote and hosted backends.
    pub access_token: Option<String>,

    /// Password typed into a detected password field before rendering.
    pub site_password: Option<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(90),
            show_link_urls: true,
            chrome_path: None,
            remote_endpoint: DEFAULT_REMOTE_ENDPOINT.to_string(),
            hosted_pdf_endpoint: DEFAULT_HOSTED_PDF_ENDPOINT.to_string(),
            access_token: None,
            site_password: None,
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("backend", &self.backend)
            .field("navigation_timeout", &self.navigation_timeout)
            .field("settle_delay", &self.settle_delay)
            .field("request_timeout", &self.request_timeout)
            .field("show_link_urls", &self.show_link_urls)
            .field("chrome_path", &self.chrome_path)
            .field("remote_endpoint", &self.remote_endpoint)
            .field("hosted_pdf_endpoint", &self.hosted_pdf_endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("site_password", &self.site_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Builder for [`ConverterConfig`] with validation.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use page2pdf_api::ConverterConfigBuilder;
///
/// let config = ConverterConfigBuilder::new()
///     .settle_delay(Duration::from_millis(500))
///     .show_link_urls(false)
///     .build()
///     .expect("Invalid configuration");
///
/// assert!(!config.show_link_urls);
/// ```
///
/// # Validation
///
/// The [`build()`](Self::build) method validates:
/// - timeouts are non-zero
/// - `navigation_timeout` and `settle_delay` fit inside `request_timeout`
/// - endpoints are absolute URLs with a matching scheme
/// - a site password is not combined with the hosted backend
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: ConverterConfig::default(),
        }
    }

    /// Select the rendering backend.
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the navigation timeout.
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.config.navigation_timeout = timeout;
        self
    }

    /// Set the post-expansion grace delay. Zero disables it.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Set the overall request deadline.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Enable or disable printing link targets after external links.
    pub fn show_link_urls(mut self, show: bool) -> Self {
        self.config.show_link_urls = show;
        self
    }

    /// Use a specific Chrome binary for the local backend.
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set the DevTools websocket endpoint for the remote backend.
    pub fn remote_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.remote_endpoint = endpoint.into();
        self
    }

    /// Set the hosted PDF endpoint.
    pub fn hosted_pdf_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.hosted_pdf_endpoint = endpoint.into();
        self
    }

    /// Set the access token for remote and hosted backends.
    pub fn access_token<S: Into<String>>(mut self, token: S) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    /// Set the password used to pass a site's login gate.
    pub fn site_password<S: Into<String>>(mut self, password: S) -> Self {
        self.config.site_password = Some(password.into());
        self
    }

    /// Build and validate the configuration.
    ///
    /// A missing access token is not an error here: remote and hosted
    /// backends report it per request as
    /// [`BackendError::BackendUnavailable`](crate::BackendError::BackendUnavailable).
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use page2pdf_api::{BackendKind, ConverterConfigBuilder};
    ///
    /// assert!(ConverterConfigBuilder::new().build().is_ok());
    ///
    /// let config = ConverterConfigBuilder::new()
    ///     .navigation_timeout(Duration::ZERO)
    ///     .build();
    /// assert!(config.is_err());
    ///
    /// let config = ConverterConfigBuilder::new()
    ///     .backend(BackendKind::Hosted)
    ///     .site_password("hunter2")
    ///     .build();
    /// assert!(config.is_err());
    /// ```
    pub fn build(self) -> std::result::Result<ConverterConfig, String> {
        let config = self.config;

        if config.navigation_timeout.is_zero() {
            return Err("navigation_timeout must be greater than 0".to_string());
        }

        if config.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }

        if config.navigation_timeout > config.request_timeout {
            return Err("navigation_timeout cannot exceed request_timeout".to_string());
        }

        if config.settle_delay >= config.request_timeout {
            return Err("settle_delay must be shorter than request_timeout".to_string());
        }

        match config.backend {
            BackendKind::Local => {}
            BackendKind::Remote => {
                validate_endpoint(&config.remote_endpoint, &["ws", "wss"], "remote_endpoint")?;
            }
            BackendKind::Hosted => {
                validate_endpoint(
                    &config.hosted_pdf_endpoint,
                    &["http", "https"],
                    "hosted_pdf_endpoint",
                )?;
                if config.site_password.is_some() {
                    return Err(
                        "site_password is not supported by the hosted backend".to_string()
                    );
                }
            }
        }

        Ok(config)
    }
}

impl Default for ConverterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_endpoint(
    endpoint: &str,
    schemes: &[&str],
    field: &str,
) -> std::result::Result<(), String> {
    let parsed =
        url::Url::parse(endpoint).map_err(|e| format!("{} is not a valid URL: {}", field, e))?;

    if !schemes.contains(&parsed.scheme()) {
        return Err(format!(
            "{} must use one of the schemes {:?}, got '{}'",
            field,
            schemes,
            parsed.scheme()
        ));
    }

    Ok(())
}

// ============================================================================
// Environment Configuration (feature-gated)
// ============================================================================

/// Environment-based configuration loading.
///
/// This module is only available when the `env-config` feature is enabled.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `PDF_BACKEND` | `local`/`remote`/`hosted` | `local` | Rendering backend |
/// | `PDF_NAVIGATION_TIMEOUT_SECONDS` | u64 | 30 | Navigation timeout |
/// | `PDF_SETTLE_DELAY_MS` | u64 | 2000 | Post-expansion delay |
/// | `PDF_REQUEST_TIMEOUT_SECONDS` | u64 | 90 | Request deadline |
/// | `PDF_SHOW_LINK_URLS` | bool | true | Print link targets |
/// | `CHROME_PATH` | String | auto | Custom Chrome binary path |
/// | `BROWSERLESS_ENDPOINT` | String | `wss://chrome.browserless.io` | Remote CDP endpoint |
/// | `BROWSERLESS_PDF_ENDPOINT` | String | `https://chrome.browserless.io/pdf` | Hosted PDF endpoint |
/// | `BROWSERLESS_TOKEN` | String | none | Access token |
/// | `SITE_PASSWORD` | String | none | Site gate password |
/// | `BIND_ADDRESS` | String | `0.0.0.0:3000` | Server listen address |
///
/// # Example `app.env` File
///
/// ```text
/// PDF_BACKEND=remote
/// BROWSERLESS_TOKEN=your-token
/// PDF_NAVIGATION_TIMEOUT_SECONDS=30
/// ```
#[cfg(feature = "env-config")]
pub mod env {
    use super::*;
    use crate::error::BackendError;

    /// Default environment file name.
    pub const ENV_FILE_NAME: &str = "app.env";

    /// Default listen address for the server binary.
    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

    /// Load environment variables from `app.env` file.
    pub fn load_env_file() -> std::result::Result<std::path::PathBuf, dotenvy::Error> {
        dotenvy::from_filename(ENV_FILE_NAME)
    }

    /// Load configuration from environment variables.
    ///
    /// Also loads `app.env` if present. Unparseable numeric values fall back
    /// to their defaults; an unknown `PDF_BACKEND` is an error.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Configuration`] if configuration values are invalid.
    pub fn from_env() -> std::result::Result<ConverterConfig, BackendError> {
        match load_env_file() {
            Ok(path) => {
                log::info!("Loaded configuration from: {:?}", path);
            }
            Err(e) => {
                log::debug!(
                    "No {} file found or failed to load: {} (using environment variables and defaults)",
                    ENV_FILE_NAME,
                    e
                );
            }
        }

        let backend = match std::env::var("PDF_BACKEND") {
            Ok(value) => value.parse().map_err(BackendError::Configuration)?,
            Err(_) => BackendKind::default(),
        };

        let navigation_timeout_seconds = parse_var("PDF_NAVIGATION_TIMEOUT_SECONDS", 30u64);
        let settle_delay_ms = parse_var("PDF_SETTLE_DELAY_MS", 2000u64);
        let request_timeout_seconds = parse_var("PDF_REQUEST_TIMEOUT_SECONDS", 90u64);
        let show_link_urls = parse_var("PDF_SHOW_LINK_URLS", true);

        log::info!("Loading converter configuration from environment:");
        log::info!("   - Backend: {}", backend);
        log::info!("   - Navigation timeout: {}s", navigation_timeout_seconds);
        log::info!("   - Settle delay: {}ms", settle_delay_ms);
        log::info!("   - Request timeout: {}s", request_timeout_seconds);
        log::info!("   - Show link URLs: {}", show_link_urls);

        let mut builder = ConverterConfigBuilder::new()
            .backend(backend)
            .navigation_timeout(Duration::from_secs(navigation_timeout_seconds))
            .settle_delay(Duration::from_millis(settle_delay_ms))
            .request_timeout(Duration::from_secs(request_timeout_seconds))
            .show_link_urls(show_link_urls);

        if let Some(path) = chrome_path_from_env() {
            builder = builder.chrome_path(path);
        }
        if let Some(endpoint) = non_empty_var("BROWSERLESS_ENDPOINT") {
            builder = builder.remote_endpoint(endpoint);
        }
        if let Some(endpoint) = non_empty_var("BROWSERLESS_PDF_ENDPOINT") {
            builder = builder.hosted_pdf_endpoint(endpoint);
        }
        if let Some(token) = non_empty_var("BROWSERLESS_TOKEN") {
            builder = builder.access_token(token);
        } else if backend.requires_token() {
            log::warn!(
                "BROWSERLESS_TOKEN is not set; the {} backend will reject every request",
                backend
            );
        }
        if let Some(password) = non_empty_var("SITE_PASSWORD") {
            builder = builder.site_password(password);
        }

        builder.build().map_err(BackendError::Configuration)
    }

    /// Get Chrome path from environment.
    ///
    /// Reads `CHROME_PATH`. Call [`from_env`] or [`load_env_file`] first if
    /// the value lives in `app.env`.
    pub fn chrome_path_from_env() -> Option<String> {
        non_empty_var("CHROME_PATH")
    }

    /// Get the server listen address from `BIND_ADDRESS`.
    pub fn bind_address_from_env() -> String {
        non_empty_var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
    }

    fn non_empty_var(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    fn parse_var<T: FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
