//! Rendering backends.
//!
//! A [`RenderBackend`] turns a URL into PDF bytes. The HTTP layer only sees
//! this trait, so the browser provider is chosen once at startup and can be
//! replaced in tests.
//!
//! # Available Backends
//!
//! | Backend | [`BackendKind`] | Browser |
//! |---------|-----------------|---------|
//! | [`BrowserBackend<LocalChromeFactory>`] | `local` | Headless Chrome launched per request |
//! | [`BrowserBackend<RemoteChromeFactory>`] | `remote` | Hosted browser reached over WebSocket |
//! | [`HostedPdfBackend`] | `hosted` | Hosted `/pdf` endpoint (feature `hosted-backend`) |
//!
//! # Example
//!
//! ```rust,ignore
//! use page2pdf_api::{ConverterConfig, backend::backend_from_config};
//!
//! let backend = backend_from_config(&ConverterConfig::default())?;
//! println!("Rendering with the {} backend", backend.name());
//! ```

mod browser;
mod chrome;
#[cfg(feature = "hosted-backend")]
mod hosted;

pub use browser::{BrowserBackend, BrowserSettings};
pub use chrome::{
    ChromeSession, LocalChromeFactory, PASSWORD_FIELD_SELECTOR, RemoteChromeFactory, WINDOW_SIZE,
    create_chrome_options, endpoint_with_token,
};
#[cfg(feature = "hosted-backend")]
pub use hosted::{HostedPdfBackend, error_for_status};

use std::sync::Arc;

use crate::config::{BackendKind, ConverterConfig};
use crate::error::Result;
use crate::page::PdfRenderOptions;

/// Produces a PDF from a URL.
///
/// Implementations block the calling thread for the whole conversion; async
/// callers run them on a blocking thread.
pub trait RenderBackend: Send + Sync {
    /// Short name used in logs and the health response.
    fn name(&self) -> &'static str;

    /// Load `url`, prepare the page and export it with `options`.
    ///
    /// # Errors
    ///
    /// - [`BackendError::BackendUnavailable`](crate::BackendError::BackendUnavailable) if no browser could be acquired
    /// - [`BackendError::Navigation`](crate::BackendError::Navigation) if the page did not load in time
    /// - [`BackendError::Render`](crate::BackendError::Render) if preparing or exporting the page failed
    fn render(&self, url: &str, options: &PdfRenderOptions) -> Result<Vec<u8>> {
        self.render_as(&conversion_id(), url, options)
    }

    /// [`render`](Self::render) with the caller's conversion id, so every log
    /// line of one conversion carries the same id.
    fn render_as(&self, id: &str, url: &str, options: &PdfRenderOptions) -> Result<Vec<u8>>;
}

/// Backend shared by all request handlers.
pub type SharedBackend = Arc<dyn RenderBackend>;

/// Build the backend selected by `config`.
///
/// No browser is contacted here; availability problems surface per request.
///
/// # Errors
///
/// [`BackendError::Configuration`](crate::BackendError::Configuration) if the hosted backend is selected but the
/// crate was built without the `hosted-backend` feature.
pub fn backend_from_config(config: &ConverterConfig) -> Result<SharedBackend> {
    let settings = BrowserSettings::from_config(config);

    let backend: SharedBackend = match config.backend {
        BackendKind::Local => Arc::new(BrowserBackend::new(
            LocalChromeFactory::from_config(config),
            settings,
        )),
        BackendKind::Remote => Arc::new(BrowserBackend::new(
            RemoteChromeFactory::from_config(config),
            settings,
        )),
        #[cfg(feature = "hosted-backend")]
        BackendKind::Hosted => Arc::new(HostedPdfBackend::from_config(config)),
        #[cfg(not(feature = "hosted-backend"))]
        BackendKind::Hosted => {
            return Err(crate::error::BackendError::Configuration(
                "the hosted backend requires the `hosted-backend` feature".to_string(),
            ));
        }
    };

    log::info!("✅ Using {} rendering backend", backend.name());
    Ok(backend)
}

/// Short random id labelling one conversion in logs.
pub(crate) fn conversion_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
