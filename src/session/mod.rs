//! Browser automation sessions.
//!
//! A session is one browser (or one connection to a remote browser) owned by
//! a single conversion. Sessions are never pooled or shared: each request
//! opens one through a [`SessionFactory`], drives it through the conversion
//! steps, and releases it before returning.
//!
//! # Traits
//!
//! - [`PageSession`] - the operations the conversion procedure needs from a
//!   loaded page
//! - [`SessionFactory`] - how sessions are acquired (launch or connect)
//!
//! # Scoped Release
//!
//! [`SessionGuard`] owns the session for the duration of a conversion and
//! guarantees that [`PageSession::close`] runs exactly once, whether the
//! conversion succeeds, fails, or unwinds.

mod guard;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use guard::SessionGuard;

use std::time::Duration;

use crate::error::Result;
use crate::page::{ExpandAction, PageStyleOverride, PdfRenderOptions};

/// Operations on a page inside an acquired browser session.
///
/// Methods take `&self` so element handles borrowed from the session can be
/// used while the session is queried again. Implementations are driven
/// sequentially by one thread.
pub trait PageSession {
    /// Handle to an element matched by [`find_targets`](Self::find_targets).
    type Target<'a>
    where
        Self: 'a;

    /// Load `url` and wait until the network is idle.
    ///
    /// # Errors
    ///
    /// [`BackendError::Navigation`](crate::BackendError::Navigation) if the
    /// page fails to load or does not settle within `timeout`.
    fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Type `password` into a password field and submit it, if the page
    /// shows one.
    ///
    /// Returns `Ok(false)` when no password field is present.
    fn submit_password(&self, password: &str, timeout: Duration) -> Result<bool>;

    /// All elements currently matching `selector`.
    fn find_targets(&self, selector: &str) -> Result<Vec<Self::Target<'_>>>;

    /// Apply an expansion action to one element.
    fn apply(&self, target: &Self::Target<'_>, action: ExpandAction) -> Result<()>;

    /// Inject the print stylesheet.
    fn inject_style(&self, style: &PageStyleOverride) -> Result<()>;

    /// Export the page.
    fn print_pdf(&self, options: &PdfRenderOptions) -> Result<Vec<u8>>;

    /// Release the session: close the page and terminate the browser process
    /// or connection.
    fn close(self) -> Result<()>;
}

/// Acquires browser sessions.
///
/// Implement this trait to change how browsers are obtained, for example to
/// launch with different flags or connect to another provider.
///
/// # Example
///
/// ```rust,ignore
/// use page2pdf_api::backend::LocalChromeFactory;
/// use page2pdf_api::session::SessionFactory;
///
/// let factory = LocalChromeFactory::with_defaults();
/// let session = factory.open()?;
/// ```
pub trait SessionFactory: Send + Sync {
    /// Session type produced by this factory.
    type Session: PageSession;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Acquire a new session.
    ///
    /// # Errors
    ///
    /// [`BackendError::BackendUnavailable`](crate::BackendError::BackendUnavailable)
    /// if no browser could be launched or reached.
    fn open(&self) -> Result<Self::Session>;
}
