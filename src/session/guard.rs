//! RAII guard releasing a session exactly once.
//!
//! The conversion procedure calls [`SessionGuard::release`] on its normal
//! exit paths. If the guard is dropped without being released (a panic
//! unwinding through the procedure), [`Drop`] performs the release instead.
//! Release failures are logged and swallowed so they never replace the error
//! being reported for the conversion itself.

use super::PageSession;

/// Owns a [`PageSession`] until it is released.
///
/// # Example
///
/// ```rust,ignore
/// let guard = SessionGuard::new(factory.open()?, "conversion-1");
/// let result = guard.session().print_pdf(&options);
/// guard.release();
/// result
/// ```
pub struct SessionGuard<S: PageSession> {
    session: Option<S>,
    label: String,
}

impl<S: PageSession> SessionGuard<S> {
    /// Take ownership of `session`. `label` identifies it in logs.
    pub fn new<L: Into<String>>(session: S, label: L) -> Self {
        Self {
            session: Some(session),
            label: label.into(),
        }
    }

    /// Borrow the guarded session.
    ///
    /// # Panics
    ///
    /// Never in practice: the session is only taken by `release`, which
    /// consumes the guard.
    pub fn session(&self) -> &S {
        self.session
            .as_ref()
            .expect("session is present until the guard is released")
    }

    /// Release the session now.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(session) = self.session.take() {
            log::trace!("[{}] Releasing browser session", self.label);
            match session.close() {
                Ok(()) => log::debug!("[{}] Browser session released", self.label),
                Err(e) => log::warn!(
                    "[{}] Failed to release browser session (continuing anyway): {}",
                    self.label,
                    e
                ),
            }
        }
    }
}

impl<S: PageSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if self.session.is_some() {
            log::debug!("[{}] Session guard dropped before release", self.label);
            self.release_inner();
        }
    }
}

impl<S: PageSession> std::fmt::Debug for SessionGuard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("label", &self.label)
            .field("released", &self.session.is_none())
            .finish()
    }
}
