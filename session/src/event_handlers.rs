//! Session lifecycle event handlers.
//!
//! Provides callback-based hooks for observing what the session layer does
//! on its own initiative:
//!
//! - [`on_ready`](SessionEvents::on_ready): an `init()` call finished with an authenticated session
//! - [`on_logout`](SessionEvents::on_logout): identity and profile were cleared
//! - [`on_redirect`](SessionEvents::on_redirect): the session requested a navigation
//! - [`on_credential_failure`](SessionEvents::on_credential_failure): a pre-flight
//!   token refresh failed and the session was force-logged-out
//!
//! # Example
//!
//! ```rust
//! use workmate_session::SessionEvents;
//!
//! let events = SessionEvents::new()
//!     .on_ready(|session| {
//!         println!("ready, linked={}", session.is_linked());
//!     })
//!     .on_redirect(|path| {
//!         println!("navigating to {}", path);
//!     });
//! assert!(events.has_any());
//! ```

use crate::error::SessionError;
use crate::store::Session;
use std::fmt;
use std::sync::Arc;

/// Type alias for the on_ready callback.
pub type OnReadyCallback = Arc<dyn Fn(&Session) + Send + Sync>;

/// Type alias for the on_logout callback.
pub type OnLogoutCallback = Arc<dyn Fn() + Send + Sync>;

/// Type alias for the on_redirect callback.
pub type OnRedirectCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Type alias for the on_credential_failure callback.
pub type OnCredentialFailureCallback = Arc<dyn Fn(&SessionError) + Send + Sync>;

/// Session lifecycle event handlers.
///
/// All handlers are optional. Handlers run synchronously on the task that
/// triggered the event, so they should return quickly.
#[derive(Clone, Default)]
pub struct SessionEvents {
    pub(crate) on_ready: Option<OnReadyCallback>,
    pub(crate) on_logout: Option<OnLogoutCallback>,
    pub(crate) on_redirect: Option<OnRedirectCallback>,
    pub(crate) on_credential_failure: Option<OnCredentialFailureCallback>,
}

impl fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEvents")
            .field("on_ready", &self.on_ready.is_some())
            .field("on_logout", &self.on_logout.is_some())
            .field("on_redirect", &self.on_redirect.is_some())
            .field("on_credential_failure", &self.on_credential_failure.is_some())
            .finish()
    }
}

impl SessionEvents {
    /// Create a new empty `SessionEvents` (no callbacks registered).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked each time `init()` reaches the ready state.
    pub fn on_ready(mut self, f: impl Fn(&Session) + Send + Sync + 'static) -> Self {
        self.on_ready = Some(Arc::new(f));
        self
    }

    /// Register a callback invoked after identity and profile are cleared.
    pub fn on_logout(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_logout = Some(Arc::new(f));
        self
    }

    /// Register a callback invoked with the target of every session-initiated redirect.
    pub fn on_redirect(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_redirect = Some(Arc::new(f));
        self
    }

    /// Register a callback invoked when a pre-flight refresh fails.
    pub fn on_credential_failure(
        mut self,
        f: impl Fn(&SessionError) + Send + Sync + 'static,
    ) -> Self {
        self.on_credential_failure = Some(Arc::new(f));
        self
    }

    /// Returns `true` if any handler is registered.
    pub fn has_any(&self) -> bool {
        self.on_ready.is_some()
            || self.on_logout.is_some()
            || self.on_redirect.is_some()
            || self.on_credential_failure.is_some()
    }

    // ---------------------------------------------------------------
    // Internal dispatch helpers
    // ---------------------------------------------------------------

    pub(crate) fn emit_ready(&self, session: &Session) {
        if let Some(cb) = &self.on_ready {
            cb(session);
        }
    }

    pub(crate) fn emit_logout(&self) {
        if let Some(cb) = &self.on_logout {
            cb();
        }
    }

    pub(crate) fn emit_redirect(&self, path: &str) {
        if let Some(cb) = &self.on_redirect {
            cb(path);
        }
    }

    pub(crate) fn emit_credential_failure(&self, error: &SessionError) {
        if let Some(cb) = &self.on_credential_failure {
            cb(error);
        }
    }
}
