//! Identity provider capability.
//!
//! The session layer never speaks the identity-provider protocol itself. It
//! drives an implementation of [`TokenProvider`] (a Keycloak adapter in the
//! browser, a static token in tools and tests):
//!
//! ```rust,no_run
//! use workmate_session::{ProviderOptions, TokenProvider};
//!
//! struct KeycloakAdapter { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl TokenProvider for KeycloakAdapter {
//!     async fn init(&self, _options: &ProviderOptions) -> workmate_session::Result<bool> {
//!         Ok(true)
//!     }
//!     async fn login(&self, _redirect_target: &str) -> workmate_session::Result<()> {
//!         Ok(())
//!     }
//!     async fn logout(&self, _redirect_target: &str) -> workmate_session::Result<()> {
//!         Ok(())
//!     }
//!     fn token(&self) -> Option<String> {
//!         None
//!     }
//!     async fn refresh(&self, _min_validity_secs: u64) -> workmate_session::Result<bool> {
//!         Ok(false)
//!     }
//! }
//! ```

use crate::config::ProviderOptions;
use crate::error::Result;
use crate::models::Identity;
use log::debug;
use std::sync::{Arc, RwLock};

/// Token source and refresh authority for the session.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync + 'static {
    /// Initialize the provider client. Returns whether a user is authenticated.
    async fn init(&self, options: &ProviderOptions) -> Result<bool>;

    /// Start the provider's login flow. The browser usually leaves the app here.
    async fn login(&self, redirect_target: &str) -> Result<()>;

    /// End the provider session and return to `redirect_target`.
    async fn logout(&self, redirect_target: &str) -> Result<()>;

    /// Current raw access token, if any.
    fn token(&self) -> Option<String>;

    /// Refresh the token if it expires within `min_validity_secs`.
    ///
    /// `Ok(true)` means a new token was issued, `Ok(false)` that the current
    /// one is still valid. An error means the session cannot be kept alive.
    async fn refresh(&self, min_validity_secs: u64) -> Result<bool>;

    /// Claims of the current token.
    ///
    /// The default decodes the JWT payload of [`token`](Self::token).
    fn identity(&self) -> Result<Option<Identity>> {
        self.token().map(|t| Identity::from_token(&t)).transpose()
    }
}

/// A boxed, reference-counted [`TokenProvider`].
pub type ArcTokenProvider = Arc<dyn TokenProvider>;

/// Provider holding a fixed token handed over at construction time.
///
/// Useful for CLI tools, service accounts and local development, where the
/// token was obtained outside the app. It never refreshes; logout drops the token.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Provider with no token (anonymous).
    pub fn none() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn init(&self, _options: &ProviderOptions) -> Result<bool> {
        Ok(self.token().is_some())
    }

    async fn login(&self, redirect_target: &str) -> Result<()> {
        debug!("[SESSION] Static provider has no login flow (target={})", redirect_target);
        Ok(())
    }

    async fn logout(&self, _redirect_target: &str) -> Result<()> {
        if let Ok(mut token) = self.token.write() {
            *token = None;
        }
        Ok(())
    }

    fn token(&self) -> Option<String> {
        self.token.read().map(|t| t.clone()).unwrap_or(None)
    }

    async fn refresh(&self, _min_validity_secs: u64) -> Result<bool> {
        Ok(false)
    }
}
