//! Shared session context.
//!
//! Bundles the store with the collaborators every component needs. The
//! controller, gateway and reconciler each hold a clone; all fields are
//! reference-counted so clones share the same state.

use crate::config::SessionConfig;
use crate::controller::SessionState;
use crate::event_handlers::SessionEvents;
use crate::navigation::ArcNavigator;
use crate::provider::ArcTokenProvider;
use crate::store::SessionStore;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct SessionContext {
    pub store: SessionStore,
    pub provider: ArcTokenProvider,
    pub navigator: ArcNavigator,
    pub config: Arc<SessionConfig>,
    pub events: SessionEvents,
    pub(crate) state: Arc<watch::Sender<SessionState>>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("events", &self.events)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    pub fn new(
        config: SessionConfig,
        provider: ArcTokenProvider,
        navigator: ArcNavigator,
        events: SessionEvents,
    ) -> Self {
        let store = SessionStore::new(config.roles.clone());
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            store,
            provider,
            navigator,
            config: Arc::new(config),
            events,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub(crate) fn set_state(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                debug!("[SESSION] State {} -> {}", current, next);
                *current = next;
                true
            }
        });
    }

    /// Request a navigation and notify the `on_redirect` hook.
    pub fn redirect(&self, path: &str) {
        info!("[SESSION] Redirecting to {}", path);
        self.navigator.redirect_to(path);
        self.events.emit_redirect(path);
    }

    /// End the provider session and drop identity and profile.
    ///
    /// The store is cleared even when the provider call fails.
    pub async fn force_logout(&self) {
        let target = &self.config.routes.logout_redirect;
        if let Err(e) = self.provider.logout(target).await {
            warn!("[SESSION] Provider logout failed: {}", e);
        }
        self.store.clear();
        self.set_state(SessionState::LoggedOut);
        info!("[SESSION] Session cleared");
        self.events.emit_logout();
    }
}
