//! Session controller.
//!
//! Owns the session lifecycle:
//!
//! ```text
//! Uninitialized -> Authenticating -> Ready -> LoggedOut
//! ```
//!
//! [`SessionController::init`] acquires the identity (once per tab, guarded by
//! the `ready` latch), reconciles the linked profile on every call, lets the
//! store derive the role flags and finally applies the [`RedirectPolicy`]. Each
//! step awaits the previous one, so no two steps of one `init` interleave.

use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::error::{Result, SessionError};
use crate::event_handlers::SessionEvents;
use crate::gateway::RequestGateway;
use crate::models::Identity;
use crate::navigation::ArcNavigator;
use crate::provider::ArcTokenProvider;
use crate::reconcile::ProfileReconciler;
use crate::redirect::RedirectPolicy;
use crate::roles::RoleFlags;
use crate::store::SessionStore;
use crate::transport::{HttpTransport, ReqwestTransport};
use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Lifecycle state of the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Authenticating,
    Ready,
    LoggedOut,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Authenticating => "authenticating",
            SessionState::Ready => "ready",
            SessionState::LoggedOut => "logged_out",
        };
        write!(f, "{}", s)
    }
}

/// Drives init, login and logout against the shared [`SessionContext`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use workmate_session::{MemoryNavigator, SessionConfig, SessionController, StaticTokenProvider};
///
/// # async fn example() -> workmate_session::Result<()> {
/// let controller = SessionController::builder(SessionConfig::default())
///     .provider(Arc::new(StaticTokenProvider::new("<jwt>")))
///     .navigator(Arc::new(MemoryNavigator::new("/")))
///     .ui_host("ui.workmate.kit.edu")
///     .build()?;
///
/// controller.init().await?;
/// let _refresh = controller.spawn_token_refresh();
/// let employees = controller.gateway().get("/employees").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionController {
    ctx: SessionContext,
    gateway: RequestGateway,
    reconciler: ProfileReconciler,
    policy: RedirectPolicy,
    init_lock: Arc<Mutex<()>>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn builder(config: SessionConfig) -> SessionControllerBuilder {
        SessionControllerBuilder::new(config)
    }

    /// Assemble a controller from an existing context.
    pub fn from_parts(
        ctx: SessionContext,
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
    ) -> Self {
        let gateway = RequestGateway::new(ctx.clone(), transport, base_url);
        let reconciler = ProfileReconciler::new(gateway.clone(), ctx.config.profile.clone());
        let policy = RedirectPolicy::new(ctx.config.routes.clone());
        Self {
            ctx,
            gateway,
            reconciler,
            policy,
            init_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Shared context (store, provider, navigator, config).
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Observable session store.
    pub fn store(&self) -> &SessionStore {
        &self.ctx.store
    }

    /// Authenticated request gateway for application calls.
    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn state(&self) -> SessionState {
        self.ctx.state()
    }

    /// Watch lifecycle state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.ctx.state.subscribe()
    }

    pub fn role_flags(&self) -> RoleFlags {
        self.ctx.store.role_flags()
    }

    /// Bring the session up.
    ///
    /// Returns the resulting state:
    /// - `Ready` once identity, profile and redirect are settled,
    /// - `Uninitialized` when no user is signed in (the provider's login flow
    ///   was started if `login_required`),
    /// - `LoggedOut` when the tab already completed an init and then logged out.
    ///
    /// Only identity acquisition is latched: later calls reuse the stored
    /// identity without touching the provider, but re-fetch the profile and
    /// re-apply the redirect policy.
    pub async fn init(&self) -> Result<SessionState> {
        let _guard = self.init_lock.lock().await;

        let identity = if self.ctx.store.is_ready() {
            match self.ctx.store.identity() {
                Some(identity) => {
                    debug!("[SESSION] Identity already acquired, re-reconciling {}", identity.sub);
                    identity
                },
                None => {
                    debug!("[SESSION] init() after logout, nothing to do");
                    return Ok(SessionState::LoggedOut);
                },
            }
        } else {
            self.ctx.set_state(SessionState::Authenticating);
            let identity = match self.acquire_identity().await {
                Ok(Some(identity)) => identity,
                Ok(None) => {
                    self.ctx.set_state(SessionState::Uninitialized);
                    return Ok(SessionState::Uninitialized);
                },
                Err(e) => {
                    warn!("[SESSION] Identity acquisition failed: {}", e);
                    self.ctx.set_state(SessionState::Uninitialized);
                    return Err(e);
                },
            };

            info!("[SESSION] Authenticated as {}", identity.sub);
            self.ctx.store.set_identity(Some(identity.clone()));
            self.ctx.store.mark_ready();
            identity
        };

        let outcome = self.reconciler.resolve(&identity).await;
        if !self.ctx.store.is_authenticated() {
            // Profile lookup hit a credential failure and logged the session out
            warn!("[SESSION] Session ended during profile lookup");
            return Ok(self.ctx.state());
        }
        self.ctx.store.set_profile(Some(outcome.profile));

        if outcome.auth_redirected {
            // The gateway already sent the user to login or the forbidden page
            info!("[SESSION] Profile lookup was rejected, skipping redirect policy");
        } else {
            let current = self.ctx.navigator.current_path();
            let target = self.policy.evaluate(&current, self.ctx.store.profile().as_ref());
            match target {
                Some(target) if target != current => self.ctx.redirect(&target),
                Some(target) => debug!("[SESSION] Already on {}, no redirect", target),
                None => debug!("[SESSION] Staying on {}", current),
            }
        }

        self.ctx.set_state(SessionState::Ready);
        let session = self.ctx.store.snapshot();
        info!(
            "[SESSION] Ready (linked={}, role={})",
            session.profile.as_ref().map_or(false, |p| p.has_complete_identity()),
            self.ctx.store.role_flags().role
        );
        self.ctx.events.emit_ready(&session);
        Ok(SessionState::Ready)
    }

    async fn acquire_identity(&self) -> Result<Option<Identity>> {
        let options = &self.ctx.config.provider;
        let authenticated = self.ctx.provider.init(options).await?;

        if !authenticated {
            if options.login_required {
                let target = self.ctx.navigator.current_path();
                info!("[SESSION] No active session, starting login (target={})", target);
                self.ctx.provider.login(&target).await?;
            } else {
                debug!("[SESSION] No active session, login not required");
            }
            return Ok(None);
        }

        match self.ctx.provider.identity()? {
            Some(identity) => Ok(Some(identity)),
            None => Err(SessionError::ProviderError(
                "provider reported an authenticated session without a token".into(),
            )),
        }
    }

    /// Start the provider's login flow, returning to the current route.
    ///
    /// Session state is untouched; the next `init` picks the user up.
    pub async fn login(&self) -> Result<()> {
        let target = self.ctx.navigator.current_path();
        info!("[SESSION] Login requested (target={})", target);
        self.ctx.provider.login(&target).await
    }

    /// End the session. The `ready` latch stays set.
    pub async fn logout(&self) -> Result<()> {
        info!("[SESSION] Logout requested");
        let result = self
            .ctx
            .provider
            .logout(&self.ctx.config.routes.logout_redirect)
            .await;
        self.ctx.store.clear();
        self.ctx.set_state(SessionState::LoggedOut);
        self.ctx.events.emit_logout();
        result
    }

    /// Keep the token fresh in the background.
    ///
    /// Every `background_interval_secs` the provider is asked to refresh
    /// tokens expiring within `background_min_validity_secs`. Failures are
    /// logged only. The loop ends on logout, on [`TokenRefreshTask::stop`] or
    /// when the returned handle is dropped.
    pub fn spawn_token_refresh(&self) -> TokenRefreshTask {
        let ctx = self.ctx.clone();
        let handle = tokio::spawn(async move {
            let interval = ctx.config.refresh.background_interval();
            let min_validity = ctx.config.refresh.background_min_validity_secs;
            let mut state_rx = ctx.state.subscribe();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // First tick completes immediately
            ticker.tick().await;
            debug!("[REFRESH] Background refresh every {:?}", interval);

            loop {
                let logged_out = *state_rx.borrow_and_update() == SessionState::LoggedOut;
                if logged_out {
                    info!("[REFRESH] Session logged out, stopping background refresh");
                    break;
                }

                tokio::select! {
                    _ = ticker.tick() => {},
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    },
                }

                if !ctx.store.is_authenticated() {
                    continue;
                }

                match ctx.provider.refresh(min_validity).await {
                    Ok(true) => match ctx.provider.identity() {
                        Ok(Some(identity)) => {
                            debug!("[REFRESH] Token refreshed for {}", identity.sub);
                            ctx.store.set_identity(Some(identity));
                        },
                        Ok(None) => debug!("[REFRESH] Token refreshed"),
                        Err(e) => warn!("[REFRESH] Refreshed token could not be decoded: {}", e),
                    },
                    Ok(false) => debug!("[REFRESH] Token still valid"),
                    Err(e) => warn!("[REFRESH] Background refresh failed: {}", e),
                }
            }
        });

        TokenRefreshTask { handle }
    }
}

/// Handle of the background refresh loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct TokenRefreshTask {
    handle: JoinHandle<()>,
}

impl TokenRefreshTask {
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TokenRefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Builder for [`SessionController`].
pub struct SessionControllerBuilder {
    config: SessionConfig,
    provider: Option<ArcTokenProvider>,
    navigator: Option<ArcNavigator>,
    transport: Option<Arc<dyn HttpTransport>>,
    events: SessionEvents,
    ui_host: Option<String>,
}

impl SessionControllerBuilder {
    fn new(config: SessionConfig) -> Self {
        Self {
            config,
            provider: None,
            navigator: None,
            transport: None,
            events: SessionEvents::new(),
            ui_host: None,
        }
    }

    pub fn provider(mut self, provider: ArcTokenProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn navigator(mut self, navigator: ArcNavigator) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Override the HTTP transport (defaults to [`ReqwestTransport`]).
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = events;
        self
    }

    /// Host the UI is served from, used to derive the API base URL.
    pub fn ui_host(mut self, host: impl Into<String>) -> Self {
        self.ui_host = Some(host.into());
        self
    }

    pub fn build(self) -> Result<SessionController> {
        self.config.validate()?;

        let provider = self
            .provider
            .ok_or_else(|| SessionError::ConfigurationError("token provider is required".into()))?;
        let navigator = self
            .navigator
            .ok_or_else(|| SessionError::ConfigurationError("navigator is required".into()))?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(&self.config.api)?),
        };

        let base_url = self.config.resolve_api_base(self.ui_host.as_deref());
        info!("[SESSION] API base URL: {}", base_url);

        let ctx = SessionContext::new(self.config, provider, navigator, self.events);
        Ok(SessionController::from_parts(ctx, transport, base_url))
    }
}
