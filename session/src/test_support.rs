//! In-memory collaborators shared by the unit tests.

use crate::config::{ProviderOptions, SessionConfig};
use crate::context::SessionContext;
use crate::error::{Result, SessionError};
use crate::event_handlers::SessionEvents;
use crate::navigation::MemoryNavigator;
use crate::provider::TokenProvider;
use crate::transport::{HttpTransport, TransportRequest, TransportResponse};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Unsigned JWT carrying `sub` and `name`.
pub(crate) fn token_for(sub: &str, name: &str) -> String {
    let claims = serde_json::json!({ "sub": sub, "name": name, "preferred_username": "ada" });
    format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

pub(crate) fn context_with(
    provider: Arc<FakeProvider>,
    navigator: Arc<MemoryNavigator>,
) -> SessionContext {
    SessionContext::new(SessionConfig::default(), provider, navigator, SessionEvents::new())
}

enum RefreshPlan {
    StillValid,
    Issue(String),
    Fail(String),
}

pub(crate) struct FakeProvider {
    token: Mutex<Option<String>>,
    refresh_plan: Mutex<RefreshPlan>,
    init_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    login_targets: Mutex<Vec<String>>,
    refresh_calls: Mutex<Vec<u64>>,
}

impl FakeProvider {
    fn with_token(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
            refresh_plan: Mutex::new(RefreshPlan::StillValid),
            init_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            login_targets: Mutex::new(Vec::new()),
            refresh_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn authenticated(token: String) -> Self {
        Self::with_token(Some(token))
    }

    pub(crate) fn anonymous() -> Self {
        Self::with_token(None)
    }

    pub(crate) fn fail_refresh(&self, reason: &str) {
        *self.refresh_plan.lock().unwrap() = RefreshPlan::Fail(reason.to_string());
    }

    pub(crate) fn issue_on_refresh(&self, token: String) {
        *self.refresh_plan.lock().unwrap() = RefreshPlan::Issue(token);
    }

    pub(crate) fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn login_targets(&self) -> Vec<String> {
        self.login_targets.lock().unwrap().clone()
    }

    pub(crate) fn refresh_calls(&self) -> Vec<u64> {
        self.refresh_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TokenProvider for FakeProvider {
    async fn init(&self, _options: &ProviderOptions) -> Result<bool> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token().is_some())
    }

    async fn login(&self, redirect_target: &str) -> Result<()> {
        self.login_targets.lock().unwrap().push(redirect_target.to_string());
        Ok(())
    }

    async fn logout(&self, _redirect_target: &str) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().unwrap() = None;
        Ok(())
    }

    fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    async fn refresh(&self, min_validity_secs: u64) -> Result<bool> {
        self.refresh_calls.lock().unwrap().push(min_validity_secs);
        match &*self.refresh_plan.lock().unwrap() {
            RefreshPlan::StillValid => Ok(false),
            RefreshPlan::Issue(token) => {
                *self.token.lock().unwrap() = Some(token.clone());
                Ok(true)
            },
            RefreshPlan::Fail(reason) => Err(SessionError::ProviderError(reason.clone())),
        }
    }
}

/// Transport answering by URL suffix; unknown paths get an empty 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<Vec<(String, TransportResponse)>>,
    failure: Mutex<Option<String>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, path: &str, status: u16, content_type: Option<&str>, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .push((path.to_string(), TransportResponse::new(status, content_type, body)));
    }

    pub(crate) fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(SessionError::TransportError(reason));
        }
        let routes = self.routes.lock().unwrap();
        Ok(routes
            .iter()
            .find(|(path, _)| url.ends_with(path.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| TransportResponse::new(404, None, "")))
    }
}
