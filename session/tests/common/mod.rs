#![allow(dead_code)]
//! Shared fakes for the integration tests.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use workmate_session::{
    HttpTransport, MemoryNavigator, ProviderOptions, Result, SessionConfig, SessionController,
    SessionError, SessionEvents, TokenProvider, TransportRequest, TransportResponse,
};

pub const PROFILE_JSON: &str =
    r#"{"id":"e-7","business_id":"KIT-0007","name":"Ada Lovelace","department":"HR"}"#;

/// Unsigned access token with the given claims.
pub fn jwt(sub: &str, name: &str) -> String {
    let claims = json!({
        "sub": sub,
        "name": name,
        "preferred_username": "alovelace",
        "email": "ada@kit.edu",
    });
    format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

/// Provider whose refresh outcome can be switched at runtime.
pub struct ScriptedProvider {
    token: Mutex<Option<String>>,
    fail_refresh: Mutex<Option<String>>,
    pub init_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub login_targets: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn signed_in(token: String) -> Self {
        Self {
            token: Mutex::new(Some(token)),
            fail_refresh: Mutex::new(None),
            init_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            login_targets: Mutex::new(Vec::new()),
        }
    }

    pub fn signed_out() -> Self {
        let provider = Self::signed_in(String::new());
        *provider.token.lock().unwrap() = None;
        provider
    }

    pub fn break_refresh(&self, reason: &str) {
        *self.fail_refresh.lock().unwrap() = Some(reason.to_string());
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenProvider for ScriptedProvider {
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

    async fn refresh(&self, _min_validity_secs: u64) -> Result<bool> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_refresh.lock().unwrap().clone() {
            Some(reason) => Err(SessionError::ProviderError(reason)),
            None => Ok(false),
        }
    }
}

/// Transport serving canned responses keyed by path suffix.
#[derive(Default)]
pub struct CannedTransport {
    routes: Mutex<Vec<(String, TransportResponse)>>,
    pub sent: Mutex<Vec<TransportRequest>>,
}

impl CannedTransport {
    pub fn with(self, path: &str, status: u16, content_type: Option<&str>, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((path.to_string(), TransportResponse::new(status, content_type, body)));
        self
    }

    pub fn sent_to(&self, path: &str) -> usize {
        self.sent.lock().unwrap().iter().filter(|r| r.url.ends_with(path)).count()
    }
}

#[async_trait::async_trait]
impl HttpTransport for CannedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = request.url.clone();
        self.sent.lock().unwrap().push(request);
        Ok(self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| url.ends_with(path.as_str()))
            .map(|(_, r)| r.clone())
            .unwrap_or_else(|| TransportResponse::new(404, None, "")))
    }
}

pub struct Fixture {
    pub controller: SessionController,
    pub provider: Arc<ScriptedProvider>,
    pub navigator: Arc<MemoryNavigator>,
    pub transport: Arc<CannedTransport>,
}

pub fn fixture(
    path: &str,
    provider: ScriptedProvider,
    transport: CannedTransport,
    config: SessionConfig,
    events: SessionEvents,
) -> Fixture {
    let provider = Arc::new(provider);
    let navigator = Arc::new(MemoryNavigator::new(path));
    let transport = Arc::new(transport);
    let controller = SessionController::builder(config)
        .provider(provider.clone())
        .navigator(navigator.clone())
        .transport(transport.clone())
        .events(events)
        .ui_host("ui.workmate.kit.edu")
        .build()
        .expect("controller");
    Fixture {
        controller,
        provider,
        navigator,
        transport,
    }
}
