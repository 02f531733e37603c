use super::api_request::ApiRequest;
use reqwest::Method;
use std::fmt;
use std::time::Instant;

/// How a gateway call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Not dispatched yet
    Pending,
    Success,
    /// Pre-flight refresh failed, request never sent
    CredentialFailure,
    Unauthorized,
    Forbidden,
    ServerError,
    ClientError,
    /// No status was received
    TransportError,
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestOutcome::Pending => "pending",
            RequestOutcome::Success => "success",
            RequestOutcome::CredentialFailure => "credential_failure",
            RequestOutcome::Unauthorized => "unauthorized",
            RequestOutcome::Forbidden => "forbidden",
            RequestOutcome::ServerError => "server_error",
            RequestOutcome::ClientError => "client_error",
            RequestOutcome::TransportError => "transport_error",
        };
        write!(f, "{}", s)
    }
}

/// Per-call bookkeeping for one gateway request. Never persisted.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub path: String,
    pub method: Method,
    pub has_body: bool,
    pub credentials_injected: bool,
    pub status: Option<u16>,
    pub outcome: RequestOutcome,
    started: Instant,
}

impl RequestContext {
    pub fn new(request: &ApiRequest) -> Self {
        Self {
            path: request.path.clone(),
            method: request.method.clone(),
            has_body: request.body.is_some(),
            credentials_injected: false,
            status: None,
            outcome: RequestOutcome::Pending,
            started: Instant::now(),
        }
    }

    pub(crate) fn finish(&mut self, status: Option<u16>, outcome: RequestOutcome) {
        self.status = status;
        self.outcome = outcome;
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} outcome={} status={} auth={} duration_ms={}",
            self.method,
            self.path,
            self.outcome,
            self.status.map_or_else(|| "-".to_string(), |s| s.to_string()),
            self.credentials_injected,
            self.elapsed_ms()
        )
    }
}
