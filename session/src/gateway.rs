//! Authenticated request gateway.
//!
//! Every outbound API call goes through [`RequestGateway::send`], which runs
//! three phases:
//!
//! 1. Pre-flight refresh: when the session is authenticated, ask the provider
//!    to refresh tokens about to expire. A failed refresh logs the session
//!    out and the request is never sent.
//! 2. Injection: attach `Authorization: Bearer <token>` only when a session
//!    and a non-empty token exist.
//! 3. Classification: 2xx bodies are passed through, 401 and 403 trigger
//!    redirects, everything else is rejected with an [`ApiFailure`].
//!
//! Concurrent calls refresh independently; coalescing is up to the provider.

use crate::context::SessionContext;
use crate::error::{ApiFailure, Result, SessionError};
use crate::models::{ApiRequest, ApiResponse, RequestContext, RequestOutcome};
use crate::transport::{HttpTransport, TransportRequest, TransportResponse};
use log::{debug, info, warn};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Headers the gateway owns; caller-supplied values are ignored.
const RESERVED_HEADERS: [&str; 3] = ["accept", "content-type", "authorization"];

#[derive(Clone)]
pub struct RequestGateway {
    ctx: SessionContext,
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RequestGateway {
    /// Gateway sending to `base_url` (a trailing slash is trimmed).
    pub fn new(
        ctx: SessionContext,
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// API origin every request path is joined to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    /// POST a JSON `body` as given.
    pub async fn post(&self, path: &str, body: JsonValue) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path).with_body(body)).await
    }

    /// PUT with `null` and empty-string fields stripped from `body`.
    pub async fn put(&self, path: &str, body: JsonValue) -> Result<ApiResponse> {
        self.send(ApiRequest::put(path).with_clean_body(body)).await
    }

    /// PATCH with `null` and empty-string fields stripped from `body`.
    pub async fn patch(&self, path: &str, body: JsonValue) -> Result<ApiResponse> {
        self.send(ApiRequest::patch(path).with_clean_body(body)).await
    }

    /// DELETE `path`.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Run one request through refresh, injection and classification.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut rc = RequestContext::new(&request);
        debug!(
            "[GATEWAY] Starting {} {} (body={})",
            rc.method, rc.path, rc.has_body
        );

        if let Err(e) = self.preflight_refresh().await {
            rc.finish(None, RequestOutcome::CredentialFailure);
            warn!("[GATEWAY] {}", rc);
            return Err(e);
        }

        let wire = self.build_transport_request(&request, &mut rc)?;

        let response = match self.transport.send(wire).await {
            Ok(response) => response,
            Err(e) => {
                rc.finish(None, RequestOutcome::TransportError);
                warn!("[GATEWAY] {} error=\"{}\"", rc, e);
                return Err(e);
            },
        };

        let status = response.status;
        let (result, outcome) = self.classify(response);
        rc.finish(Some(status), outcome);
        match &result {
            Ok(_) => debug!("[GATEWAY] {}", rc),
            Err(e) => warn!("[GATEWAY] {} error=\"{}\"", rc, e),
        }
        result
    }

    async fn preflight_refresh(&self) -> Result<()> {
        if !self.ctx.store.is_authenticated() {
            return Ok(());
        }

        let min_validity = self.ctx.config.refresh.preflight_min_validity_secs;
        match self.ctx.provider.refresh(min_validity).await {
            Ok(true) => {
                debug!("[GATEWAY] Token refreshed before dispatch");
                match self.ctx.provider.identity() {
                    Ok(Some(identity)) => self.ctx.store.set_identity(Some(identity)),
                    Ok(None) => {},
                    Err(e) => warn!("[GATEWAY] Refreshed token could not be decoded: {}", e),
                }
                Ok(())
            },
            Ok(false) => Ok(()),
            Err(e) => {
                warn!("[GATEWAY] Pre-flight refresh failed, logging out: {}", e);
                let error = SessionError::CredentialRefreshFailure(e.to_string());
                self.ctx.force_logout().await;
                self.ctx.events.emit_credential_failure(&error);
                Err(error)
            },
        }
    }

    fn build_transport_request(
        &self,
        request: &ApiRequest,
        rc: &mut RequestContext,
    ) -> Result<TransportRequest> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];

        let body = match &request.body {
            Some(body) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(body)?)
            },
            None => None,
        };

        if self.ctx.store.is_authenticated() {
            if let Some(token) = self.ctx.provider.token().filter(|t| !t.is_empty()) {
                headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
                rc.credentials_injected = true;
            }
        }

        headers.extend(
            request
                .headers
                .iter()
                .filter(|(name, _)| {
                    !RESERVED_HEADERS.iter().any(|reserved| name.eq_ignore_ascii_case(reserved))
                })
                .cloned(),
        );

        Ok(TransportRequest {
            method: request.method.clone(),
            url: self.url_for(&request.path),
            headers,
            body,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn classify(&self, response: TransportResponse) -> (Result<ApiResponse>, RequestOutcome) {
        let status = response.status;
        match status {
            200..=299 => (Ok(decode_success(response)), RequestOutcome::Success),
            401 => {
                info!("[GATEWAY] 401 received, sending user to login");
                self.ctx.redirect(&self.ctx.config.routes.login);
                (
                    Err(SessionError::Unauthorized(ApiFailure::from_response(status, response.body))),
                    RequestOutcome::Unauthorized,
                )
            },
            403 => {
                info!("[GATEWAY] 403 received, sending user to forbidden page");
                self.ctx.redirect(&self.ctx.config.routes.forbidden);
                (
                    Err(SessionError::Forbidden(ApiFailure::from_response(status, response.body))),
                    RequestOutcome::Forbidden,
                )
            },
            500.. => (
                Err(SessionError::ServerError(ApiFailure::from_response(status, response.body))),
                RequestOutcome::ServerError,
            ),
            _ => (
                Err(SessionError::ClientError(ApiFailure::from_response(status, response.body))),
                RequestOutcome::ClientError,
            ),
        }
    }
}

fn decode_success(response: TransportResponse) -> ApiResponse {
    if response.body.trim().is_empty() {
        return ApiResponse::Empty;
    }
    if !response.is_json() {
        return ApiResponse::Text(response.body);
    }
    match serde_json::from_str(&response.body) {
        Ok(value) => ApiResponse::Json(value),
        Err(e) => {
            warn!(
                "[GATEWAY] Malformed JSON body ({} bytes), treating as empty: {}",
                response.body.len(),
                e
            );
            ApiResponse::Empty
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_with, token_for, FakeProvider, FakeTransport};
    use crate::models::Identity;
    use crate::navigation::MemoryNavigator;
    use serde_json::json;

    struct Harness {
        gateway: RequestGateway,
        ctx: SessionContext,
        provider: Arc<FakeProvider>,
        navigator: Arc<MemoryNavigator>,
        transport: Arc<FakeTransport>,
    }

    fn harness(authenticated: bool) -> Harness {
        let provider = Arc::new(if authenticated {
            FakeProvider::authenticated(token_for("u-1", "Ada Lovelace"))
        } else {
            FakeProvider::anonymous()
        });
        let navigator = Arc::new(MemoryNavigator::new("/documents"));
        let transport = Arc::new(FakeTransport::new());
        let ctx = context_with(provider.clone(), navigator.clone());
        if authenticated {
            ctx.store.set_identity(Some(Identity::new("u-1")));
        }
        let gateway = RequestGateway::new(ctx.clone(), transport.clone(), "https://api.kit.test/");
        Harness {
            gateway,
            ctx,
            provider,
            navigator,
            transport,
        }
    }

    #[tokio::test]
    async fn test_success_passes_json_through() {
        let h = harness(true);
        h.transport.respond("/departments", 200, Some("application/json"), r#"["IT","HR"]"#);

        let response = h.gateway.get("/departments").await.unwrap();
        assert_eq!(response, ApiResponse::Json(json!(["IT", "HR"])));

        let sent = h.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://api.kit.test/departments");
        assert!(sent[0]
            .headers
            .iter()
            .any(|(k, v)| k == "Authorization" && v.starts_with("Bearer ")));
        assert_eq!(h.provider.refresh_calls(), vec![30]);
    }

    #[tokio::test]
    async fn test_unauthorized_redirects_once_and_rejects() {
        let h = harness(true);
        h.transport.respond("/employees", 401, Some("application/json"), r#"{"detail":"expired"}"#);

        let err = h.gateway.get("/employees").await.unwrap_err();
        assert!(matches!(err, SessionError::Unauthorized(_)));
        assert_eq!(err.status(), Some(401));
        assert_eq!(h.navigator.redirects(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_server_error_does_not_redirect() {
        let h = harness(true);
        h.transport.respond("/payroll", 500, Some("text/plain"), "boom");

        let err = h.gateway.get("/payroll").await.unwrap_err();
        assert!(matches!(err, SessionError::ServerError(_)));
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.failure().and_then(|f| f.body.as_deref()), Some("boom"));
        assert!(h.navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_forbidden_redirects_to_forbidden_page() {
        let h = harness(true);
        h.transport.respond("/admin", 403, None, "");

        let err = h.gateway.get("/admin").await.unwrap_err();
        assert!(matches!(err, SessionError::Forbidden(_)));
        assert_eq!(h.navigator.redirects(), vec!["/403".to_string()]);
    }

    #[tokio::test]
    async fn test_other_client_errors_carry_status_and_message() {
        let h = harness(true);
        h.transport.respond("/documents", 422, Some("application/json"), r#"{"detail":"title missing"}"#);

        let err = h.gateway.post("/documents", json!({})).await.unwrap_err();
        let failure = err.failure().unwrap();
        assert_eq!(failure.status, 422);
        assert_eq!(failure.message, "title missing");
        assert!(h.navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_and_malformed_bodies() {
        let h = harness(true);
        h.transport.respond("/documents/1", 204, None, "");
        h.transport.respond("/export", 200, Some("text/csv"), "id,name\n1,Ada");
        h.transport.respond("/broken", 200, Some("application/json"), "{not json");

        assert_eq!(h.gateway.delete("/documents/1").await.unwrap(), ApiResponse::Empty);
        assert_eq!(
            h.gateway.get("/export").await.unwrap(),
            ApiResponse::Text("id,name\n1,Ada".into())
        );
        assert_eq!(h.gateway.get("/broken").await.unwrap(), ApiResponse::Empty);
    }

    #[tokio::test]
    async fn test_unauthenticated_sends_no_credentials_and_skips_refresh() {
        let h = harness(false);
        h.transport.respond("/public/health", 200, Some("application/json"), r#"{"ok":true}"#);

        h.gateway.get("/public/health").await.unwrap();

        let sent = h.transport.requests();
        assert!(!sent[0].headers.iter().any(|(k, _)| k == "Authorization"));
        assert!(h.provider.refresh_calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_logs_out_without_sending() {
        let h = harness(true);
        h.provider.fail_refresh("refresh token expired");
        let failures = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let counter = failures.clone();
        let mut ctx = h.ctx.clone();
        ctx.events = ctx.events.on_credential_failure(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        let gateway = RequestGateway::new(ctx, h.transport.clone(), "https://api.kit.test");

        let err = gateway.get("/employees").await.unwrap_err();
        assert!(matches!(err, SessionError::CredentialRefreshFailure(_)));
        assert!(h.transport.requests().is_empty());
        assert!(!h.ctx.store.is_authenticated());
        assert_eq!(h.provider.logout_calls(), 1);
        assert_eq!(failures.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refreshed_token_replaces_identity() {
        let h = harness(true);
        h.provider.issue_on_refresh(token_for("u-1", "Ada King"));
        h.transport.respond("/employees", 200, Some("application/json"), "[]");

        h.gateway.get("/employees").await.unwrap();

        let identity = h.ctx.store.identity().unwrap();
        assert_eq!(identity.name.as_deref(), Some("Ada King"));
    }

    #[tokio::test]
    async fn test_body_headers_and_reserved_header_filtering() {
        let h = harness(true);
        h.transport.respond("/employees/KIT-0007", 200, Some("application/json"), "{}");

        let request = ApiRequest::patch("/employees/KIT-0007")
            .with_clean_body(json!({"name": "Ada", "phone": "", "room": null}))
            .with_header("Authorization", "Bearer forged")
            .with_header("X-Request-Id", "r-1");
        h.gateway.send(request).await.unwrap();

        let sent = &h.transport.requests()[0];
        assert_eq!(sent.body.as_deref(), Some(r#"{"name":"Ada"}"#));
        let header = |name: &str| {
            sent.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(header("Content-Type"), vec!["application/json".to_string()]);
        assert_eq!(header("Accept"), vec!["application/json".to_string()]);
        assert_eq!(header("Authorization").len(), 1);
        assert_ne!(header("Authorization")[0], "Bearer forged");
        assert_eq!(header("X-Request-Id"), vec!["r-1".to_string()]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let h = harness(true);
        h.transport.fail_with("connection refused");

        let err = h.gateway.get("/employees").await.unwrap_err();
        assert!(matches!(err, SessionError::TransportError(_)));
        assert!(err.is_retriable());
        assert!(h.navigator.redirects().is_empty());
    }
}
