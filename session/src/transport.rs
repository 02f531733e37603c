//! HTTP transport seam.
//!
//! The gateway builds a fully resolved [`TransportRequest`] (absolute URL,
//! all headers) and hands it to an [`HttpTransport`]. Status classification
//! stays in the gateway, so a transport only moves bytes. [`ReqwestTransport`]
//! is the production implementation.

use crate::config::ApiSettings;
use crate::error::{Result, SessionError};
use log::debug;
use reqwest::Method;
use std::time::Duration;

/// A request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body
    pub body: Option<String>,
}

/// Raw response as received, regardless of status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// Whether the server declared a JSON body (`application/json`, `application/problem+json`, ...).
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|mime| {
                let mime = mime.trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }
}

/// Sends requests and returns the raw response for any status.
///
/// Only failures that produce no status at all (DNS, connect, timeout) are
/// errors, reported as [`SessionError::TransportError`].
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given timeouts.
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SessionError::ConfigurationError(e.to_string()))?;
        Ok(Self { http_client })
    }

    pub fn from_config(api: &ApiSettings) -> Result<Self> {
        Self::new(api.request_timeout(), api.connect_timeout())
    }

    /// Wrap an existing client (shared pools, custom TLS roots).
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.http_client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        debug!(
            "[GATEWAY] Transport received status={} bytes={}",
            status,
            body.len()
        );

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
