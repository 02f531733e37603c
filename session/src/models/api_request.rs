use reqwest::Method;
use serde_json::Value as JsonValue;

/// Outbound request accepted by the gateway: `{path, method, body?, headers?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path relative to the API base URL (query string included)
    pub path: String,
    pub method: Method,
    pub body: Option<JsonValue>,
    /// Extra headers; the gateway sets `Accept`, `Content-Type` and
    /// `Authorization` itself.
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a JSON body with `null` and empty-string fields removed.
    ///
    /// Partial updates (PATCH/PUT) rely on this so that unset form fields
    /// don't overwrite stored values.
    pub fn with_clean_body(self, body: JsonValue) -> Self {
        self.with_body(clean_payload(body))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Drop `null` and `""` members from a top-level JSON object.
///
/// Non-object values are returned unchanged.
pub fn clean_payload(body: JsonValue) -> JsonValue {
    match body {
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null() && v.as_str() != Some(""))
                .collect(),
        ),
        other => other,
    }
}
