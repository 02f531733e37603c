use crate::error::{Result, SessionError};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Decoded body of a successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// No body (e.g. `204 No Content` after a DELETE)
    Empty,
    /// Body served as `application/json`
    Json(JsonValue),
    /// Any other content type, returned as raw text
    Text(String),
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Deserialize a JSON body into `T`.
    ///
    /// Empty and text bodies are a serialization error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Json(value) => Ok(T::deserialize(value)?),
            Self::Empty => Err(SessionError::SerializationError("response body is empty".into())),
            Self::Text(_) => Err(SessionError::SerializationError(
                "response body is not JSON".into(),
            )),
        }
    }
}
