use crate::error::{Result, SessionError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Claims decoded from an identity-provider token.
///
/// `username` also accepts the OIDC-standard `preferred_username` claim
/// (Keycloak, Auth0, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject id assigned by the identity provider
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default, alias = "preferred_username")]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp seconds)
    #[serde(default)]
    pub exp: Option<u64>,
}

impl Identity {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            name: None,
            given_name: None,
            family_name: None,
            username: None,
            email: None,
            exp: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_given_and_family(
        mut self,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        self.given_name = Some(given_name.into());
        self.family_name = Some(family_name.into());
        self
    }

    /// Decode the claims of a JWT **without verifying the signature**.
    ///
    /// Verification belongs to the identity provider; the session layer only
    /// reads the claims of a token the provider already accepted.
    pub fn from_token(token: &str) -> Result<Self> {
        let mut parts = token.splitn(3, '.');
        let payload = match (parts.next(), parts.next()) {
            (Some(_header), Some(payload)) if !payload.is_empty() => payload,
            _ => {
                return Err(SessionError::InvalidToken(
                    "Invalid JWT format: less than 2 segments".into(),
                ))
            },
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| SessionError::InvalidToken(format!("Invalid JWT payload base64: {}", e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::InvalidToken(format!("Invalid JWT payload JSON: {}", e)))
    }

    /// Best display name the claims offer: `name`, then `given_name family_name`,
    /// then `username`.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = non_blank(self.name.as_deref()) {
            return Some(name.to_string());
        }

        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if !parts.is_empty() {
            return Some(parts.join(" "));
        }

        non_blank(self.username.as_deref()).map(str::to_string)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
