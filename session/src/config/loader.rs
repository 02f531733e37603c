use super::SessionConfig;
use crate::error::{Result, SessionError};
use log::{debug, warn};
use std::fs;
use std::path::Path;

impl SessionConfig {
    /// Load configuration from a TOML file
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SessionError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content).map_err(|e| {
            SessionError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override selected settings from `WORKMATE_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = env_value("WORKMATE_API_URL") {
            debug!("[CONFIG] api.base_url overridden from environment");
            self.api.base_url = Some(url);
        }
        if let Some(url) = env_value("WORKMATE_AUTH_URL") {
            self.provider.url = url;
        }
        if let Some(realm) = env_value("WORKMATE_AUTH_REALM") {
            self.provider.realm = realm;
        }
        if let Some(client_id) = env_value("WORKMATE_AUTH_CLIENT_ID") {
            self.provider.client_id = client_id;
        }
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        let routes = [
            ("routes.root", &self.routes.root),
            ("routes.dashboard", &self.routes.dashboard),
            ("routes.setup", &self.routes.setup),
            ("routes.login", &self.routes.login),
            ("routes.forbidden", &self.routes.forbidden),
            ("routes.logout_redirect", &self.routes.logout_redirect),
            ("profile.endpoint", &self.profile.endpoint),
        ];
        for (name, value) in routes {
            if !value.starts_with('/') {
                return Err(SessionError::ConfigurationError(format!(
                    "{} must be an absolute path starting with '/', got '{}'",
                    name, value
                )));
            }
        }

        if self.api.request_timeout_secs == 0 {
            return Err(SessionError::ConfigurationError(
                "api.request_timeout_secs cannot be 0".into(),
            ));
        }
        if self.api.connect_timeout_secs == 0 {
            return Err(SessionError::ConfigurationError(
                "api.connect_timeout_secs cannot be 0".into(),
            ));
        }
        if self.refresh.background_interval_secs == 0 {
            return Err(SessionError::ConfigurationError(
                "refresh.background_interval_secs cannot be 0".into(),
            ));
        }

        if self.profile.fallback_business_id.trim().is_empty() {
            return Err(SessionError::ConfigurationError(
                "profile.fallback_business_id cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Resolve the API base URL.
    ///
    /// Uses `api.base_url` when set, else `https://api.<host>` derived from the
    /// UI host (a leading `ui.` label is dropped). With `force_https` the
    /// scheme is forced to `https` and any explicit port removed. Trailing
    /// slashes are always stripped.
    pub fn resolve_api_base(&self, ui_host: Option<&str>) -> String {
        let candidate = self
            .api
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| {
                ui_host.map(str::trim).filter(|h| !h.is_empty()).map(|host| {
                    let host = host.strip_prefix("ui.").unwrap_or(host);
                    format!("https://api.{}", host)
                })
            });

        let Some(candidate) = candidate else {
            return self.api.fallback_base_url.clone();
        };

        match reqwest::Url::parse(&candidate) {
            Ok(mut url) => {
                if self.api.force_https {
                    // set_scheme/set_port only fail for cannot-be-a-base URLs
                    let _ = url.set_scheme("https");
                    let _ = url.set_port(None);
                }
                url.as_str().trim_end_matches('/').to_string()
            },
            Err(e) => {
                warn!(
                    "[CONFIG] Invalid API base URL '{}': {}; falling back to {}",
                    candidate, e, self.api.fallback_base_url
                );
                self.api.fallback_base_url.clone()
            },
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
