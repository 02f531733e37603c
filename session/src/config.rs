//! Session configuration types.
//!
//! Every section can be omitted from the TOML file; missing fields fall back
//! to the functions in [`defaults`].

pub mod defaults;
mod loader;

use crate::redirect::RootRedirect;
use crate::roles::RoleRules;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for the session layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default, alias = "auth")]
    pub provider: ProviderOptions,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub routes: RouteSettings,
    #[serde(default)]
    pub profile: ProfileSettings,
    #[serde(default)]
    pub roles: RoleRules,
}

/// Where and how outbound API calls are sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Explicit API base URL. When unset it is derived from the UI host.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Used when neither `base_url` nor the UI host yields a valid URL
    #[serde(default = "default_fallback_base_url")]
    pub fallback_base_url: String,

    /// Rewrite the base URL to `https` and drop any explicit port
    #[serde(default = "default_true")]
    pub force_https: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            fallback_base_url: default_fallback_base_url(),
            force_https: true,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Options handed to [`TokenProvider::init`](crate::TokenProvider::init).
///
/// The session layer does not interpret these; they describe the identity
/// provider client (issuer, realm, OAuth client) for the implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOptions {
    /// Identity provider base URL (no trailing slash)
    #[serde(default = "default_provider_url")]
    pub url: String,

    #[serde(default = "default_realm")]
    pub realm: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_pkce_method")]
    pub pkce_method: String,

    /// Send the user to the login page when no session exists at init
    #[serde(default = "default_true")]
    pub login_required: bool,

    #[serde(default = "default_false")]
    pub check_login_iframe: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            url: default_provider_url(),
            realm: default_realm(),
            client_id: default_client_id(),
            pkce_method: default_pkce_method(),
            login_required: true,
            check_login_iframe: false,
        }
    }
}

/// Token refresh horizons and the background refresh cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSettings {
    /// Gateway refreshes tokens expiring within this many seconds before each call
    #[serde(default = "default_preflight_min_validity_secs")]
    pub preflight_min_validity_secs: u64,

    /// Interval of the background refresh task
    #[serde(default = "default_background_interval_secs")]
    pub background_interval_secs: u64,

    /// Minimum validity requested by the background refresh task
    #[serde(default = "default_background_min_validity_secs")]
    pub background_min_validity_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            preflight_min_validity_secs: default_preflight_min_validity_secs(),
            background_interval_secs: default_background_interval_secs(),
            background_min_validity_secs: default_background_min_validity_secs(),
        }
    }
}

impl RefreshSettings {
    pub fn background_interval(&self) -> Duration {
        Duration::from_secs(self.background_interval_secs)
    }
}

/// Navigation entry points used by the redirect policy and the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSettings {
    #[serde(default = "default_root_route")]
    pub root: String,

    #[serde(default = "default_dashboard_route")]
    pub dashboard: String,

    /// Onboarding page for identities without a linked profile
    #[serde(default = "default_setup_route")]
    pub setup: String,

    /// Target of a 401 response
    #[serde(default = "default_login_route")]
    pub login: String,

    /// Target of a 403 response
    #[serde(default = "default_forbidden_route")]
    pub forbidden: String,

    /// Where the identity provider sends the browser after logout
    #[serde(default = "default_logout_redirect")]
    pub logout_redirect: String,

    #[serde(default)]
    pub root_redirect: RootRedirect,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            root: default_root_route(),
            dashboard: default_dashboard_route(),
            setup: default_setup_route(),
            login: default_login_route(),
            forbidden: default_forbidden_route(),
            logout_redirect: default_logout_redirect(),
            root_redirect: RootRedirect::default(),
        }
    }
}

/// Profile endpoint and the values used to synthesize a fallback profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default = "default_profile_endpoint")]
    pub endpoint: String,

    /// Sentinel business identifier carried by fallback profiles
    #[serde(default = "default_fallback_business_id")]
    pub fallback_business_id: String,

    #[serde(default = "default_fallback_department")]
    pub fallback_department: String,

    #[serde(default = "default_fallback_display_name")]
    pub fallback_display_name: String,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            endpoint: default_profile_endpoint(),
            fallback_business_id: default_fallback_business_id(),
            fallback_department: default_fallback_department(),
            fallback_display_name: default_fallback_display_name(),
        }
    }
}
