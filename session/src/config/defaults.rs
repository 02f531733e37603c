// Default value functions

pub fn default_fallback_base_url() -> String {
    "https://api.workmate.test".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_false() -> bool {
    false
}

pub fn default_request_timeout_secs() -> u64 {
    30
}

pub fn default_connect_timeout_secs() -> u64 {
    10
}

pub fn default_provider_url() -> String {
    "https://login.workmate.test".to_string() // no trailing slash
}

pub fn default_realm() -> String {
    "kit".to_string()
}

pub fn default_client_id() -> String {
    "workmate-ui".to_string()
}

pub fn default_pkce_method() -> String {
    "S256".to_string()
}

pub fn default_preflight_min_validity_secs() -> u64 {
    30
}

pub fn default_background_interval_secs() -> u64 {
    60
}

pub fn default_background_min_validity_secs() -> u64 {
    70
}

pub fn default_root_route() -> String {
    "/".to_string()
}

pub fn default_dashboard_route() -> String {
    "/dashboard".to_string()
}

pub fn default_setup_route() -> String {
    "/setup".to_string()
}

pub fn default_login_route() -> String {
    "/login".to_string()
}

pub fn default_forbidden_route() -> String {
    "/403".to_string()
}

pub fn default_logout_redirect() -> String {
    "/".to_string()
}

pub fn default_profile_endpoint() -> String {
    "/employees/me".to_string()
}

pub fn default_fallback_business_id() -> String {
    "UNASSIGNED".to_string()
}

pub fn default_fallback_department() -> String {
    "employee".to_string()
}

pub fn default_fallback_display_name() -> String {
    "User".to_string()
}

pub fn default_management_departments() -> Vec<String> {
    vec!["management".to_string()]
}

pub fn default_backoffice_departments() -> Vec<String> {
    vec!["backoffice".to_string(), "hr".to_string()]
}

pub fn default_admin_departments() -> Vec<String> {
    vec!["admin".to_string(), "support".to_string()]
}
