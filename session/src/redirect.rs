//! Post-init redirect policy.
//!
//! Rules are checked in order:
//! 1. On the root path with a resolved profile: go to the dashboard.
//! 2. Without a resolved profile (fallback or none): go to setup.
//! 3. Otherwise stay on the current route.

use crate::config::RouteSettings;
use crate::models::LinkedProfile;
use serde::{Deserialize, Serialize};

/// Dashboard target used when a fully provisioned user lands on the root path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootRedirect {
    /// The shared dashboard route
    #[default]
    Dashboard,
    /// `{dashboard}/employee/{business_id}`
    EmployeeDashboard,
}

/// Evaluates where the browser should go once `init` completes.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    routes: RouteSettings,
}

impl RedirectPolicy {
    pub fn new(routes: RouteSettings) -> Self {
        Self { routes }
    }

    /// Return the redirect target, or `None` to stay on `current_path`.
    pub fn evaluate(&self, current_path: &str, profile: Option<&LinkedProfile>) -> Option<String> {
        match profile {
            Some(LinkedProfile::Resolved(record)) => {
                if current_path == self.routes.root {
                    Some(self.dashboard_target(&record.business_id))
                } else {
                    None
                }
            },
            Some(LinkedProfile::Fallback(_)) | None => Some(self.routes.setup.clone()),
        }
    }

    fn dashboard_target(&self, business_id: &str) -> String {
        match self.routes.root_redirect {
            RootRedirect::Dashboard => self.routes.dashboard.clone(),
            RootRedirect::EmployeeDashboard => format!(
                "{}/employee/{}",
                self.routes.dashboard.trim_end_matches('/'),
                business_id
            ),
        }
    }
}
