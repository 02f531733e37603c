//! Profile reconciliation.
//!
//! Links the authenticated identity to its application-side employee record.
//! A missing record is a normal state for new hires, so the reconciler never
//! fails: anything other than a usable record yields a
//! [`LinkedProfile::Fallback`] synthesized from the token claims.

use crate::config::ProfileSettings;
use crate::error::SessionError;
use crate::gateway::RequestGateway;
use crate::models::{ApiResponse, Identity, LinkedProfile, ProfileRecord};
use log::{debug, warn};

/// Result of one profile lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub profile: LinkedProfile,
    /// The endpoint answered 401/403 and the gateway sent the user to login
    /// or the forbidden page.
    pub auth_redirected: bool,
}

#[derive(Debug, Clone)]
pub struct ProfileReconciler {
    gateway: RequestGateway,
    settings: ProfileSettings,
}

impl ProfileReconciler {
    pub fn new(gateway: RequestGateway, settings: ProfileSettings) -> Self {
        Self { gateway, settings }
    }

    /// Fetch the current user's profile, or build a fallback.
    pub async fn reconcile(&self, identity: &Identity) -> LinkedProfile {
        self.resolve(identity).await.profile
    }

    /// Like [`reconcile`](Self::reconcile), but also reports whether the
    /// lookup was rejected with 401/403 (the gateway has already redirected).
    pub async fn resolve(&self, identity: &Identity) -> Reconciliation {
        let (reason, auth_redirected) = match self.gateway.get(&self.settings.endpoint).await {
            Ok(ApiResponse::Json(value)) => match serde_json::from_value::<ProfileRecord>(value) {
                Ok(record) if !record.business_id.trim().is_empty() => {
                    debug!(
                        "[PROFILE] Linked {} to profile {}",
                        identity.sub, record.business_id
                    );
                    return Reconciliation {
                        profile: LinkedProfile::Resolved(record),
                        auth_redirected: false,
                    };
                },
                Ok(_) => ("profile has an empty business id".to_string(), false),
                Err(e) => (format!("unexpected profile shape: {}", e), false),
            },
            Ok(ApiResponse::Empty) => ("profile endpoint returned no body".to_string(), false),
            Ok(ApiResponse::Text(_)) => {
                ("profile endpoint returned non-JSON body".to_string(), false)
            },
            Err(e) => {
                let auth = matches!(e, SessionError::Unauthorized(_) | SessionError::Forbidden(_));
                (e.to_string(), auth)
            },
        };

        warn!(
            "[PROFILE] No linked profile for {}, using fallback: {}",
            identity.sub, reason
        );
        Reconciliation {
            profile: self.fallback_for(identity),
            auth_redirected,
        }
    }

    /// Profile synthesized from the identity claims.
    pub fn fallback_for(&self, identity: &Identity) -> LinkedProfile {
        LinkedProfile::Fallback(ProfileRecord {
            id: identity.sub.clone(),
            business_id: self.settings.fallback_business_id.clone(),
            name: identity
                .display_name()
                .unwrap_or_else(|| self.settings.fallback_display_name.clone()),
            department: Some(self.settings.fallback_department.clone()),
        })
    }
}
