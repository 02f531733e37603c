use serde::{Deserialize, Serialize};

/// Application-side employee record for the authenticated identity.
///
/// Mirrors the `/employees/me` response. The business identifier is the
/// external employee code (e.g. `KIT-0007`); `employee_id` is accepted as an
/// alias because that is what the HR backend calls it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Profile id (UUID on the HR backend)
    #[serde(default)]
    pub id: String,
    #[serde(alias = "employee_id")]
    pub business_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
}

/// Linked profile with its provenance.
///
/// Downstream logic (redirect policy, onboarding views) matches on the
/// variant instead of comparing business ids against the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provenance", rename_all = "snake_case")]
pub enum LinkedProfile {
    /// Fetched from the profile endpoint
    Resolved(ProfileRecord),
    /// Synthesized locally because no backing record exists yet
    Fallback(ProfileRecord),
}

impl LinkedProfile {
    pub fn record(&self) -> &ProfileRecord {
        match self {
            Self::Resolved(record) | Self::Fallback(record) => record,
        }
    }

    /// `true` only for profiles backed by a real application record.
    pub fn has_complete_identity(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn business_id(&self) -> &str {
        &self.record().business_id
    }

    pub fn display_name(&self) -> &str {
        &self.record().name
    }

    pub fn department(&self) -> Option<&str> {
        self.record().department.as_deref()
    }
}
