//! Role derivation from the linked profile's department.
//!
//! Pure functions only: the store re-runs [`RoleRules::derive`] after every
//! profile mutation and publishes the result. Enforcement of the flags is
//! up to the views and the HR backend.

use crate::config::defaults::{
    default_admin_departments, default_backoffice_departments, default_management_departments,
};
use crate::models::LinkedProfile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Access tier derived from the profile department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    Management,
    Backoffice,
    Admin,
    #[default]
    Employee,
}

impl RoleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::Management => "management",
            RoleTag::Backoffice => "backoffice",
            RoleTag::Admin => "admin",
            RoleTag::Employee => "employee",
        }
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "management" => Ok(RoleTag::Management),
            "backoffice" => Ok(RoleTag::Backoffice),
            "admin" => Ok(RoleTag::Admin),
            "employee" => Ok(RoleTag::Employee),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Check if a role may approve requests (vacations, sick leave).
#[inline]
pub fn can_approve(role: RoleTag) -> bool {
    matches!(role, RoleTag::Backoffice | RoleTag::Management)
}

/// Check if a role may manage employees and settings.
#[inline]
pub fn can_manage(role: RoleTag) -> bool {
    matches!(role, RoleTag::Management | RoleTag::Admin)
}

/// Role tag plus the capability flags derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleFlags {
    pub role: RoleTag,
    pub can_approve: bool,
    pub can_manage: bool,
}

impl RoleFlags {
    pub fn for_role(role: RoleTag) -> Self {
        Self {
            role,
            can_approve: can_approve(role),
            can_manage: can_manage(role),
        }
    }
}

/// Department aliases that map to each non-default role.
///
/// Matching is case-insensitive and ignores surrounding whitespace. When a
/// department appears in more than one list the priority is
/// management > backoffice > admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRules {
    #[serde(default = "default_management_departments")]
    pub management: Vec<String>,
    #[serde(default = "default_backoffice_departments")]
    pub backoffice: Vec<String>,
    #[serde(default = "default_admin_departments")]
    pub admin: Vec<String>,
}

impl Default for RoleRules {
    fn default() -> Self {
        Self {
            management: default_management_departments(),
            backoffice: default_backoffice_departments(),
            admin: default_admin_departments(),
        }
    }
}

impl RoleRules {
    /// Map a department to its role tag. Unknown or missing departments are `Employee`.
    pub fn classify(&self, department: Option<&str>) -> RoleTag {
        let Some(department) = department.map(str::trim).filter(|d| !d.is_empty()) else {
            return RoleTag::Employee;
        };

        let listed = |aliases: &[String]| {
            aliases.iter().any(|a| a.trim().eq_ignore_ascii_case(department))
        };

        if listed(self.management.as_slice()) {
            RoleTag::Management
        } else if listed(self.backoffice.as_slice()) {
            RoleTag::Backoffice
        } else if listed(self.admin.as_slice()) {
            RoleTag::Admin
        } else {
            RoleTag::Employee
        }
    }

    pub fn derive(&self, profile: Option<&LinkedProfile>) -> RoleFlags {
        RoleFlags::for_role(self.classify(profile.and_then(LinkedProfile::department)))
    }
}

/// Derive role flags with the default department rules.
pub fn derive_role(profile: Option<&LinkedProfile>) -> RoleFlags {
    static DEFAULT_RULES: OnceLock<RoleRules> = OnceLock::new();
    DEFAULT_RULES.get_or_init(RoleRules::default).derive(profile)
}
