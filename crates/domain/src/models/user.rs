//! Staff roles and the permissions they carry.

use serde::{Deserialize, Serialize};

/// Role of an authenticated staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Employee,
    Security,
}

impl StaffRole {
    /// Admins see every record; everyone else is scoped to their own.
    pub fn sees_all_records(&self) -> bool {
        matches!(self, StaffRole::Admin)
    }

    /// Gate-side operations: pass verification, check-in, check-out.
    pub fn can_operate_gate(&self) -> bool {
        matches!(self, StaffRole::Admin | StaffRole::Security)
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(StaffRole::Admin),
            "employee" => Ok(StaffRole::Employee),
            "security" => Ok(StaffRole::Security),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StaffRole::Admin => "admin",
            StaffRole::Employee => "employee",
            StaffRole::Security => "security",
        };
        f.write_str(s)
    }
}
