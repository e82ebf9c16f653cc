use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Active,
    Suspended,
    Expired,
    Unverified,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Active => "active",
            RegistrationStatus::Suspended => "suspended",
            RegistrationStatus::Expired => "expired",
            RegistrationStatus::Unverified => "unverified",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry entry for a licensed prescriber.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrescriberRecord {
    pub id: String,
    pub name: String,
    pub license_number: String,
    pub registration_status: RegistrationStatus,
    pub specialty: String,
    pub contact: String,
}

/// Result of a license lookup. An unknown license is a valid answer, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Registered(PrescriberRecord),
    Unverified { license_number: String },
}

impl VerificationOutcome {
    pub fn registration_status(&self) -> RegistrationStatus {
        match self {
            VerificationOutcome::Registered(rec) => rec.registration_status,
            VerificationOutcome::Unverified { .. } => RegistrationStatus::Unverified,
        }
    }

    pub fn is_active(&self) -> bool {
        self.registration_status() == RegistrationStatus::Active
    }

    pub fn license_number(&self) -> &str {
        match self {
            VerificationOutcome::Registered(rec) => &rec.license_number,
            VerificationOutcome::Unverified { license_number } => license_number,
        }
    }
}
