use super::model::{PrescriberRecord, RegistrationStatus, VerificationOutcome};
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only prescriber reference data keyed by license number.
#[derive(Debug, Clone, Default)]
pub struct PrescriberRegistry {
    by_license: BTreeMap<String, PrescriberRecord>,
}

impl PrescriberRegistry {
    pub fn new(records: Vec<PrescriberRecord>) -> CoreResult<Self> {
        let mut by_license = BTreeMap::new();
        for rec in records {
            let key = rec.license_number.trim().to_string();
            if key.is_empty() {
                return Err(CoreError::InvalidInput(format!(
                    "prescriber {} has an empty license number",
                    rec.id
                )));
            }
            if by_license.insert(key.clone(), rec).is_some() {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate prescriber license {}",
                    key
                )));
            }
        }
        Ok(Self { by_license })
    }

    /// Loads a JSON array of `PrescriberRecord`.
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let records: Vec<PrescriberRecord> = serde_json::from_slice(&bytes)?;
        Self::new(records)
    }

    pub fn with_seed_data() -> Self {
        let by_license = seed_records()
            .into_iter()
            .map(|r| (r.license_number.clone(), r))
            .collect();
        Self { by_license }
    }

    pub fn verify(&self, license_number: &str) -> VerificationOutcome {
        let key = license_number.trim();
        match self.by_license.get(key) {
            Some(rec) => VerificationOutcome::Registered(rec.clone()),
            None => VerificationOutcome::Unverified {
                license_number: key.to_string(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.by_license.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_license.is_empty()
    }
}

fn seed_records() -> Vec<PrescriberRecord> {
    let rec = |id: &str, name: &str, license: &str, status, specialty: &str, contact: &str| {
        PrescriberRecord {
            id: id.to_string(),
            name: name.to_string(),
            license_number: license.to_string(),
            registration_status: status,
            specialty: specialty.to_string(),
            contact: contact.to_string(),
        }
    };
    vec![
        rec(
            "PR-001",
            "Dr. Sarah Johnson",
            "MD123456",
            RegistrationStatus::Active,
            "Internal Medicine",
            "+1-555-0101",
        ),
        rec(
            "PR-002",
            "Dr. Michael Chen",
            "MD234567",
            RegistrationStatus::Active,
            "Cardiology",
            "+1-555-0102",
        ),
        rec(
            "PR-003",
            "Dr. Emily Davis",
            "MD789012",
            RegistrationStatus::Suspended,
            "Pediatrics",
            "+1-555-0103",
        ),
        rec(
            "PR-004",
            "Dr. Robert Wilson",
            "MD345678",
            RegistrationStatus::Expired,
            "Family Medicine",
            "+1-555-0104",
        ),
    ]
}
