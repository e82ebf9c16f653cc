use super::stage::WorkflowStage;
use crate::error::{CoreError, CoreResult};
use crate::interactions::model::{AllergyFlag, Interaction, InteractionReview};
use crate::prescriber::model::VerificationOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrescriberRef {
    pub id: String,
    pub name: String,
    pub license_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Medication {
    pub name: String,
    pub strength: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    pub quantity: u32,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub selected_batch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions: Option<Vec<Interaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergy_flags: Option<Vec<AllergyFlag>>,
}

impl Medication {
    pub fn new(name: &str, strength: &str, quantity: u32) -> Self {
        Self {
            name: name.to_string(),
            strength: strength.to_string(),
            dosage: String::new(),
            frequency: String::new(),
            duration: String::new(),
            quantity,
            instructions: String::new(),
            in_stock: false,
            selected_batch: None,
            interactions: None,
            allergy_flags: None,
        }
    }

    pub fn label(&self) -> String {
        if self.strength.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.strength)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prescription {
    pub id: String,
    pub version: u64,
    pub patient: PatientRef,
    pub prescriber: PrescriberRef,
    pub medications: Vec<Medication>,
    pub stage: WorkflowStage,
    pub created_at: String,
    pub verified_at: Option<String>,
    pub dispensed_at: Option<String>,
    pub completed_at: Option<String>,
    pub notes: String,
    pub prescriber_verification: Option<VerificationOutcome>,
    pub interaction_review: Option<InteractionReview>,
    pub approved_by: Option<String>,
}

/// Intake request; the workflow assigns id, stage and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPrescription {
    pub patient: PatientRef,
    pub prescriber: PrescriberRef,
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub notes: String,
}

impl NewPrescription {
    pub fn validate(&self) -> CoreResult<()> {
        if self.patient.id.trim().is_empty() || self.patient.name.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "patient id and name are required".to_string(),
            ));
        }
        if self.prescriber.license_number.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "prescriber license number is required".to_string(),
            ));
        }
        if self.medications.is_empty() {
            return Err(CoreError::InvalidInput(
                "at least one medication is required".to_string(),
            ));
        }
        for med in &self.medications {
            if med.name.trim().is_empty() {
                return Err(CoreError::InvalidInput(
                    "medication name is required".to_string(),
                ));
            }
            if med.quantity == 0 {
                return Err(CoreError::InvalidInput(format!(
                    "quantity for {} must be greater than zero",
                    med.label()
                )));
            }
        }
        Ok(())
    }
}

/// Partial update applied by `PrescriptionStore::update`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrescriptionPatch {
    pub expected_version: Option<u64>,
    pub stage: Option<WorkflowStage>,
    pub medications: Option<Vec<Medication>>,
    pub notes: Option<String>,
    pub verified_at: Option<String>,
    pub dispensed_at: Option<String>,
    pub completed_at: Option<String>,
    pub prescriber_verification: Option<VerificationOutcome>,
    pub interaction_review: Option<InteractionReview>,
    pub approved_by: Option<String>,
}

impl PrescriptionPatch {
    pub fn at_version(version: u64) -> Self {
        Self {
            expected_version: Some(version),
            ..Self::default()
        }
    }

    pub fn apply_to(self, rx: &mut Prescription) {
        if let Some(v) = self.stage {
            rx.stage = v;
        }
        if let Some(v) = self.medications {
            rx.medications = v;
        }
        if let Some(v) = self.notes {
            rx.notes = v;
        }
        if let Some(v) = self.verified_at {
            rx.verified_at = Some(v);
        }
        if let Some(v) = self.dispensed_at {
            rx.dispensed_at = Some(v);
        }
        if let Some(v) = self.completed_at {
            rx.completed_at = Some(v);
        }
        if let Some(v) = self.prescriber_verification {
            rx.prescriber_verification = Some(v);
        }
        if let Some(v) = self.interaction_review {
            rx.interaction_review = Some(v);
        }
        if let Some(v) = self.approved_by {
            rx.approved_by = Some(v);
        }
    }
}
