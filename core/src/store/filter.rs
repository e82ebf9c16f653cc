use crate::prescription::model::Prescription;
use crate::prescription::stage::WorkflowStage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrescriptionFilter {
    /// Case-insensitive substring over patient, prescriber and medication names.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub stage: Option<WorkflowStage>,
}

impl PrescriptionFilter {
    pub fn search(term: &str) -> Self {
        Self {
            search: Some(term.to_string()),
            stage: None,
        }
    }

    pub fn stage(stage: WorkflowStage) -> Self {
        Self {
            search: None,
            stage: Some(stage),
        }
    }

    pub fn matches(&self, rx: &Prescription) -> bool {
        if let Some(stage) = self.stage {
            if rx.stage != stage {
                return false;
            }
        }
        let term = match self.search.as_deref().map(str::trim) {
            None | Some("") => return true,
            Some(t) => t.to_lowercase(),
        };
        rx.patient.name.to_lowercase().contains(&term)
            || rx.prescriber.name.to_lowercase().contains(&term)
            || rx
                .medications
                .iter()
                .any(|m| m.name.to_lowercase().contains(&term))
    }
}
