use super::model::Prescription;
use super::stage::WorkflowStage;
use crate::config::WorkflowConfig;

/// Checks the guard attached to moving `rx` into `to`. Returns the reason the
/// transition must be refused, if any. Ordering is checked separately.
pub fn guard_violation(rx: &Prescription, to: WorkflowStage, cfg: &WorkflowConfig) -> Option<String> {
    match to {
        WorkflowStage::InteractionCheck => prescriber_active(rx),
        WorkflowStage::StockCheck => interactions_resolved(rx),
        WorkflowStage::PharmacistApproval => stock_available(rx),
        WorkflowStage::Dispense if cfg.require_pharmacist_sign_off => sign_off_present(rx),
        _ => None,
    }
}

fn prescriber_active(rx: &Prescription) -> Option<String> {
    match &rx.prescriber_verification {
        None => Some("prescriber has not been verified".to_string()),
        Some(outcome) if !outcome.is_active() => Some(format!(
            "prescriber license {} is {}",
            outcome.license_number(),
            outcome.registration_status()
        )),
        Some(_) => None,
    }
}

fn interactions_resolved(rx: &Prescription) -> Option<String> {
    let review = match &rx.interaction_review {
        None => return Some("interaction check has not run".to_string()),
        Some(r) => r,
    };
    let open = review.unresolved_blocking();
    if open.is_empty() {
        None
    } else {
        Some(format!("unacknowledged findings: {}", open.join(", ")))
    }
}

fn stock_available(rx: &Prescription) -> Option<String> {
    let missing: Vec<String> = rx
        .medications
        .iter()
        .filter(|m| !m.in_stock || m.selected_batch.is_none())
        .map(|m| m.label())
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(format!("insufficient stock for {}", missing.join(", ")))
    }
}

fn sign_off_present(rx: &Prescription) -> Option<String> {
    match rx.approved_by.as_deref() {
        Some(p) if !p.trim().is_empty() => None,
        _ => Some("pharmacist sign-off is required before dispensing".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prescriber::model::VerificationOutcome;
    use crate::prescription::model::{Medication, PatientRef, PrescriberRef};

    fn rx() -> Prescription {
        Prescription {
            id: "rx_test".to_string(),
            version: 1,
            patient: PatientRef {
                id: "PT-1".to_string(),
                name: "Jane Doe".to_string(),
                allergies: vec![],
            },
            prescriber: PrescriberRef {
                id: "PR-9".to_string(),
                name: "Dr. Nobody".to_string(),
                license_number: "XX000000".to_string(),
            },
            medications: vec![Medication::new("Metformin", "500mg", 60)],
            stage: WorkflowStage::Verification,
            created_at: "2026-03-01T00:00:00Z".to_string(),
            verified_at: None,
            dispensed_at: None,
            completed_at: None,
            notes: String::new(),
            prescriber_verification: None,
            interaction_review: None,
            approved_by: None,
        }
    }

    #[test]
    fn unverified_prescriber_blocks_interaction_check() {
        let mut p = rx();
        let cfg = WorkflowConfig::default();
        assert!(guard_violation(&p, WorkflowStage::InteractionCheck, &cfg).is_some());
        p.prescriber_verification = Some(VerificationOutcome::Unverified {
            license_number: "XX000000".to_string(),
        });
        let reason = guard_violation(&p, WorkflowStage::InteractionCheck, &cfg).unwrap();
        assert!(reason.contains("unverified"));
    }

    #[test]
    fn sign_off_only_required_when_configured() {
        let p = rx();
        let mut cfg = WorkflowConfig::default();
        assert!(guard_violation(&p, WorkflowStage::Dispense, &cfg).is_none());
        cfg.require_pharmacist_sign_off = true;
        assert!(guard_violation(&p, WorkflowStage::Dispense, &cfg).is_some());
    }

    #[test]
    fn out_of_stock_line_is_named() {
        let p = rx();
        let reason =
            guard_violation(&p, WorkflowStage::PharmacistApproval, &WorkflowConfig::default())
                .unwrap();
        assert_eq!(reason, "insufficient stock for Metformin 500mg");
    }
}
