use rx_core::audit::event::verify_chain;
use rx_core::audit::log::AuditLog;
use rx_core::config::WorkflowConfig;
use rx_core::determinism::clock::FixedClock;
use rx_core::interactions::checker::TableInteractionChecker;
use rx_core::inventory::ledger::StockLedger;
use rx_core::prescriber::model::RegistrationStatus;
use rx_core::prescriber::registry::PrescriberRegistry;
use rx_core::prescription::model::{Medication, NewPrescription, PatientRef, PrescriberRef};
use rx_core::prescription::stage::WorkflowStage;
use rx_core::prescription::workflow::PrescriptionWorkflow;
use rx_core::store::InMemoryPrescriptionStore;

const NOW: &str = "2026-03-01T09:00:00Z";

fn workflow() -> PrescriptionWorkflow<InMemoryPrescriptionStore, TableInteractionChecker> {
    PrescriptionWorkflow::new(
        InMemoryPrescriptionStore::new(),
        PrescriberRegistry::with_seed_data(),
        TableInteractionChecker::with_builtin_rules(),
        StockLedger::with_demo_batches(),
        AuditLog::in_memory(),
        WorkflowConfig::default(),
    )
    .with_clock(FixedClock(NOW.to_string()))
}

fn metformin_rx() -> NewPrescription {
    let mut med = Medication::new("Metformin", "500mg", 60);
    med.dosage = "1 tablet".to_string();
    med.frequency = "twice daily".to_string();
    med.duration = "30 days".to_string();
    med.instructions = "Take with meals".to_string();
    NewPrescription {
        patient: PatientRef {
            id: "PT-2026-001".to_string(),
            name: "John Smith".to_string(),
            allergies: vec![],
        },
        prescriber: PrescriberRef {
            id: "PR-001".to_string(),
            name: "Dr. Sarah Johnson".to_string(),
            license_number: "MD123456".to_string(),
        },
        medications: vec![med],
        notes: String::new(),
    }
}

#[test]
fn new_prescriptions_start_at_intake() {
    let wf = workflow();
    let rx = wf.intake(metformin_rx()).unwrap();
    assert_eq!(rx.stage, WorkflowStage::Intake);
    assert_eq!(rx.created_at, NOW);
    assert!(rx.verified_at.is_none());
    assert!(rx.dispensed_at.is_none());
    assert_eq!(wf.get(&rx.id).unwrap(), rx);
}

#[test]
fn each_forward_step_lands_on_the_successor() {
    let wf = workflow();
    let rx = wf.intake(metformin_rx()).unwrap();
    let mut stage = rx.stage;
    while let Some(next) = stage.successor() {
        let updated = wf.advance(&rx.id, next).unwrap();
        assert_eq!(updated.stage, next);
        assert_eq!(wf.get(&rx.id).unwrap().stage, next);
        stage = next;
    }
    assert!(stage.is_terminal());
}

#[test]
fn metformin_walks_from_intake_to_complete() {
    let wf = workflow();
    let rx = wf.intake(metformin_rx()).unwrap();

    let rx = wf.advance(&rx.id, WorkflowStage::Verification).unwrap();
    let outcome = rx.prescriber_verification.clone().unwrap();
    assert_eq!(outcome.registration_status(), RegistrationStatus::Active);
    assert_eq!(rx.verified_at.as_deref(), Some(NOW));

    let rx = wf.advance(&rx.id, WorkflowStage::InteractionCheck).unwrap();
    let review = rx.interaction_review.clone().unwrap();
    assert!(review.interactions.is_empty());
    assert_eq!(rx.medications[0].interactions, Some(vec![]));

    let rx = wf.advance(&rx.id, WorkflowStage::StockCheck).unwrap();
    assert!(rx.medications[0].in_stock);
    assert_eq!(rx.medications[0].selected_batch.as_deref(), Some("MET-2312"));

    let rx = wf.advance(&rx.id, WorkflowStage::PharmacistApproval).unwrap();
    let rx = wf.advance(&rx.id, WorkflowStage::Dispense).unwrap();
    assert_eq!(rx.dispensed_at.as_deref(), Some(NOW));
    let rx = wf.advance(&rx.id, WorkflowStage::Complete).unwrap();

    assert_eq!(rx.stage, WorkflowStage::Complete);
    assert!(rx.dispensed_at.is_some());
    assert_eq!(rx.completed_at.as_deref(), Some(NOW));

    let stock = wf.stock_snapshot().unwrap();
    let batch = stock
        .batches()
        .iter()
        .find(|b| b.batch_id == "MET-2312")
        .unwrap();
    assert_eq!(batch.quantity_on_hand, 0);
}

#[test]
fn lifecycle_is_audited_as_an_intact_chain() {
    let wf = workflow();
    let rx = wf.intake(metformin_rx()).unwrap();
    for stage in &WorkflowStage::ORDER[1..] {
        wf.advance(&rx.id, *stage).unwrap();
    }
    let events = wf.audit_events().unwrap();
    verify_chain(&events).unwrap();

    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types[0], "PRESCRIPTION_CREATED");
    assert_eq!(
        types
            .iter()
            .filter(|t| **t == "PRESCRIPTION_STAGE_CHANGED")
            .count(),
        6
    );
    assert!(types.contains(&"PRESCRIBER_VERIFIED"));
    assert!(types.contains(&"INTERACTION_CHECK_COMPLETED"));
    assert!(types.contains(&"STOCK_CHECK_COMPLETED"));
    assert!(types.contains(&"MEDICATION_DISPENSED"));
    assert!(events.iter().all(|e| e.prescription_id == rx.id));
}

#[test]
fn notes_can_be_updated_at_any_stage() {
    let wf = workflow();
    let rx = wf.intake(metformin_rx()).unwrap();
    wf.advance(&rx.id, WorkflowStage::Verification).unwrap();
    let rx = wf.update_notes(&rx.id, "Patient prefers extended release").unwrap();
    assert_eq!(rx.notes, "Patient prefers extended release");
    assert_eq!(rx.stage, WorkflowStage::Verification);
}

#[test]
fn intake_rejects_empty_or_zero_quantity_orders() {
    let wf = workflow();
    let mut empty = metformin_rx();
    empty.medications.clear();
    assert!(wf.intake(empty).is_err());

    let mut zero = metformin_rx();
    zero.medications[0].quantity = 0;
    assert!(wf.intake(zero).is_err());

    assert!(wf.list(&Default::default()).unwrap().is_empty());
}
