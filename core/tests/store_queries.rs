use rx_core::error::CoreError;
use rx_core::prescription::model::{
    Medication, PatientRef, PrescriberRef, Prescription, PrescriptionPatch,
};
use rx_core::prescription::stage::WorkflowStage;
use rx_core::store::{InMemoryPrescriptionStore, PrescriptionFilter, PrescriptionStore};

fn rx(id: &str, patient: &str, prescriber: &str, med: &str, stage: WorkflowStage) -> Prescription {
    Prescription {
        id: id.to_string(),
        version: 1,
        patient: PatientRef {
            id: format!("PT-{}", id),
            name: patient.to_string(),
            allergies: vec![],
        },
        prescriber: PrescriberRef {
            id: "PR-001".to_string(),
            name: prescriber.to_string(),
            license_number: "MD123456".to_string(),
        },
        medications: vec![Medication::new(med, "10mg", 30)],
        stage,
        created_at: "2026-03-01T09:00:00Z".to_string(),
        verified_at: None,
        dispensed_at: None,
        completed_at: None,
        notes: String::new(),
        prescriber_verification: None,
        interaction_review: None,
        approved_by: None,
    }
}

fn seeded() -> InMemoryPrescriptionStore {
    let store = InMemoryPrescriptionStore::new();
    store
        .create(rx("rx_a", "John Smith", "Dr. Sarah Johnson", "Metformin", WorkflowStage::Intake))
        .unwrap();
    store
        .create(rx("rx_b", "Maria Garcia", "Dr. Michael Chen", "Lisinopril", WorkflowStage::StockCheck))
        .unwrap();
    store
        .create(rx("rx_c", "Ahmed Khan", "Dr. Sarah Johnson", "Atorvastatin", WorkflowStage::StockCheck))
        .unwrap();
    store
}

fn ids(rows: &[Prescription]) -> Vec<&str> {
    rows.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn blank_search_lists_everything_in_creation_order() {
    let store = seeded();
    assert_eq!(
        ids(&store.list(&PrescriptionFilter::default()).unwrap()),
        vec!["rx_a", "rx_b", "rx_c"]
    );
    assert_eq!(
        ids(&store.list(&PrescriptionFilter::search("   ")).unwrap()),
        vec!["rx_a", "rx_b", "rx_c"]
    );
}

#[test]
fn search_covers_patient_prescriber_and_medication() {
    let store = seeded();
    assert_eq!(ids(&store.list(&PrescriptionFilter::search("garcia")).unwrap()), vec!["rx_b"]);
    assert_eq!(
        ids(&store.list(&PrescriptionFilter::search("SARAH")).unwrap()),
        vec!["rx_a", "rx_c"]
    );
    assert_eq!(ids(&store.list(&PrescriptionFilter::search("statin")).unwrap()), vec!["rx_c"]);
    assert!(store.list(&PrescriptionFilter::search("penicillin")).unwrap().is_empty());
}

#[test]
fn stage_and_search_combine() {
    let store = seeded();
    let filter = PrescriptionFilter {
        search: Some("johnson".to_string()),
        stage: Some(WorkflowStage::StockCheck),
    };
    assert_eq!(ids(&store.list(&filter).unwrap()), vec!["rx_c"]);
    assert_eq!(
        ids(&store.list(&PrescriptionFilter::stage(WorkflowStage::StockCheck)).unwrap()),
        vec!["rx_b", "rx_c"]
    );
}

#[test]
fn unknown_ids_are_not_found() {
    let store = seeded();
    assert!(matches!(store.get("rx_zzz"), Err(CoreError::NotFound(_))));
    assert!(matches!(
        store.update("rx_zzz", PrescriptionPatch::default()),
        Err(CoreError::NotFound(_))
    ));
}

#[test]
fn duplicate_create_conflicts() {
    let store = seeded();
    let err = store
        .create(rx("rx_a", "Someone Else", "Dr. X", "Aspirin", WorkflowStage::Intake))
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
    assert_eq!(store.get("rx_a").unwrap().patient.name, "John Smith");
}

#[test]
fn stale_version_is_rejected_and_leaves_record_untouched() {
    let store = seeded();
    let mut first = PrescriptionPatch::at_version(1);
    first.notes = Some("first".to_string());
    let updated = store.update("rx_a", first).unwrap();
    assert_eq!(updated.version, 2);

    let mut stale = PrescriptionPatch::at_version(1);
    stale.stage = Some(WorkflowStage::Verification);
    assert!(matches!(store.update("rx_a", stale), Err(CoreError::Conflict(_))));

    let current = store.get("rx_a").unwrap();
    assert_eq!(current.stage, WorkflowStage::Intake);
    assert_eq!(current.notes, "first");
    assert_eq!(current.version, 2);
}
