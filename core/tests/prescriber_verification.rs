use rx_core::error::CoreError;
use rx_core::prescriber::model::{PrescriberRecord, RegistrationStatus, VerificationOutcome};
use rx_core::prescriber::registry::PrescriberRegistry;

#[test]
fn seeded_license_verifies_as_active() {
    let registry = PrescriberRegistry::with_seed_data();
    match registry.verify("MD123456") {
        VerificationOutcome::Registered(rec) => {
            assert_eq!(rec.name, "Dr. Sarah Johnson");
            assert_eq!(rec.registration_status, RegistrationStatus::Active);
        }
        other => panic!("expected a registered prescriber, got {:?}", other),
    }
}

#[test]
fn verification_is_idempotent() {
    let registry = PrescriberRegistry::with_seed_data();
    for license in ["MD123456", "MD789012", "MD345678", "XX000000"] {
        let first = registry.verify(license);
        let second = registry.verify(license);
        assert_eq!(first, second);
    }
}

#[test]
fn statuses_come_from_the_registry() {
    let registry = PrescriberRegistry::with_seed_data();
    assert_eq!(
        registry.verify("MD789012").registration_status(),
        RegistrationStatus::Suspended
    );
    assert_eq!(
        registry.verify("MD345678").registration_status(),
        RegistrationStatus::Expired
    );
    assert!(!registry.verify("MD789012").is_active());
}

#[test]
fn unknown_license_is_unverified_not_an_error() {
    let registry = PrescriberRegistry::with_seed_data();
    let outcome = registry.verify("  ZZ424242 ");
    assert_eq!(
        outcome,
        VerificationOutcome::Unverified {
            license_number: "ZZ424242".to_string()
        }
    );
    assert_eq!(outcome.registration_status(), RegistrationStatus::Unverified);
}

#[test]
fn registry_loads_from_json_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("prescribers.json");
    std::fs::write(
        &path,
        r#"[
          {"id": "PR-9", "name": "Dr. Ana Ruiz", "license_number": "MD900001",
           "registration_status": "active", "specialty": "Cardiology",
           "contact": "(555) 010-2000"}
        ]"#,
    )
    .unwrap();
    let registry = PrescriberRegistry::from_json_file(&path).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.verify("MD900001").is_active());
    assert_eq!(
        registry.verify("MD123456").registration_status(),
        RegistrationStatus::Unverified
    );
}

#[test]
fn duplicate_licenses_are_rejected() {
    let rec = PrescriberRecord {
        id: "PR-1".to_string(),
        name: "Dr. A".to_string(),
        license_number: "MD1".to_string(),
        registration_status: RegistrationStatus::Active,
        specialty: String::new(),
        contact: String::new(),
    };
    let err = PrescriberRegistry::new(vec![rec.clone(), rec]).unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}
