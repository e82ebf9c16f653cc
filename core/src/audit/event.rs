use crate::determinism::json_canonical;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEvent {
    pub ts_utc: String, // RFC3339 UTC string
    pub event_type: String,
    pub prescription_id: String,
    pub actor: Actor,
    pub details: serde_json::Value,
    pub prev_event_hash: String, // hex 64
    pub event_hash: String,      // hex 64
}

impl AuditEvent {
    /// Unchained event; `AuditLog::append` fills in both hashes.
    pub fn new(
        ts_utc: impl Into<String>,
        event_type: &str,
        prescription_id: &str,
        actor: Actor,
        details: serde_json::Value,
    ) -> Self {
        Self {
            ts_utc: ts_utc.into(),
            event_type: event_type.to_string(),
            prescription_id: prescription_id.to_string(),
            actor,
            details,
            prev_event_hash: String::new(),
            event_hash: String::new(),
        }
    }
}

pub const ZERO_HASH_64: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// event_hash = SHA-256 over the canonical bytes of the full envelope, with
// event_hash itself forced to ZERO_HASH_64 while hashing.
pub fn compute_event_hash(event: &AuditEvent) -> CoreResult<String> {
    let mut e = event.clone();
    e.event_hash = ZERO_HASH_64.to_string();
    let bytes = json_canonical::to_canonical_bytes(&e)?;
    let mut h = Sha256::new();
    h.update(bytes);
    Ok(hex::encode(h.finalize()))
}

pub fn finalize_event(mut event: AuditEvent) -> CoreResult<AuditEvent> {
    if event.prev_event_hash.len() != 64
        || !event.prev_event_hash.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(CoreError::InvalidInput(
            "prev_event_hash must be 64 hex chars".to_string(),
        ));
    }
    validate_event_taxonomy(&event)?;
    event.event_hash = compute_event_hash(&event)?;
    Ok(event)
}

/// Recomputes every hash and checks each event points at its predecessor.
pub fn verify_chain(events: &[AuditEvent]) -> CoreResult<()> {
    let mut expected_prev = ZERO_HASH_64.to_string();
    for (idx, ev) in events.iter().enumerate() {
        if ev.prev_event_hash != expected_prev {
            return Err(CoreError::InvalidInput(format!(
                "audit chain broken at event {}: prev_event_hash mismatch",
                idx
            )));
        }
        if compute_event_hash(ev)? != ev.event_hash {
            return Err(CoreError::InvalidInput(format!(
                "audit chain broken at event {}: event_hash mismatch",
                idx
            )));
        }
        expected_prev = ev.event_hash.clone();
    }
    Ok(())
}

pub const EVENT_TYPES: &[&str] = &[
    "PRESCRIPTION_CREATED",
    "PRESCRIPTION_STAGE_CHANGED",
    "PRESCRIPTION_TRANSITION_REJECTED",
    "PRESCRIPTION_NOTES_UPDATED",
    "PRESCRIBER_VERIFIED",
    "INTERACTION_CHECK_COMPLETED",
    "FINDING_ACKNOWLEDGED",
    "STOCK_CHECK_COMPLETED",
    "PHARMACIST_APPROVED",
    "MEDICATION_DISPENSED",
    "STOCK_RESTOCKED",
];

fn validate_event_taxonomy(event: &AuditEvent) -> CoreResult<()> {
    if !EVENT_TYPES.contains(&event.event_type.as_str()) {
        return Err(CoreError::InvalidInput(format!(
            "unknown event_type {}",
            event.event_type
        )));
    }
    for k in required_detail_keys(&event.event_type) {
        if event.details.get(k).is_none() {
            return Err(CoreError::InvalidInput(format!(
                "event {} missing details.{}",
                event.event_type, k
            )));
        }
    }
    Ok(())
}

fn required_detail_keys(event_type: &str) -> &'static [&'static str] {
    match event_type {
        "PRESCRIPTION_CREATED" => &["patient_id", "prescriber_license", "medication_count"],
        "PRESCRIPTION_STAGE_CHANGED" => &["from_stage", "to_stage"],
        "PRESCRIPTION_TRANSITION_REJECTED" => &["from_stage", "to_stage", "reason"],
        "PRESCRIBER_VERIFIED" => &["license_number", "registration_status"],
        "INTERACTION_CHECK_COMPLETED" => &[
            "interaction_count",
            "severe_count",
            "allergy_flag_count",
        ],
        "FINDING_ACKNOWLEDGED" => &["finding_key", "acknowledged_by", "reason"],
        "STOCK_CHECK_COMPLETED" => &["all_in_stock", "selected_batches"],
        "PHARMACIST_APPROVED" => &["approved_by"],
        "MEDICATION_DISPENSED" => &["batch_id", "medication", "quantity"],
        "STOCK_RESTOCKED" => &["batch_id", "quantity", "quantity_on_hand"],
        _ => &[],
    }
}
