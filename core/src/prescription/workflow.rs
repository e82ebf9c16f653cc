use super::guards::guard_violation;
use super::model::{NewPrescription, Prescription, PrescriptionPatch};
use super::stage::{valid_transition, WorkflowStage};
use crate::audit::event::{Actor, AuditEvent};
use crate::audit::log::AuditLog;
use crate::config::{PharmacyConfig, WorkflowConfig};
use crate::determinism::clock::{Clock, SystemClock};
use crate::determinism::ids::prescription_id_ulid;
use crate::error::{CoreError, CoreResult};
use crate::interactions::allergy::screen_allergies;
use crate::interactions::checker::InteractionChecker;
use crate::interactions::model::{Acknowledgement, InteractionReview, InteractionSeverity};
use crate::inventory::ledger::StockLedger;
use crate::inventory::model::StockBatch;
use crate::prescriber::model::VerificationOutcome;
use crate::prescriber::registry::PrescriberRegistry;
use crate::store::{PrescriptionFilter, PrescriptionStore};
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use tracing::{debug, error, info, warn};

/// Drives prescriptions through the seven-stage workflow.
///
/// Each `advance` reads the record, checks ordering and guards, applies the
/// side effects of the target stage, and writes back with the version it read.
/// A concurrent writer in between turns the write into `CoreError::Conflict`.
///
/// Audit events for a change are appended after the store write commits. A
/// failing audit sink at that point is logged and the committed record is
/// still returned, so callers never retry a change that already happened.
pub struct PrescriptionWorkflow<S: PrescriptionStore, C: InteractionChecker> {
    store: S,
    registry: RwLock<PrescriberRegistry>,
    checker: C,
    stock: Mutex<StockLedger>,
    audit: Mutex<AuditLog>,
    clock: Box<dyn Clock>,
    config: WorkflowConfig,
}

impl<S: PrescriptionStore, C: InteractionChecker> PrescriptionWorkflow<S, C> {
    pub fn new(
        store: S,
        registry: PrescriberRegistry,
        checker: C,
        stock: StockLedger,
        audit: AuditLog,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            store,
            registry: RwLock::new(registry),
            checker,
            stock: Mutex::new(stock),
            audit: Mutex::new(audit),
            clock: Box::new(SystemClock),
            config,
        }
    }

    /// Builds reference data and the audit sink from `cfg`, falling back to
    /// the seed registry, the demo ledger and an in-memory audit log.
    pub fn from_config(cfg: &PharmacyConfig, store: S, checker: C) -> CoreResult<Self> {
        let registry = match &cfg.prescriber_registry_path {
            Some(p) => PrescriberRegistry::from_json_file(p)?,
            None => PrescriberRegistry::with_seed_data(),
        };
        let stock = match &cfg.stock_path {
            Some(p) => StockLedger::from_json_file(p)?,
            None => StockLedger::with_demo_batches(),
        };
        let audit = match &cfg.audit_log_path {
            Some(p) => AuditLog::open_or_create(p)?,
            None => AuditLog::in_memory(),
        };
        debug!(
            prescribers = registry.len(),
            batches = stock.batches().len(),
            "workflow reference data loaded"
        );
        Ok(Self::new(
            store,
            registry,
            checker,
            stock,
            audit,
            cfg.workflow.clone(),
        ))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn intake(&self, req: NewPrescription) -> CoreResult<Prescription> {
        req.validate()?;
        let now = self.clock.now_rfc3339()?;
        let rx = Prescription {
            id: prescription_id_ulid(),
            version: 1,
            patient: req.patient,
            prescriber: req.prescriber,
            medications: req.medications,
            stage: WorkflowStage::Intake,
            created_at: now.clone(),
            verified_at: None,
            dispensed_at: None,
            completed_at: None,
            notes: req.notes,
            prescriber_verification: None,
            interaction_review: None,
            approved_by: None,
        };
        self.store.create(rx.clone())?;
        self.record_committed(
            &now,
            "PRESCRIPTION_CREATED",
            &rx.id,
            Actor::User,
            json!({
                "patient_id": rx.patient.id,
                "prescriber_license": rx.prescriber.license_number,
                "medication_count": rx.medications.len()
            }),
        );
        info!(prescription_id = %rx.id, patient_id = %rx.patient.id, "prescription received");
        Ok(rx)
    }

    pub fn get(&self, id: &str) -> CoreResult<Prescription> {
        self.store.get(id)
    }

    pub fn list(&self, filter: &PrescriptionFilter) -> CoreResult<Vec<Prescription>> {
        self.store.list(filter)
    }

    pub fn verify_prescriber(&self, license_number: &str) -> CoreResult<VerificationOutcome> {
        Ok(self.read_registry()?.verify(license_number))
    }

    /// Swaps in fresh prescriber reference data, e.g. after a reinstatement.
    /// Prescriptions already past verification keep their recorded outcome.
    pub fn replace_registry(&self, registry: PrescriberRegistry) -> CoreResult<()> {
        let mut current = self
            .registry
            .write()
            .map_err(|_| CoreError::Conflict("prescriber registry lock poisoned".to_string()))?;
        info!(
            before = current.len(),
            after = registry.len(),
            "prescriber registry replaced"
        );
        *current = registry;
        Ok(())
    }

    pub fn advance(&self, id: &str, target: WorkflowStage) -> CoreResult<Prescription> {
        let rx = self.store.get(id)?;
        let from = rx.stage;
        if !valid_transition(from, target) {
            let reason = match from.successor() {
                Some(next) => format!("{} may only advance to {}", from, next),
                None => format!("{} is terminal", from),
            };
            return Err(self.reject(&rx, target, reason)?);
        }
        if let Some(reason) = guard_violation(&rx, target, &self.config) {
            return Err(self.reject(&rx, target, reason)?);
        }

        let now = self.clock.now_rfc3339()?;
        let mut patch = PrescriptionPatch::at_version(rx.version);
        patch.stage = Some(target);
        let mut events: Vec<(&'static str, Value)> = Vec::new();

        let updated = match target {
            WorkflowStage::Verification => {
                events.push(self.run_verification(&rx, &now, &mut patch)?);
                self.store.update(id, patch)?
            }
            WorkflowStage::InteractionCheck => {
                let review = self.run_interaction_check(&rx, &now, &mut patch)?;
                events.push((
                    "INTERACTION_CHECK_COMPLETED",
                    json!({
                        "interaction_count": review.interactions.len(),
                        "severe_count": review
                            .interactions
                            .iter()
                            .filter(|i| i.severity == InteractionSeverity::Severe)
                            .count(),
                        "allergy_flag_count": review.allergy_flags.len()
                    }),
                ));
                patch.interaction_review = Some(review);
                self.store.update(id, patch)?
            }
            WorkflowStage::StockCheck => {
                let details = self.run_stock_check(&rx, &mut patch)?;
                events.push(("STOCK_CHECK_COMPLETED", details));
                self.store.update(id, patch)?
            }
            WorkflowStage::Dispense => {
                let today = self.clock.today()?;
                let mut ledger = lock(&self.stock, "stock ledger")?;
                let mut scratch = ledger.clone();
                let mut meds = rx.medications.clone();
                for med in &mut meds {
                    // The batch chosen at stock-check may have been drawn down since.
                    let batch_id = match scratch.select_batch(med, &today) {
                        Some(b) => b.batch_id.clone(),
                        None => {
                            drop(ledger);
                            let reason =
                                format!("insufficient stock for {} at dispense", med.label());
                            return Err(self.reject(&rx, target, reason)?);
                        }
                    };
                    if med.selected_batch.as_deref() != Some(batch_id.as_str()) {
                        debug!(
                            prescription_id = %id,
                            medication = %med.label(),
                            batch_id = %batch_id,
                            "batch reselected at dispense"
                        );
                        med.selected_batch = Some(batch_id.clone());
                    }
                    scratch.deduct(&batch_id, med.quantity)?;
                    events.push((
                        "MEDICATION_DISPENSED",
                        json!({
                            "batch_id": batch_id,
                            "medication": med.label(),
                            "quantity": med.quantity
                        }),
                    ));
                }
                patch.medications = Some(meds);
                patch.dispensed_at = Some(now.clone());
                let updated = self.store.update(id, patch)?;
                *ledger = scratch;
                updated
            }
            WorkflowStage::Complete => {
                patch.completed_at = Some(now.clone());
                self.store.update(id, patch)?
            }
            WorkflowStage::Intake | WorkflowStage::PharmacistApproval => {
                self.store.update(id, patch)?
            }
        };

        for (event_type, details) in events {
            self.record_committed(&now, event_type, id, Actor::System, details);
        }
        self.record_committed(
            &now,
            "PRESCRIPTION_STAGE_CHANGED",
            id,
            Actor::User,
            json!({ "from_stage": from.as_str(), "to_stage": target.as_str() }),
        );
        info!(prescription_id = %id, from = %from, to = %target, "prescription advanced");
        Ok(updated)
    }

    /// Records a pharmacist override for a severe interaction or an allergy flag.
    pub fn acknowledge_finding(
        &self,
        id: &str,
        finding_key: &str,
        pharmacist: &str,
        reason: &str,
    ) -> CoreResult<Prescription> {
        if pharmacist.trim().is_empty() || reason.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "acknowledgement needs a pharmacist and a reason".to_string(),
            ));
        }
        let rx = self.store.get(id)?;
        if rx.stage != WorkflowStage::InteractionCheck {
            return Err(CoreError::PreconditionFailed(format!(
                "findings can only be acknowledged during interaction-check, prescription is at {}",
                rx.stage
            )));
        }
        let mut review = rx.interaction_review.clone().ok_or_else(|| {
            CoreError::PreconditionFailed("interaction check has not run".to_string())
        })?;
        if !review.has_finding(finding_key) {
            return Err(CoreError::NotFound(format!("finding {}", finding_key)));
        }
        if review.is_acknowledged(finding_key) {
            return Ok(rx);
        }
        if review.severity_of(finding_key) == Some(InteractionSeverity::Severe)
            && !self.config.allow_severe_override
        {
            return Err(CoreError::PreconditionFailed(format!(
                "severe interaction {} cannot be overridden",
                finding_key
            )));
        }

        let now = self.clock.now_rfc3339()?;
        review.acknowledgements.push(Acknowledgement {
            finding_key: finding_key.to_string(),
            acknowledged_by: pharmacist.trim().to_string(),
            reason: reason.trim().to_string(),
            acknowledged_at: now.clone(),
        });
        let mut patch = PrescriptionPatch::at_version(rx.version);
        patch.interaction_review = Some(review);
        let updated = self.store.update(id, patch)?;
        self.record_committed(
            &now,
            "FINDING_ACKNOWLEDGED",
            id,
            Actor::User,
            json!({
                "finding_key": finding_key,
                "acknowledged_by": pharmacist.trim(),
                "reason": reason.trim()
            }),
        );
        warn!(prescription_id = %id, finding_key, pharmacist, "finding overridden");
        Ok(updated)
    }

    pub fn approve(&self, id: &str, pharmacist: &str) -> CoreResult<Prescription> {
        if pharmacist.trim().is_empty() {
            return Err(CoreError::InvalidInput("pharmacist is required".to_string()));
        }
        let rx = self.store.get(id)?;
        if rx.stage != WorkflowStage::PharmacistApproval {
            return Err(CoreError::PreconditionFailed(format!(
                "approval is only possible at pharmacist-approval, prescription is at {}",
                rx.stage
            )));
        }
        let now = self.clock.now_rfc3339()?;
        let mut patch = PrescriptionPatch::at_version(rx.version);
        patch.approved_by = Some(pharmacist.trim().to_string());
        let updated = self.store.update(id, patch)?;
        self.record_committed(
            &now,
            "PHARMACIST_APPROVED",
            id,
            Actor::User,
            json!({ "approved_by": pharmacist.trim() }),
        );
        Ok(updated)
    }

    pub fn update_notes(&self, id: &str, notes: &str) -> CoreResult<Prescription> {
        let rx = self.store.get(id)?;
        let now = self.clock.now_rfc3339()?;
        let mut patch = PrescriptionPatch::at_version(rx.version);
        patch.notes = Some(notes.to_string());
        let updated = self.store.update(id, patch)?;
        self.record_committed(
            &now,
            "PRESCRIPTION_NOTES_UPDATED",
            id,
            Actor::User,
            json!({ "length": notes.len() }),
        );
        Ok(updated)
    }

    /// Repeats the prescriber lookup for a prescription held at verification.
    pub fn reverify_prescriber(&self, id: &str) -> CoreResult<Prescription> {
        let rx = self.store.get(id)?;
        if rx.stage != WorkflowStage::Verification {
            return Err(CoreError::PreconditionFailed(format!(
                "prescriber can only be re-verified at verification, prescription is at {}",
                rx.stage
            )));
        }
        let now = self.clock.now_rfc3339()?;
        let mut patch = PrescriptionPatch::at_version(rx.version);
        let (event_type, details) = self.run_verification(&rx, &now, &mut patch)?;
        let updated = self.store.update(id, patch)?;
        self.record_committed(&now, event_type, id, Actor::User, details);
        Ok(updated)
    }

    /// Repeats batch selection for a prescription held at stock-check.
    pub fn recheck_stock(&self, id: &str) -> CoreResult<Prescription> {
        let rx = self.store.get(id)?;
        if rx.stage != WorkflowStage::StockCheck {
            return Err(CoreError::PreconditionFailed(format!(
                "stock can only be re-checked at stock-check, prescription is at {}",
                rx.stage
            )));
        }
        let now = self.clock.now_rfc3339()?;
        let mut patch = PrescriptionPatch::at_version(rx.version);
        let details = self.run_stock_check(&rx, &mut patch)?;
        let updated = self.store.update(id, patch)?;
        self.record_committed(&now, "STOCK_CHECK_COMPLETED", id, Actor::User, details);
        Ok(updated)
    }

    /// Receives stock into the ledger. Returns the batch's new quantity on hand.
    pub fn restock(&self, incoming: StockBatch) -> CoreResult<u32> {
        let now = self.clock.now_rfc3339()?;
        let batch_id = incoming.batch_id.clone();
        let quantity = incoming.quantity_on_hand;
        let on_hand = lock(&self.stock, "stock ledger")?.restock(incoming)?;
        // Inventory events are not tied to a prescription.
        self.record_committed(
            &now,
            "STOCK_RESTOCKED",
            "",
            Actor::User,
            json!({
                "batch_id": batch_id,
                "quantity": quantity,
                "quantity_on_hand": on_hand
            }),
        );
        info!(batch_id = %batch_id, quantity, on_hand, "stock received");
        Ok(on_hand)
    }

    pub fn stock_snapshot(&self) -> CoreResult<StockLedger> {
        Ok(lock(&self.stock, "stock ledger")?.clone())
    }

    pub fn audit_events(&self) -> CoreResult<Vec<AuditEvent>> {
        Ok(lock(&self.audit, "audit log")?.session_events().to_vec())
    }

    fn run_verification(
        &self,
        rx: &Prescription,
        now: &str,
        patch: &mut PrescriptionPatch,
    ) -> CoreResult<(&'static str, Value)> {
        let outcome = self.read_registry()?.verify(&rx.prescriber.license_number);
        if outcome.is_active() {
            patch.verified_at = Some(now.to_string());
        }
        let details = json!({
            "license_number": outcome.license_number(),
            "registration_status": outcome.registration_status().as_str()
        });
        patch.prescriber_verification = Some(outcome);
        Ok(("PRESCRIBER_VERIFIED", details))
    }

    fn run_interaction_check(
        &self,
        rx: &Prescription,
        now: &str,
        patch: &mut PrescriptionPatch,
    ) -> CoreResult<InteractionReview> {
        let interactions = self.checker.check_interactions(&rx.medications)?;
        let allergy_flags = screen_allergies(&rx.medications, &rx.patient.allergies);
        let mut meds = rx.medications.clone();
        for med in &mut meds {
            med.interactions = Some(
                interactions
                    .iter()
                    .filter(|i| i.involves(&med.name))
                    .cloned()
                    .collect(),
            );
            med.allergy_flags = Some(
                allergy_flags
                    .iter()
                    .filter(|f| f.medication == med.name)
                    .cloned()
                    .collect(),
            );
        }
        patch.medications = Some(meds);
        debug!(
            prescription_id = %rx.id,
            interactions = interactions.len(),
            allergy_flags = allergy_flags.len(),
            "interaction check finished"
        );
        Ok(InteractionReview {
            checked_at: now.to_string(),
            interactions,
            allergy_flags,
            acknowledgements: Vec::new(),
        })
    }

    fn run_stock_check(&self, rx: &Prescription, patch: &mut PrescriptionPatch) -> CoreResult<Value> {
        let today = self.clock.today()?;
        let mut scratch = lock(&self.stock, "stock ledger")?.clone();
        let mut meds = rx.medications.clone();
        let mut selected = Vec::new();
        for med in &mut meds {
            let batch_id = scratch
                .select_batch(med, &today)
                .map(|b| b.batch_id.clone());
            match batch_id {
                Some(b) => {
                    // Two lines drawing on one batch must both fit.
                    scratch.deduct(&b, med.quantity)?;
                    med.in_stock = true;
                    med.selected_batch = Some(b.clone());
                    selected.push(b);
                }
                None => {
                    med.in_stock = false;
                    med.selected_batch = None;
                }
            }
        }
        let all_in_stock = meds.iter().all(|m| m.in_stock);
        patch.medications = Some(meds);
        Ok(json!({ "all_in_stock": all_in_stock, "selected_batches": selected }))
    }

    /// Logs and audits a refused transition, returning the error to surface.
    fn reject(
        &self,
        rx: &Prescription,
        target: WorkflowStage,
        reason: String,
    ) -> CoreResult<CoreError> {
        warn!(
            prescription_id = %rx.id,
            from = %rx.stage,
            to = %target,
            reason = %reason,
            "transition rejected"
        );
        let now = self.clock.now_rfc3339()?;
        self.record(
            &now,
            "PRESCRIPTION_TRANSITION_REJECTED",
            &rx.id,
            Actor::System,
            json!({
                "from_stage": rx.stage.as_str(),
                "to_stage": target.as_str(),
                "reason": reason
            }),
        )?;
        Ok(CoreError::PreconditionFailed(format!(
            "{} -> {}: {}",
            rx.stage, target, reason
        )))
    }

    fn record(
        &self,
        ts: &str,
        event_type: &str,
        prescription_id: &str,
        actor: Actor,
        details: Value,
    ) -> CoreResult<()> {
        lock(&self.audit, "audit log")?.append(AuditEvent::new(
            ts,
            event_type,
            prescription_id,
            actor,
            details,
        ))?;
        Ok(())
    }

    /// Appends an event for a change the store has already committed.
    fn record_committed(
        &self,
        ts: &str,
        event_type: &str,
        prescription_id: &str,
        actor: Actor,
        details: Value,
    ) {
        if let Err(e) = self.record(ts, event_type, prescription_id, actor, details) {
            error!(
                prescription_id = %prescription_id,
                event_type,
                error = %e,
                "audit append failed after commit"
            );
        }
    }

    fn read_registry(&self) -> CoreResult<RwLockReadGuard<'_, PrescriberRegistry>> {
        self.registry
            .read()
            .map_err(|_| CoreError::Conflict("prescriber registry lock poisoned".to_string()))
    }
}

fn lock<'a, T>(m: &'a Mutex<T>, what: &str) -> CoreResult<MutexGuard<'a, T>> {
    m.lock()
        .map_err(|_| CoreError::Conflict(format!("{} lock poisoned", what)))
}
