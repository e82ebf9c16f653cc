pub mod filter;
pub mod memory;

use crate::error::CoreResult;
use crate::prescription::model::{Prescription, PrescriptionPatch};
pub use filter::PrescriptionFilter;
pub use memory::InMemoryPrescriptionStore;

/// Persistence seam for prescription records.
///
/// `update` must reject a patch whose `expected_version` differs from the stored
/// record with `CoreError::Conflict`, and bump `version` on every successful write.
pub trait PrescriptionStore: Send + Sync {
    fn create(&self, prescription: Prescription) -> CoreResult<String>;
    fn get(&self, id: &str) -> CoreResult<Prescription>;
    fn list(&self, filter: &PrescriptionFilter) -> CoreResult<Vec<Prescription>>;
    fn update(&self, id: &str, patch: PrescriptionPatch) -> CoreResult<Prescription>;
}
