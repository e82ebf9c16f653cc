use super::filter::PrescriptionFilter;
use super::PrescriptionStore;
use crate::error::{CoreError, CoreResult};
use crate::prescription::model::{Prescription, PrescriptionPatch};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Inner {
    records: HashMap<String, Prescription>,
    order: Vec<String>,
}

/// Session-lifetime store. Records come back from `list` in creation order.
#[derive(Default)]
pub struct InMemoryPrescriptionStore {
    inner: RwLock<Inner>,
}

impl InMemoryPrescriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| CoreError::Conflict("prescription store lock poisoned".to_string()))
    }

    fn write(&self) -> CoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| CoreError::Conflict("prescription store lock poisoned".to_string()))
    }
}

impl PrescriptionStore for InMemoryPrescriptionStore {
    fn create(&self, prescription: Prescription) -> CoreResult<String> {
        let mut inner = self.write()?;
        let id = prescription.id.clone();
        if inner.records.contains_key(&id) {
            return Err(CoreError::Conflict(format!("prescription {} already exists", id)));
        }
        inner.order.push(id.clone());
        inner.records.insert(id.clone(), prescription);
        Ok(id)
    }

    fn get(&self, id: &str) -> CoreResult<Prescription> {
        self.read()?
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("prescription {}", id)))
    }

    fn list(&self, filter: &PrescriptionFilter) -> CoreResult<Vec<Prescription>> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|rx| filter.matches(rx))
            .cloned()
            .collect())
    }

    fn update(&self, id: &str, patch: PrescriptionPatch) -> CoreResult<Prescription> {
        let mut inner = self.write()?;
        let rx = inner
            .records
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("prescription {}", id)))?;
        if let Some(expected) = patch.expected_version {
            if rx.version != expected {
                return Err(CoreError::Conflict(format!(
                    "prescription {} is at version {}, update expected {}",
                    id, rx.version, expected
                )));
            }
        }
        patch.apply_to(rx);
        rx.version += 1;
        Ok(rx.clone())
    }
}
