use super::model::StockBatch;
use crate::error::{CoreError, CoreResult};
use crate::prescription::model::Medication;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    batches: Vec<StockBatch>,
}

impl StockLedger {
    pub fn new(batches: Vec<StockBatch>) -> Self {
        Self { batches }
    }

    /// Loads a JSON array of `StockBatch`.
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(Self::new(serde_json::from_slice(&bytes)?))
    }

    pub fn with_demo_batches() -> Self {
        let batch = |id: &str, name: &str, strength: &str, qty: u32, expiry: &str| StockBatch {
            batch_id: id.to_string(),
            medication_name: name.to_string(),
            strength: strength.to_string(),
            quantity_on_hand: qty,
            expiry_date: expiry.to_string(),
        };
        Self::new(vec![
            batch("MET-2401", "Metformin", "500mg", 240, "2027-06-30"),
            batch("MET-2312", "Metformin", "500mg", 60, "2026-12-31"),
            batch("LIS-2403", "Lisinopril", "10mg", 300, "2027-09-30"),
            batch("AMX-2402", "Amoxicillin", "500mg", 120, "2026-11-30"),
            batch("ATV-2405", "Atorvastatin", "20mg", 180, "2027-12-31"),
            batch("WAR-2401", "Warfarin", "5mg", 90, "2027-03-31"),
            batch("ASP-2404", "Aspirin", "81mg", 500, "2028-01-31"),
            batch("IBU-2402", "Ibuprofen", "400mg", 200, "2027-05-31"),
        ])
    }

    pub fn batches(&self) -> &[StockBatch] {
        &self.batches
    }

    pub fn available(&self, name: &str, strength: &str, today: &str) -> u32 {
        self.batches
            .iter()
            .filter(|b| b.matches(name, strength) && !b.is_expired_on(today))
            .map(|b| b.quantity_on_hand)
            .sum()
    }

    /// Picks the batch to fill `med` from: the medication's pre-selected batch
    /// when it is still usable, otherwise the earliest-expiring non-expired
    /// batch that can cover the whole quantity.
    pub fn select_batch(&self, med: &Medication, today: &str) -> Option<&StockBatch> {
        let usable = |b: &&StockBatch| {
            b.matches(&med.name, &med.strength)
                && !b.is_expired_on(today)
                && b.quantity_on_hand >= med.quantity
        };
        if let Some(pre) = med.selected_batch.as_deref() {
            if let Some(b) = self.batches.iter().filter(usable).find(|b| b.batch_id == pre) {
                return Some(b);
            }
        }
        self.batches
            .iter()
            .filter(usable)
            .min_by(|a, b| a.expiry_date.cmp(&b.expiry_date))
    }

    pub fn deduct(&mut self, batch_id: &str, quantity: u32) -> CoreResult<u32> {
        let batch = self
            .batches
            .iter_mut()
            .find(|b| b.batch_id == batch_id)
            .ok_or_else(|| CoreError::NotFound(format!("stock batch {}", batch_id)))?;
        if batch.quantity_on_hand < quantity {
            return Err(CoreError::PreconditionFailed(format!(
                "batch {} holds {} units, {} requested",
                batch_id, batch.quantity_on_hand, quantity
            )));
        }
        batch.quantity_on_hand -= quantity;
        Ok(batch.quantity_on_hand)
    }

    /// Adds to an existing batch or registers a new one. Returns the batch's
    /// quantity on hand afterwards.
    pub fn restock(&mut self, incoming: StockBatch) -> CoreResult<u32> {
        match self
            .batches
            .iter_mut()
            .find(|b| b.batch_id == incoming.batch_id)
        {
            Some(existing) => {
                let total = existing
                    .quantity_on_hand
                    .checked_add(incoming.quantity_on_hand)
                    .ok_or_else(|| {
                        CoreError::InvalidInput(format!(
                            "restocking batch {} would overflow its quantity",
                            existing.batch_id
                        ))
                    })?;
                existing.quantity_on_hand = total;
                Ok(total)
            }
            None => {
                let on_hand = incoming.quantity_on_hand;
                self.batches.push(incoming);
                Ok(on_hand)
            }
        }
    }
}
