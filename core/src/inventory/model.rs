use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockBatch {
    pub batch_id: String,
    pub medication_name: String,
    pub strength: String,
    pub quantity_on_hand: u32,
    pub expiry_date: String, // YYYY-MM-DD
}

impl StockBatch {
    pub fn matches(&self, name: &str, strength: &str) -> bool {
        normalize(&self.medication_name) == normalize(name)
            && normalize(&self.strength) == normalize(strength)
    }

    /// ISO dates compare correctly as strings.
    pub fn is_expired_on(&self, today: &str) -> bool {
        self.expiry_date.as_str() < today
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<String>().to_lowercase()
}
