use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Severe,
}

impl InteractionSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionSeverity::Minor => "minor",
            InteractionSeverity::Moderate => "moderate",
            InteractionSeverity::Severe => "severe",
        }
    }
}

/// Pairwise drug-drug warning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interaction {
    pub severity: InteractionSeverity,
    pub description: String,
    pub recommendation: String,
    pub drug_pair: [String; 2],
}

impl Interaction {
    /// Order-independent key, e.g. `aspirin+warfarin`.
    pub fn finding_key(&self) -> String {
        let mut pair = [
            self.drug_pair[0].trim().to_lowercase(),
            self.drug_pair[1].trim().to_lowercase(),
        ];
        pair.sort();
        format!("{}+{}", pair[0], pair[1])
    }

    pub fn involves(&self, medication_name: &str) -> bool {
        let name = medication_name.to_lowercase();
        self.drug_pair
            .iter()
            .any(|d| name.contains(&d.to_lowercase()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllergyFlag {
    pub medication: String,
    pub allergen: String,
}

impl AllergyFlag {
    pub fn finding_key(&self) -> String {
        format!(
            "allergy:{}:{}",
            self.allergen.trim().to_lowercase(),
            self.medication.trim().to_lowercase()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgement {
    pub finding_key: String,
    pub acknowledged_by: String,
    pub reason: String,
    pub acknowledged_at: String,
}

/// Interaction-check result kept on the prescription so later stages can see
/// which findings were raised and which were overridden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionReview {
    pub checked_at: String,
    pub interactions: Vec<Interaction>,
    pub allergy_flags: Vec<AllergyFlag>,
    #[serde(default)]
    pub acknowledgements: Vec<Acknowledgement>,
}

impl InteractionReview {
    pub fn is_acknowledged(&self, finding_key: &str) -> bool {
        self.acknowledgements
            .iter()
            .any(|a| a.finding_key == finding_key)
    }

    /// Finding keys that still block the stock-check transition.
    pub fn unresolved_blocking(&self) -> Vec<String> {
        let severe = self
            .interactions
            .iter()
            .filter(|i| i.severity == InteractionSeverity::Severe)
            .map(Interaction::finding_key);
        let allergies = self.allergy_flags.iter().map(AllergyFlag::finding_key);
        severe
            .chain(allergies)
            .filter(|k| !self.is_acknowledged(k))
            .collect()
    }

    pub fn has_finding(&self, finding_key: &str) -> bool {
        self.interactions
            .iter()
            .any(|i| i.finding_key() == finding_key)
            || self
                .allergy_flags
                .iter()
                .any(|a| a.finding_key() == finding_key)
    }

    pub fn severity_of(&self, finding_key: &str) -> Option<InteractionSeverity> {
        self.interactions
            .iter()
            .find(|i| i.finding_key() == finding_key)
            .map(|i| i.severity)
    }
}
