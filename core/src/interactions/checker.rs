use super::model::{Interaction, InteractionSeverity};
use crate::error::CoreResult;
use crate::prescription::model::Medication;

/// Evaluates a medication list for drug-drug interactions.
///
/// `Ok(vec![])` means no interactions were found; an unreachable or broken
/// knowledge source must report `CoreError::CheckerUnavailable` instead.
pub trait InteractionChecker: Send + Sync {
    fn check_interactions(&self, medications: &[Medication]) -> CoreResult<Vec<Interaction>>;
}

/// Returns the same result set for every non-empty medication list.
#[derive(Debug, Clone)]
pub struct FixedInteractionChecker {
    fixed: Vec<Interaction>,
}

impl FixedInteractionChecker {
    pub fn new(fixed: Vec<Interaction>) -> Self {
        Self { fixed }
    }

    pub fn demo() -> Self {
        Self::new(vec![
            Interaction {
                severity: InteractionSeverity::Moderate,
                description: "ACE inhibitors may raise serum potassium when combined with potassium supplements.".to_string(),
                recommendation: "Monitor potassium levels; counsel patient on hyperkalemia symptoms.".to_string(),
                drug_pair: ["Lisinopril".to_string(), "Potassium Chloride".to_string()],
            },
            Interaction {
                severity: InteractionSeverity::Minor,
                description: "Metformin absorption may be slightly reduced when taken with food high in fibre.".to_string(),
                recommendation: "Take consistently with meals.".to_string(),
                drug_pair: ["Metformin".to_string(), "Psyllium".to_string()],
            },
        ])
    }
}

impl InteractionChecker for FixedInteractionChecker {
    fn check_interactions(&self, medications: &[Medication]) -> CoreResult<Vec<Interaction>> {
        if medications.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.fixed.clone())
    }
}

#[derive(Debug, Clone)]
pub struct InteractionRule {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: InteractionSeverity,
    pub description: String,
    pub recommendation: String,
}

/// Pairwise lookup against a rule table keyed by lowercase drug name.
#[derive(Debug, Clone)]
pub struct TableInteractionChecker {
    rules: Vec<InteractionRule>,
}

impl TableInteractionChecker {
    pub fn new(rules: Vec<InteractionRule>) -> Self {
        Self { rules }
    }

    pub fn with_builtin_rules() -> Self {
        let rule = |a: &str, b: &str, severity, description: &str, recommendation: &str| {
            InteractionRule {
                drug_a: a.to_string(),
                drug_b: b.to_string(),
                severity,
                description: description.to_string(),
                recommendation: recommendation.to_string(),
            }
        };
        Self::new(vec![
            rule(
                "warfarin",
                "aspirin",
                InteractionSeverity::Severe,
                "Additive anticoagulant and antiplatelet effect; major bleeding risk.",
                "Avoid combination unless specifically indicated; monitor INR closely.",
            ),
            rule(
                "simvastatin",
                "clarithromycin",
                InteractionSeverity::Severe,
                "CYP3A4 inhibition raises statin exposure; rhabdomyolysis risk.",
                "Suspend simvastatin for the antibiotic course.",
            ),
            rule(
                "sildenafil",
                "nitroglycerin",
                InteractionSeverity::Severe,
                "Profound hypotension.",
                "Contraindicated; do not dispense together.",
            ),
            rule(
                "lisinopril",
                "ibuprofen",
                InteractionSeverity::Moderate,
                "NSAIDs blunt the antihypertensive effect and may impair renal function.",
                "Prefer paracetamol for analgesia; monitor blood pressure and creatinine.",
            ),
            rule(
                "lisinopril",
                "potassium chloride",
                InteractionSeverity::Moderate,
                "ACE inhibitors may raise serum potassium.",
                "Monitor potassium levels.",
            ),
            rule(
                "metformin",
                "furosemide",
                InteractionSeverity::Minor,
                "Furosemide may increase metformin plasma concentration.",
                "Monitor blood glucose.",
            ),
            rule(
                "amlodipine",
                "simvastatin",
                InteractionSeverity::Moderate,
                "Amlodipine raises simvastatin exposure.",
                "Limit simvastatin to 20 mg daily.",
            ),
        ])
    }

    fn lookup(&self, a: &str, b: &str) -> Option<&InteractionRule> {
        self.rules.iter().find(|r| {
            (matches_drug(a, &r.drug_a) && matches_drug(b, &r.drug_b))
                || (matches_drug(a, &r.drug_b) && matches_drug(b, &r.drug_a))
        })
    }
}

impl InteractionChecker for TableInteractionChecker {
    fn check_interactions(&self, medications: &[Medication]) -> CoreResult<Vec<Interaction>> {
        let mut out = Vec::new();
        for (i, a) in medications.iter().enumerate() {
            for b in &medications[i + 1..] {
                if let Some(rule) = self.lookup(&a.name, &b.name) {
                    out.push(Interaction {
                        severity: rule.severity,
                        description: rule.description.clone(),
                        recommendation: rule.recommendation.clone(),
                        drug_pair: [a.name.clone(), b.name.clone()],
                    });
                }
            }
        }
        out.sort_by(|x, y| y.severity.cmp(&x.severity));
        Ok(out)
    }
}

fn matches_drug(medication_name: &str, drug: &str) -> bool {
    medication_name.trim().to_lowercase().contains(drug)
}
