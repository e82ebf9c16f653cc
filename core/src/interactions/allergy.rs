use super::model::AllergyFlag;
use crate::prescription::model::Medication;

// allergen (lowercase) -> members of the drug class
const ALLERGY_CLASSES: &[(&str, &[&str])] = &[
    (
        "penicillin",
        &["amoxicillin", "ampicillin", "piperacillin", "flucloxacillin", "penicillin"],
    ),
    ("sulfa", &["sulfamethoxazole", "sulfasalazine", "sulfadiazine"]),
    ("nsaid", &["ibuprofen", "naproxen", "diclofenac", "aspirin"]),
    ("cephalosporin", &["cefalexin", "ceftriaxone", "cefuroxime"]),
];

/// Flags every medication whose name matches a patient allergen, either
/// directly or through a known drug class.
pub fn screen_allergies(medications: &[Medication], allergies: &[String]) -> Vec<AllergyFlag> {
    let mut flags = Vec::new();
    for med in medications {
        let name = med.name.trim().to_lowercase();
        for allergen in allergies {
            let a = allergen.trim().to_lowercase();
            if a.is_empty() || a == "none" {
                continue;
            }
            let class_hit = ALLERGY_CLASSES
                .iter()
                .filter(|(class, _)| a.contains(class))
                .any(|(_, members)| members.iter().any(|m| name.contains(m)));
            if name.contains(&a) || class_hit {
                flags.push(AllergyFlag {
                    medication: med.name.clone(),
                    allergen: allergen.trim().to_string(),
                });
            }
        }
    }
    flags
}
