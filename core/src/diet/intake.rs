use super::model::DietPlanInput;
use crate::error::CoreResult;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// Raw submitted form: field name to the string the user typed.
pub type DietPlanForm = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Integer(u32),
    Decimal(f64),
}

/// Boundary defaulting policy, one row per `DietPlanInput` field (wire names).
pub const DIET_FIELD_DEFAULTS: &[(&str, FieldDefault)] = &[
    ("patientName", FieldDefault::Text("Patient")),
    ("age", FieldDefault::Integer(30)),
    ("gender", FieldDefault::Text("not specified")),
    ("heightCm", FieldDefault::Decimal(170.0)),
    ("weightKg", FieldDefault::Decimal(70.0)),
    ("activityLevel", FieldDefault::Text("moderately active")),
    ("healthGoals", FieldDefault::Text("general wellness")),
    ("medicalConditions", FieldDefault::Text("none")),
    ("currentMedications", FieldDefault::Text("none")),
    ("allergies", FieldDefault::Text("none")),
    ("dietaryPreference", FieldDefault::Text("no restrictions")),
    ("cuisinePreference", FieldDefault::Text("any")),
    ("mealsPerDay", FieldDefault::Integer(3)),
    ("planDuration", FieldDefault::Text("7 days")),
    ("budget", FieldDefault::Text("moderate")),
    ("cookingSkill", FieldDefault::Text("intermediate")),
];

/// Applies `DIET_FIELD_DEFAULTS` to a raw form. Blank text, unparsable or
/// non-positive numbers and missing fields all take the default; unknown
/// form keys are ignored.
pub fn normalize_form(form: &DietPlanForm) -> CoreResult<DietPlanInput> {
    let mut obj = Map::new();
    for (key, default) in DIET_FIELD_DEFAULTS {
        let raw = form.get(*key).map(|s| s.trim()).filter(|s| !s.is_empty());
        let value = match (default, raw) {
            (FieldDefault::Text(d), raw) => Value::from(raw.unwrap_or(*d)),
            (FieldDefault::Integer(d), raw) => {
                Value::from(raw.and_then(leading_integer).filter(|n| *n > 0).unwrap_or(*d))
            }
            (FieldDefault::Decimal(d), raw) => Value::from(
                raw.and_then(leading_decimal)
                    .filter(|n| *n > 0.0)
                    .unwrap_or(*d),
            ),
        };
        if raw.is_none() {
            debug!(field = *key, "diet form field defaulted");
        }
        obj.insert((*key).to_string(), value);
    }
    for key in form.keys() {
        if !DIET_FIELD_DEFAULTS.iter().any(|(k, _)| *k == key.as_str()) {
            debug!(field = %key, "ignoring unknown diet form field");
        }
    }
    Ok(serde_json::from_value(Value::Object(obj))?)
}

fn leading_number_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?(\d+(?:\.\d+)?)").ok())
        .as_ref()
}

/// Integer prefix of `s`, e.g. `"30 years"` -> 30, `"30.9"` -> 30.
fn leading_integer(s: &str) -> Option<u32> {
    let caps = leading_number_re()?.captures(s)?;
    let digits = caps.get(1)?.as_str();
    digits.split('.').next()?.parse().ok()
}

fn leading_decimal(s: &str) -> Option<f64> {
    let caps = leading_number_re()?.captures(s)?;
    caps.get(1)?.as_str().parse().ok()
}
