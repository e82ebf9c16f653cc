use super::intake::{normalize_form, DietPlanForm};
use super::model::{DietPlanInput, DietPlanOutput, DietPlanResponse};
use crate::error::CoreResult;
use serde_json::Value;
use tracing::{error, info};

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to generate diet plan. Please try again later.";

/// External plan generator. Returns the raw JSON the generation flow produced,
/// which may itself be an `{"error": "..."}` object.
pub trait DietPlanGenerator {
    fn generate(&self, input: &DietPlanInput) -> CoreResult<Value>;
}

/// Normalizes the form, calls the generator once and decodes the result.
/// Failures never escape as `Err`; they come back as `DietPlanResponse::Error`.
pub fn request_diet_plan<G: DietPlanGenerator + ?Sized>(
    generator: &G,
    form: &DietPlanForm,
) -> DietPlanResponse {
    let input = match normalize_form(form) {
        Ok(i) => i,
        Err(e) => {
            error!(error = %e, "diet form normalization failed");
            return failure();
        }
    };
    let raw = match generator.generate(&input) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "diet plan generation failed");
            return failure();
        }
    };
    if let Some(msg) = raw.get("error").and_then(Value::as_str) {
        error!(error = msg, "diet plan generator reported an error");
        return DietPlanResponse::Error {
            error: msg.to_string(),
        };
    }
    match serde_json::from_value::<DietPlanOutput>(raw) {
        Ok(plan) => {
            info!(
                days = plan.meal_plan.len(),
                grocery_categories = plan.grocery_list.len(),
                "diet plan generated"
            );
            DietPlanResponse::Plan(plan)
        }
        Err(e) => {
            error!(error = %e, "diet plan output could not be decoded");
            failure()
        }
    }
}

fn failure() -> DietPlanResponse {
    DietPlanResponse::Error {
        error: GENERIC_FAILURE_MESSAGE.to_string(),
    }
}
