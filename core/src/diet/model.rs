use serde::{Deserialize, Deserializer, Serialize};

/// Schema-typed diet planner request, after boundary defaulting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DietPlanInput {
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: String,
    pub health_goals: String,
    pub medical_conditions: String,
    pub current_medications: String,
    pub allergies: String,
    pub dietary_preference: String,
    pub cuisine_preference: String,
    pub meals_per_day: u32,
    pub plan_duration: String,
    pub budget: String,
    pub cooking_skill: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct QuickSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub overview: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key_goals: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub calorie_target: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyNutrition {
    #[serde(deserialize_with = "lenient_string")]
    pub calories: String,
    #[serde(deserialize_with = "lenient_string")]
    pub protein: String,
    #[serde(deserialize_with = "lenient_string")]
    pub carbohydrates: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fat: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fiber: String,
    #[serde(deserialize_with = "lenient_string")]
    pub water: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Meal {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub calories: String,
    #[serde(deserialize_with = "lenient_string")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DayPlan {
    #[serde(deserialize_with = "lenient_string")]
    pub day: String,
    #[serde(deserialize_with = "null_as_default")]
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct GroceryCategory {
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FoodInteraction {
    #[serde(deserialize_with = "lenient_string")]
    pub medication: String,
    #[serde(deserialize_with = "lenient_string")]
    pub food: String,
    #[serde(deserialize_with = "lenient_string")]
    pub effect: String,
    #[serde(deserialize_with = "lenient_string")]
    pub advice: String,
}

/// Generated plan. Every section may be missing or null in the generator's
/// output and decodes to empty instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DietPlanOutput {
    #[serde(deserialize_with = "null_as_default")]
    pub quick_summary: QuickSummary,
    #[serde(deserialize_with = "null_as_default")]
    pub daily_nutrition: DailyNutrition,
    #[serde(deserialize_with = "null_as_default")]
    pub meal_plan: Vec<DayPlan>,
    #[serde(deserialize_with = "null_as_default")]
    pub grocery_list: Vec<GroceryCategory>,
    #[serde(deserialize_with = "null_as_default")]
    pub medication_interactions: Vec<FoodInteraction>,
    #[serde(deserialize_with = "null_as_default")]
    pub monitoring_checklist: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub eating_out_tips: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub disclaimers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DietPlanResponse {
    Error { error: String },
    Plan(DietPlanOutput),
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
