pub mod allergy;
pub mod checker;
pub mod model;
