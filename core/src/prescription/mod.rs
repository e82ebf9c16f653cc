pub mod guards;
pub mod model;
pub mod stage;
pub mod workflow;
