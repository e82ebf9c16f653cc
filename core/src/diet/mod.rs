pub mod intake;
pub mod model;
pub mod planner;
