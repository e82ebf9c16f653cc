pub mod audit;
pub mod config;
pub mod determinism;
pub mod diet;
pub mod interactions;
pub mod inventory;
pub mod prescriber;
pub mod prescription;
pub mod report;
pub mod store;
pub mod telemetry;

pub mod error;
