pub mod clock;
pub mod ids;
pub mod json_canonical;
