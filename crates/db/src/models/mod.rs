//! Row models and DTOs, one module per table.

pub mod dashboard;
pub mod script;
pub mod session;
pub mod user;
pub mod video;
