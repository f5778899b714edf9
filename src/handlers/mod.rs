// Handler modules
pub mod analyze;
pub mod validate;
