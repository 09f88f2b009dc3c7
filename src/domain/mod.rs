//! Domain module - canonical product records and their validation
//!
//! Every source adapter maps its raw data onto these types; the validator
//! decides whether a candidate record is accepted.

pub mod product;
pub mod validation;

// Re-export commonly used items
pub use product::{Model, ProductRecord, Variant};
pub use validation::validate;
