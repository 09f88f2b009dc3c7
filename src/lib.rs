//! Product Harvester - e-commerce product record extraction
//!
//! Pulls one product record from each configured storefront, normalizes it
//! into a common shape, validates it and persists it as pretty-printed JSON.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;
