//! Product catalog domain module.
//!
//! A product is a reusable template for a SKU: how long the goods keep, how
//! many days ahead to warn, and where they are normally stored. This crate
//! holds the template type and its write-time validation, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod sample;
pub mod sku;

pub use product::{Product, ProductDraft, ProductPatch};
pub use sample::sample_catalog;
pub use sku::{SKU_LEN, Sku};
