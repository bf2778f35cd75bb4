//! Stock ledger domain module.
//!
//! This crate contains the business rules for per-product available stock,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage). The storage layer invokes these mutations under its own
//! transaction lock, which is what makes them atomic.

pub mod product;

pub use product::ProductRecord;
