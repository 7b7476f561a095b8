//! Allocation domain module.
//!
//! This crate contains the business rules for allocating customer order lines
//! to purchase batches, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod batch;
pub mod service;

pub use batch::{Batch, OrderLine};
pub use service::{allocate, OutOfStock};
