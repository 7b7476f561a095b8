//! Infrastructure layer: persistence adapters for the allocation domain.
//!
//! The domain core never imports a concrete backend; it sees batches only
//! through the [`repository::BatchRepository`] capability. This crate provides
//! that trait plus an in-memory implementation (tests/dev) and a
//! Postgres-backed one (production).

pub mod repository;


pub use repository::{
    BatchRepository, InMemoryBatchRepository, PostgresBatchRepository, RepositoryError,
};
