//! Batch persistence boundary.
//!
//! This module defines the storage-facing abstraction for saving and loading
//! `Batch` aggregates without making any storage assumptions. Consistency
//! across concurrent callers is this layer's job (e.g. row locks in the
//! Postgres backend), never the domain's.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryBatchRepository;
pub use postgres::PostgresBatchRepository;
pub use r#trait::{BatchRepository, RepositoryError};
