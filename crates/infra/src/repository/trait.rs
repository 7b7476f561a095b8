use std::sync::Arc;

use thiserror::Error;

use stockalloc_allocation::Batch;
use stockalloc_core::BatchRef;

/// Repository operation error.
///
/// These are **infrastructure errors** (storage, conflicts, missing rows) as
/// opposed to domain errors (validation, invariants). They are propagated to
/// the caller unmodified; the repository never synthesizes a default batch.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A batch with the same reference already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No batch with the requested reference exists in storage.
    #[error("batch not found: {0}")]
    NotFound(BatchRef),

    /// Backend failure (connection, serialization, poisoned lock, ...).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Load/save boundary for `Batch` aggregates.
///
/// ## Design Principles
///
/// - **No storage assumptions**: works with an in-memory implementation
///   (tests/dev) and SQL backends (production)
/// - **Whole aggregates**: `get` reconstructs the full allocation set, so a
///   loaded batch answers `available_quantity()` correctly without further
///   queries
/// - **One direction**: the domain core takes this capability as a
///   dependency; implementations depend on the domain, never the reverse
///
/// ## Concurrency
///
/// The domain model provides no locking. If two allocation requests for the
/// same sku run against the same stored batch set, implementations are the
/// place for row-level locking or version checks.
pub trait BatchRepository: Send + Sync {
    /// Persist a new batch aggregate, including its current allocations.
    ///
    /// Fails with [`RepositoryError::Conflict`] when a batch with the same
    /// reference is already stored.
    fn add(&self, batch: Batch) -> Result<(), RepositoryError>;

    /// Load a batch by reference, with its full allocation set.
    ///
    /// Fails with [`RepositoryError::NotFound`] when no such batch exists.
    fn get(&self, reference: &BatchRef) -> Result<Batch, RepositoryError>;

    /// All known batches, in unspecified order.
    fn list(&self) -> Result<Vec<Batch>, RepositoryError>;
}

impl<R> BatchRepository for Arc<R>
where
    R: BatchRepository + ?Sized,
{
    fn add(&self, batch: Batch) -> Result<(), RepositoryError> {
        (**self).add(batch)
    }

    fn get(&self, reference: &BatchRef) -> Result<Batch, RepositoryError> {
        (**self).get(reference)
    }

    fn list(&self) -> Result<Vec<Batch>, RepositoryError> {
        (**self).list()
    }
}
