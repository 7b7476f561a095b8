use std::collections::HashMap;
use std::sync::RwLock;

use stockalloc_allocation::Batch;
use stockalloc_core::BatchRef;

use super::r#trait::{BatchRepository, RepositoryError};

/// In-memory batch repository.
///
/// Intended for tests/dev. Batches are stored by value; `get` hands out a
/// clone, so mutations only become visible to other callers once persisted
/// again by the owner of the store.
#[derive(Debug, Default)]
pub struct InMemoryBatchRepository {
    batches: RwLock<HashMap<BatchRef, Batch>>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-seeded with `batches`.
    ///
    /// Fails on duplicate references, same as repeated `add` calls would.
    pub fn with_batches(
        batches: impl IntoIterator<Item = Batch>,
    ) -> Result<Self, RepositoryError> {
        let repo = Self::new();
        for batch in batches {
            repo.add(batch)?;
        }
        Ok(repo)
    }
}

impl BatchRepository for InMemoryBatchRepository {
    fn add(&self, batch: Batch) -> Result<(), RepositoryError> {
        let mut batches = self
            .batches
            .write()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;

        if batches.contains_key(batch.reference()) {
            return Err(RepositoryError::Conflict(format!(
                "batch '{}' already exists",
                batch.reference()
            )));
        }

        batches.insert(batch.reference().clone(), batch);
        Ok(())
    }

    fn get(&self, reference: &BatchRef) -> Result<Batch, RepositoryError> {
        let batches = self
            .batches
            .read()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;

        batches
            .get(reference)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(reference.clone()))
    }

    fn list(&self) -> Result<Vec<Batch>, RepositoryError> {
        let batches = self
            .batches
            .read()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;

        Ok(batches.values().cloned().collect())
    }
}
