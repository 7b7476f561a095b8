//! Postgres-backed batch repository.
//!
//! Persists batches in three tables: `batches` (one row per purchased lot),
//! `order_lines` (one row per allocated line) and `allocations` (the join
//! between them). `get` rehydrates a batch by replaying its stored lines
//! through `Batch::allocate`, so a loaded aggregate enforces the same
//! invariants as a fresh one.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError | Scenario |
//! |------------|----------------------|-----------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate batch reference |
//! | Database (other) | Any other | `Storage` | Constraint/connection/database failure |
//! | Anything else | N/A | `Storage` | Pool closed, network errors, decode failures |
//!
//! ## Thread Safety
//!
//! `PostgresBatchRepository` is `Send + Sync` and can be shared across
//! threads; all operations go through the SQLx connection pool.

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::instrument;

use stockalloc_allocation::{Batch, OrderLine};
use stockalloc_core::{BatchRef, OrderId, Sku};

use super::r#trait::{BatchRepository, RepositoryError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS batches (
        id BIGSERIAL PRIMARY KEY,
        reference TEXT NOT NULL UNIQUE,
        sku TEXT NOT NULL,
        purchased_quantity BIGINT NOT NULL CHECK (purchased_quantity >= 0),
        eta DATE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_lines (
        id BIGSERIAL PRIMARY KEY,
        order_id TEXT NOT NULL,
        sku TEXT NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity > 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS allocations (
        order_line_id BIGINT NOT NULL REFERENCES order_lines (id),
        batch_id BIGINT NOT NULL REFERENCES batches (id),
        PRIMARY KEY (order_line_id, batch_id)
    )
    "#,
];

/// Postgres-backed implementation of [`BatchRepository`].
///
/// The unique constraint on `batches.reference` is what turns a concurrent
/// double-`add` into a [`RepositoryError::Conflict`] instead of silent
/// duplication; the domain model itself carries no concurrency guard.
#[derive(Debug, Clone)]
pub struct PostgresBatchRepository {
    pool: Arc<PgPool>,
}

impl PostgresBatchRepository {
    /// Create a repository over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the backing tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    /// Persist a new batch and its current allocations in one transaction.
    #[instrument(skip(self, batch), fields(reference = %batch.reference()), err)]
    pub async fn add(&self, batch: &Batch) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("add", e))?;

        let batch_id: i64 = sqlx::query(
            r#"
            INSERT INTO batches (reference, sku, purchased_quantity, eta)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(batch.reference().as_str())
        .bind(batch.sku().as_str())
        .bind(batch.purchased_quantity())
        .bind(batch.eta())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("add", e))?
        .try_get("id")
        .map_err(|e| map_sqlx_error("add", e))?;

        for line in batch.allocations() {
            let line_id: i64 = sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, sku, quantity)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(line.order_id().as_str())
            .bind(line.sku().as_str())
            .bind(line.quantity())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("add", e))?
            .try_get("id")
            .map_err(|e| map_sqlx_error("add", e))?;

            sqlx::query("INSERT INTO allocations (order_line_id, batch_id) VALUES ($1, $2)")
                .bind(line_id)
                .bind(batch_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("add", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("add", e))
    }

    /// Load a batch by reference, rebuilding its full allocation set.
    #[instrument(skip(self), fields(reference = %reference), err)]
    pub async fn get(&self, reference: &BatchRef) -> Result<Batch, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, sku, purchased_quantity, eta FROM batches WHERE reference = $1",
        )
        .bind(reference.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?
        .ok_or_else(|| RepositoryError::NotFound(reference.clone()))?;

        let batch_id: i64 = row.try_get("id").map_err(|e| map_sqlx_error("get", e))?;
        let sku: String = row.try_get("sku").map_err(|e| map_sqlx_error("get", e))?;
        let purchased_quantity: i64 = row
            .try_get("purchased_quantity")
            .map_err(|e| map_sqlx_error("get", e))?;
        let eta: Option<NaiveDate> = row.try_get("eta").map_err(|e| map_sqlx_error("get", e))?;

        let mut batch = Batch::new(reference.clone(), Sku::new(sku), purchased_quantity, eta)
            .map_err(|e| RepositoryError::Storage(format!("corrupt batch row: {e}")))?;
        self.load_allocations(batch_id, &mut batch).await?;
        Ok(batch)
    }

    /// All stored batches, each with its allocation set.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> Result<Vec<Batch>, RepositoryError> {
        let rows = sqlx::query("SELECT id, reference, sku, purchased_quantity, eta FROM batches")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        let mut batches = Vec::with_capacity(rows.len());
        for row in rows {
            let batch_id: i64 = row.try_get("id").map_err(|e| map_sqlx_error("list", e))?;
            let reference: String = row
                .try_get("reference")
                .map_err(|e| map_sqlx_error("list", e))?;
            let sku: String = row.try_get("sku").map_err(|e| map_sqlx_error("list", e))?;
            let purchased_quantity: i64 = row
                .try_get("purchased_quantity")
                .map_err(|e| map_sqlx_error("list", e))?;
            let eta: Option<NaiveDate> =
                row.try_get("eta").map_err(|e| map_sqlx_error("list", e))?;

            let mut batch = Batch::new(
                BatchRef::new(reference),
                Sku::new(sku),
                purchased_quantity,
                eta,
            )
            .map_err(|e| RepositoryError::Storage(format!("corrupt batch row: {e}")))?;
            self.load_allocations(batch_id, &mut batch).await?;
            batches.push(batch);
        }

        Ok(batches)
    }

    async fn load_allocations(
        &self,
        batch_id: i64,
        batch: &mut Batch,
    ) -> Result<(), RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT ol.order_id, ol.sku, ol.quantity
            FROM order_lines ol
            JOIN allocations a ON a.order_line_id = ol.id
            WHERE a.batch_id = $1
            "#,
        )
        .bind(batch_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_allocations", e))?;

        for row in rows {
            let order_id: String = row
                .try_get("order_id")
                .map_err(|e| map_sqlx_error("load_allocations", e))?;
            let sku: String = row
                .try_get("sku")
                .map_err(|e| map_sqlx_error("load_allocations", e))?;
            let quantity: i64 = row
                .try_get("quantity")
                .map_err(|e| map_sqlx_error("load_allocations", e))?;

            let line = OrderLine::new(OrderId::new(order_id), Sku::new(sku), quantity)
                .map_err(|e| RepositoryError::Storage(format!("corrupt order line row: {e}")))?;

            // Replay through the domain gate; a stored line that no longer
            // fits the batch means the tables are inconsistent.
            if !batch.allocate(line) {
                return Err(RepositoryError::Storage(format!(
                    "stored allocation does not fit batch '{}'",
                    batch.reference()
                )));
            }
        }

        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            // 23505 = unique violation (duplicate batch reference).
            if db_err.code().as_deref() == Some("23505") {
                RepositoryError::Conflict(msg)
            } else {
                RepositoryError::Storage(msg)
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Storage(format!("connection pool closed in {operation}"))
        }
        _ => RepositoryError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}

// Implement BatchRepository trait

impl BatchRepository for PostgresBatchRepository {
    fn add(&self, batch: Batch) -> Result<(), RepositoryError> {
        // The BatchRepository trait is synchronous, but Postgres operations
        // require async. We use tokio::runtime::Handle to run async code in a
        // sync context; this works when called from within a tokio runtime.
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            RepositoryError::Storage(
                "PostgresBatchRepository requires an async runtime (tokio). Ensure you're calling from within a tokio runtime context.".to_string(),
            )
        })?;

        handle.block_on(self.add(&batch))
    }

    fn get(&self, reference: &BatchRef) -> Result<Batch, RepositoryError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            RepositoryError::Storage(
                "PostgresBatchRepository requires an async runtime (tokio). Ensure you're calling from within a tokio runtime context.".to_string(),
            )
        })?;

        handle.block_on(self.get(reference))
    }

    fn list(&self) -> Result<Vec<Batch>, RepositoryError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            RepositoryError::Storage(
                "PostgresBatchRepository requires an async runtime (tokio). Ensure you're calling from within a tokio runtime context.".to_string(),
            )
        })?;

        handle.block_on(self.list())
    }
}
