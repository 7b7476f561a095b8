//! Batch selection: which candidate batch serves an order line.

use thiserror::Error;

use stockalloc_core::{BatchRef, Sku};

use crate::batch::{Batch, OrderLine};

/// No candidate batch could satisfy the order line.
///
/// Raised for an empty candidate list, all-sku-mismatched candidates and
/// depleted candidates alike. Non-fatal: callers are expected to surface it
/// as a "cannot fulfill order" response, not retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("out of stock for sku {sku}")]
pub struct OutOfStock {
    pub sku: Sku,
}

/// Allocate `line` to the best-suited candidate batch.
///
/// Candidates are considered warehouse-stock first (`eta: None`), then by
/// ascending eta; ties keep the caller's order (stable sort). The first batch
/// that can take the line gets it, and its reference is returned.
///
/// Exactly one batch is mutated on success; none on failure. Allocating
/// several lines means calling this once per line — there is no transaction
/// across lines.
pub fn allocate(line: &OrderLine, batches: &mut [Batch]) -> Result<BatchRef, OutOfStock> {
    // `Option<NaiveDate>` orders `None` before any date, which is exactly the
    // in-stock-before-shipments policy.
    let mut order: Vec<usize> = (0..batches.len()).collect();
    order.sort_by_key(|&i| batches[i].eta());

    for i in order {
        if batches[i].can_allocate(line) {
            let reference = batches[i].reference().clone();
            batches[i].allocate(line.clone());
            return Ok(reference);
        }
    }

    Err(OutOfStock {
        sku: line.sku().clone(),
    })
}
