use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockalloc_core::{BatchRef, DomainError, DomainResult, Entity, OrderId, Sku, ValueObject};

/// Value object: a customer's request for a quantity of a single sku.
///
/// Two lines are the same line iff order id, sku and quantity all match.
/// Fields are private so the positive-quantity invariant established by
/// [`OrderLine::new`] cannot be bypassed; an order line never changes after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderLine {
    order_id: OrderId,
    sku: Sku,
    quantity: i64,
}

impl OrderLine {
    /// Create an order line.
    ///
    /// Rejects non-positive quantities: an order for zero (or fewer) units of
    /// something is not a meaningful request.
    pub fn new(order_id: OrderId, sku: Sku, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("order line quantity must be positive"));
        }
        Ok(Self {
            order_id,
            sku,
            quantity,
        })
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}

impl ValueObject for OrderLine {}

/// Entity: a discrete purchased lot of a single sku.
///
/// A batch has a fixed purchased quantity and an optional eta; `eta: None`
/// means the stock is already in the warehouse. Order lines are reserved
/// against it via [`Batch::allocate`], which keeps the bookkeeping invariant
/// `available_quantity() >= 0` by construction.
#[derive(Debug, Clone)]
pub struct Batch {
    reference: BatchRef,
    sku: Sku,
    purchased_quantity: i64,
    eta: Option<NaiveDate>,
    allocations: HashSet<OrderLine>,
}

impl Batch {
    /// Create a batch with no allocations.
    ///
    /// The reference is assigned by the caller (purchasing paperwork or the
    /// persistence layer), never generated here. Rejects a negative purchased
    /// quantity.
    pub fn new(
        reference: BatchRef,
        sku: Sku,
        purchased_quantity: i64,
        eta: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        if purchased_quantity < 0 {
            return Err(DomainError::validation(
                "purchased quantity cannot be negative",
            ));
        }
        Ok(Self {
            reference,
            sku,
            purchased_quantity,
            eta,
            allocations: HashSet::new(),
        })
    }

    pub fn reference(&self) -> &BatchRef {
        &self.reference
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    /// Expected arrival date. `None` means already in physical stock.
    pub fn eta(&self) -> Option<NaiveDate> {
        self.eta
    }

    pub fn purchased_quantity(&self) -> i64 {
        self.purchased_quantity
    }

    /// Currently allocated order lines (no defined iteration order).
    pub fn allocations(&self) -> impl Iterator<Item = &OrderLine> {
        self.allocations.iter()
    }

    /// Sum of quantities over all allocated lines.
    pub fn allocated_quantity(&self) -> i64 {
        self.allocations.iter().map(OrderLine::quantity).sum()
    }

    pub fn available_quantity(&self) -> i64 {
        self.purchased_quantity - self.allocated_quantity()
    }

    /// Whether `line` could be allocated to this batch: the skus must match
    /// and the line must fit in the remaining quantity. Pure predicate.
    pub fn can_allocate(&self, line: &OrderLine) -> bool {
        self.sku == *line.sku() && self.available_quantity() >= line.quantity()
    }

    /// Reserve `line` against this batch.
    ///
    /// Returns whether an allocation actually occurred: `false` when the line
    /// does not fit (sku mismatch or insufficient quantity) or was already
    /// allocated. Allocating the same line twice is idempotent; the second
    /// call changes nothing.
    pub fn allocate(&mut self, line: OrderLine) -> bool {
        if !self.can_allocate(&line) {
            return false;
        }
        self.allocations.insert(line)
    }

    /// Release a previously allocated line.
    ///
    /// Returns whether a line was removed. Deallocating a line that was never
    /// allocated is a no-op, not an error.
    pub fn deallocate(&mut self, line: &OrderLine) -> bool {
        self.allocations.remove(line)
    }
}

impl Entity for Batch {
    type Id = BatchRef;

    fn id(&self) -> &Self::Id {
        &self.reference
    }
}

// Identity semantics: a batch is its reference. A rehydrated copy and an
// in-memory mutated copy with the same reference are the same entity even
// when sku, quantities or eta differ.
impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Batch {}

impl core::hash::Hash for Batch {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn sku(s: &str) -> Sku {
        Sku::new(s)
    }

    fn batch_and_line(sku_name: &str, batch_qty: i64, line_qty: i64) -> (Batch, OrderLine) {
        let batch = Batch::new(
            BatchRef::new("batch-001"),
            sku(sku_name),
            batch_qty,
            Some(today()),
        )
        .unwrap();
        let line = OrderLine::new(OrderId::new("order-123"), sku(sku_name), line_qty).unwrap();
        (batch, line)
    }

    #[test]
    fn allocating_reduces_the_available_quantity() {
        let (mut batch, line) = batch_and_line("SMALL-TABLE", 20, 2);
        assert!(batch.allocate(line));
        assert_eq!(batch.available_quantity(), 18);
    }

    #[test]
    fn can_allocate_if_available_greater_than_required() {
        let (batch, line) = batch_and_line("ELEGANT-LAMP", 20, 2);
        assert!(batch.can_allocate(&line));
    }

    #[test]
    fn cannot_allocate_if_available_smaller_than_required() {
        let (batch, line) = batch_and_line("ELEGANT-LAMP", 2, 20);
        assert!(!batch.can_allocate(&line));
    }

    #[test]
    fn can_allocate_if_available_equal_to_required() {
        let (mut batch, line) = batch_and_line("ELEGANT-LAMP", 2, 2);
        assert!(batch.can_allocate(&line));
        assert!(batch.allocate(line));
        assert_eq!(batch.available_quantity(), 0);
    }

    #[test]
    fn cannot_allocate_if_skus_do_not_match() {
        let batch = Batch::new(BatchRef::new("batch-001"), sku("UNCOMFORTABLE-CHAIR"), 100, None)
            .unwrap();
        let line = OrderLine::new(OrderId::new("order-123"), sku("EXPENSIVE-TOASTER"), 10).unwrap();
        assert!(!batch.can_allocate(&line));
    }

    #[test]
    fn allocation_is_idempotent() {
        let (mut batch, line) = batch_and_line("ANGULAR-DESK", 20, 2);
        assert!(batch.allocate(line.clone()));
        assert!(!batch.allocate(line));
        assert_eq!(batch.available_quantity(), 18);
    }

    #[test]
    fn deallocate_releases_the_quantity() {
        let (mut batch, line) = batch_and_line("ANGULAR-DESK", 20, 2);
        batch.allocate(line.clone());
        assert!(batch.deallocate(&line));
        assert_eq!(batch.available_quantity(), 20);
    }

    #[test]
    fn can_only_deallocate_allocated_lines() {
        let (mut batch, unallocated_line) = batch_and_line("DECORATIVE-TRINKET", 20, 2);
        assert!(!batch.deallocate(&unallocated_line));
        assert_eq!(batch.available_quantity(), 20);
    }

    #[test]
    fn batch_equality_and_hash_are_by_reference_only() {
        let batch1 = Batch::new(BatchRef::new("batch-001"), sku("COMFY-SOFA"), 10, Some(today()))
            .unwrap();
        let batch2 = Batch::new(BatchRef::new("batch-001"), sku("LUMPY-SOFA"), 99, None).unwrap();
        assert_eq!(batch1, batch2);

        let mut set = HashSet::new();
        set.insert(batch1);
        assert!(!set.insert(batch2));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn entity_id_is_the_reference() {
        let (batch, _) = batch_and_line("COMFY-SOFA", 10, 2);
        assert_eq!(Entity::id(&batch), &BatchRef::new("batch-001"));
    }

    #[test]
    fn order_line_equality_is_by_value() {
        let a = OrderLine::new(OrderId::new("order-1"), sku("RED-CHAIR"), 5).unwrap();
        let b = OrderLine::new(OrderId::new("order-1"), sku("RED-CHAIR"), 5).unwrap();
        let c = OrderLine::new(OrderId::new("order-1"), sku("RED-CHAIR"), 6).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn constructors_validate_quantities() {
        assert!(OrderLine::new(OrderId::new("order-1"), sku("RED-CHAIR"), 0).is_err());
        assert!(OrderLine::new(OrderId::new("order-1"), sku("RED-CHAIR"), -3).is_err());
        assert!(Batch::new(BatchRef::new("batch-001"), sku("RED-CHAIR"), -1, None).is_err());
        assert!(Batch::new(BatchRef::new("batch-001"), sku("RED-CHAIR"), 0, None).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of feasible allocations, available
        /// quantity equals purchased minus the sum of distinct allocated
        /// lines, and never goes negative.
        #[test]
        fn bookkeeping_is_conserved(
            purchased in 0i64..10_000,
            quantities in prop::collection::vec(1i64..100, 0..50)
        ) {
            let mut batch = Batch::new(
                BatchRef::new("batch-001"),
                Sku::new("RED-CHAIR"),
                purchased,
                None,
            ).unwrap();

            let mut accepted = 0i64;
            for (i, qty) in quantities.into_iter().enumerate() {
                let line = OrderLine::new(
                    OrderId::new(format!("order-{i}")),
                    Sku::new("RED-CHAIR"),
                    qty,
                ).unwrap();

                let fits = batch.can_allocate(&line);
                let did = batch.allocate(line);
                prop_assert_eq!(did, fits);
                if did {
                    accepted += qty;
                }

                prop_assert!(batch.available_quantity() >= 0);
                prop_assert_eq!(batch.allocated_quantity(), accepted);
                prop_assert_eq!(batch.available_quantity(), purchased - accepted);
            }
        }

        /// Property: allocate followed by deallocate of the same line is a
        /// round trip back to the starting quantities.
        #[test]
        fn deallocate_undoes_allocate(
            purchased in 1i64..10_000,
            qty in 1i64..100,
        ) {
            prop_assume!(qty <= purchased);

            let mut batch = Batch::new(
                BatchRef::new("batch-001"),
                Sku::new("RED-CHAIR"),
                purchased,
                None,
            ).unwrap();
            let line = OrderLine::new(OrderId::new("order-1"), Sku::new("RED-CHAIR"), qty).unwrap();

            prop_assert!(batch.allocate(line.clone()));
            prop_assert!(batch.deallocate(&line));
            prop_assert_eq!(batch.available_quantity(), purchased);
            prop_assert_eq!(batch.allocated_quantity(), 0);
        }
    }
}
