//! Adjustment execution pipeline (application-level orchestration).
//!
//! The writer implements the full lifecycle of one stock change:
//!
//! ```text
//! Adjustment
//!   ↓
//! 1. Validate caller-supplied fields (pure, before any IO)
//!   ↓
//! 2. Load the product
//!   ↓
//! 3. Compute the new count (pure decision logic)
//!   ↓
//! 4. Commit count + ledger entry atomically, CAS on the loaded count
//! ```
//!
//! The CAS means two concurrent removals cannot both observe the same
//! previous count and both win; the loser gets [`StoreError::Conflict`] and
//! the caller decides whether to retry. This module contains no IO itself; it
//! composes the [`LedgerStore`] trait.

use chrono::Utc;
use thiserror::Error;

use stockledger_core::DomainError;
use stockledger_inventory::{Adjustment, LedgerEntry, Product, apply_action};

use crate::ledger_store::{ActorRecord, LedgerStore, StoreError};

#[derive(Debug, Error)]
pub enum WriteError {
    /// Deterministic domain failure (validation, stock rules, unknown product).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure failure (storage, concurrency conflict).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Executes adjustments against a [`LedgerStore`].
#[derive(Debug)]
pub struct LedgerWriter<S> {
    store: S,
}

impl<S> LedgerWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> LedgerWriter<S>
where
    S: LedgerStore,
{
    /// Apply one adjustment and return the updated product together with the
    /// recorded ledger entry.
    ///
    /// Validation runs before any mutation, so a failed call leaves no side
    /// effects (the actor directory upsert is the one exception — it records
    /// who *attempted* the change and is idempotent).
    pub async fn apply(
        &self,
        adjustment: Adjustment,
        actor: ActorRecord,
    ) -> Result<(Product, LedgerEntry), WriteError> {
        adjustment.validate()?;

        let product = self
            .store
            .get_product(adjustment.product_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let previous_count = product.stock_count;
        let new_count = apply_action(adjustment.action, previous_count, adjustment.quantity)?;
        let entry = LedgerEntry::record(&adjustment, previous_count, new_count, Utc::now());

        self.store.upsert_actor(actor.clone()).await?;
        self.store
            .commit_adjustment(previous_count, new_count, entry.clone())
            .await?;

        tracing::info!(
            action = %adjustment.action,
            quantity = adjustment.quantity,
            product = %product.name,
            actor = %actor.name,
            previous_count,
            new_count,
            "stock adjusted"
        );

        Ok((
            Product {
                stock_count: new_count,
                ..product
            },
            entry,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockledger_core::{ActorId, ProductId};
    use stockledger_inventory::AdjustmentAction;

    use crate::ledger_store::InMemoryLedgerStore;

    fn actor() -> ActorRecord {
        ActorRecord {
            id: ActorId::new(),
            name: "Alice Smith".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    fn adjustment(
        product_id: ProductId,
        actor_id: ActorId,
        action: AdjustmentAction,
        quantity: i64,
        reason: &str,
    ) -> Adjustment {
        Adjustment {
            product_id,
            action,
            quantity,
            reason: reason.to_string(),
            notes: String::new(),
            actor_id,
        }
    }

    async fn seeded(stock_count: i64) -> (LedgerWriter<InMemoryLedgerStore>, ProductId) {
        let store = InMemoryLedgerStore::new();
        let product = Product {
            id: ProductId::new(),
            name: "widget".to_string(),
            price_cents: 250,
            stock_count,
        };
        store.upsert_product(product.clone()).await.unwrap();
        (LedgerWriter::new(store), product.id)
    }

    #[tokio::test]
    async fn remove_updates_count_and_records_entry() {
        let (writer, product_id) = seeded(5).await;
        let a = actor();

        let (product, entry) = writer
            .apply(
                adjustment(product_id, a.id, AdjustmentAction::Remove, 3, "sold"),
                a.clone(),
            )
            .await
            .unwrap();

        assert_eq!(product.stock_count, 2);
        assert_eq!(entry.previous_count, 5);
        assert_eq!(entry.new_count, 2);
        assert_eq!(entry.action, AdjustmentAction::Remove);
        assert_eq!(entry.actor_id, a.id);
    }

    #[tokio::test]
    async fn remove_beyond_available_fails_with_no_side_effects() {
        let (writer, product_id) = seeded(5).await;
        let a = actor();

        let err = writer
            .apply(
                adjustment(product_id, a.id, AdjustmentAction::Remove, 10, "sold"),
                a,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WriteError::Domain(DomainError::InvalidOperation(_))
        ));

        // Count unchanged, nothing recorded.
        let product = writer.store.get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock_count, 5);
        assert!(writer.store.product_log(product_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_from_zero_records_reason() {
        let (writer, product_id) = seeded(0).await;
        let a = actor();

        let (product, entry) = writer
            .apply(
                adjustment(product_id, a.id, AdjustmentAction::Add, 20, "restock"),
                a,
            )
            .await
            .unwrap();

        assert_eq!(product.stock_count, 20);
        assert_eq!(entry.reason, "restock");
    }

    #[tokio::test]
    async fn unknown_product_is_not_found_before_any_write() {
        let (writer, _) = seeded(5).await;
        let a = actor();

        let err = writer
            .apply(
                adjustment(ProductId::new(), a.id, AdjustmentAction::Add, 1, "restock"),
                a,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WriteError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn blank_reason_is_rejected_before_load() {
        let (writer, product_id) = seeded(5).await;
        let a = actor();

        let err = writer
            .apply(
                adjustment(product_id, a.id, AdjustmentAction::Add, 1, "  "),
                a,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WriteError::Domain(DomainError::InvalidInput(_))
        ));
    }
}
