use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockledger_core::{ActorId, ProductId};
use stockledger_inventory::{LedgerEntry, Product};

use super::query::{LogFilter, LogPage, Pagination};

/// Directory record for the user behind an adjustment.
///
/// Populated from verified token claims at write time so that ledger reads
/// can join actor display fields without consulting an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: ActorId,
    pub name: String,
    pub email: String,
}

/// A ledger entry joined with the display fields reads want.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReadModel {
    pub entry: LedgerEntry,
    pub product_name: String,
    pub actor_name: String,
    pub actor_email: String,
}

/// Store operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to
/// domain errors (validation, stock rules).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The compare-and-swap on the previous count failed: the product changed
    /// between read and commit.
    #[error("concurrent modification: {0}")]
    Conflict(String),

    /// The referenced record vanished between read and commit.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Anything the backend itself failed at (IO, pool, row decoding).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Persistence boundary for products, actors, and the append-only ledger.
///
/// ## Commit semantics
///
/// `commit_adjustment()` must:
/// - compare the product's current count against `expected_count` and fail
///   with [`StoreError::Conflict`] when they differ (no lost updates)
/// - persist the new count and append the entry **atomically** (a crash can
///   never leave a count change without its audit record)
///
/// ## Read semantics
///
/// Ledger reads return entries newest first and join product/actor display
/// fields. Entries are never mutated or deleted; implementations must not
/// expose any way to do so.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn upsert_product(&self, product: Product) -> Result<(), StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn upsert_actor(&self, actor: ActorRecord) -> Result<(), StoreError>;

    /// Atomically set the product's count to `new_count` (iff it still equals
    /// `expected_count`) and append `entry`.
    async fn commit_adjustment(
        &self,
        expected_count: i64,
        new_count: i64,
        entry: LedgerEntry,
    ) -> Result<(), StoreError>;

    /// Full history for one product, newest first. Returns an empty vector
    /// for a product with no entries; product existence is the caller's
    /// concern.
    async fn product_log(&self, product_id: ProductId) -> Result<Vec<EntryReadModel>, StoreError>;

    /// Filtered, paginated view over all entries, newest first.
    async fn query_logs(
        &self,
        filter: LogFilter,
        pagination: Pagination,
    ) -> Result<LogPage, StoreError>;

    /// Entries created at or after `since`, newest first, capped at `limit`.
    async fn recent_entries(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<EntryReadModel>, StoreError>;
}

#[async_trait::async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        (**self).upsert_product(product).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }

    async fn upsert_actor(&self, actor: ActorRecord) -> Result<(), StoreError> {
        (**self).upsert_actor(actor).await
    }

    async fn commit_adjustment(
        &self,
        expected_count: i64,
        new_count: i64,
        entry: LedgerEntry,
    ) -> Result<(), StoreError> {
        (**self)
            .commit_adjustment(expected_count, new_count, entry)
            .await
    }

    async fn product_log(&self, product_id: ProductId) -> Result<Vec<EntryReadModel>, StoreError> {
        (**self).product_log(product_id).await
    }

    async fn query_logs(
        &self,
        filter: LogFilter,
        pagination: Pagination,
    ) -> Result<LogPage, StoreError> {
        (**self).query_logs(filter, pagination).await
    }

    async fn recent_entries(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<EntryReadModel>, StoreError> {
        (**self).recent_entries(since, limit).await
    }
}
