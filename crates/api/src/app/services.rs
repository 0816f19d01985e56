use std::sync::Arc;

use chrono::{Duration, Utc};

use stockledger_core::{DomainError, ProductId};
use stockledger_inventory::{Adjustment, LedgerEntry, Product, StockSummary, summarize};
use stockledger_store::{
    ActorRecord, EntryReadModel, InMemoryLedgerStore, LedgerStore, LedgerWriter, LogFilter,
    LogPage, Pagination, PostgresLedgerStore, StoreError, WriteError,
};

/// Summary activity covers this trailing window.
pub const RECENT_ACTIVITY_DAYS: i64 = 30;

/// Cap on summary activity entries.
pub const RECENT_ACTIVITY_LIMIT: u32 = 10;

/// Application services shared by all handlers via request extension.
pub struct AppServices {
    store: Arc<dyn LedgerStore>,
    writer: LedgerWriter<Arc<dyn LedgerStore>>,
}

/// Wire up the ledger store backend.
///
/// In-memory by default (dev/test); Postgres when `USE_PERSISTENT_STORES`
/// is set, connecting to `DATABASE_URL`.
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let store: Arc<dyn LedgerStore> = if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        let store = PostgresLedgerStore::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");
        Arc::new(store)
    } else {
        Arc::new(InMemoryLedgerStore::new())
    };

    AppServices {
        writer: LedgerWriter::new(store.clone()),
        store,
    }
}

impl AppServices {
    /// Apply one stock adjustment on behalf of `actor`.
    pub async fn apply_adjustment(
        &self,
        adjustment: Adjustment,
        actor: ActorRecord,
    ) -> Result<(Product, LedgerEntry), WriteError> {
        self.writer.apply(adjustment, actor).await
    }

    /// Full ledger history for one product, newest first.
    ///
    /// Fails with NotFound when the product itself does not exist (an empty
    /// history for an existing product is an empty vector, not an error).
    pub async fn product_history(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<EntryReadModel>, WriteError> {
        if self.store.get_product(product_id).await?.is_none() {
            return Err(WriteError::Domain(DomainError::NotFound));
        }
        Ok(self.store.product_log(product_id).await?)
    }

    /// One page of the global log view (fixed page size).
    pub async fn logs_page(
        &self,
        filter: LogFilter,
        page_number: u32,
    ) -> Result<LogPage, StoreError> {
        self.store
            .query_logs(filter, Pagination::page(page_number))
            .await
    }

    /// Stock summary plus recent ledger activity.
    pub async fn summary(&self) -> Result<(StockSummary, Vec<EntryReadModel>), StoreError> {
        let products = self.store.list_products().await?;
        let summary = summarize(&products);

        let since = Utc::now() - Duration::days(RECENT_ACTIVITY_DAYS);
        let recent = self
            .store
            .recent_entries(since, RECENT_ACTIVITY_LIMIT)
            .await?;

        Ok((summary, recent))
    }

    pub async fn create_product(&self, product: Product) -> Result<Product, StoreError> {
        self.store.upsert_product(product.clone()).await?;
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.store.get_product(id).await
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.store.list_products().await
    }
}
