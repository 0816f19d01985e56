use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use stockledger_core::{ActorId, ProductId};
use stockledger_inventory::{LedgerEntry, Product};

use super::query::{LogFilter, LogPage, Pagination};
use super::r#trait::{ActorRecord, EntryReadModel, LedgerStore, StoreError};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    actors: HashMap<ActorId, ActorRecord>,
    /// Append-only, in creation order. Reads iterate in reverse for
    /// newest-first ordering.
    entries: Vec<LedgerEntry>,
}

/// In-memory ledger store.
///
/// Intended for tests/dev. The write lock doubles as the commit critical
/// section: the count check, count update, and entry append all happen under
/// one guard, so the atomicity contract of the trait holds trivially.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read_model(state: &State, entry: &LedgerEntry) -> EntryReadModel {
    let product_name = state
        .products
        .get(&entry.product_id)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    let (actor_name, actor_email) = state
        .actors
        .get(&entry.actor_id)
        .map(|a| (a.name.clone(), a.email.clone()))
        .unwrap_or_default();

    EntryReadModel {
        entry: entry.clone(),
        product_name,
        actor_name,
        actor_email,
    }
}

fn matches(entry: &LedgerEntry, filter: &LogFilter) -> bool {
    if let Some(product_id) = filter.product_id {
        if entry.product_id != product_id {
            return false;
        }
    }
    if let Some(action) = filter.action {
        if entry.action != action {
            return false;
        }
    }
    if let Some(from) = filter.created_from {
        if entry.created_at < from {
            return false;
        }
    }
    if let Some(to) = filter.created_to {
        if entry.created_at > to {
            return false;
        }
    }
    true
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.products.insert(product.id, product);
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn upsert_actor(&self, actor: ActorRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.actors.insert(actor.id, actor);
        Ok(())
    }

    async fn commit_adjustment(
        &self,
        expected_count: i64,
        new_count: i64,
        entry: LedgerEntry,
    ) -> Result<(), StoreError> {
        let mut guard = self.state.write().map_err(|_| poisoned())?;
        let state = &mut *guard;

        let product = state
            .products
            .get_mut(&entry.product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", entry.product_id)))?;

        if product.stock_count != expected_count {
            return Err(StoreError::Conflict(format!(
                "expected count {expected_count}, found {}",
                product.stock_count
            )));
        }

        product.stock_count = new_count;
        state.entries.push(entry);
        Ok(())
    }

    async fn product_log(&self, product_id: ProductId) -> Result<Vec<EntryReadModel>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .entries
            .iter()
            .rev()
            .filter(|e| e.product_id == product_id)
            .map(|e| read_model(&state, e))
            .collect())
    }

    async fn query_logs(
        &self,
        filter: LogFilter,
        pagination: Pagination,
    ) -> Result<LogPage, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;

        let matching: Vec<&LedgerEntry> = state
            .entries
            .iter()
            .filter(|e| matches(e, &filter))
            .collect();

        let entries = matching
            .iter()
            .rev()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .map(|e| read_model(&state, e))
            .collect();

        Ok(LogPage {
            entries,
            total: matching.len() as u64,
            pagination,
        })
    }

    async fn recent_entries(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<EntryReadModel>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .entries
            .iter()
            .rev()
            .filter(|e| e.created_at >= since)
            .take(limit as usize)
            .map(|e| read_model(&state, e))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stockledger_core::EntryId;
    use stockledger_inventory::AdjustmentAction;

    fn product(name: &str, stock_count: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            price_cents: 100,
            stock_count,
        }
    }

    fn actor(name: &str) -> ActorRecord {
        ActorRecord {
            id: ActorId::new(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn entry_at(
        product_id: ProductId,
        actor_id: ActorId,
        action: AdjustmentAction,
        previous: i64,
        new: i64,
        created_at: DateTime<Utc>,
    ) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::new(),
            product_id,
            actor_id,
            action,
            quantity: (new - previous).abs(),
            previous_count: previous,
            new_count: new,
            reason: "test".to_string(),
            notes: String::new(),
            created_at,
        }
    }

    #[tokio::test]
    async fn commit_updates_count_and_appends_entry() {
        let store = InMemoryLedgerStore::new();
        let p = product("widget", 5);
        let a = actor("Alice");
        store.upsert_product(p.clone()).await.unwrap();
        store.upsert_actor(a.clone()).await.unwrap();

        let entry = entry_at(p.id, a.id, AdjustmentAction::Remove, 5, 2, Utc::now());
        store.commit_adjustment(5, 2, entry).await.unwrap();

        let stored = store.get_product(p.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_count, 2);

        let log = store.product_log(p.id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].entry.previous_count, 5);
        assert_eq!(log[0].entry.new_count, 2);
        assert_eq!(log[0].product_name, "widget");
        assert_eq!(log[0].actor_name, "Alice");
        assert_eq!(log[0].actor_email, "alice@example.com");
    }

    #[tokio::test]
    async fn commit_with_stale_count_conflicts_and_leaves_no_entry() {
        let store = InMemoryLedgerStore::new();
        let p = product("widget", 5);
        store.upsert_product(p.clone()).await.unwrap();

        let a = actor("Alice");
        store.upsert_actor(a.clone()).await.unwrap();

        let entry = entry_at(p.id, a.id, AdjustmentAction::Remove, 4, 1, Utc::now());
        let err = store.commit_adjustment(4, 1, entry).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        assert_eq!(store.get_product(p.id).await.unwrap().unwrap().stock_count, 5);
        assert!(store.product_log(p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_against_missing_product_is_not_found() {
        let store = InMemoryLedgerStore::new();
        let a = actor("Alice");
        let entry = entry_at(
            ProductId::new(),
            a.id,
            AdjustmentAction::Add,
            0,
            1,
            Utc::now(),
        );

        let err = store.commit_adjustment(0, 1, entry).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn product_log_is_newest_first_and_scoped_to_product() {
        let store = InMemoryLedgerStore::new();
        let p1 = product("widget", 0);
        let p2 = product("gadget", 0);
        let a = actor("Alice");
        store.upsert_product(p1.clone()).await.unwrap();
        store.upsert_product(p2.clone()).await.unwrap();
        store.upsert_actor(a.clone()).await.unwrap();

        let t0 = Utc::now();
        store
            .commit_adjustment(0, 3, entry_at(p1.id, a.id, AdjustmentAction::Add, 0, 3, t0))
            .await
            .unwrap();
        store
            .commit_adjustment(
                0,
                9,
                entry_at(p2.id, a.id, AdjustmentAction::Add, 0, 9, t0 + Duration::seconds(1)),
            )
            .await
            .unwrap();
        store
            .commit_adjustment(
                3,
                1,
                entry_at(p1.id, a.id, AdjustmentAction::Remove, 3, 1, t0 + Duration::seconds(2)),
            )
            .await
            .unwrap();

        let log = store.product_log(p1.id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].entry.action, AdjustmentAction::Remove);
        assert_eq!(log[1].entry.action, AdjustmentAction::Add);
    }

    #[tokio::test]
    async fn query_logs_filters_and_paginates() {
        let store = InMemoryLedgerStore::new();
        let p = product("widget", 0);
        let a = actor("Alice");
        store.upsert_product(p.clone()).await.unwrap();
        store.upsert_actor(a.clone()).await.unwrap();

        let t0 = Utc::now();
        let mut count = 0;
        for i in 0..25 {
            let action = if i % 2 == 0 {
                AdjustmentAction::Add
            } else {
                AdjustmentAction::Remove
            };
            let new = if action == AdjustmentAction::Add {
                count + 1
            } else {
                count - 1
            };
            store
                .commit_adjustment(
                    count,
                    new,
                    entry_at(p.id, a.id, action, count, new, t0 + Duration::seconds(i)),
                )
                .await
                .unwrap();
            count = new;
        }

        // Unfiltered: fixed page size, newest first, exact total.
        let page1 = store
            .query_logs(LogFilter::default(), Pagination::page(1))
            .await
            .unwrap();
        assert_eq!(page1.total, 25);
        assert_eq!(page1.entries.len(), 10);
        assert_eq!(page1.total_pages(), 3);
        assert!(
            page1
                .entries
                .windows(2)
                .all(|w| w[0].entry.created_at >= w[1].entry.created_at)
        );

        let page3 = store
            .query_logs(LogFilter::default(), Pagination::page(3))
            .await
            .unwrap();
        assert_eq!(page3.entries.len(), 5);

        // Action filter.
        let removes = store
            .query_logs(
                LogFilter {
                    action: Some(AdjustmentAction::Remove),
                    ..Default::default()
                },
                Pagination::page(1),
            )
            .await
            .unwrap();
        assert_eq!(removes.total, 12);
        assert!(
            removes
                .entries
                .iter()
                .all(|e| e.entry.action == AdjustmentAction::Remove)
        );

        // Inclusive date range: seconds 5..=9 inclusive on both bounds.
        let ranged = store
            .query_logs(
                LogFilter {
                    created_from: Some(t0 + Duration::seconds(5)),
                    created_to: Some(t0 + Duration::seconds(9)),
                    ..Default::default()
                },
                Pagination::page(1),
            )
            .await
            .unwrap();
        assert_eq!(ranged.total, 5);
    }

    #[tokio::test]
    async fn recent_entries_honors_cutoff_and_cap() {
        let store = InMemoryLedgerStore::new();
        let p = product("widget", 0);
        let a = actor("Alice");
        store.upsert_product(p.clone()).await.unwrap();
        store.upsert_actor(a.clone()).await.unwrap();

        let now = Utc::now();
        let old = now - Duration::days(40);
        store
            .commit_adjustment(0, 1, entry_at(p.id, a.id, AdjustmentAction::Add, 0, 1, old))
            .await
            .unwrap();

        let mut count = 1;
        for i in 0..12 {
            store
                .commit_adjustment(
                    count,
                    count + 1,
                    entry_at(
                        p.id,
                        a.id,
                        AdjustmentAction::Add,
                        count,
                        count + 1,
                        now - Duration::days(12 - i),
                    ),
                )
                .await
                .unwrap();
            count += 1;
        }

        let recent = store
            .recent_entries(now - Duration::days(30), 10)
            .await
            .unwrap();
        assert_eq!(recent.len(), 10);
        assert!(recent.iter().all(|e| e.entry.created_at >= now - Duration::days(30)));
        assert!(
            recent
                .windows(2)
                .all(|w| w[0].entry.created_at >= w[1].entry.created_at)
        );
    }
}
