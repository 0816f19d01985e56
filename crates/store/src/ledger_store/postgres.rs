//! Postgres-backed ledger store implementation.
//!
//! Persists products, actors, and ledger entries in PostgreSQL (see
//! `schema.sql` at the crate root for the tables). The commit path runs the
//! count update and the entry insert in one transaction, with the
//! compare-and-swap expressed as `WHERE id = $n AND stock_count = $n`: zero
//! rows affected means either the product vanished or another writer got
//! there first.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use stockledger_core::{ActorId, EntryId, ProductId};
use stockledger_inventory::{AdjustmentAction, LedgerEntry, Product};

use super::query::{LogFilter, LogPage, Pagination};
use super::r#trait::{ActorRecord, EntryReadModel, LedgerStore, StoreError};

/// Postgres-backed ledger store.
///
/// Uses the SQLx connection pool, which is thread-safe and shareable across
/// tasks. Every multi-statement write runs inside a transaction.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a fresh pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Unique violation: a concurrent writer inserted first.
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

const ENTRY_COLUMNS: &str = r#"
    e.id,
    e.product_id,
    e.actor_id,
    e.action,
    e.quantity,
    e.previous_count,
    e.new_count,
    e.reason,
    e.notes,
    e.created_at,
    COALESCE(p.name, '') AS product_name,
    COALESCE(a.name, '') AS actor_name,
    COALESCE(a.email, '') AS actor_email
"#;

#[derive(Debug)]
struct ProductRow {
    id: uuid::Uuid,
    name: String,
    price_cents: i64,
    stock_count: i64,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price_cents: row.try_get("price_cents")?,
            stock_count: row.try_get("stock_count")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            price_cents: row.price_cents,
            stock_count: row.stock_count,
        }
    }
}

#[derive(Debug)]
struct EntryRow {
    id: uuid::Uuid,
    product_id: uuid::Uuid,
    actor_id: uuid::Uuid,
    action: String,
    quantity: i64,
    previous_count: i64,
    new_count: i64,
    reason: String,
    notes: String,
    created_at: DateTime<Utc>,
    product_name: String,
    actor_name: String,
    actor_email: String,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for EntryRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(EntryRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            actor_id: row.try_get("actor_id")?,
            action: row.try_get("action")?,
            quantity: row.try_get("quantity")?,
            previous_count: row.try_get("previous_count")?,
            new_count: row.try_get("new_count")?,
            reason: row.try_get("reason")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            product_name: row.try_get("product_name")?,
            actor_name: row.try_get("actor_name")?,
            actor_email: row.try_get("actor_email")?,
        })
    }
}

impl TryFrom<EntryRow> for EntryReadModel {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let action: AdjustmentAction = row
            .action
            .parse()
            .map_err(|_| StoreError::Backend(format!("unrecognized action '{}' in row", row.action)))?;

        Ok(EntryReadModel {
            entry: LedgerEntry {
                id: EntryId::from_uuid(row.id),
                product_id: ProductId::from_uuid(row.product_id),
                actor_id: ActorId::from_uuid(row.actor_id),
                action,
                quantity: row.quantity,
                previous_count: row.previous_count,
                new_count: row.new_count,
                reason: row.reason,
                notes: row.notes,
                created_at: row.created_at,
            },
            product_name: row.product_name,
            actor_name: row.actor_name,
            actor_email: row.actor_email,
        })
    }
}

fn rows_to_read_models(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<EntryReadModel>, StoreError> {
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let entry_row = EntryRow::from_row(&row)
            .map_err(|e| StoreError::Backend(format!("failed to decode entry row: {e}")))?;
        entries.push(entry_row.try_into()?);
    }
    Ok(entries)
}

#[async_trait::async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, stock_count)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                stock_count = EXCLUDED.stock_count
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock_count)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_product", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, price_cents, stock_count FROM products WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        match row {
            Some(row) => {
                let product = ProductRow::from_row(&row)
                    .map_err(|e| StoreError::Backend(format!("failed to decode product row: {e}")))?;
                Ok(Some(product.into()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, price_cents, stock_count FROM products ORDER BY name ASC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let product = ProductRow::from_row(&row)
                .map_err(|e| StoreError::Backend(format!("failed to decode product row: {e}")))?;
            products.push(product.into());
        }
        Ok(products)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id), err)]
    async fn upsert_actor(&self, actor: ActorRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO actors (id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email
            "#,
        )
        .bind(actor.id.as_uuid())
        .bind(&actor.name)
        .bind(&actor.email)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_actor", e))?;

        Ok(())
    }

    #[instrument(
        skip(self, entry),
        fields(product_id = %entry.product_id, action = %entry.action),
        err
    )]
    async fn commit_adjustment(
        &self,
        expected_count: i64,
        new_count: i64,
        entry: LedgerEntry,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let updated = sqlx::query(
            "UPDATE products SET stock_count = $1 WHERE id = $2 AND stock_count = $3",
        )
        .bind(new_count)
        .bind(entry.product_id.as_uuid())
        .bind(expected_count)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_stock_count", e))?;

        if updated.rows_affected() == 0 {
            // Distinguish a vanished product from a concurrent writer.
            let exists_row = sqlx::query("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1) AS present")
                .bind(entry.product_id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("check_product_exists", e))?;

            let present: bool = exists_row
                .try_get("present")
                .map_err(|e| StoreError::Backend(format!("failed to read existence check: {e}")))?;

            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;

            return if present {
                Err(StoreError::Conflict(format!(
                    "expected count {expected_count}, but the product changed since read"
                )))
            } else {
                Err(StoreError::NotFound(format!("product {}", entry.product_id)))
            };
        }

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id,
                product_id,
                actor_id,
                action,
                quantity,
                previous_count,
                new_count,
                reason,
                notes,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.product_id.as_uuid())
        .bind(entry.actor_id.as_uuid())
        .bind(entry.action.as_str())
        .bind(entry.quantity)
        .bind(entry.previous_count)
        .bind(entry.new_count)
        .bind(&entry.reason)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_entry", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn product_log(&self, product_id: ProductId) -> Result<Vec<EntryReadModel>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM ledger_entries e
            LEFT JOIN products p ON p.id = e.product_id
            LEFT JOIN actors a ON a.id = e.actor_id
            WHERE e.product_id = $1
            ORDER BY e.created_at DESC, e.id DESC
            "#
        ))
        .bind(product_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("product_log", e))?;

        rows_to_read_models(rows)
    }

    #[instrument(skip(self, filter), err)]
    async fn query_logs(
        &self,
        filter: LogFilter,
        pagination: Pagination,
    ) -> Result<LogPage, StoreError> {
        // Optional filters in a single parameterized query.
        let product_param: Option<uuid::Uuid> = filter.product_id.map(|id| *id.as_uuid());
        let action_param: Option<&str> = filter.action.map(|a| a.as_str());

        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM ledger_entries e
            WHERE ($1::uuid IS NULL OR e.product_id = $1)
                AND ($2::text IS NULL OR e.action = $2)
                AND ($3::timestamptz IS NULL OR e.created_at >= $3)
                AND ($4::timestamptz IS NULL OR e.created_at <= $4)
            "#,
        )
        .bind(product_param)
        .bind(action_param)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_logs", e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| StoreError::Backend(format!("failed to read count: {e}")))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM ledger_entries e
            LEFT JOIN products p ON p.id = e.product_id
            LEFT JOIN actors a ON a.id = e.actor_id
            WHERE ($1::uuid IS NULL OR e.product_id = $1)
                AND ($2::text IS NULL OR e.action = $2)
                AND ($3::timestamptz IS NULL OR e.created_at >= $3)
                AND ($4::timestamptz IS NULL OR e.created_at <= $4)
            ORDER BY e.created_at DESC, e.id DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(product_param)
        .bind(action_param)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_logs", e))?;

        Ok(LogPage {
            entries: rows_to_read_models(rows)?,
            total: total as u64,
            pagination,
        })
    }

    #[instrument(skip(self), err)]
    async fn recent_entries(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<EntryReadModel>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM ledger_entries e
            LEFT JOIN products p ON p.id = e.product_id
            LEFT JOIN actors a ON a.id = e.actor_id
            WHERE e.created_at >= $1
            ORDER BY e.created_at DESC, e.id DESC
            LIMIT $2
            "#
        ))
        .bind(since)
        .bind(i64::from(limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("recent_entries", e))?;

        rows_to_read_models(rows)
    }
}
