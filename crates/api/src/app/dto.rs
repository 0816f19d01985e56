use serde::Deserialize;
use serde_json::Value;

use stockledger_inventory::{LedgerEntry, Product, StockSummary};
use stockledger_store::EntryReadModel;

// -------------------------
// Request DTOs
// -------------------------

// Required fields are `Option` so that a missing field surfaces as this
// service's own 400 `{ message }` response instead of a framework rejection.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryRequest {
    pub product_id: Option<String>,
    pub action: Option<String>,
    pub quantity: Option<i64>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub page_number: Option<String>,
    pub product_id: Option<String>,
    pub action: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    /// Unit price in the smallest currency unit (e.g. cents).
    pub price: Option<i64>,
    pub stock_count: Option<i64>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: &Product) -> Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "price": p.price_cents,
        "stockCount": p.stock_count,
    })
}

pub fn log_to_json(entry: &LedgerEntry) -> Value {
    serde_json::json!({
        "id": entry.id.to_string(),
        "productId": entry.product_id.to_string(),
        "userId": entry.actor_id.to_string(),
        "action": entry.action.as_str(),
        "quantity": entry.quantity,
        "previousCount": entry.previous_count,
        "newCount": entry.new_count,
        "reason": entry.reason,
        "notes": entry.notes,
        "createdAt": entry.created_at,
    })
}

/// Entry joined with actor display fields; `include_product` adds the product
/// reference for views that span products.
pub fn entry_to_json(rm: &EntryReadModel, include_product: bool) -> Value {
    let mut value = log_to_json(&rm.entry);
    value["user"] = serde_json::json!({
        "id": rm.entry.actor_id.to_string(),
        "name": rm.actor_name,
        "email": rm.actor_email,
    });
    if include_product {
        value["product"] = serde_json::json!({
            "id": rm.entry.product_id.to_string(),
            "name": rm.product_name,
        });
    }
    value
}

pub fn summary_to_json(summary: &StockSummary, recent: &[EntryReadModel]) -> Value {
    serde_json::json!({
        "lowStockProducts": summary.low_stock.iter().map(product_to_json).collect::<Vec<_>>(),
        "outOfStockProducts": {
            "count": summary.out_of_stock.len(),
            "products": summary.out_of_stock.iter().map(product_to_json).collect::<Vec<_>>(),
        },
        "totalInventoryValue": summary.total_inventory_value,
        "totalProducts": summary.total_products,
        "recentActivity": recent.iter().map(|e| entry_to_json(e, true)).collect::<Vec<_>>(),
    })
}
