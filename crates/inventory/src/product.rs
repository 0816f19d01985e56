use serde::{Deserialize, Serialize};

use stockledger_core::ProductId;

/// Products with fewer units than this count as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Product record as this service sees it.
///
/// Products are owned by an external catalog component; the ledger only ever
/// mutates `stock_count`, and only through [`crate::adjustment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the smallest currency unit (e.g. cents).
    pub price_cents: i64,
    pub stock_count: i64,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock_count < LOW_STOCK_THRESHOLD
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock_count == 0
    }

    /// Value of the units on hand, in the smallest currency unit.
    pub fn inventory_value(&self) -> i64 {
        self.price_cents * self.stock_count
    }
}
