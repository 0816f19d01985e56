//! Stock-level aggregation for the summary report.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Aggregated stock view over the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    /// Products under the low-stock threshold, ascending by count.
    pub low_stock: Vec<Product>,
    /// Products with no units on hand.
    pub out_of_stock: Vec<Product>,
    /// Σ price × count over all products, in the smallest currency unit.
    pub total_inventory_value: i64,
    pub total_products: usize,
}

/// Reduce the full product list into the summary view.
///
/// Loads nothing itself; the caller supplies whatever snapshot of the catalog
/// it wants summarized.
pub fn summarize(products: &[Product]) -> StockSummary {
    let mut low_stock: Vec<Product> = products
        .iter()
        .filter(|p| p.is_low_stock())
        .cloned()
        .collect();
    low_stock.sort_by_key(|p| p.stock_count);

    let out_of_stock: Vec<Product> = products
        .iter()
        .filter(|p| p.is_out_of_stock())
        .cloned()
        .collect();

    let total_inventory_value = products.iter().map(Product::inventory_value).sum();

    StockSummary {
        low_stock,
        out_of_stock,
        total_inventory_value,
        total_products: products.len(),
    }
}
