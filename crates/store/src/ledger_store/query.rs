//! Query types for the global ledger view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::ProductId;
use stockledger_inventory::AdjustmentAction;

use super::r#trait::EntryReadModel;

/// Pagination parameters for ledger queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of entries to return.
    pub limit: u32,
    /// Offset (0-based).
    pub offset: u32,
}

/// Fixed page size of the global log view.
pub const LOG_PAGE_SIZE: u32 = 10;

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: LOG_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Pagination for a 1-based page number at the fixed page size.
    pub fn page(page_number: u32) -> Self {
        let page = page_number.max(1);
        Self {
            limit: LOG_PAGE_SIZE,
            offset: (page - 1) * LOG_PAGE_SIZE,
        }
    }

    /// The 1-based page number this offset corresponds to.
    pub fn page_number(&self) -> u32 {
        self.offset / self.limit.max(1) + 1
    }
}

/// Filter criteria for the global log view. All filters are optional and
/// combined with AND; date bounds are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogFilter {
    pub product_id: Option<ProductId>,
    pub action: Option<AdjustmentAction>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

/// One page of the global log view.
#[derive(Debug, Clone)]
pub struct LogPage {
    /// Entries on this page, newest first.
    pub entries: Vec<EntryReadModel>,
    /// Total entries matching the filter (across all pages).
    pub total: u64,
    pub pagination: Pagination,
}

impl LogPage {
    /// Number of pages at this page size (`ceil(total / limit)`).
    pub fn total_pages(&self) -> u64 {
        let limit = u64::from(self.pagination.limit.max(1));
        self.total.div_ceil(limit)
    }
}
