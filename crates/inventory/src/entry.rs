use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{ActorId, EntryId, ProductId};

use crate::adjustment::{Adjustment, AdjustmentAction};

/// Immutable audit record of one stock-count change.
///
/// Entries are append-only: once recorded they are never mutated or deleted,
/// and they survive product or actor deletion (no cascade).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub product_id: ProductId,
    pub actor_id: ActorId,
    pub action: AdjustmentAction,
    /// Magnitude as supplied by the caller (sign implied by `action`).
    pub quantity: i64,
    /// Stock count snapshot before the change.
    pub previous_count: i64,
    /// Stock count snapshot after the change.
    pub new_count: i64,
    pub reason: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Capture the audit record for a computed adjustment.
    pub fn record(
        adjustment: &Adjustment,
        previous_count: i64,
        new_count: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            product_id: adjustment.product_id,
            actor_id: adjustment.actor_id,
            action: adjustment.action,
            quantity: adjustment.quantity,
            previous_count,
            new_count,
            reason: adjustment.reason.clone(),
            notes: adjustment.notes.clone(),
            created_at,
        }
    }
}
