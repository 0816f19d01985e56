//! Ledger persistence boundary.
//!
//! This module defines an infrastructure-facing abstraction over the two
//! stores the ledger touches (product counts, append-only ledger entries)
//! without making storage assumptions. The one non-negotiable contract is
//! [`LedgerStore::commit_adjustment`]: a count update and its audit entry are
//! committed together or not at all, guarded by a compare-and-swap on the
//! previous count.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use query::{LogFilter, LogPage, Pagination};
pub use r#trait::{ActorRecord, EntryReadModel, LedgerStore, StoreError};
