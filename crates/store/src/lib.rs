//! Infrastructure layer: persistence backends and write orchestration.

pub mod ledger_store;
pub mod writer;

pub use ledger_store::{
    ActorRecord, EntryReadModel, InMemoryLedgerStore, LedgerStore, LogFilter, LogPage, Pagination,
    PostgresLedgerStore, StoreError,
};
pub use writer::{LedgerWriter, WriteError};
