//! Inventory ledger domain module.
//!
//! A record is one physical, dated batch. It snapshots its product template at
//! creation time and is never edited afterwards. This crate contains the
//! record type, the derived per-day view of a record, and the listing order,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod entry;
pub mod record;

pub use entry::{InventoryEntry, annotate, expiring_only};
pub use record::{NewRecord, Record, RecordKey};
