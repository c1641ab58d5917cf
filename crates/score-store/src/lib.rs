//! SQLite-backed statement source and score sink, plus the incremental
//! merge/diff layer that keeps the sink append-only and deduplicated.

pub mod diff;
pub mod store;
pub mod tables;

pub use diff::{canonical_number, incremental_rows, DiffOutcome};
pub use store::SqliteStore;
