//! # Tradebook Storage Crate
//!
//! This crate is the journal's "permanent archive": the single place that knows
//! how trades are laid out on disk.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** Everything file-specific lives here. The rest of the application
//!   only sees the `TradeRepository` trait and plain `Trade` values.
//! - **Whole-list persistence:** The journal is small, so every mutation rewrites
//!   the complete JSON array. There is no partial update and no locking; the last
//!   writer wins.
//! - **Newest first:** Repositories hand trades out in the order they are stored,
//!   which is reverse insertion order. Analytics that care about chronology sort
//!   for themselves.
//!
//! ## Public API
//!
//! - `TradeRepository`: The trait every store implements (list, add, delete, replace, reset).
//! - `JsonFileRepository` / `InMemoryRepository`: The two implementations.
//! - `sample_trades`: The demo journal a fresh store is seeded with.
//! - `parse_trades_csv` / `write_trades_csv`: Spreadsheet import and export.
//! - `StorageError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod csv_io;
pub mod error;
pub mod repository;
pub mod seed;

// Re-export the key components to create a clean, public-facing API.
pub use csv_io::{parse_trades_csv, write_trades_csv, IMPORTED_ASSET_CLASS};
pub use error::StorageError;
pub use repository::{InMemoryRepository, JsonFileRepository, TradeRepository};
pub use seed::sample_trades;
