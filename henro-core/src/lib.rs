//! Henro Core Library
//!
//! Turns rows of a table into keyed documents and writes them to a
//! document store.

pub mod models;
pub mod rules;
pub mod store;
pub mod sync;
pub mod table;

pub use models::{Document, DocumentKey, GeoPoint, KeyError, Value};
pub use rules::{ColumnMapping, DerivationRule, DeriveError, ImageUrlTemplate, RowMapping};
pub use store::{DocumentStore, MemoryStore, StoreError};
pub use sync::{prepare, synchronize, SyncError, SyncPlan, SyncReport};
pub use table::{Table, TableError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
