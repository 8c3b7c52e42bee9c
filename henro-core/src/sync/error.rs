//! Synchronization error types.

use thiserror::Error;

use crate::models::{DocumentKey, KeyError};
use crate::rules::DeriveError;
use crate::store::StoreError;

/// Errors that abort a synchronization run.
///
/// Row numbers count data rows from 1, not including the header.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A mapping references a column the table does not have.
    #[error("Column '{column}' is not present in the table")]
    MissingColumn { column: String },

    /// The key column value cannot be turned into a document key.
    #[error("Row {row}: invalid document key: {source}")]
    KeyCoercion {
        row: usize,
        #[source]
        source: KeyError,
    },

    /// A derivation rule rejected the row's values.
    #[error("Row {row}: cannot derive '{field}': {source}")]
    Derivation {
        row: usize,
        field: String,
        #[source]
        source: DeriveError,
    },

    /// The store failed to write a document. Earlier writes are kept.
    #[error("Failed to write document '{key}': {source}")]
    StoreWrite {
        key: DocumentKey,
        #[source]
        source: StoreError,
    },
}
