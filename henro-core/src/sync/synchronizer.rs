use crate::models::{Document, DocumentKey};
use crate::rules::RowMapping;
use crate::store::DocumentStore;
use crate::table::Table;

use super::error::SyncError;
use super::plan::SyncPlan;

/// Outcome of a completed synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of documents written, one per table row.
    pub written: usize,
}

/// Builds every keyed document for `table` without writing anything.
pub fn prepare(
    table: &Table,
    mapping: &RowMapping,
) -> Result<Vec<(DocumentKey, Document)>, SyncError> {
    SyncPlan::compile(table, mapping)?.build_documents(table)
}

/// Writes one document per table row into `store`, keyed by the mapping's
/// key column.
///
/// All documents are built before the first write, so column, key and
/// derivation errors never leave a partial run behind. Store failures do.
pub async fn synchronize<S: DocumentStore>(
    table: &Table,
    mapping: &RowMapping,
    store: &mut S,
) -> Result<SyncReport, SyncError> {
    let documents = prepare(table, mapping)?;
    tracing::info!("Writing {} document(s)", documents.len());

    let mut written = 0;
    for (key, document) in &documents {
        store
            .set(key, document)
            .await
            .map_err(|source| SyncError::StoreWrite {
                key: key.clone(),
                source,
            })?;
        written += 1;
        tracing::debug!(key = %key, fields = document.len(), "Wrote document");
    }

    Ok(SyncReport { written })
}
