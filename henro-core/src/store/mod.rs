//! Keyed document stores.
//!
//! The synchronizer only needs `set`: write a whole document under a key,
//! replacing whatever was there.

mod memory;

use std::future::Future;

use thiserror::Error;

use crate::models::{Document, DocumentKey};

pub use memory::MemoryStore;

/// Errors reported by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Credentials unavailable: {0}")]
    Credentials(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Write rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// A remote (or fake) store of documents addressed by key.
pub trait DocumentStore {
    /// Writes `document` under `key`, replacing any existing document.
    fn set(
        &mut self,
        key: &DocumentKey,
        document: &Document,
    ) -> impl Future<Output = Result<(), StoreError>>;
}
