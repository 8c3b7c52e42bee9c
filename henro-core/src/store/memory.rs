use std::collections::BTreeMap;

use super::{DocumentStore, StoreError};
use crate::models::{Document, DocumentKey};

/// In-memory store that keeps the latest document per key and a log of
/// every `set` call in order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: BTreeMap<DocumentKey, Document>,
    writes: Vec<(DocumentKey, Document)>,
    fail_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that accepts `writes` calls and rejects every call after that.
    pub fn failing_after(writes: usize) -> Self {
        Self {
            fail_after: Some(writes),
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.documents.get(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All accepted `set` calls in the order they were made.
    pub fn writes(&self) -> &[(DocumentKey, Document)] {
        &self.writes
    }

    pub fn documents(&self) -> impl Iterator<Item = (&DocumentKey, &Document)> {
        self.documents.iter()
    }
}

impl DocumentStore for MemoryStore {
    async fn set(&mut self, key: &DocumentKey, document: &Document) -> Result<(), StoreError> {
        if let Some(limit) = self.fail_after {
            if self.writes.len() >= limit {
                return Err(StoreError::Rejected {
                    status: 503,
                    message: format!("refusing write for '{}'", key),
                });
            }
        }

        self.writes.push((key.clone(), document.clone()));
        self.documents.insert(key.clone(), document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn key(s: &str) -> DocumentKey {
        DocumentKey::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let mut store = MemoryStore::new();
        let first = Document::new().with_field("name", Value::from("a"));
        let second = Document::new().with_field("other", Value::Integer(2));

        store.set(&key("1"), &first).await.unwrap();
        store.set(&key("1"), &second).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1"), Some(&second));
        assert_eq!(store.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_after() {
        let mut store = MemoryStore::failing_after(1);
        let doc = Document::new();

        store.set(&key("1"), &doc).await.unwrap();
        let err = store.set(&key("2"), &doc).await.unwrap_err();

        assert!(matches!(err, StoreError::Rejected { status: 503, .. }));
        assert_eq!(store.len(), 1);
        assert!(store.get("2").is_none());
    }
}
