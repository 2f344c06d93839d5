//! In-memory implementation of the GrantStore trait.
//!
//! This is primarily for testing. It has the same query semantics as
//! SQLite but keeps everything in memory with no persistence.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::{Cursor, Document, Filter, GrantStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
    closed: AtomicBool,
    /// Number of `find` calls served, for asserting on store traffic.
    queries: AtomicUsize,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        }
    }

    /// Add a document.
    pub fn insert(&self, doc: Document) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(doc);
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Close the store; later queries fail with `Unavailable`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GrantStore for MemoryStore {
    async fn find(&self, filter: &Filter) -> Result<Cursor> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.queries.fetch_add(1, Ordering::SeqCst);

        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        Ok(Cursor::new(
            documents
                .iter()
                .filter(|doc| filter.matches(doc))
                .cloned()
                .map(Ok),
        ))
    }
}
