//! Store trait: the query interface for grant documents.
//!
//! This trait keeps the service storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::Result;

/// A schemaless stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Field holding the owning player's ID in every grant document.
pub const SOURCE_ID_FIELD: &str = "source_id";

/// Query filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Documents whose `source_id` equals the given player ID.
    SourceId(String),
}

impl Filter {
    /// Match documents owned by a player.
    pub fn source_id(id: impl Into<String>) -> Self {
        Filter::SourceId(id.into())
    }

    /// Whether a document satisfies this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::SourceId(id) => doc
                .get(SOURCE_ID_FIELD)
                .and_then(|v| v.as_str())
                .is_some_and(|v| v == id),
        }
    }
}

/// Results of a query.
///
/// Each item is a document or the error that occurred reading it, so a
/// caller can decide whether one bad row fails the whole query.
#[derive(Debug, Default)]
pub struct Cursor {
    items: VecDeque<Result<Document>>,
}

impl Cursor {
    /// Create a cursor over already-fetched results.
    pub fn new(items: impl IntoIterator<Item = Result<Document>>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Number of results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl Iterator for Cursor {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.items.len(), Some(self.items.len()))
    }
}

/// The GrantStore trait: async query interface for grant documents.
///
/// Implementations may block on I/O; callers must not hold locks across
/// `find`.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Find every document matching `filter`.
    ///
    /// Returns `StoreError::Unavailable` if the store has been closed.
    async fn find(&self, filter: &Filter) -> Result<Cursor>;
}
