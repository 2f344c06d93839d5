//! SQLite implementation of the GrantStore trait.
//!
//! This is the primary storage backend for Grantkeeper. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking.
//! Documents are stored whole as JSON text, indexed by `source_id`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{Cursor, Document, Filter, GrantStore, SOURCE_ID_FIELD};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime. The connection is `None` once the
/// store has been closed.
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Insert or replace a grant document.
    ///
    /// The document must carry string `_id` and `source_id` fields.
    pub async fn insert(&self, doc: Document) -> Result<()> {
        let grant_id = string_field(&doc, "_id")?;
        let source_id = string_field(&doc, SOURCE_ID_FIELD)?;
        let body = serde_json::to_string(&doc).map_err(|e| StoreError::InvalidData(e.to_string()))?;

        self.run_blocking(move |conn| {
            conn.execute(
                "INSERT INTO grants (grant_id, source_id, body, inserted_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(grant_id) DO UPDATE SET
                    source_id = excluded.source_id,
                    body = excluded.body",
                params![grant_id, source_id, body, now_secs()],
            )?;
            Ok(())
        })
        .await
    }

    /// Close the underlying connection. Later operations fail with
    /// `StoreError::Unavailable`.
    pub async fn close(&self) -> Result<()> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let taken = lock(&conn)?.take();
            if let Some(conn) = taken {
                conn.close().map_err(|(_, e)| StoreError::Database(e))?;
            }
            Ok(())
        })
        .await
        .map_err(join_failed)?
    }

    /// Run a blocking operation on the connection.
    async fn run_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn)?;
            let conn = guard.as_ref().ok_or(StoreError::Unavailable)?;
            f(conn)
        })
        .await
        .map_err(join_failed)?
    }
}

#[async_trait]
impl GrantStore for SqliteStore {
    async fn find(&self, filter: &Filter) -> Result<Cursor> {
        let filter = filter.clone();

        let bodies = self
            .run_blocking(move |conn| {
                let Filter::SourceId(source_id) = &filter;
                let mut stmt = conn.prepare(
                    "SELECT grant_id, body FROM grants
                     WHERE source_id = ?1
                     ORDER BY inserted_at, rowid",
                )?;
                let rows = stmt
                    .query_map(params![source_id], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        Ok(Cursor::new(
            bodies
                .into_iter()
                .map(|(grant_id, body)| parse_body(&grant_id, &body)),
        ))
    }
}

fn parse_body(grant_id: &str, body: &str) -> Result<Document> {
    match serde_json::from_str(body) {
        Ok(serde_json::Value::Object(doc)) => Ok(doc),
        Ok(_) => Err(StoreError::Decode(format!(
            "document {} is not an object",
            grant_id
        ))),
        Err(e) => Err(StoreError::Decode(format!("document {}: {}", grant_id, e))),
    }
}

fn string_field(doc: &Document, field: &str) -> Result<String> {
    doc.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| StoreError::InvalidData(format!("{} is not a string", field)))
}

fn lock(conn: &Mutex<Option<Connection>>) -> Result<std::sync::MutexGuard<'_, Option<Connection>>> {
    conn.lock().map_err(|e| {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("mutex poisoned: {}", e)),
        ))
    })
}

fn join_failed(e: tokio::task::JoinError) -> StoreError {
    StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
        Some(format!("spawn_blocking failed: {}", e)),
    ))
}

fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grant_doc(id: &str, source: &str, value: &str) -> Document {
        match json!({
            "_id": id,
            "source_id": source,
            "grant": {"key": "rank", "value": value},
            "added_by": "console",
            "added_at": 100,
            "expires_at": 0,
            "scopes": [],
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_insert_and_find() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert(grant_doc("g1", "p1", "vip")).await.unwrap();
        store.insert(grant_doc("g2", "p2", "vip")).await.unwrap();
        store.insert(grant_doc("g3", "p1", "mod")).await.unwrap();

        let docs: Vec<_> = store
            .find(&Filter::source_id("p1"))
            .await
            .unwrap()
            .map(|d| d.unwrap())
            .collect();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["_id"], "g1");
        assert_eq!(docs[1]["grant"]["value"], "mod");
    }

    #[tokio::test]
    async fn test_sqlite_insert_replaces_by_id() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert(grant_doc("g1", "p1", "vip")).await.unwrap();
        store.insert(grant_doc("g1", "p1", "mod")).await.unwrap();

        let docs: Vec<_> = store
            .find(&Filter::source_id("p1"))
            .await
            .unwrap()
            .map(|d| d.unwrap())
            .collect();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["grant"]["value"], "mod");
    }

    #[tokio::test]
    async fn test_sqlite_insert_requires_ids() {
        let store = SqliteStore::open_memory().unwrap();
        let mut doc = grant_doc("g1", "p1", "vip");
        doc.remove("source_id");
        assert!(matches!(
            store.insert(doc).await,
            Err(StoreError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_sqlite_corrupt_body_is_decode_error() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .run_blocking(|conn| {
                conn.execute(
                    "INSERT INTO grants (grant_id, source_id, body, inserted_at)
                     VALUES ('bad', 'p1', '{not json', 0)",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let mut cursor = store.find(&Filter::source_id("p1")).await.unwrap();
        assert!(matches!(cursor.next(), Some(Err(StoreError::Decode(_)))));
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(grant_doc("g1", "p1", "vip")).await.unwrap();
            store.close().await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let cursor = store.find(&Filter::source_id("p1")).await.unwrap();
        assert_eq!(cursor.remaining(), 1);
    }

    #[tokio::test]
    async fn test_closed_sqlite_store_is_unavailable() {
        let store = SqliteStore::open_memory().unwrap();
        store.close().await.unwrap();
        assert!(matches!(
            store.find(&Filter::source_id("p1")).await,
            Err(StoreError::Unavailable)
        ));
    }
}
