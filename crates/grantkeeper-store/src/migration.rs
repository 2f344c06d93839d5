//! Grant store schema.
//!
//! The schema version lives in SQLite's `user_version` pragma. `MIGRATIONS[n]`
//! takes the schema from version `n` to `n + 1`.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

const MIGRATIONS: &[&str] = &[
    // v1: grant documents stored whole, indexed by owning player.
    r#"
    CREATE TABLE grants (
        grant_id TEXT PRIMARY KEY,
        source_id TEXT NOT NULL,
        body TEXT NOT NULL,
        inserted_at INTEGER NOT NULL
    );
    CREATE INDEX idx_grants_source ON grants(source_id);
    "#,
];

/// Schema version a migrated database ends up at.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{found} is newer than supported v{CURRENT_VERSION}"
        )));
    }
    if found == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for sql in &MIGRATIONS[found as usize..] {
        tx.execute_batch(sql)?;
    }
    tx.pragma_update(None, "user_version", CURRENT_VERSION)?;
    tx.commit()?;

    tracing::debug!(from = found, to = CURRENT_VERSION, "migrated grant store schema");
    Ok(())
}
