//! SQLite annotation store implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use crate::Result;
use crate::object::ObjectId;
use super::{AnnotationStore, schema};

/// SQLite-backed annotation storage
pub struct SqliteAnnotations {
    conn: Connection,
}

impl SqliteAnnotations {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Count all annotations
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM annotations", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl AnnotationStore for SqliteAnnotations {
    fn get(&self, owner: ObjectId, key: &str) -> Result<Option<Vec<String>>> {
        let raw: Option<String> = self.conn
            .query_row(
                "SELECT value FROM annotations WHERE owner = ?1 AND key = ?2",
                params![owner_key(owner), key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set(&self, owner: ObjectId, key: &str, value: &[String]) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO annotations (owner, key, value)
            VALUES (?1, ?2, ?3)
            "#,
            params![owner_key(owner), key, json],
        )?;
        Ok(())
    }

    fn delete(&self, owner: ObjectId, key: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM annotations WHERE owner = ?1 AND key = ?2",
            params![owner_key(owner), key],
        )?;
        Ok(())
    }

    fn remove_owner(&self, owner: ObjectId) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM annotations WHERE owner = ?1",
            params![owner_key(owner)],
        )?;
        if removed > 0 {
            tracing::debug!("{}: dropped {} annotations", owner, removed);
        }
        Ok(())
    }
}

// SQLite integers are signed; object ids round-trip through the bit pattern.
fn owner_key(owner: ObjectId) -> i64 {
    owner.0 as i64
}
