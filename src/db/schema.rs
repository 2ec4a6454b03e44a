//! Schema introspection and table labels.
//!
//! Labels are key/value markers attached to a table name. The entries table
//! carries a `version` label once it conforms to a versioned layout.

use crate::db::db::Db;
use rusqlite::{params, Connection, OptionalExtension};

pub const SCHEMA_TABLE_LABELS: &str = "CREATE TABLE IF NOT EXISTS table_labels (
    table_name TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (table_name, key)
)";

pub const VERSION_LABEL: &str = "version";

const SELECT_LABEL: &str = "SELECT value FROM table_labels WHERE table_name = ?1 AND key = ?2";
const UPSERT_LABEL: &str = "INSERT INTO table_labels (table_name, key, value) VALUES (?1, ?2, ?3)
    ON CONFLICT (table_name, key) DO UPDATE SET value = excluded.value";
const SELECT_OBJECT: &str = "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2";

pub struct Schema<'a> {
    conn: &'a Connection,
}

impl Db {
    pub fn schema(&self) -> Schema<'_> {
        Schema::new(&self.conn)
    }
}

impl<'a> Schema<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Schema { conn }
    }

    pub fn table_exists(&self, table: &str) -> rusqlite::Result<bool> {
        self.object_exists("table", table)
    }

    pub fn index_exists(&self, index: &str) -> rusqlite::Result<bool> {
        self.object_exists("index", index)
    }

    fn object_exists(&self, kind: &str, name: &str) -> rusqlite::Result<bool> {
        let count: i64 = self.conn.query_row(SELECT_OBJECT, params![kind, name], |row| row.get(0))?;
        Ok(count > 0)
    }

    pub fn columns(&self, table: &str) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
        let columns = stmt.query_map([], |row| row.get::<_, String>(1))?.collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Reads a label. Fails with "no such table" when labels were never set up.
    pub fn label(&self, table: &str, key: &str) -> rusqlite::Result<Option<String>> {
        self.conn.query_row(SELECT_LABEL, params![table, key], |row| row.get(0)).optional()
    }

    pub fn set_label(&self, table: &str, key: &str, value: &str) -> rusqlite::Result<()> {
        self.conn.execute(UPSERT_LABEL, params![table, key, value])?;
        Ok(())
    }

    /// SQLite's schema cookie; it changes on every DDL statement.
    pub fn schema_version(&self) -> rusqlite::Result<i64> {
        self.conn.query_row("PRAGMA schema_version", [], |row| row.get(0))
    }
}
