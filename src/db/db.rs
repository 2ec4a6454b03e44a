use crate::libs::data_storage::DataStorage;
use crate::libs::error::LedgerResult;
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "tock.db";

/// Thin session over the SQLite store.
///
/// Opening a `Db` never touches the schema; run the
/// [`Migrator`](crate::db::migrations::Migrator) before handing it to the
/// timer, registry or reports.
pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database in the per-user data directory.
    pub fn new() -> anyhow::Result<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Ok(Db::open(db_file_path)?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Db> {
        let conn = Connection::open(path)?;
        Ok(Db { conn })
    }

    pub fn open_in_memory() -> LedgerResult<Db> {
        let conn = Connection::open_in_memory()?;
        Ok(Db { conn })
    }
}
