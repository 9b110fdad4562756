//! SQLite connection management for Web Portals.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection` and
//! brings the partition/service schema up to date on open.

use rusqlite::Connection;
use std::path::Path;

use super::migrations;

/// Owns the SQLite connection; migrations run on every open.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file at `path` and brings the schema
    /// up to date.
    ///
    /// # Arguments
    /// * `path` - Location of the SQLite file, usually `<data dir>/portals.db`.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open(path)?)
    }

    /// In-memory database, discarded on drop.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or a
    /// migration fails.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, shared by the portal store.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
