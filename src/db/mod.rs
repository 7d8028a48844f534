//! Local storage: one SQLite file holding the persisted collections (as
//! key/value blobs) plus the pending-notification queue the daemon reads.

mod collections;
mod notifications;
mod schema;

pub use collections::{CollectionLoad, GAMES_KEY, PLAYERS_KEY, REMINDERS_KEY};
pub use notifications::{PendingNotification, TIMESTAMP_FORMAT};

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Errors from the storage layer. Collection decode failures are NOT in
/// here; they are tolerated and reported through [`CollectionLoad`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open (creating parent directories and the file as needed).
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(schema::SCHEMA)?;
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<(), StoreError> {
        for migration in schema::MIGRATIONS {
            let _ = self.conn.execute(migration, []);
        }
        Ok(())
    }

    // ========================================================================
    // Key/value blobs (the platform-defaults analog)
    // ========================================================================

    pub fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let result = self.conn.query_row(
            "SELECT value FROM defaults WHERE key = ?",
            [key],
            |row| row.get::<_, Vec<u8>>(0),
        );
        match result {
            Ok(bytes) => Ok(Some(bytes)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_blob(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO defaults (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE
                SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// String convenience over [`Database::get_blob`]; non-UTF-8 values
    /// read as absent.
    pub fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .get_blob(key)?
            .and_then(|bytes| String::from_utf8(bytes).ok()))
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_blob(key, value.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("meeplebox.db")).unwrap();
        db.initialize().unwrap();
        (dir, db)
    }

    #[test]
    fn test_blob_roundtrip_and_overwrite() {
        let (_dir, db) = open_temp_db();

        assert_eq!(db.get_blob("savedGames").unwrap(), None);

        db.set_blob("savedGames", b"[]").unwrap();
        assert_eq!(db.get_blob("savedGames").unwrap(), Some(b"[]".to_vec()));

        db.set_blob("savedGames", b"[1,2]").unwrap();
        assert_eq!(db.get_blob("savedGames").unwrap(), Some(b"[1,2]".to_vec()));
    }

    #[test]
    fn test_keys_are_independent() {
        let (_dir, db) = open_temp_db();

        db.set_blob("savedGames", b"games").unwrap();
        db.set_blob("savedPlayers", b"players").unwrap();

        assert_eq!(db.get_blob("savedGames").unwrap(), Some(b"games".to_vec()));
        assert_eq!(
            db.get_blob("savedPlayers").unwrap(),
            Some(b"players".to_vec())
        );
        assert_eq!(db.get_blob("savedReminders").unwrap(), None);
    }

    #[test]
    fn test_string_helpers() {
        let (_dir, db) = open_temp_db();

        db.set_string("notificationPermission", "granted").unwrap();
        assert_eq!(
            db.get_string("notificationPermission").unwrap().as_deref(),
            Some("granted")
        );

        db.set_blob("binary", &[0xff, 0xfe]).unwrap();
        assert_eq!(db.get_string("binary").unwrap(), None);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, db) = open_temp_db();
        db.initialize().unwrap();
        db.initialize().unwrap();
    }
}
