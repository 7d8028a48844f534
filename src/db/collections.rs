//! Whole-collection persistence. Each collection is stored as a single
//! JSON blob under a well-known key, read and written in full.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, StoreError};

pub const GAMES_KEY: &str = "savedGames";
pub const REMINDERS_KEY: &str = "savedReminders";
pub const PLAYERS_KEY: &str = "savedPlayers";

/// Outcome of loading a collection key.
///
/// Undecodable stored bytes are not an error: the collection starts over
/// empty and the reason is surfaced so callers can log it. The stale blob
/// stays in place until the next save overwrites it.
#[derive(Debug)]
pub enum CollectionLoad<T> {
    Loaded(Vec<T>),
    Empty,
    Reset { reason: String },
}

impl<T> CollectionLoad<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            CollectionLoad::Loaded(items) => items,
            CollectionLoad::Empty | CollectionLoad::Reset { .. } => Vec::new(),
        }
    }
}

impl Database {
    pub fn save_collection<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec(items)?;
        self.set_blob(key, &encoded)
    }

    pub fn load_collection<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<CollectionLoad<T>, StoreError> {
        let Some(bytes) = self.get_blob(key)? else {
            return Ok(CollectionLoad::Empty);
        };
        match serde_json::from_slice(&bytes) {
            Ok(items) => Ok(CollectionLoad::Loaded(items)),
            Err(e) => Ok(CollectionLoad::Reset {
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Entry {
        name: String,
        count: u32,
    }

    fn open_temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("meeplebox.db")).unwrap();
        db.initialize().unwrap();
        (dir, db)
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let (_dir, db) = open_temp_db();
        let load: CollectionLoad<Entry> = db.load_collection(GAMES_KEY).unwrap();
        assert!(matches!(load, CollectionLoad::Empty));
        assert!(load.into_items().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (_dir, db) = open_temp_db();
        let items = vec![
            Entry {
                name: "Catan".into(),
                count: 4,
            },
            Entry {
                name: "Pandemic".into(),
                count: 2,
            },
        ];

        db.save_collection(GAMES_KEY, &items).unwrap();

        let load: CollectionLoad<Entry> = db.load_collection(GAMES_KEY).unwrap();
        match load {
            CollectionLoad::Loaded(back) => assert_eq!(back, items),
            other => panic!("expected Loaded, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_vec_saves_as_loaded_empty() {
        let (_dir, db) = open_temp_db();
        db.save_collection::<Entry>(PLAYERS_KEY, &[]).unwrap();

        let load: CollectionLoad<Entry> = db.load_collection(PLAYERS_KEY).unwrap();
        assert!(matches!(load, CollectionLoad::Loaded(ref items) if items.is_empty()));
    }

    #[test]
    fn test_corrupt_blob_resets() {
        let (_dir, db) = open_temp_db();
        db.set_blob(REMINDERS_KEY, b"{not json").unwrap();

        let load: CollectionLoad<Entry> = db.load_collection(REMINDERS_KEY).unwrap();
        match load {
            CollectionLoad::Reset { reason } => assert!(!reason.is_empty()),
            other => panic!("expected Reset, got {:?}", other),
        }

        // The stale blob survives until the next save replaces it.
        assert!(db.get_blob(REMINDERS_KEY).unwrap().is_some());
        db.save_collection::<Entry>(REMINDERS_KEY, &[]).unwrap();
        let load: CollectionLoad<Entry> = db.load_collection(REMINDERS_KEY).unwrap();
        assert!(matches!(load, CollectionLoad::Loaded(_)));
    }

    #[test]
    fn test_wrong_shape_resets() {
        let (_dir, db) = open_temp_db();
        // Valid JSON, wrong shape for the collection.
        db.set_blob(GAMES_KEY, br#"{"name": "solo"}"#).unwrap();

        let load: CollectionLoad<Entry> = db.load_collection(GAMES_KEY).unwrap();
        assert!(matches!(load, CollectionLoad::Reset { .. }));
    }
}
