//! The catalog holds the three persisted collections and is the single
//! owner of mutations: every change is written through to storage
//! immediately, and reminder changes keep the notification queue in step.

mod filter;

pub use filter::{
    matches_duration, matches_player_count, GameFilter, DURATION_BUCKETS, PLAYER_BUCKETS,
};

use chrono::{Duration, Local, Months, NaiveDate, Utc};
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db::{
    CollectionLoad, Database, PendingNotification, StoreError, GAMES_KEY, PLAYERS_KEY,
    REMINDERS_KEY,
};
use crate::models::{Difficulty, Game, LeadTime, Player, Reminder, ReminderPeriod};
use crate::notify::{NotificationCenter, Permission};
use crate::photos::PhotoStore;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no game with id {0}")]
    GameNotFound(Uuid),
    #[error("no player with id {0}")]
    PlayerNotFound(Uuid),
    #[error("no reminder with id {0}")]
    ReminderNotFound(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for a new game. The id and timestamp are assigned on add.
#[derive(Debug, Clone)]
pub struct GameDraft {
    pub title: String,
    pub genre: String,
    pub players: String,
    pub playtime: String,
    pub difficulty: Difficulty,
    pub rating: u8,
    pub description: String,
    pub comments: String,
}

/// Input for adding or updating a player. Updates replace every field;
/// the stored portrait changes only when `photo` is set.
#[derive(Debug, Clone)]
pub struct PlayerDraft {
    pub name: String,
    pub description: String,
    pub photo: Option<PathBuf>,
    pub games_played: u32,
    pub games_won: u32,
}

#[derive(Debug, Clone)]
pub struct ReminderDraft {
    pub game_title: String,
    pub date: NaiveDate,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub players_count: u32,
    pub notify_before: LeadTime,
}

pub struct Catalog {
    games: Vec<Game>,
    reminders: Vec<Reminder>,
    players: Vec<Player>,
    db: Database,
    photos: PhotoStore,
    notifier: NotificationCenter,
}

impl Catalog {
    /// Open the database and load all three collections. A collection
    /// whose stored bytes cannot be decoded starts over empty; the other
    /// two load normally.
    pub fn open(config: &Config) -> Result<Self, CatalogError> {
        let db = Database::open(&config.db_path)?;
        db.initialize()?;
        let photos = PhotoStore::new(&config.photos);
        let notifier = NotificationCenter::new(&config.notifications);

        let games = load_or_empty(&db, GAMES_KEY, "games")?;
        let reminders = load_or_empty(&db, REMINDERS_KEY, "reminders")?;
        let players = load_or_empty(&db, PLAYERS_KEY, "players")?;
        info!(
            "Catalog opened: {} games, {} players, {} reminders",
            games.len(),
            players.len(),
            reminders.len()
        );

        Ok(Self {
            games,
            reminders,
            players,
            db,
            photos,
            notifier,
        })
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn photo_store(&self) -> &PhotoStore {
        &self.photos
    }

    // ========================================================================
    // Games
    // ========================================================================

    /// Add a game, storing its photos first. A photo that cannot be read
    /// is skipped; the game keeps the filenames that stored successfully.
    pub fn add_game(&mut self, draft: GameDraft, photos: &[PathBuf]) -> Game {
        let mut photo_filenames = Vec::new();
        for (index, source) in photos.iter().enumerate() {
            if let Some(filename) = self.photos.store_photo(source, index) {
                photo_filenames.push(filename);
            }
        }

        let game = Game {
            id: Uuid::new_v4(),
            title: draft.title,
            genre: draft.genre,
            players: draft.players,
            playtime: draft.playtime,
            difficulty: draft.difficulty,
            rating: draft.rating,
            description: draft.description,
            comments: draft.comments,
            photo_filenames,
            date_added: Utc::now(),
        };

        self.games.push(game.clone());
        self.persist_games();
        game
    }

    /// Remove the game's photo files, then the game itself.
    pub fn delete_game(&mut self, id: Uuid) -> Result<(), CatalogError> {
        let index = self
            .games
            .iter()
            .position(|g| g.id == id)
            .ok_or(CatalogError::GameNotFound(id))?;

        for filename in &self.games[index].photo_filenames {
            self.photos.remove(filename);
        }
        self.games.remove(index);
        self.persist_games();
        Ok(())
    }

    /// Case-insensitive substring search over title, genre and
    /// description. An empty query returns everything.
    pub fn search_games(&self, query: &str) -> Vec<&Game> {
        if query.is_empty() {
            return self.games.iter().collect();
        }
        let query = query.to_lowercase();
        self.games
            .iter()
            .filter(|g| g.searchable_text().contains(&query))
            .collect()
    }

    pub fn filter_games(&self, filter: &GameFilter) -> Vec<&Game> {
        self.games.iter().filter(|g| filter.matches(g)).collect()
    }

    pub fn all_genres(&self) -> Vec<String> {
        self.games
            .iter()
            .map(|g| g.genre.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn all_player_options(&self) -> Vec<String> {
        self.games
            .iter()
            .map(|g| g.players.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn random_game(&self) -> Option<&Game> {
        self.games.choose(&mut rand::thread_rng())
    }

    // ========================================================================
    // Players
    // ========================================================================

    pub fn add_player(&mut self, draft: PlayerDraft) -> Player {
        let photo_filename = draft
            .photo
            .as_deref()
            .and_then(|source| self.photos.store_portrait(source));

        let player = Player {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            photo_filename,
            games_played: draft.games_played,
            games_won: draft.games_won,
        };

        self.players.push(player.clone());
        self.persist_players();
        player
    }

    /// Replace a player's fields. When a new photo is supplied the old
    /// portrait file is removed before the new one is stored.
    pub fn update_player(&mut self, id: Uuid, draft: PlayerDraft) -> Result<(), CatalogError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(CatalogError::PlayerNotFound(id))?;

        let mut photo_filename = self.players[index].photo_filename.clone();
        if let Some(source) = draft.photo.as_deref() {
            if let Some(old) = &photo_filename {
                self.photos.remove(old);
            }
            if let Some(fresh) = self.photos.store_portrait(source) {
                photo_filename = Some(fresh);
            }
        }

        self.players[index] = Player {
            id,
            name: draft.name,
            description: draft.description,
            photo_filename,
            games_played: draft.games_played,
            games_won: draft.games_won,
        };
        self.persist_players();
        Ok(())
    }

    pub fn delete_player(&mut self, id: Uuid) -> Result<(), CatalogError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(CatalogError::PlayerNotFound(id))?;

        if let Some(filename) = &self.players[index].photo_filename {
            self.photos.remove(filename);
        }
        self.players.remove(index);
        self.persist_players();
        Ok(())
    }

    /// Quietly does nothing when no player has this id.
    pub fn increment_games_played(&mut self, id: Uuid) {
        if let Some(index) = self.players.iter().position(|p| p.id == id) {
            self.players[index].games_played += 1;
            self.persist_players();
        }
    }

    /// Quietly does nothing when no player has this id.
    pub fn increment_games_won(&mut self, id: Uuid) {
        if let Some(index) = self.players.iter().position(|p| p.id == id) {
            self.players[index].games_won += 1;
            self.persist_players();
        }
    }

    // ========================================================================
    // Reminders
    // ========================================================================

    /// Add a reminder and queue its notification. A queueing failure is
    /// logged; the reminder itself always persists.
    pub fn add_reminder(&mut self, draft: ReminderDraft) -> Reminder {
        let reminder = Reminder {
            id: Uuid::new_v4(),
            game_title: draft.game_title,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            players_count: draft.players_count,
            notify_before: draft.notify_before,
        };

        self.reminders.push(reminder.clone());
        self.persist_reminders();

        if let Err(e) = self.notifier.schedule(&self.db, &reminder) {
            warn!(
                "Failed to queue notification for reminder {}: {}",
                reminder.id, e
            );
        }
        reminder
    }

    /// Cancel the pending notification first, then remove the reminder.
    pub fn delete_reminder(&mut self, id: Uuid) -> Result<(), CatalogError> {
        let index = self
            .reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or(CatalogError::ReminderNotFound(id))?;

        if let Err(e) = self.notifier.cancel(&self.db, id) {
            warn!("Failed to cancel notification for reminder {}: {}", id, e);
        }
        self.reminders.remove(index);
        self.persist_reminders();
        Ok(())
    }

    /// Ascending by day, then by start time within the day.
    pub fn sorted_reminders(&self) -> Vec<Reminder> {
        let mut sorted = self.reminders.clone();
        sorted.sort_by_key(|r| (r.date, r.start_time));
        sorted
    }

    /// Week keeps everything dated up to a week from today, month up to
    /// one calendar month. Past reminders stay included in both.
    pub fn filter_reminders(&self, period: ReminderPeriod) -> Vec<Reminder> {
        let sorted = self.sorted_reminders();
        let today = Local::now().date_naive();
        match period {
            ReminderPeriod::All => sorted,
            ReminderPeriod::ThisWeek => {
                let end = today + Duration::days(7);
                sorted.into_iter().filter(|r| r.date <= end).collect()
            }
            ReminderPeriod::ThisMonth => {
                let end = today
                    .checked_add_months(Months::new(1))
                    .unwrap_or(NaiveDate::MAX);
                sorted.into_iter().filter(|r| r.date <= end).collect()
            }
        }
    }

    pub fn group_reminders_by_date(&self) -> BTreeMap<NaiveDate, Vec<Reminder>> {
        let mut grouped: BTreeMap<NaiveDate, Vec<Reminder>> = BTreeMap::new();
        for reminder in self.sorted_reminders() {
            grouped.entry(reminder.date).or_default().push(reminder);
        }
        grouped
    }

    // ========================================================================
    // Notifications and maintenance
    // ========================================================================

    pub fn notification_permission(&self) -> Result<Permission, CatalogError> {
        Ok(self.notifier.permission(&self.db)?)
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> Result<Permission, CatalogError> {
        Ok(self.notifier.set_permission(&self.db, enabled)?)
    }

    pub fn pending_notifications(&self) -> Result<Vec<PendingNotification>, CatalogError> {
        Ok(self.notifier.pending(&self.db)?)
    }

    /// Clear every collection, stored photo and pending notification.
    pub fn wipe(&mut self) {
        self.games.clear();
        self.players.clear();
        self.reminders.clear();
        self.persist_games();
        self.persist_players();
        self.persist_reminders();

        match self.photos.clear() {
            Ok(removed) => info!("Removed {} stored photos", removed),
            Err(e) => warn!("Failed to clear photo directory: {}", e),
        }
        if let Err(e) = self.notifier.cancel_all(&self.db) {
            warn!("Failed to cancel pending notifications: {}", e);
        }
        info!("All catalog data cleared");
    }

    // Write-through failures degrade to a log line; the in-memory state
    // stays authoritative for the rest of the session.

    fn persist_games(&self) {
        if let Err(e) = self.db.save_collection(GAMES_KEY, &self.games) {
            error!("Failed to save games: {}", e);
        }
    }

    fn persist_players(&self) {
        if let Err(e) = self.db.save_collection(PLAYERS_KEY, &self.players) {
            error!("Failed to save players: {}", e);
        }
    }

    fn persist_reminders(&self) {
        if let Err(e) = self.db.save_collection(REMINDERS_KEY, &self.reminders) {
            error!("Failed to save reminders: {}", e);
        }
    }
}

fn load_or_empty<T: DeserializeOwned>(
    db: &Database,
    key: &str,
    what: &str,
) -> Result<Vec<T>, StoreError> {
    Ok(match db.load_collection(key)? {
        CollectionLoad::Loaded(items) => items,
        CollectionLoad::Empty => Vec::new(),
        CollectionLoad::Reset { reason } => {
            warn!("Stored {} are unreadable, starting over empty: {}", what, reason);
            Vec::new()
        }
    })
}
