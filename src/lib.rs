//! Core library for meeplebox, a local board-game catalog with session
//! reminders. The [`catalog::Catalog`] owns the persisted collections;
//! the notification daemon shares the same database file and delivers
//! queued reminders as desktop notifications.

pub mod catalog;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod models;
pub mod notify;
pub mod photos;

pub use catalog::{Catalog, CatalogError, GameDraft, GameFilter, PlayerDraft, ReminderDraft};
pub use config::Config;
pub use models::{Difficulty, Game, LeadTime, Player, Reminder, ReminderPeriod};
