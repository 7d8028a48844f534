//! Entity types for the catalog: games, players and session reminders.

mod game;
mod player;
mod reminder;

pub use game::{Difficulty, Game};
pub use player::Player;
pub use reminder::{LeadTime, Reminder, ReminderPeriod};
