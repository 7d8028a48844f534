//! Combined games filter: free-text search plus four facet matchers.
//!
//! The player-count and duration facets match loosely against the
//! free-text descriptors on a Game ("2-4 players", "45min"), so a value
//! can satisfy several buckets at once. Genre is a case-sensitive
//! substring test and difficulty is exact.

use crate::models::{Difficulty, Game};

/// Facet labels offered for the player-count filter.
pub const PLAYER_BUCKETS: [&str; 5] = ["1-2", "2-4", "3-6", "4+", "6+"];

/// Facet labels offered for the duration filter.
pub const DURATION_BUCKETS: [&str; 5] =
    ["< 15 min", "15-30 min", "30-60 min", "1-2 hours", "2+ hours"];

#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub players: Option<String>,
    pub duration: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl GameFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.genre.is_none()
            && self.players.is_none()
            && self.duration.is_none()
            && self.difficulty.is_none()
    }

    pub fn matches(&self, game: &Game) -> bool {
        if let Some(query) = &self.search {
            if !query.is_empty() && !game.searchable_text().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if let Some(genre) = &self.genre {
            if !game.genre.contains(genre.as_str()) {
                return false;
            }
        }
        if let Some(players) = &self.players {
            if !matches_player_count(&game.players, players) {
                return false;
            }
        }
        if let Some(duration) = &self.duration {
            if !matches_duration(&game.playtime, duration) {
                return false;
            }
        }
        if let Some(difficulty) = self.difficulty {
            if game.difficulty != difficulty {
                return false;
            }
        }
        true
    }
}

/// An unknown bucket matches nothing.
pub fn matches_player_count(value: &str, bucket: &str) -> bool {
    let v = value.to_lowercase();
    match bucket {
        "1-2" => v.contains("1-2") || v.contains('1') || v.contains('2'),
        "2-4" => v.contains("2-4") || v.contains('3') || v.contains('4'),
        "3-6" => v.contains("3-6") || v.contains('4') || v.contains('5') || v.contains('6'),
        "4+" => v.contains('4') || v.contains('5') || v.contains('6') || v.contains('+'),
        "6+" => v.contains('6') || v.contains('7') || v.contains('8') || v.contains('+'),
        _ => false,
    }
}

/// An unknown bucket matches nothing.
pub fn matches_duration(value: &str, bucket: &str) -> bool {
    let v = value.to_lowercase();
    match bucket {
        "< 15 min" => v.contains("<15") || v.contains("<10") || v.contains("< 15"),
        "15-30 min" => v.contains("15-30") || v.contains("20") || v.contains("25"),
        "30-60 min" => v.contains("30-60") || v.contains("45") || v.contains("30"),
        "1-2 hours" => v.contains("1-2") || v.contains("hour") || v.contains("1h"),
        "2+ hours" => v.contains("2+") || v.contains('3') || v.contains("hours"),
        _ => false,
    }
}
