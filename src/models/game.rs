use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How hard a game is to learn and play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// A board game in the collection.
///
/// `players` and `playtime` are free-text descriptors ("2-5", "45min"),
/// kept as the owner typed them rather than parsed into ranges.
/// `photo_filenames` are weak references into the photo store; deleting a
/// game must delete the referenced files explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub players: String,
    pub playtime: String,
    pub difficulty: Difficulty,
    pub rating: u8,
    pub description: String,
    pub comments: String,
    pub photo_filenames: Vec<String>,
    pub date_added: DateTime<Utc>,
}

impl Game {
    /// Text blob the search matches against (title, genre, description).
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.title, self.genre, self.description).to_lowercase()
    }
}
