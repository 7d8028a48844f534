use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Someone you play with, plus their running win/loss tally.
///
/// `games_won <= games_played` is a convention kept by the edit surfaces,
/// not an invariant enforced here (see the catalog increment operations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_filename: Option<String>,
    pub games_played: u32,
    pub games_won: u32,
}

impl Player {
    /// Win percentage, truncated toward zero. Zero when no games played.
    pub fn win_rate(&self) -> u32 {
        if self.games_played == 0 {
            return 0;
        }
        (self.games_won as u64 * 100 / self.games_played as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(played: u32, won: u32) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: "Anton".to_string(),
            description: "Game Master".to_string(),
            photo_filename: None,
            games_played: played,
            games_won: won,
        }
    }

    #[test]
    fn test_win_rate_zero_when_unplayed() {
        assert_eq!(player(0, 0).win_rate(), 0);
    }

    #[test]
    fn test_win_rate_truncates() {
        assert_eq!(player(24, 12).win_rate(), 50);
        // 13/24 = 54.16..., truncated
        assert_eq!(player(24, 13).win_rate(), 54);
        assert_eq!(player(3, 1).win_rate(), 33);
        assert_eq!(player(7, 7).win_rate(), 100);
    }

    #[test]
    fn test_missing_photo_is_omitted_from_json() {
        let json = serde_json::to_value(player(2, 1)).unwrap();
        assert!(json.get("photoFilename").is_none());
        assert_eq!(json["gamesPlayed"], 2);
        assert_eq!(json["gamesWon"], 1);
    }
}
