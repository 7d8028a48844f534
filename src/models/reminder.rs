use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How far ahead of the session start the notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadTime {
    #[serde(rename = "1 day before")]
    OneDay,
    #[serde(rename = "3 hours before")]
    ThreeHours,
}

impl LeadTime {
    /// Seconds subtracted from the session start to get the fire instant.
    pub fn offset_secs(&self) -> i64 {
        match self {
            LeadTime::OneDay => 86_400,
            LeadTime::ThreeHours => 10_800,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadTime::OneDay => "1 day before",
            LeadTime::ThreeHours => "3 hours before",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1day" | "1 day before" => Some(LeadTime::OneDay),
            "3hours" | "3 hours before" => Some(LeadTime::ThreeHours),
            _ => None,
        }
    }
}

/// Which reminders a listing shows. The week/month windows have no lower
/// bound, so past-dated reminders stay visible in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderPeriod {
    All,
    ThisWeek,
    ThisMonth,
}

/// A scheduled game session. `game_title` is free text, not a reference
/// into the games collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub game_title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub players_count: u32,
    pub notify_before: LeadTime,
}

impl Reminder {
    /// Wall-clock instant the session starts (local calendar day + start time).
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}
