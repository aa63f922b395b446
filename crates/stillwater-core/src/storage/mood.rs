//! Mood check-ins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kv::{keys, KeyValueStore, KeyValueStoreExt};
use super::Preferences;

/// Number of check-ins kept; older entries fall off the end.
pub const MOOD_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Bad,
    Okay,
    Good,
    Great,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    Low,
    Medium,
    High,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Bad => "bad",
            Mood::Okay => "okay",
            Mood::Good => "good",
            Mood::Great => "great",
        }
    }
}

impl Energy {
    pub fn as_str(self) -> &'static str {
        match self {
            Energy::Low => "low",
            Energy::Medium => "medium",
            Energy::High => "high",
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bad" => Ok(Mood::Bad),
            "okay" => Ok(Mood::Okay),
            "good" => Ok(Mood::Good),
            "great" => Ok(Mood::Great),
            other => Err(format!("unknown mood: {other}")),
        }
    }
}

impl std::str::FromStr for Energy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Energy::Low),
            "medium" => Ok(Energy::Medium),
            "high" => Ok(Energy::High),
            other => Err(format!("unknown energy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodLogEntry {
    pub id: String,
    /// When the check-in happened (ISO 8601).
    pub date: DateTime<Utc>,
    pub mood: Mood,
    pub energy: Energy,
}

impl<S: KeyValueStore> Preferences<S> {
    /// Check-ins, newest first.
    pub fn mood_logs(&self) -> Vec<MoodLogEntry> {
        self.store().read_or(keys::MOOD_LOGS, Vec::new())
    }

    /// The `n` most recent check-ins.
    pub fn recent_moods(&self, n: usize) -> Vec<MoodLogEntry> {
        let mut logs = self.mood_logs();
        logs.truncate(n);
        logs
    }

    /// Prepend a check-in, keeping at most [`MOOD_LOG_CAPACITY`] entries.
    pub fn record_mood(&self, mood: Mood, energy: Energy, at: DateTime<Utc>) -> MoodLogEntry {
        let entry = MoodLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            date: at,
            mood,
            energy,
        };
        let mut logs = self.mood_logs();
        logs.insert(0, entry.clone());
        logs.truncate(MOOD_LOG_CAPACITY);
        self.store().write(keys::MOOD_LOGS, &logs);
        entry
    }
}
