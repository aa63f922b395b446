//! Consecutive-day practice streak.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::kv::{keys, KeyValueStore, KeyValueStoreExt};
use super::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StreakState {
    #[serde(rename = "lastPracticeISO", default, skip_serializing_if = "Option::is_none")]
    pub last_practice: Option<DateTime<Utc>>,
    #[serde(rename = "streakDays", default)]
    pub streak_days: u32,
}

impl StreakState {
    /// State after practicing at `now`, using `now`'s calendar.
    ///
    /// Same day keeps the count, the next day adds one, any longer gap
    /// starts over at one. A clock that went backwards keeps the count.
    pub fn advance<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> StreakState {
        let today = now.date_naive();
        let streak_days = match self.last_day_in(&now.timezone()) {
            None => 1,
            Some(prev) => match (today - prev).num_days() {
                0 => self.streak_days.max(1),
                1 => self.streak_days.saturating_add(1),
                d if d > 1 => 1,
                _ => self.streak_days,
            },
        };
        StreakState {
            last_practice: Some(now.with_timezone(&Utc)),
            streak_days,
        }
    }

    /// Streak as shown on `today`: broken once a full day was missed.
    pub fn current_on(&self, today: NaiveDate, tz: &impl TimeZone) -> u32 {
        match self.last_day_in(tz) {
            Some(prev) if (today - prev).num_days() <= 1 => self.streak_days,
            _ => 0,
        }
    }

    fn last_day_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.last_practice
            .map(|at| at.with_timezone(tz).date_naive())
    }
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn streak(&self) -> StreakState {
        self.store().read_or(keys::STREAK, StreakState::default())
    }

    /// Record a completed breath cycle at `now` and persist the new streak.
    pub fn log_practice<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> StreakState {
        let next = self.streak().advance(now);
        self.store().write(keys::STREAK, &next);
        next
    }
}
