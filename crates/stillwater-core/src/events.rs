use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ambient::Channel;
use crate::bell::BellReason;
use crate::breath::{BreathDurations, BreathPhase, PacerState};
use crate::storage::{Energy, Mood};

/// Every state change in the system produces an Event.
/// The CLI prints them; the practice layer reacts to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PacerStarted {
        durations: BreathDurations,
        at: DateTime<Utc>,
    },
    /// A phase began. `cycle` counts completed cycles so far.
    PhaseEntered {
        phase: BreathPhase,
        cycle: u64,
        haptic: Vec<u32>,
        at: DateTime<Utc>,
    },
    PacerStopped {
        cycles: u64,
        at: DateTime<Utc>,
    },
    CycleCompleted {
        cycles: u64,
        at: DateTime<Utc>,
    },
    PacerSnapshot {
        state: PacerState,
        phase: BreathPhase,
        progress: f64,
        scale: f64,
        elapsed_sec: f64,
        target_sec: f64,
        cycles: u64,
        at: DateTime<Utc>,
    },
    CalibrationAccepted {
        cycle_sec: f64,
        durations: BreathDurations,
        at: DateTime<Utc>,
    },
    CalibrationRejected {
        measured_sec: f64,
        hint: String,
        at: DateTime<Utc>,
    },
    BellRang {
        reason: BellReason,
        elapsed_sec: f64,
        at: DateTime<Utc>,
    },
    BellFinished {
        at: DateTime<Utc>,
    },
    StreakUpdated {
        streak_days: u32,
        last_practice: NaiveDate,
        at: DateTime<Utc>,
    },
    MoodLogged {
        id: String,
        mood: Mood,
        energy: Energy,
        at: DateTime<Utc>,
    },
    AmbientToggled {
        enabled: bool,
        /// Channels that are playing synthesized sound instead of a sample.
        synthesized: Vec<Channel>,
        at: DateTime<Utc>,
    },
}
