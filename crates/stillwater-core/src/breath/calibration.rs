//! Tap-to-tempo calibration.
//!
//! The user taps once at the start of an inhale and again at the start of
//! the next one. The interval between the taps becomes the cycle length,
//! which is then spread across the phases using a ratio profile.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::durations::BreathDurations;
use super::phase::{FIRST_TAP_PATTERN, SECOND_TAP_PATTERN};
use super::ratios::{durations_from_cycle, ratios_for_profile, PhaseBounds, Profile, Ratios};
use crate::error::ValidationError;
use crate::events::Event;

pub const DEFAULT_MIN_CYCLE_SEC: f64 = 6.0;
pub const DEFAULT_MAX_CYCLE_SEC: f64 = 24.0;

const FIRST_TAP_HINT: &str = "Tap at the start of an inhale";
const SECOND_TAP_HINT: &str = "Once more, at the start of the next inhale";

/// Result of a single tap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TapOutcome {
    /// First tap recorded; waiting for the second one.
    AwaitingSecondTap { hint: String, haptic: Vec<u32> },
    /// Interval outside the accepted band. Calibration restarted.
    Rejected {
        measured_sec: f64,
        hint: String,
        haptic: Vec<u32>,
    },
    /// Interval accepted as the new cycle length.
    Accepted { cycle_sec: f64, haptic: Vec<u32> },
}

impl TapOutcome {
    pub fn to_event(&self, profile: Profile, current: Ratios, bounds: PhaseBounds) -> Option<Event> {
        match self {
            TapOutcome::AwaitingSecondTap { .. } => None,
            TapOutcome::Rejected {
                measured_sec, hint, ..
            } => Some(Event::CalibrationRejected {
                measured_sec: *measured_sec,
                hint: hint.clone(),
                at: Utc::now(),
            }),
            TapOutcome::Accepted { cycle_sec, .. } => Some(Event::CalibrationAccepted {
                cycle_sec: *cycle_sec,
                durations: calibrate(*cycle_sec, profile, current, bounds),
                at: Utc::now(),
            }),
        }
    }
}

/// Two-tap calibrator. Timestamps are offsets from any fixed origin.
#[derive(Debug, Clone)]
pub struct TapCalibrator {
    min_cycle_sec: f64,
    max_cycle_sec: f64,
    first_tap: Option<Duration>,
}

impl Default for TapCalibrator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CYCLE_SEC, DEFAULT_MAX_CYCLE_SEC)
    }
}

impl TapCalibrator {
    pub fn new(min_cycle_sec: f64, max_cycle_sec: f64) -> Self {
        Self {
            min_cycle_sec,
            max_cycle_sec,
            first_tap: None,
        }
    }

    /// Hint to show before the next tap.
    pub fn hint(&self) -> &'static str {
        if self.first_tap.is_some() {
            SECOND_TAP_HINT
        } else {
            FIRST_TAP_HINT
        }
    }

    pub fn awaiting_second_tap(&self) -> bool {
        self.first_tap.is_some()
    }

    pub fn reset(&mut self) {
        self.first_tap = None;
    }

    pub fn tap(&mut self, at: Duration) -> TapOutcome {
        let Some(first) = self.first_tap.take() else {
            self.first_tap = Some(at);
            return TapOutcome::AwaitingSecondTap {
                hint: SECOND_TAP_HINT.to_string(),
                haptic: FIRST_TAP_PATTERN.to_vec(),
            };
        };

        let measured = at.saturating_sub(first).as_secs_f64();
        match self.check(measured) {
            Ok(cycle_sec) => TapOutcome::Accepted {
                cycle_sec,
                haptic: SECOND_TAP_PATTERN.to_vec(),
            },
            Err(err) => {
                tracing::debug!(measured, "calibration interval rejected");
                TapOutcome::Rejected {
                    measured_sec: measured,
                    hint: format!("{err}. Try again"),
                    haptic: SECOND_TAP_PATTERN.to_vec(),
                }
            }
        }
    }

    /// Validate a measured cycle length against the accepted band (inclusive).
    pub fn check(&self, measured_sec: f64) -> Result<f64, ValidationError> {
        if !measured_sec.is_finite()
            || measured_sec < self.min_cycle_sec
            || measured_sec > self.max_cycle_sec
        {
            return Err(ValidationError::CycleOutOfRange {
                measured: measured_sec,
                min: self.min_cycle_sec,
                max: self.max_cycle_sec,
            });
        }
        Ok(measured_sec)
    }
}

/// Phase durations for a calibrated cycle under `profile`.
pub fn calibrate(
    cycle_sec: f64,
    profile: Profile,
    current: Ratios,
    bounds: PhaseBounds,
) -> BreathDurations {
    durations_from_cycle(cycle_sec, ratios_for_profile(profile, current), bounds)
}
