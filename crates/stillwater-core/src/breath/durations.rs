use serde::{Deserialize, Serialize};

use super::phase::BreathPhase;
use crate::error::ValidationError;

/// Length of each breath phase in seconds.
///
/// Every value is finite and non-negative and the four add up to more than
/// zero. Use [`BreathDurations::new`] to get those guarantees; values read
/// back from storage go through [`BreathDurations::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathDurations {
    #[serde(rename = "inhaleSec")]
    pub inhale: f64,
    #[serde(rename = "holdTopSec")]
    pub hold_high: f64,
    #[serde(rename = "exhaleSec")]
    pub exhale: f64,
    #[serde(rename = "holdBottomSec")]
    pub hold_low: f64,
}

impl Default for BreathDurations {
    fn default() -> Self {
        Self {
            inhale: 4.0,
            hold_high: 4.0,
            exhale: 6.0,
            hold_low: 2.0,
        }
    }
}

impl BreathDurations {
    pub fn new(
        inhale: f64,
        hold_high: f64,
        exhale: f64,
        hold_low: f64,
    ) -> Result<Self, ValidationError> {
        let durations = Self {
            inhale,
            hold_high,
            exhale,
            hold_low,
        };
        durations.validate()?;
        Ok(durations)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for phase in BreathPhase::ALL {
            let value = self.for_phase(phase);
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidDuration {
                    phase: phase.label(),
                    value,
                });
            }
        }
        if self.total() <= 0.0 {
            return Err(ValidationError::EmptyCycle);
        }
        Ok(())
    }

    pub fn for_phase(&self, phase: BreathPhase) -> f64 {
        match phase {
            BreathPhase::Inhale => self.inhale,
            BreathPhase::HoldHigh => self.hold_high,
            BreathPhase::Exhale => self.exhale,
            BreathPhase::HoldLow => self.hold_low,
        }
    }

    /// Full cycle length in seconds.
    pub fn total(&self) -> f64 {
        self.inhale + self.hold_high + self.exhale + self.hold_low
    }

    /// Phase length in whole milliseconds.
    pub fn millis(&self, phase: BreathPhase) -> u64 {
        (self.for_phase(phase) * 1000.0).round().max(0.0) as u64
    }

    /// Breaths per minute at this pacing.
    pub fn breaths_per_minute(&self) -> f64 {
        60.0 / self.total()
    }
}
