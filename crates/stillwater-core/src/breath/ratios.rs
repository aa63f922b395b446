//! Ratio profiles and the conversion from a cycle length to phase durations.

use serde::{Deserialize, Serialize};

use super::durations::BreathDurations;
use crate::error::ValidationError;

/// Shortest phase a calibrated pattern may contain, in seconds.
pub const MIN_PHASE_SEC: f64 = 0.3;
/// Longest phase a calibrated pattern may contain, in seconds.
pub const MAX_PHASE_SEC: f64 = 60.0;

/// Range every calibrated phase is clamped into, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for PhaseBounds {
    fn default() -> Self {
        Self {
            min: MIN_PHASE_SEC,
            max: MAX_PHASE_SEC,
        }
    }
}

impl PhaseBounds {
    /// Bounds must be finite, non-negative and ordered.
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(ValidationError::InvalidValue {
                field: "phase bounds".into(),
                message: format!("expected 0 <= min <= max, got {min}..{max}"),
            });
        }
        Ok(Self { min, max })
    }

    pub fn clamp(&self, sec: f64) -> f64 {
        sec.max(self.min).min(self.max)
    }
}

/// Relative weight of each phase within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    pub inhale: f64,
    pub hold_high: f64,
    pub exhale: f64,
    pub hold_low: f64,
}

impl Ratios {
    pub const fn new(inhale: f64, hold_high: f64, exhale: f64, hold_low: f64) -> Self {
        Self {
            inhale,
            hold_high,
            exhale,
            hold_low,
        }
    }

    pub fn sum(&self) -> f64 {
        self.inhale + self.hold_high + self.exhale + self.hold_low
    }

    /// Scale the components so they add up to one.
    ///
    /// A zero sum is treated as one so an all-zero set stays all-zero.
    pub fn normalize(&self) -> Self {
        let s = self.sum();
        let s = if s == 0.0 || !s.is_finite() { 1.0 } else { s };
        Self {
            inhale: self.inhale / s,
            hold_high: self.hold_high / s,
            exhale: self.exhale / s,
            hold_low: self.hold_low / s,
        }
    }
}

/// Named breathing technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Profile {
    /// The app's default 4:4:6:2 pacing.
    #[default]
    #[serde(rename = "default")]
    Default,
    /// Whatever ratios the current pattern already has.
    #[serde(rename = "keep")]
    Keep,
    #[serde(rename = "box")]
    Box,
    #[serde(rename = "coherent")]
    Coherent,
    #[serde(rename = "relax")]
    Relax,
    #[serde(rename = "478")]
    FourSevenEight,
}

impl Profile {
    pub const ALL: [Profile; 6] = [
        Profile::Default,
        Profile::Keep,
        Profile::Box,
        Profile::Coherent,
        Profile::Relax,
        Profile::FourSevenEight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Default => "default",
            Profile::Keep => "keep",
            Profile::Box => "box",
            Profile::Coherent => "coherent",
            Profile::Relax => "relax",
            Profile::FourSevenEight => "478",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Profile::Default => "Default",
            Profile::Keep => "Keep current",
            Profile::Box => "Box",
            Profile::Coherent => "Coherent",
            Profile::Relax => "Relax",
            Profile::FourSevenEight => "4-7-8",
        }
    }

    /// Raw (unnormalized) weights; `None` for [`Profile::Keep`].
    fn weights(self) -> Option<Ratios> {
        match self {
            Profile::Default => Some(Ratios::new(4.0, 4.0, 6.0, 2.0)),
            Profile::Keep => None,
            Profile::Box => Some(Ratios::new(1.0, 1.0, 1.0, 1.0)),
            Profile::Coherent => Some(Ratios::new(1.0, 0.0, 1.0, 0.0)),
            Profile::Relax => Some(Ratios::new(2.0, 0.5, 3.0, 0.5)),
            Profile::FourSevenEight => Some(Ratios::new(4.0, 7.0, 8.0, 0.0)),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Profile::Default),
            "keep" => Ok(Profile::Keep),
            "box" => Ok(Profile::Box),
            "coherent" => Ok(Profile::Coherent),
            "relax" => Ok(Profile::Relax),
            "478" | "4-7-8" => Ok(Profile::FourSevenEight),
            other => Err(format!("unknown profile: {other}")),
        }
    }
}

/// Normalized ratios for `profile`, falling back to `current` for `Keep`.
pub fn ratios_for_profile(profile: Profile, current: Ratios) -> Ratios {
    profile.weights().unwrap_or(current).normalize()
}

/// Spread a calibrated cycle across the phases.
///
/// Each phase is rounded to a tenth of a second and clamped into `bounds`,
/// so zero-weight phases still get a short pause and nothing stalls the
/// pacer.
pub fn durations_from_cycle(
    total_sec: f64,
    ratios: Ratios,
    bounds: PhaseBounds,
) -> BreathDurations {
    let clamp = |x: f64| bounds.clamp((x * 10.0).round() / 10.0);
    BreathDurations {
        inhale: clamp(total_sec * ratios.inhale),
        hold_high: clamp(total_sec * ratios.hold_high),
        exhale: clamp(total_sec * ratios.exhale),
        hold_low: clamp(total_sec * ratios.hold_low),
    }
}

/// Spread a cycle across the phases without rounding or clamping.
///
/// Used when an existing pattern switches profile; the total is preserved.
pub fn durations_from_cycle_exact(total_sec: f64, ratios: Ratios) -> BreathDurations {
    BreathDurations {
        inhale: total_sec * ratios.inhale,
        hold_high: total_sec * ratios.hold_high,
        exhale: total_sec * ratios.exhale,
        hold_low: total_sec * ratios.hold_low,
    }
}

/// The ratios a set of durations currently expresses.
pub fn ratios_from_durations(durations: &BreathDurations) -> Ratios {
    Ratios::new(
        durations.inhale,
        durations.hold_high,
        durations.exhale,
        durations.hold_low,
    )
    .normalize()
}
