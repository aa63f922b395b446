use serde::{Deserialize, Serialize};

/// One of the four segments of a breath cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathPhase {
    Inhale,
    HoldHigh,
    Exhale,
    HoldLow,
}

impl BreathPhase {
    pub const ALL: [BreathPhase; 4] = [
        BreathPhase::Inhale,
        BreathPhase::HoldHigh,
        BreathPhase::Exhale,
        BreathPhase::HoldLow,
    ];

    /// The phase that follows this one. The cycle has no terminal phase.
    pub fn next(self) -> Self {
        match self {
            BreathPhase::Inhale => BreathPhase::HoldHigh,
            BreathPhase::HoldHigh => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::HoldLow,
            BreathPhase::HoldLow => BreathPhase::Inhale,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "inhale",
            BreathPhase::HoldHigh => "hold-high",
            BreathPhase::Exhale => "exhale",
            BreathPhase::HoldLow => "hold-low",
        }
    }

    /// Vibration pattern played on entering the phase (on/off milliseconds).
    pub fn haptic_pattern(self) -> &'static [u32] {
        match self {
            BreathPhase::Inhale => &[20],
            BreathPhase::HoldHigh => &[10, 40, 10],
            BreathPhase::Exhale => &[20],
            BreathPhase::HoldLow => &[5, 20, 5],
        }
    }

    /// Position of the breathing shape in 0..=1 for a given phase progress.
    ///
    /// Inhale expands, exhale contracts, the holds stay at the extremes.
    pub fn expansion(self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            BreathPhase::Inhale => p,
            BreathPhase::HoldHigh => 1.0,
            BreathPhase::Exhale => 1.0 - p,
            BreathPhase::HoldLow => 0.0,
        }
    }
}

impl std::fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Linear interpolation of the breathing shape between two scale bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self { min: 0.6, max: 1.0 }
    }
}

impl ScaleBounds {
    pub fn scale(&self, phase: BreathPhase, progress: f64) -> f64 {
        self.min + (self.max - self.min) * phase.expansion(progress)
    }
}

/// Vibration played when the first calibration tap lands.
pub const FIRST_TAP_PATTERN: &[u32] = &[10];
/// Vibration played when the second calibration tap lands.
pub const SECOND_TAP_PATTERN: &[u32] = &[8, 24, 8];
