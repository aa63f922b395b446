//! Guided breathing: phases, durations, ratio profiles, the pacer,
//! tap calibration and the practice session built on top of them.

pub mod calibration;
pub mod cues;
pub mod durations;
pub mod pacer;
pub mod phase;
pub mod practice;
pub mod ratios;

pub use calibration::{calibrate, TapCalibrator, TapOutcome};
pub use cues::{CueSink, HapticLog, NoopCues};
pub use durations::BreathDurations;
pub use pacer::{BreathPacer, PacerState};
pub use phase::{BreathPhase, ScaleBounds};
pub use practice::BreathPractice;
pub use ratios::{
    durations_from_cycle, durations_from_cycle_exact, ratios_for_profile, ratios_from_durations,
    PhaseBounds, Profile, Ratios,
};
