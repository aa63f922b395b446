//! Breath pacer.
//!
//! The pacer is a frame-driven state machine. It does not own a clock or a
//! thread -- the caller feeds it the time since the previous frame through
//! `tick()`, which makes every transition reproducible in tests.
//!
//! ## Phase cycle
//!
//! ```text
//! Inhale -> HoldHigh -> Exhale -> HoldLow -> Inhale -> ...
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut pacer = BreathPacer::new();
//! pacer.start(BreathDurations::default(), &mut cues);
//! // Once per frame:
//! pacer.tick(frame_delta, &mut cues); // Some(Event) on phase change
//! ```

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cues::CueSink;
use super::durations::BreathDurations;
use super::phase::{BreathPhase, ScaleBounds};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathPacer {
    state: PacerState,
    durations: BreathDurations,
    phase: BreathPhase,
    /// Seconds accumulated against the current phase target.
    elapsed_sec: f64,
    /// Completed inhale-to-inhale cycles since `start`.
    cycles: u64,
    #[serde(default)]
    bounds: ScaleBounds,
}

impl Default for BreathPacer {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathPacer {
    pub fn new() -> Self {
        Self {
            state: PacerState::Idle,
            durations: BreathDurations::default(),
            phase: BreathPhase::Inhale,
            elapsed_sec: 0.0,
            cycles: 0,
            bounds: ScaleBounds::default(),
        }
    }

    pub fn with_bounds(mut self, bounds: ScaleBounds) -> Self {
        self.bounds = bounds;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> PacerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PacerState::Running
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn durations(&self) -> &BreathDurations {
        &self.durations
    }

    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_sec
    }

    /// Target length of the current phase in seconds.
    pub fn target_sec(&self) -> f64 {
        self.durations.for_phase(self.phase)
    }

    /// 0.0 ..= 1.0 progress within the current phase.
    ///
    /// A zero-length phase is always complete.
    pub fn progress(&self) -> f64 {
        let target = self.target_sec();
        if target <= 0.0 {
            return 1.0;
        }
        (self.elapsed_sec / target).clamp(0.0, 1.0)
    }

    /// Scale factor of the breathing shape for the current frame.
    pub fn scale(&self) -> f64 {
        self.bounds.scale(self.phase, self.progress())
    }

    pub fn snapshot(&self) -> Event {
        Event::PacerSnapshot {
            state: self.state,
            phase: self.phase,
            progress: self.progress(),
            scale: self.scale(),
            elapsed_sec: self.elapsed_sec,
            target_sec: self.target_sec(),
            cycles: self.cycles,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh cycle at inhale.
    ///
    /// Starting a running pacer discards its state; there is never more than
    /// one cycle in flight.
    pub fn start(&mut self, durations: BreathDurations, cues: &mut impl CueSink) -> Event {
        self.durations = durations;
        self.state = PacerState::Running;
        self.phase = BreathPhase::Inhale;
        self.elapsed_sec = 0.0;
        self.cycles = 0;
        tracing::debug!(total_sec = durations.total(), "breath pacer started");
        cues.phase_entered(BreathPhase::Inhale, 0);
        Event::PacerStarted {
            durations,
            at: Utc::now(),
        }
    }

    /// Stop immediately. Safe to call when already idle.
    pub fn stop(&mut self) -> Option<Event> {
        if self.state == PacerState::Idle {
            return None;
        }
        self.state = PacerState::Idle;
        self.elapsed_sec = 0.0;
        self.phase = BreathPhase::Inhale;
        Some(Event::PacerStopped {
            cycles: self.cycles,
            at: Utc::now(),
        })
    }

    /// Swap durations without restarting the cycle.
    pub fn set_durations(&mut self, durations: BreathDurations) {
        self.durations = durations;
    }

    /// Advance by one frame.
    ///
    /// Returns `Some(Event::PhaseEntered)` when the frame crossed the end of
    /// the current phase. At most one transition happens per frame and the
    /// accumulator restarts from zero, so no phase is ever skipped.
    pub fn tick(&mut self, dt: Duration, cues: &mut impl CueSink) -> Option<Event> {
        if self.state != PacerState::Running {
            return None;
        }
        self.elapsed_sec += dt.as_secs_f64();
        if self.elapsed_sec < self.target_sec() {
            return None;
        }

        self.phase = self.phase.next();
        self.elapsed_sec = 0.0;
        if self.phase == BreathPhase::Inhale {
            self.cycles += 1;
        }
        tracing::debug!(phase = %self.phase, cycle = self.cycles, "phase entered");

        cues.phase_entered(self.phase, self.cycles);
        if self.phase == BreathPhase::Inhale {
            cues.cycle_completed(self.cycles);
        }
        Some(Event::PhaseEntered {
            phase: self.phase,
            cycle: self.cycles,
            haptic: self.phase.haptic_pattern().to_vec(),
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::cues::{HapticLog, NoopCues};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn start_enters_inhale_with_cue() {
        let mut pacer = BreathPacer::new();
        let mut cues = HapticLog::default();
        pacer.start(BreathDurations::default(), &mut cues);
        assert_eq!(pacer.state(), PacerState::Running);
        assert_eq!(pacer.phase(), BreathPhase::Inhale);
        assert_eq!(cues.pulses, vec![(BreathPhase::Inhale, &[20u32][..])]);
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut pacer = BreathPacer::new();
        assert!(pacer.tick(ms(10_000), &mut NoopCues).is_none());
        assert_eq!(pacer.elapsed_sec(), 0.0);
    }

    #[test]
    fn transitions_when_target_reached() {
        let mut pacer = BreathPacer::new();
        let d = BreathDurations::new(1.0, 1.0, 1.0, 1.0).unwrap();
        pacer.start(d, &mut NoopCues);

        assert!(pacer.tick(ms(600), &mut NoopCues).is_none());
        assert!((pacer.progress() - 0.6).abs() < 1e-9);
        let event = pacer.tick(ms(500), &mut NoopCues);
        assert!(matches!(
            event,
            Some(Event::PhaseEntered {
                phase: BreathPhase::HoldHigh,
                cycle: 0,
                ..
            })
        ));
        assert_eq!(pacer.elapsed_sec(), 0.0);
    }

    #[test]
    fn long_frame_moves_one_phase_only() {
        let mut pacer = BreathPacer::new();
        pacer.start(BreathDurations::new(1.0, 1.0, 1.0, 1.0).unwrap(), &mut NoopCues);
        pacer.tick(ms(10_000), &mut NoopCues);
        assert_eq!(pacer.phase(), BreathPhase::HoldHigh);
    }

    #[test]
    fn zero_length_phase_does_not_stall() {
        let mut pacer = BreathPacer::new();
        pacer.start(BreathDurations::new(1.0, 0.0, 1.0, 0.0).unwrap(), &mut NoopCues);
        pacer.tick(ms(1000), &mut NoopCues);
        assert_eq!(pacer.phase(), BreathPhase::HoldHigh);
        assert_eq!(pacer.progress(), 1.0);
        pacer.tick(ms(16), &mut NoopCues);
        assert_eq!(pacer.phase(), BreathPhase::Exhale);
    }

    #[test]
    fn completed_cycle_reaches_sink() {
        let mut pacer = BreathPacer::new();
        let mut cues = HapticLog::default();
        pacer.start(BreathDurations::new(1.0, 1.0, 1.0, 1.0).unwrap(), &mut cues);
        for _ in 0..4 {
            pacer.tick(ms(1000), &mut cues);
        }
        assert_eq!(pacer.phase(), BreathPhase::Inhale);
        assert_eq!(pacer.cycles(), 1);
        assert_eq!(cues.completed_cycles, 1);
        let phases: Vec<_> = cues.pulses.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            phases,
            vec![
                BreathPhase::Inhale,
                BreathPhase::HoldHigh,
                BreathPhase::Exhale,
                BreathPhase::HoldLow,
                BreathPhase::Inhale,
            ]
        );
    }

    #[test]
    fn stop_is_immediate_and_idempotent() {
        let mut pacer = BreathPacer::new();
        pacer.start(BreathDurations::default(), &mut NoopCues);
        pacer.tick(ms(2000), &mut NoopCues);
        assert!(pacer.stop().is_some());
        assert!(pacer.stop().is_none());
        assert!(pacer.tick(ms(60_000), &mut NoopCues).is_none());
        assert_eq!(pacer.phase(), BreathPhase::Inhale);
    }

    #[test]
    fn restart_discards_previous_cycle() {
        let mut pacer = BreathPacer::new();
        pacer.start(BreathDurations::new(1.0, 1.0, 1.0, 1.0).unwrap(), &mut NoopCues);
        pacer.tick(ms(1000), &mut NoopCues);
        pacer.tick(ms(500), &mut NoopCues);
        pacer.start(BreathDurations::default(), &mut NoopCues);
        assert_eq!(pacer.phase(), BreathPhase::Inhale);
        assert_eq!(pacer.elapsed_sec(), 0.0);
        assert_eq!(pacer.cycles(), 0);
    }

    #[test]
    fn snapshot_reports_scale() {
        let mut pacer = BreathPacer::new();
        pacer.start(BreathDurations::default(), &mut NoopCues);
        pacer.tick(ms(2000), &mut NoopCues);
        match pacer.snapshot() {
            Event::PacerSnapshot {
                phase,
                progress,
                scale,
                ..
            } => {
                assert_eq!(phase, BreathPhase::Inhale);
                assert!((progress - 0.5).abs() < 1e-9);
                assert!((scale - 0.8).abs() < 1e-9);
            }
            _ => panic!("Expected PacerSnapshot"),
        }
    }
}
