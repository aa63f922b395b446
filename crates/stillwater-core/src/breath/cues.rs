//! Phase-entry side effects.
//!
//! The pacer itself only keeps time. Whatever should happen when a phase
//! begins (a vibration, a sound, logging the practice) is pushed through a
//! [`CueSink`] supplied by the caller.

use super::phase::BreathPhase;

pub trait CueSink {
    /// Called every time a phase begins, including the first inhale.
    fn phase_entered(&mut self, phase: BreathPhase, cycle: u64);

    /// Called when a full cycle finished and the pacer re-entered inhale.
    fn cycle_completed(&mut self, _cycles: u64) {}
}

/// Ignores every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCues;

impl CueSink for NoopCues {
    fn phase_entered(&mut self, _phase: BreathPhase, _cycle: u64) {}
}

/// Keeps every vibration pattern it was asked to play.
#[derive(Debug, Default, Clone)]
pub struct HapticLog {
    pub pulses: Vec<(BreathPhase, &'static [u32])>,
    pub completed_cycles: u64,
}

impl CueSink for HapticLog {
    fn phase_entered(&mut self, phase: BreathPhase, _cycle: u64) {
        self.pulses.push((phase, phase.haptic_pattern()));
    }

    fn cycle_completed(&mut self, cycles: u64) {
        self.completed_cycles = cycles;
    }
}

impl<T: CueSink + ?Sized> CueSink for &mut T {
    fn phase_entered(&mut self, phase: BreathPhase, cycle: u64) {
        (**self).phase_entered(phase, cycle);
    }

    fn cycle_completed(&mut self, cycles: u64) {
        (**self).cycle_completed(cycles);
    }
}
