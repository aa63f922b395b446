//! Gain automation.
//!
//! A [`GainParam`] holds a level that can jump immediately or ramp
//! linearly to a target over context time (seconds since the engine
//! started). Levels are always within 0..=1.

use crate::storage::clamp_level;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
    start_time: f64,
    start_value: f64,
    end_time: f64,
    target: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GainParam {
    value: f64,
    ramp: Option<Ramp>,
}

impl GainParam {
    pub fn new(value: f64) -> Self {
        Self {
            value: clamp_level(value),
            ramp: None,
        }
    }

    /// Jump to `value`, dropping any scheduled ramp.
    pub fn set_value(&mut self, value: f64) {
        self.value = clamp_level(value);
        self.ramp = None;
    }

    /// Ramp linearly from the level at `now` to `target`, reaching it at `end_time`.
    pub fn linear_ramp_to(&mut self, target: f64, now: f64, end_time: f64) {
        let start_value = self.value_at(now);
        let target = clamp_level(target);
        if end_time <= now {
            self.set_value(target);
            return;
        }
        self.value = target;
        self.ramp = Some(Ramp {
            start_time: now,
            start_value,
            end_time,
            target,
        });
    }

    /// Freeze at the level reached at `now`.
    pub fn cancel_scheduled(&mut self, now: f64) {
        let v = self.value_at(now);
        self.set_value(v);
    }

    pub fn value_at(&self, t: f64) -> f64 {
        match self.ramp {
            None => self.value,
            Some(r) if t <= r.start_time => r.start_value,
            Some(r) if t >= r.end_time => r.target,
            Some(r) => {
                let x = (t - r.start_time) / (r.end_time - r.start_time);
                r.start_value + (r.target - r.start_value) * x
            }
        }
    }

    /// Final level once any ramp completes.
    pub fn target(&self) -> f64 {
        self.value
    }

    pub fn is_ramping(&self, t: f64) -> bool {
        self.ramp.is_some_and(|r| t < r.end_time)
    }
}

impl Default for GainParam {
    fn default() -> Self {
        Self::new(1.0)
    }
}
