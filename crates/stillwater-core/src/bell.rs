//! Mindfulness bell.
//!
//! Rings once when started, again every interval, and a last time when
//! the session ends. Driven by `tick()` like the breath pacer.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ambient::synth::bell_tone;
use crate::ambient::{AudioBuffer, SampleLoader};
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BellReason {
    Start,
    Interval,
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindfulBell {
    minutes: u32,
    interval_min: u32,
    running: bool,
    elapsed_sec: f64,
    next_bell_sec: f64,
}

impl MindfulBell {
    /// A session of `minutes` with a bell every `interval_min`.
    ///
    /// Intervals under a minute are raised to one minute.
    pub fn new(minutes: u32, interval_min: u32) -> Result<Self, ValidationError> {
        if minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "minutes".into(),
                message: "session must last at least one minute".into(),
            });
        }
        Ok(Self {
            minutes,
            interval_min: interval_min.max(1),
            running: false,
            elapsed_sec: 0.0,
            next_bell_sec: 0.0,
        })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn interval_min(&self) -> u32 {
        self.interval_min
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_sec
    }

    fn duration_sec(&self) -> f64 {
        f64::from(self.minutes) * 60.0
    }

    fn interval_sec(&self) -> f64 {
        f64::from(self.interval_min) * 60.0
    }

    pub fn remaining_sec(&self) -> f64 {
        (self.duration_sec() - self.elapsed_sec).max(0.0)
    }

    /// Ring the opening bell and start counting.
    pub fn start(&mut self) -> Event {
        self.running = true;
        self.elapsed_sec = 0.0;
        self.next_bell_sec = self.interval_sec();
        tracing::debug!(minutes = self.minutes, interval = self.interval_min, "bell started");
        self.rang(BellReason::Start)
    }

    /// Stop without ringing. Safe to call when idle.
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed_sec = 0.0;
        self.next_bell_sec = 0.0;
    }

    /// Advance by `dt`. The end bell wins over an interval bell due at the
    /// same moment; the next interval is counted from when the bell rang.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        self.elapsed_sec += dt.as_secs_f64();

        if self.elapsed_sec >= self.duration_sec() {
            self.running = false;
            let end = self.rang(BellReason::End);
            return vec![end, Event::BellFinished { at: Utc::now() }];
        }
        if self.elapsed_sec >= self.next_bell_sec {
            self.next_bell_sec = self.elapsed_sec + self.interval_sec();
            return vec![self.rang(BellReason::Interval)];
        }
        Vec::new()
    }

    fn rang(&self, reason: BellReason) -> Event {
        Event::BellRang {
            reason,
            elapsed_sec: self.elapsed_sec,
            at: Utc::now(),
        }
    }
}

/// The bell sound: a `bell` sample if the loader has one, else a synthesized tone.
pub fn bell_sound(loader: &mut impl SampleLoader, frequency_hz: f64, sample_rate: u32) -> AudioBuffer {
    match loader.load("bell") {
        Ok(Some(buffer)) if !buffer.is_empty() => buffer,
        Ok(_) => bell_tone(frequency_hz, sample_rate),
        Err(e) => {
            tracing::warn!(error = %e, "bell sample unavailable, synthesizing");
            bell_tone(frequency_hz, sample_rate)
        }
    }
}
