//! Fallback synthesis for channels without a sample, plus the bell tone.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;

use super::AudioBuffer;

/// Loop length of the synthesized noise buffers.
pub const NOISE_LOOP_SECS: f64 = 2.0;
/// Low-pass cutoff shaping white noise into rain.
pub const RAIN_CUTOFF_HZ: f64 = 800.0;
/// Low-pass cutoff shaping white noise into a stream.
pub const STREAM_CUTOFF_HZ: f64 = 2000.0;
pub const BOWL_BASE_HZ: f64 = 432.0;

/// White noise in -1..1 from a seeded generator.
pub fn white_noise(seconds: f64, sample_rate: u32, seed: u64) -> AudioBuffer {
    let len = (seconds * sample_rate as f64).round().max(0.0) as usize;
    let mut rng = Mcg128Xsl64::seed_from_u64(seed);
    let samples = (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    AudioBuffer::new(sample_rate, samples)
}

/// One-pole low-pass filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnePoleLowpass {
    coeff: f64,
    state: f64,
}

impl OnePoleLowpass {
    pub fn new(cutoff_hz: f64, sample_rate: u32) -> Self {
        let sr = f64::from(sample_rate.max(1));
        let coeff = 1.0 - (-TAU * cutoff_hz / sr).exp();
        Self { coeff, state: 0.0 }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        self.state += self.coeff * (f64::from(x) - self.state);
        self.state as f32
    }
}

/// Frequency shifted by `cents` hundredths of a semitone.
pub fn detune(freq_hz: f64, cents: f64) -> f64 {
    freq_hz * 2f64.powf(cents / 1200.0)
}

/// Three sines at the base, a detuned fifth and a detuned octave.
#[derive(Debug, Clone, PartialEq)]
pub struct BowlChord {
    freqs: [f64; 3],
    phases: [f64; 3],
    sample_rate: f64,
}

impl BowlChord {
    pub fn new(base_hz: f64, sample_rate: u32) -> Self {
        Self {
            freqs: [
                base_hz,
                detune(base_hz * 1.5, 2.0),
                detune(base_hz * 2.0, -3.0),
            ],
            phases: [0.0; 3],
            sample_rate: f64::from(sample_rate.max(1)),
        }
    }

    pub fn frequencies(&self) -> [f64; 3] {
        self.freqs
    }

    pub fn next_sample(&mut self) -> f32 {
        let mut sum = 0.0;
        for (freq, phase) in self.freqs.iter().zip(self.phases.iter_mut()) {
            sum += phase.sin();
            *phase = (*phase + TAU * freq / self.sample_rate) % TAU;
        }
        sum as f32
    }
}

const BELL_FLOOR: f64 = 0.0001;
const BELL_PEAK: f64 = 0.3;
const BELL_ATTACK_SECS: f64 = 0.02;
const BELL_DECAY_END_SECS: f64 = 1.2;
const BELL_STOP_SECS: f64 = 1.3;

/// Gain of the bell tone `t` seconds after it was struck.
///
/// Linear attack to the peak, then exponential decay back to the floor.
/// Silent once the tone stops.
pub fn bell_envelope(t: f64) -> f64 {
    if !(0.0..BELL_STOP_SECS).contains(&t) {
        return 0.0;
    }
    if t < BELL_ATTACK_SECS {
        return BELL_FLOOR + (BELL_PEAK - BELL_FLOOR) * t / BELL_ATTACK_SECS;
    }
    if t < BELL_DECAY_END_SECS {
        let x = (t - BELL_ATTACK_SECS) / (BELL_DECAY_END_SECS - BELL_ATTACK_SECS);
        return BELL_PEAK * (BELL_FLOOR / BELL_PEAK).powf(x);
    }
    BELL_FLOOR
}

/// A struck bell: a sine under [`bell_envelope`].
pub fn bell_tone(freq_hz: f64, sample_rate: u32) -> AudioBuffer {
    let sr = f64::from(sample_rate.max(1));
    let len = (BELL_STOP_SECS * sr).round() as usize;
    let samples = (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            ((TAU * freq_hz * t).sin() * bell_envelope(t)) as f32
        })
        .collect();
    AudioBuffer::new(sample_rate, samples)
}
