//! Ambient sound engine.
//!
//! ## Graph
//!
//! ```text
//! rain   voice -> rain gain   --\
//! stream voice -> stream gain ---+-> master (0.9) -> breath envelope -> out
//! bowls  voice -> bowls ramp -> bowls gain --/
//! ```
//!
//! The engine owns an audio context clock that advances only as samples are
//! rendered. Enabling builds whatever voices are missing, each from a
//! sample when the loader has one and from synthesis otherwise.

use chrono::Utc;
use serde::Serialize;

use super::graph::GainParam;
use super::sample::SampleLoader;
use super::synth::{
    white_noise, BowlChord, OnePoleLowpass, BOWL_BASE_HZ, NOISE_LOOP_SECS, RAIN_CUTOFF_HZ,
    STREAM_CUTOFF_HZ,
};
use super::{AudioBuffer, Channel};
use crate::breath::BreathDurations;
use crate::error::AudioError;
use crate::events::Event;
use crate::storage::{clamp_level, AmbientConfig, ChannelLevels};

pub const DEFAULT_MASTER_GAIN: f64 = 0.9;
pub const DEFAULT_RAMP_SECS: f64 = 0.2;
/// Envelope level at the bottom of the breath.
pub const BREATH_FLOOR: f64 = 0.4;
/// Envelope level at the top of the breath.
pub const BREATH_PEAK: f64 = 1.0;
/// Longest span `render_seconds` will allocate in one call.
pub const MAX_RENDER_SECS: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

/// What an enable or disable call left playing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnableReport {
    pub enabled: bool,
    /// Channels playing synthesized sound because no sample was available.
    pub synthesized: Vec<Channel>,
}

impl EnableReport {
    pub fn to_event(&self) -> Event {
        Event::AmbientToggled {
            enabled: self.enabled,
            synthesized: self.synthesized.clone(),
            at: Utc::now(),
        }
    }
}

/// Breath-following loudness: floor to peak over the inhale, peak through
/// the top hold, back to the floor over the exhale, floor through the
/// bottom hold. Repeats every cycle; `t` is seconds since the cycle began.
pub fn breath_envelope(durations: &BreathDurations, t: f64) -> f64 {
    let total = durations.total();
    if total <= 0.0 || !t.is_finite() {
        return BREATH_PEAK;
    }
    let mut x = t.rem_euclid(total);
    if x < durations.inhale {
        return BREATH_FLOOR + (BREATH_PEAK - BREATH_FLOOR) * x / durations.inhale;
    }
    x -= durations.inhale;
    if x < durations.hold_high {
        return BREATH_PEAK;
    }
    x -= durations.hold_high;
    if x < durations.exhale {
        return BREATH_PEAK - (BREATH_PEAK - BREATH_FLOOR) * x / durations.exhale;
    }
    BREATH_FLOOR
}

#[derive(Debug, Clone)]
enum Voice {
    Looped {
        buffer: AudioBuffer,
        pos: f64,
        step: f64,
        filter: Option<OnePoleLowpass>,
    },
    Chord(BowlChord),
}

impl Voice {
    fn looped(buffer: AudioBuffer, output_rate: u32, filter: Option<OnePoleLowpass>) -> Self {
        let step = f64::from(buffer.sample_rate) / f64::from(output_rate.max(1));
        Voice::Looped {
            buffer,
            pos: 0.0,
            step,
            filter,
        }
    }

    fn next_sample(&mut self) -> f32 {
        match self {
            Voice::Looped {
                buffer,
                pos,
                step,
                filter,
            } => {
                let n = buffer.samples.len();
                if n == 0 {
                    return 0.0;
                }
                // Linear interpolation covers samples recorded at another rate.
                let i = pos.floor() as usize % n;
                let j = (i + 1) % n;
                let frac = (*pos - pos.floor()) as f32;
                let s = buffer.samples[i] * (1.0 - frac) + buffer.samples[j] * frac;
                *pos = (*pos + *step) % n as f64;
                match filter {
                    Some(f) => f.process(s),
                    None => s,
                }
            }
            Voice::Chord(chord) => chord.next_sample(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BreathSync {
    durations: BreathDurations,
    start: f64,
}

pub struct AmbientEngine {
    sample_rate: u32,
    /// Frames rendered so far; the context clock.
    frames: u64,
    state: ContextState,
    enabled: bool,
    master: GainParam,
    channel_gains: [GainParam; 3],
    /// Extra gain in front of the bowls channel, ramped on volume changes.
    /// Created on first enable and kept across disables.
    bowls_ramp: Option<GainParam>,
    voices: [Option<Voice>; 3],
    synthesized: [bool; 3],
    breath: Option<BreathSync>,
    ramp_secs: f64,
    seed: u64,
}

impl AmbientEngine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            frames: 0,
            state: ContextState::Suspended,
            enabled: false,
            master: GainParam::new(DEFAULT_MASTER_GAIN),
            channel_gains: [GainParam::new(1.0), GainParam::new(1.0), GainParam::new(1.0)],
            bowls_ramp: None,
            voices: [None, None, None],
            synthesized: [false; 3],
            breath: None,
            ramp_secs: DEFAULT_RAMP_SECS,
            seed: 0x5717_1a7e,
        }
    }

    pub fn from_config(config: &AmbientConfig) -> Self {
        let mut engine = Self::new(config.sample_rate);
        engine.master.set_value(config.master_gain);
        engine.ramp_secs = config.ramp_ms as f64 / 1000.0;
        engine
    }

    /// Seed for the synthesized noise.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Context time in seconds.
    pub fn now(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Channels with a voice currently playing.
    pub fn active_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.voices[c.index()].is_some())
            .collect()
    }

    pub fn synthesized(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.voices[c.index()].is_some() && self.synthesized[c.index()])
            .collect()
    }

    /// Effective level of `channel` at context time `t`.
    pub fn channel_level_at(&self, channel: Channel, t: f64) -> f64 {
        let gain = self.channel_gains[channel.index()].value_at(t);
        match channel {
            Channel::Bowls => gain * self.bowls_ramp.as_ref().map_or(0.0, |g| g.value_at(t)),
            _ => gain,
        }
    }

    pub fn master_gain(&self) -> f64 {
        self.master.target()
    }

    /// Breath envelope level at context time `t`; 1 when not synced.
    pub fn breath_gain_at(&self, t: f64) -> f64 {
        match self.breath {
            Some(sync) => breath_envelope(&sync.durations, t - sync.start),
            None => 1.0,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or stop every channel.
    ///
    /// Enabling resumes the context and builds each missing voice on its
    /// own: a loader failure on one channel only means that channel is
    /// synthesized. Calling it again while enabled just applies `volumes`.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        volumes: ChannelLevels,
        loader: &mut impl SampleLoader,
    ) -> Result<EnableReport, AudioError> {
        if self.state == ContextState::Closed {
            tracing::warn!("ambient engine is closed, ignoring toggle");
            return Err(AudioError::Closed);
        }

        if enabled {
            self.state = ContextState::Running;
            self.bowls_ramp.get_or_insert_with(|| GainParam::new(0.0));
            for channel in Channel::ALL {
                if self.voices[channel.index()].is_none() {
                    let (voice, synthesized) = self.build_voice(channel, loader);
                    self.voices[channel.index()] = Some(voice);
                    self.synthesized[channel.index()] = synthesized;
                }
            }
            self.enabled = true;
            self.set_volumes(volumes);
        } else {
            self.voices = [None, None, None];
            self.synthesized = [false; 3];
            self.enabled = false;
        }

        tracing::debug!(enabled, active = ?self.active_channels(), "ambient toggled");
        Ok(EnableReport {
            enabled,
            synthesized: self.synthesized(),
        })
    }

    fn build_voice(&self, channel: Channel, loader: &mut impl SampleLoader) -> (Voice, bool) {
        match loader.load(channel.as_str()) {
            Ok(Some(buffer)) if !buffer.is_empty() => {
                return (Voice::looped(buffer, self.sample_rate, None), false);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(%channel, error = %e, "sample unavailable, synthesizing");
            }
        }

        let noise = |cutoff: f64, salt: u64| {
            let buffer = white_noise(NOISE_LOOP_SECS, self.sample_rate, self.seed ^ salt);
            let filter = OnePoleLowpass::new(cutoff, self.sample_rate);
            Voice::looped(buffer, self.sample_rate, Some(filter))
        };
        let voice = match channel {
            Channel::Rain => noise(RAIN_CUTOFF_HZ, 1),
            Channel::Stream => noise(STREAM_CUTOFF_HZ, 2),
            Channel::Bowls => Voice::Chord(BowlChord::new(BOWL_BASE_HZ, self.sample_rate)),
        };
        (voice, true)
    }

    /// Set one channel's level, clamped to 0..=1. Rain and stream change
    /// immediately; bowls ramps. Returns the applied level.
    pub fn set_volume(&mut self, channel: Channel, level: f64) -> f64 {
        let level = clamp_level(level);
        if self.state == ContextState::Closed {
            tracing::warn!("ambient engine is closed, ignoring volume change");
            return level;
        }
        match channel {
            Channel::Rain | Channel::Stream => {
                self.channel_gains[channel.index()].set_value(level);
            }
            Channel::Bowls => {
                let now = self.now();
                if let Some(ramp) = self.bowls_ramp.as_mut() {
                    ramp.linear_ramp_to(level, now, now + self.ramp_secs);
                }
            }
        }
        level
    }

    pub fn set_volumes(&mut self, levels: ChannelLevels) {
        for channel in Channel::ALL {
            self.set_volume(channel, levels.get(channel));
        }
    }

    /// Follow a breathing pattern starting now, or stop following with `None`.
    pub fn sync_with_breath(&mut self, durations: Option<BreathDurations>) {
        self.breath = durations
            .filter(|d| d.validate().is_ok())
            .map(|durations| BreathSync {
                durations,
                start: self.now(),
            });
    }

    /// Mix the next `out.len()` mono frames and advance the clock.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.state == ContextState::Closed {
            tracing::warn!("ambient engine is closed, rendering silence");
            out.fill(0.0);
            return;
        }

        let sr = f64::from(self.sample_rate);
        for (i, slot) in out.iter_mut().enumerate() {
            let t = (self.frames + i as u64) as f64 / sr;
            let mut mix = 0.0f64;
            for channel in Channel::ALL {
                let idx = channel.index();
                let Some(voice) = self.voices[idx].as_mut() else {
                    continue;
                };
                let mut gain = self.channel_gains[idx].value_at(t);
                if channel == Channel::Bowls {
                    gain *= self.bowls_ramp.as_ref().map_or(0.0, |g| g.value_at(t));
                }
                mix += f64::from(voice.next_sample()) * gain;
            }
            let envelope = match self.breath {
                Some(sync) => breath_envelope(&sync.durations, t - sync.start),
                None => 1.0,
            };
            mix *= self.master.value_at(t) * envelope;
            // Hard limit; three full-scale sines would otherwise clip.
            *slot = mix.clamp(-1.0, 1.0) as f32;
        }
        self.frames += out.len() as u64;
    }

    /// Render `seconds` of audio into a new buffer.
    ///
    /// Lengths outside `0..=MAX_RENDER_SECS` (or NaN) are rejected before
    /// anything is allocated.
    pub fn render_seconds(&mut self, seconds: f64) -> Result<AudioBuffer, AudioError> {
        if !(0.0..=MAX_RENDER_SECS).contains(&seconds) {
            return Err(AudioError::RenderLength {
                seconds,
                max: MAX_RENDER_SECS,
            });
        }
        let len = (seconds * f64::from(self.sample_rate)).round() as usize;
        let mut samples = vec![0.0f32; len];
        self.render(&mut samples);
        Ok(AudioBuffer::new(self.sample_rate, samples))
    }

    /// Tear the engine down. Later calls are no-ops.
    pub fn close(&mut self) {
        if self.state == ContextState::Closed {
            tracing::warn!("ambient engine already closed");
            return;
        }
        self.voices = [None, None, None];
        self.synthesized = [false; 3];
        self.enabled = false;
        self.breath = None;
        self.state = ContextState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::NoSamples;

    const SR: u32 = 8000;

    fn levels(rain: f64, stream: f64, bowls: f64) -> ChannelLevels {
        ChannelLevels {
            rain,
            stream,
            bowls,
        }
    }

    /// Rain fails to decode, stream has a constant sample, bowls has none.
    struct MixedLoader;

    impl SampleLoader for MixedLoader {
        fn load(&mut self, name: &str) -> Result<Option<AudioBuffer>, AudioError> {
            match name {
                "rain" => Err(AudioError::DecodeFailed {
                    path: "rain.wav".into(),
                    message: "corrupt".into(),
                }),
                "stream" => Ok(Some(AudioBuffer::new(SR, vec![0.5; 100]))),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn enable_builds_every_channel() {
        let mut engine = AmbientEngine::new(SR);
        assert_eq!(engine.state(), ContextState::Suspended);
        let report = engine
            .set_enabled(true, levels(0.3, 0.2, 0.1), &mut NoSamples)
            .unwrap();
        assert!(report.enabled);
        assert_eq!(report.synthesized, Channel::ALL.to_vec());
        assert_eq!(engine.state(), ContextState::Running);
        assert_eq!(engine.active_channels().len(), 3);

        let out = engine.render_seconds(0.5).unwrap();
        assert!(out.peak() > 0.0);
        assert!(out.peak() <= 1.0);
    }

    #[test]
    fn one_failing_channel_does_not_block_others() {
        let mut engine = AmbientEngine::new(SR);
        let report = engine
            .set_enabled(true, levels(0.3, 0.2, 0.1), &mut MixedLoader)
            .unwrap();
        assert_eq!(report.synthesized, vec![Channel::Rain, Channel::Bowls]);
        assert_eq!(engine.active_channels().len(), 3);
    }

    #[test]
    fn enable_twice_keeps_voices() {
        let mut engine = AmbientEngine::new(SR);
        engine
            .set_enabled(true, levels(0.3, 0.2, 0.1), &mut MixedLoader)
            .unwrap();
        let report = engine
            .set_enabled(true, levels(0.3, 0.2, 0.1), &mut NoSamples)
            .unwrap();
        // Stream still plays its sample; nothing was rebuilt.
        assert_eq!(report.synthesized, vec![Channel::Rain, Channel::Bowls]);
    }

    #[test]
    fn rain_and_stream_apply_immediately_bowls_ramps() {
        let mut engine = AmbientEngine::new(SR);
        engine
            .set_enabled(true, levels(0.3, 0.2, 0.1), &mut NoSamples)
            .unwrap();
        let t0 = engine.now();
        assert_eq!(engine.channel_level_at(Channel::Rain, t0), 0.3);
        assert_eq!(engine.channel_level_at(Channel::Stream, t0), 0.2);
        assert_eq!(engine.channel_level_at(Channel::Bowls, t0), 0.0);
        assert!((engine.channel_level_at(Channel::Bowls, t0 + 0.1) - 0.05).abs() < 1e-9);
        assert!((engine.channel_level_at(Channel::Bowls, t0 + 0.2) - 0.1).abs() < 1e-9);

        engine.render_seconds(0.5).unwrap();
        let t1 = engine.now();
        engine.set_volume(Channel::Bowls, 0.5);
        assert!((engine.channel_level_at(Channel::Bowls, t1) - 0.1).abs() < 1e-9);
        assert!((engine.channel_level_at(Channel::Bowls, t1 + 0.2) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn volumes_are_clamped() {
        let mut engine = AmbientEngine::new(SR);
        engine
            .set_enabled(true, levels(0.3, 0.2, 0.1), &mut NoSamples)
            .unwrap();
        assert_eq!(engine.set_volume(Channel::Rain, 1.5), 1.0);
        assert_eq!(engine.set_volume(Channel::Stream, -0.5), 0.0);
        assert_eq!(engine.channel_level_at(Channel::Rain, engine.now()), 1.0);
    }

    #[test]
    fn disable_stops_everything_and_is_idempotent() {
        let mut engine = AmbientEngine::new(SR);
        engine
            .set_enabled(true, levels(1.0, 1.0, 1.0), &mut NoSamples)
            .unwrap();
        engine.set_enabled(false, levels(1.0, 1.0, 1.0), &mut NoSamples).unwrap();
        engine.set_enabled(false, levels(1.0, 1.0, 1.0), &mut NoSamples).unwrap();
        assert!(!engine.is_enabled());
        assert!(engine.active_channels().is_empty());
        assert_eq!(engine.render_seconds(0.1).unwrap().peak(), 0.0);
    }

    #[test]
    fn oversized_render_is_rejected_without_allocating() {
        let mut engine = AmbientEngine::new(SR);
        for seconds in [1e30, f64::INFINITY, f64::NAN, -1.0, MAX_RENDER_SECS + 1.0] {
            assert!(matches!(
                engine.render_seconds(seconds),
                Err(AudioError::RenderLength { .. })
            ));
        }
        assert_eq!(engine.now(), 0.0);
        assert!(engine.render_seconds(0.0).unwrap().is_empty());
    }

    #[test]
    fn breath_envelope_shape() {
        let d = BreathDurations::new(4.0, 4.0, 6.0, 2.0).unwrap();
        assert!((breath_envelope(&d, 0.0) - 0.4).abs() < 1e-9);
        assert!((breath_envelope(&d, 2.0) - 0.7).abs() < 1e-9);
        assert_eq!(breath_envelope(&d, 5.0), 1.0);
        assert!((breath_envelope(&d, 11.0) - 0.7).abs() < 1e-9);
        assert_eq!(breath_envelope(&d, 15.0), 0.4);
        // Next cycle.
        assert!((breath_envelope(&d, 18.0) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn sync_with_breath_follows_and_clears() {
        let mut engine = AmbientEngine::new(SR);
        engine.render_seconds(1.0).unwrap();
        engine.sync_with_breath(Some(BreathDurations::new(2.0, 0.0, 2.0, 0.0).unwrap()));
        assert!((engine.breath_gain_at(1.0) - 0.4).abs() < 1e-9);
        assert!((engine.breath_gain_at(3.0) - 1.0).abs() < 1e-9);
        engine.sync_with_breath(None);
        assert_eq!(engine.breath_gain_at(3.0), 1.0);
    }

    #[test]
    fn closed_engine_ignores_calls() {
        let mut engine = AmbientEngine::new(SR);
        engine
            .set_enabled(true, levels(0.3, 0.2, 0.1), &mut NoSamples)
            .unwrap();
        engine.close();
        assert_eq!(engine.state(), ContextState::Closed);
        assert!(matches!(
            engine.set_enabled(true, levels(0.3, 0.2, 0.1), &mut NoSamples),
            Err(AudioError::Closed)
        ));
        assert_eq!(engine.render_seconds(0.1).unwrap().peak(), 0.0);
        engine.close();
    }

    #[test]
    fn config_sets_master_and_rate() {
        let config = AmbientConfig {
            master_gain: 0.5,
            sample_rate: 22_050,
            ..AmbientConfig::default()
        };
        let engine = AmbientEngine::from_config(&config);
        assert_eq!(engine.master_gain(), 0.5);
        assert_eq!(engine.sample_rate(), 22_050);
    }
}
