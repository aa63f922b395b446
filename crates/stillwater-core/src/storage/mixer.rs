//! Persisted ambient mixer levels.

use serde::{Deserialize, Serialize};

use super::kv::{keys, KeyValueStore, KeyValueStoreExt};
use super::Preferences;
use crate::ambient::Channel;

/// Clamp a level to 0..=1. NaN becomes silence.
pub fn clamp_level(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixerState {
    pub rain: f64,
    pub stream: f64,
    pub bowls: f64,
    pub enabled: bool,
}

impl Default for MixerState {
    fn default() -> Self {
        Self {
            rain: 0.3,
            stream: 0.2,
            bowls: 0.1,
            enabled: false,
        }
    }
}

impl MixerState {
    pub fn level(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Rain => self.rain,
            Channel::Stream => self.stream,
            Channel::Bowls => self.bowls,
        }
    }

    /// Set a channel level, clamped to 0..=1. Returns the stored value.
    pub fn set_level(&mut self, channel: Channel, value: f64) -> f64 {
        let v = clamp_level(value);
        match channel {
            Channel::Rain => self.rain = v,
            Channel::Stream => self.stream = v,
            Channel::Bowls => self.bowls = v,
        }
        v
    }

    pub fn levels(&self) -> ChannelLevels {
        ChannelLevels {
            rain: self.rain,
            stream: self.stream,
            bowls: self.bowls,
        }
    }
}

/// Volume for each ambient channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelLevels {
    pub rain: f64,
    pub stream: f64,
    pub bowls: f64,
}

impl ChannelLevels {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Rain => self.rain,
            Channel::Stream => self.stream,
            Channel::Bowls => self.bowls,
        }
    }
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn mixer(&self) -> MixerState {
        let mut state: MixerState = self.store().read_or(keys::MIXER, MixerState::default());
        // Hand-edited or stale documents may hold anything.
        for channel in Channel::ALL {
            state.set_level(channel, state.level(channel));
        }
        state
    }

    pub fn save_mixer(&self, state: &MixerState) {
        self.store().write(keys::MIXER, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults() {
        let prefs = Preferences::new(MemoryStore::new());
        let state = prefs.mixer();
        assert_eq!(state, MixerState::default());
        assert!(!state.enabled);
    }

    #[test]
    fn levels_clamp() {
        let mut state = MixerState::default();
        assert_eq!(state.set_level(Channel::Rain, -0.5), 0.0);
        assert_eq!(state.set_level(Channel::Bowls, 1.5), 1.0);
        assert_eq!(state.set_level(Channel::Stream, f64::NAN), 0.0);
        assert_eq!(state.rain, 0.0);
        assert_eq!(state.bowls, 1.0);
    }

    #[test]
    fn out_of_range_stored_values_are_clamped_on_read() {
        let prefs = Preferences::new(MemoryStore::new());
        prefs
            .store()
            .set_raw(keys::MIXER, r#"{"rain":3,"stream":-1,"bowls":0.5,"enabled":true}"#)
            .unwrap();
        let state = prefs.mixer();
        assert_eq!(state.rain, 1.0);
        assert_eq!(state.stream, 0.0);
        assert!(state.enabled);
    }

    #[test]
    fn save_round_trip() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut state = prefs.mixer();
        state.set_level(Channel::Stream, 0.8);
        state.enabled = true;
        prefs.save_mixer(&state);
        assert_eq!(prefs.mixer(), state);
    }
}
