//! Mixer controller: the persisted mixer state driving the engine.

use super::engine::{AmbientEngine, EnableReport};
use super::sample::SampleLoader;
use super::Channel;
use crate::error::AudioError;
use crate::storage::{KeyValueStore, MixerState, Preferences};

pub struct AmbientMixer<'p, S, L> {
    prefs: &'p Preferences<S>,
    engine: AmbientEngine,
    loader: L,
}

impl<'p, S: KeyValueStore, L: SampleLoader> AmbientMixer<'p, S, L> {
    pub fn new(prefs: &'p Preferences<S>, engine: AmbientEngine, loader: L) -> Self {
        Self {
            prefs,
            engine,
            loader,
        }
    }

    pub fn state(&self) -> MixerState {
        self.prefs.mixer()
    }

    pub fn engine(&self) -> &AmbientEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AmbientEngine {
        &mut self.engine
    }

    /// Start playback if the stored state says ambient sound was on.
    pub fn restore(&mut self) -> Result<Option<EnableReport>, AudioError> {
        let state = self.state();
        if !state.enabled {
            return Ok(None);
        }
        self.engine
            .set_enabled(true, state.levels(), &mut self.loader)
            .map(Some)
    }

    /// Persist the toggle, then start or stop the engine.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<EnableReport, AudioError> {
        let mut state = self.state();
        state.enabled = enabled;
        self.prefs.save_mixer(&state);
        self.engine
            .set_enabled(enabled, state.levels(), &mut self.loader)
    }

    /// Persist a clamped level and forward it to the engine when playing.
    pub fn set_volume(&mut self, channel: Channel, level: f64) -> MixerState {
        let mut state = self.state();
        let level = state.set_level(channel, level);
        self.prefs.save_mixer(&state);
        if state.enabled && self.engine.is_enabled() {
            self.engine.set_volume(channel, level);
        }
        state
    }

    pub fn into_engine(self) -> AmbientEngine {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::NoSamples;
    use crate::storage::MemoryStore;

    #[test]
    fn enable_persists_and_starts() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut mixer = AmbientMixer::new(&prefs, AmbientEngine::new(8000), NoSamples);
        let report = mixer.set_enabled(true).unwrap();
        assert!(report.enabled);
        assert!(prefs.mixer().enabled);
        assert!(mixer.engine().is_enabled());

        mixer.set_enabled(false).unwrap();
        assert!(!prefs.mixer().enabled);
        assert!(mixer.engine().active_channels().is_empty());
    }

    #[test]
    fn volume_is_clamped_persisted_and_forwarded() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut mixer = AmbientMixer::new(&prefs, AmbientEngine::new(8000), NoSamples);
        mixer.set_enabled(true).unwrap();
        let state = mixer.set_volume(Channel::Rain, 1.5);
        assert_eq!(state.rain, 1.0);
        assert_eq!(prefs.mixer().rain, 1.0);
        let now = mixer.engine().now();
        assert_eq!(mixer.engine().channel_level_at(Channel::Rain, now), 1.0);
    }

    #[test]
    fn volume_while_disabled_only_persists() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut mixer = AmbientMixer::new(&prefs, AmbientEngine::new(8000), NoSamples);
        mixer.set_volume(Channel::Stream, 0.7);
        assert_eq!(prefs.mixer().stream, 0.7);
        assert!(!mixer.engine().is_enabled());
    }

    #[test]
    fn restore_follows_stored_toggle() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut mixer = AmbientMixer::new(&prefs, AmbientEngine::new(8000), NoSamples);
        assert!(mixer.restore().unwrap().is_none());

        let mut state = prefs.mixer();
        state.enabled = true;
        prefs.save_mixer(&state);
        assert!(mixer.restore().unwrap().is_some());
        assert!(mixer.engine().is_enabled());
    }
}
