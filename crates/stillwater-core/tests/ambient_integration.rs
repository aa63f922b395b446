//! Integration tests for the ambient engine with on-disk samples.

use stillwater_core::ambient::sample::read_wav;
use stillwater_core::ambient::{write_wav, DirSampleLoader, NoSamples};
use stillwater_core::storage::{Preferences, SqliteStore};
use stillwater_core::{AmbientEngine, AmbientMixer, AudioBuffer, Channel};

const SR: u32 = 8_000;

fn tone(seconds: f64) -> AudioBuffer {
    let len = (seconds * f64::from(SR)) as usize;
    let samples = (0..len)
        .map(|i| (i as f32 * 0.05).sin() * 0.5)
        .collect();
    AudioBuffer::new(SR, samples)
}

#[test]
fn missing_and_broken_samples_fall_back_per_channel() {
    let dir = tempfile::tempdir().unwrap();
    write_wav(&dir.path().join("rain.wav"), &tone(0.5)).unwrap();
    std::fs::write(dir.path().join("stream.wav"), b"definitely not a wav").unwrap();

    let mut loader = DirSampleLoader::new(dir.path());
    let mut engine = AmbientEngine::new(SR);
    let levels = stillwater_core::storage::MixerState::default().levels();
    let report = engine.set_enabled(true, levels, &mut loader).unwrap();

    assert!(report.enabled);
    assert_eq!(report.synthesized, vec![Channel::Stream, Channel::Bowls]);
    assert_eq!(engine.active_channels(), Channel::ALL.to_vec());

    let out = engine.render_seconds(0.5).unwrap();
    assert_eq!(out.len(), (SR / 2) as usize);
    assert!(out.peak() > 0.0);
    assert!(out.peak() <= 1.0);
}

#[test]
fn mixer_persists_and_restores() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("stillwater.db");
    {
        let prefs = Preferences::new(SqliteStore::open_at(&db).unwrap());
        let mut mixer = AmbientMixer::new(&prefs, AmbientEngine::new(SR), NoSamples);
        let report = mixer.set_enabled(true).unwrap();
        assert_eq!(report.synthesized, Channel::ALL.to_vec());
        let state = mixer.set_volume(Channel::Stream, 2.0);
        assert_eq!(state.stream, 1.0);
        assert_eq!(mixer.engine().channel_level_at(Channel::Stream, 0.0), 1.0);
    }

    let prefs = Preferences::new(SqliteStore::open_at(&db).unwrap());
    let mut mixer = AmbientMixer::new(&prefs, AmbientEngine::new(SR), NoSamples);
    assert!(mixer.state().enabled);
    assert!(mixer.restore().unwrap().is_some());
    assert!(mixer.engine().is_enabled());

    mixer.set_enabled(false).unwrap();
    assert!(!prefs.mixer().enabled);
    assert!(mixer.engine().active_channels().is_empty());
}

#[test]
fn rendered_audio_exports_as_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mix.wav");

    let mut engine = AmbientEngine::new(SR).with_seed(7);
    let levels = stillwater_core::storage::MixerState::default().levels();
    engine.set_enabled(true, levels, &mut NoSamples).unwrap();
    let rendered = engine.render_seconds(1.0).unwrap();
    write_wav(&path, &rendered).unwrap();

    let back = read_wav(&path).unwrap();
    assert_eq!(back.sample_rate, SR);
    assert_eq!(back.len(), rendered.len());
    assert!((back.peak() - rendered.peak()).abs() < 1e-6);
}

#[test]
fn closed_engine_rejects_toggles() {
    let mut engine = AmbientEngine::new(SR);
    engine.close();
    let levels = stillwater_core::storage::MixerState::default().levels();
    assert!(engine.set_enabled(true, levels, &mut NoSamples).is_err());
    let out = engine.render_seconds(0.1).unwrap();
    assert_eq!(out.peak(), 0.0);
}
