//! Breathing practice session.
//!
//! Ties the pacer to the saved presets and settings: resolves which
//! durations are active, turns calibration results into presets, rescales
//! presets on profile changes and logs the streak for every completed cycle.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};

use super::calibration::calibrate;
use super::cues::CueSink;
use super::durations::BreathDurations;
use super::pacer::BreathPacer;
use super::phase::ScaleBounds;
use super::ratios::{
    durations_from_cycle_exact, ratios_for_profile, ratios_from_durations, PhaseBounds, Profile,
};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::storage::{
    BreathConfig, BreathMode, BreathPreset, BreathSettings, KeyValueStore, Preferences,
};

pub struct BreathPractice<'p, S> {
    prefs: &'p Preferences<S>,
    defaults: BreathDurations,
    phase_bounds: PhaseBounds,
    pacer: BreathPacer,
}

impl<'p, S: KeyValueStore> BreathPractice<'p, S> {
    pub fn new(prefs: &'p Preferences<S>, defaults: BreathDurations) -> Self {
        Self {
            prefs,
            defaults,
            phase_bounds: PhaseBounds::default(),
            pacer: BreathPacer::new(),
        }
    }

    pub fn from_config(prefs: &'p Preferences<S>, config: &BreathConfig) -> Self {
        Self::new(prefs, config.durations())
            .with_bounds(config.scale_bounds())
            .with_phase_bounds(config.phase_bounds())
    }

    pub fn with_bounds(mut self, bounds: ScaleBounds) -> Self {
        self.pacer = self.pacer.with_bounds(bounds);
        self
    }

    /// Clamp applied to each phase of a calibrated pattern.
    pub fn with_phase_bounds(mut self, bounds: PhaseBounds) -> Self {
        self.phase_bounds = bounds;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn pacer(&self) -> &BreathPacer {
        &self.pacer
    }

    pub fn settings(&self) -> BreathSettings {
        self.prefs.breath_settings()
    }

    /// The preset in use, if custom mode points at one that still exists.
    pub fn active_preset(&self) -> Option<BreathPreset> {
        let settings = self.settings();
        if settings.current_mode != BreathMode::Custom {
            return None;
        }
        self.prefs.preset(settings.selected_preset_id.as_deref()?)
    }

    /// Durations the pacer should run with right now.
    pub fn active_durations(&self) -> BreathDurations {
        if let Some(preset) = self.active_preset() {
            return preset.durations;
        }
        match self.settings().selected_profile {
            Profile::Default | Profile::Keep => self.defaults,
            profile => {
                let ratios = ratios_for_profile(profile, ratios_from_durations(&self.defaults));
                durations_from_cycle_exact(self.defaults.total(), ratios)
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Save a calibrated cycle as a new preset and switch to it.
    pub fn apply_calibration(&mut self, cycle_sec: f64, name: Option<&str>) -> BreathPreset {
        let settings = self.settings();
        let current = ratios_from_durations(&self.active_durations());
        let durations = calibrate(cycle_sec, settings.selected_profile, current, self.phase_bounds);
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("Pattern {}", Local::now().format("%H:%M")),
        };
        let preset = self.prefs.save_preset(&name, durations);
        self.prefs.save_breath_settings(&BreathSettings {
            current_mode: BreathMode::Custom,
            selected_preset_id: Some(preset.id.clone()),
            ..settings
        });
        self.refresh();
        preset
    }

    /// Store the profile. A selected custom preset is rescaled to the new
    /// ratios while keeping its cycle length.
    pub fn set_profile(&mut self, profile: Profile) -> BreathSettings {
        let settings = BreathSettings {
            selected_profile: profile,
            ..self.settings()
        };
        self.prefs.save_breath_settings(&settings);

        if let Some(preset) = self.active_preset() {
            let ratios = ratios_for_profile(profile, ratios_from_durations(&preset.durations));
            let durations = durations_from_cycle_exact(preset.durations.total(), ratios);
            self.prefs.update_preset(&preset.id, durations, None);
        }
        self.refresh();
        settings
    }

    /// Switch between the default pattern and saved presets.
    ///
    /// Custom mode selects the first preset, or none when there are none.
    pub fn set_mode(&mut self, mode: BreathMode) -> BreathSettings {
        let mut settings = self.settings();
        settings.current_mode = mode;
        if mode == BreathMode::Custom {
            settings.selected_preset_id = self.prefs.presets().first().map(|p| p.id.clone());
        }
        self.prefs.save_breath_settings(&settings);
        self.refresh();
        settings
    }

    pub fn select_preset(&mut self, id: &str) -> Result<BreathSettings> {
        if self.prefs.preset(id).is_none() {
            return Err(ValidationError::UnknownPreset(id.to_string()).into());
        }
        let settings = BreathSettings {
            current_mode: BreathMode::Custom,
            selected_preset_id: Some(id.to_string()),
            ..self.settings()
        };
        self.prefs.save_breath_settings(&settings);
        self.refresh();
        Ok(settings)
    }

    pub fn delete_preset(&mut self, id: &str) -> Result<()> {
        if !self.prefs.delete_preset(id) {
            return Err(ValidationError::UnknownPreset(id.to_string()).into());
        }
        self.refresh();
        Ok(())
    }

    pub fn start(&mut self, cues: &mut impl CueSink) -> Event {
        let durations = self.active_durations();
        self.pacer.start(durations, cues)
    }

    pub fn stop(&mut self) -> Option<Event> {
        self.pacer.stop()
    }

    /// Advance the pacer, logging practice against the local calendar.
    pub fn tick(&mut self, dt: Duration, cues: &mut impl CueSink) -> Vec<Event> {
        self.tick_at(dt, cues, &Local::now())
    }

    /// Advance the pacer; a completed cycle logs practice at `now`.
    pub fn tick_at<Tz: TimeZone>(
        &mut self,
        dt: Duration,
        cues: &mut impl CueSink,
        now: &DateTime<Tz>,
    ) -> Vec<Event> {
        let before = self.pacer.cycles();
        let Some(event) = self.pacer.tick(dt, cues) else {
            return Vec::new();
        };
        let mut events = vec![event];
        if self.pacer.cycles() > before {
            let streak = self.prefs.log_practice(now);
            let at = now.with_timezone(&Utc);
            events.push(Event::CycleCompleted {
                cycles: self.pacer.cycles(),
                at,
            });
            events.push(Event::StreakUpdated {
                streak_days: streak.streak_days,
                last_practice: now.date_naive(),
                at,
            });
        }
        events
    }

    /// Keep a running pacer in step with the stored settings.
    fn refresh(&mut self) {
        if self.pacer.is_running() {
            let durations = self.active_durations();
            self.pacer.set_durations(durations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::cues::NoopCues;
    use crate::breath::BreathPhase;
    use crate::error::CoreError;
    use crate::storage::Config;
    use crate::storage::MemoryStore;
    use chrono::FixedOffset;

    fn prefs() -> Preferences<MemoryStore> {
        Preferences::new(MemoryStore::new())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_mode_uses_defaults() {
        let p = prefs();
        let practice = BreathPractice::new(&p, BreathDurations::default());
        assert_eq!(practice.active_durations(), BreathDurations::default());
        assert!(practice.active_preset().is_none());
    }

    #[test]
    fn default_mode_scales_by_profile() {
        let p = prefs();
        let mut practice = BreathPractice::new(&p, BreathDurations::default());
        practice.set_profile(Profile::Box);
        let d = practice.active_durations();
        assert!(approx(d.inhale, 4.0));
        assert!(approx(d.hold_low, 4.0));
        assert!(approx(d.total(), 16.0));
    }

    #[test]
    fn calibration_creates_and_selects_preset() {
        let p = prefs();
        let mut practice = BreathPractice::new(&p, BreathDurations::default());
        practice.set_profile(Profile::Box);
        let preset = practice.apply_calibration(12.0, Some("Evening"));
        assert_eq!(preset.name, "Evening");
        assert_eq!(preset.durations.inhale, 3.0);

        let settings = practice.settings();
        assert_eq!(settings.current_mode, BreathMode::Custom);
        assert_eq!(settings.selected_preset_id.as_deref(), Some(preset.id.as_str()));
        assert_eq!(practice.active_durations(), preset.durations);
    }

    #[test]
    fn calibration_without_name_gets_one() {
        let p = prefs();
        let mut practice = BreathPractice::new(&p, BreathDurations::default());
        let preset = practice.apply_calibration(10.0, Some("  "));
        assert!(preset.name.starts_with("Pattern "));
    }

    #[test]
    fn profile_change_rescales_selected_preset_keeping_total() {
        let p = prefs();
        let mut practice = BreathPractice::new(&p, BreathDurations::default());
        practice.set_profile(Profile::Box);
        let preset = practice.apply_calibration(12.0, Some("P"));

        practice.set_profile(Profile::Coherent);
        let updated = p.preset(&preset.id).unwrap();
        assert!(approx(updated.durations.total(), preset.durations.total()));
        assert!(approx(updated.durations.inhale, 6.0));
        assert!(approx(updated.durations.hold_high, 0.0));
    }

    #[test]
    fn custom_mode_selects_first_preset() {
        let p = prefs();
        let first = p.save_preset("A", BreathDurations::new(3.0, 0.0, 3.0, 0.0).unwrap());
        p.save_preset("B", BreathDurations::default());
        let mut practice = BreathPractice::new(&p, BreathDurations::default());
        let settings = practice.set_mode(BreathMode::Custom);
        assert_eq!(settings.selected_preset_id, Some(first.id));
        assert_eq!(practice.active_durations().total(), 6.0);

        practice.set_mode(BreathMode::Default);
        assert_eq!(practice.active_durations(), BreathDurations::default());
    }

    #[test]
    fn custom_mode_without_presets_falls_back() {
        let p = prefs();
        let mut practice = BreathPractice::new(&p, BreathDurations::default());
        let settings = practice.set_mode(BreathMode::Custom);
        assert_eq!(settings.selected_preset_id, None);
        assert_eq!(practice.active_durations(), BreathDurations::default());
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let p = prefs();
        let mut practice = BreathPractice::new(&p, BreathDurations::default());
        let err = practice.select_preset("nope").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::UnknownPreset(ref id)) if id == "nope"
        ));
        assert_eq!(err.to_string(), "Validation error: Unknown preset: nope");
        assert!(matches!(
            practice.delete_preset("nope"),
            Err(CoreError::Validation(ValidationError::UnknownPreset(_)))
        ));
    }

    #[test]
    fn calibration_respects_configured_phase_bounds() {
        let p = prefs();
        let mut config = Config::default();
        config.apply("breath.min_phase_sec", "1.0").unwrap();
        config.apply("breath.max_phase_sec", "5.0").unwrap();
        let mut practice = BreathPractice::from_config(&p, &config.breath);
        practice.set_profile(Profile::FourSevenEight);

        let d = practice.apply_calibration(19.0, Some("Narrow")).durations;
        for sec in [d.inhale, d.hold_high, d.exhale, d.hold_low] {
            assert!((1.0..=5.0).contains(&sec), "{sec} outside 1-5s");
        }
        assert!(approx(d.hold_low, 1.0));
        assert!(approx(d.exhale, 5.0));
    }

    #[test]
    fn from_config_applies_scale_bounds() {
        let p = prefs();
        let mut config = Config::default();
        config.breath.min_scale = 0.2;
        config.breath.max_scale = 0.8;
        let practice = BreathPractice::from_config(&p, &config.breath);
        assert_eq!(practice.pacer().bounds(), config.breath.scale_bounds());
    }

    #[test]
    fn completed_cycle_logs_streak() {
        let p = prefs();
        let d = BreathDurations::new(1.0, 1.0, 1.0, 1.0).unwrap();
        let mut practice = BreathPractice::new(&p, d);
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = tz.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap();

        practice.start(&mut NoopCues);
        let mut all = Vec::new();
        for _ in 0..4 {
            all.extend(practice.tick_at(Duration::from_secs(1), &mut NoopCues, &now));
        }
        assert_eq!(practice.pacer().phase(), BreathPhase::Inhale);
        assert!(all
            .iter()
            .any(|e| matches!(e, Event::CycleCompleted { cycles: 1, .. })));
        assert!(all
            .iter()
            .any(|e| matches!(e, Event::StreakUpdated { streak_days: 1, .. })));
        assert_eq!(p.streak().streak_days, 1);
    }

    #[test]
    fn running_pacer_follows_mode_changes() {
        let p = prefs();
        let preset = p.save_preset("Short", BreathDurations::new(2.0, 0.0, 2.0, 0.0).unwrap());
        let mut practice = BreathPractice::new(&p, BreathDurations::default());
        practice.start(&mut NoopCues);
        practice.select_preset(&preset.id).unwrap();
        assert_eq!(practice.pacer().durations().total(), 4.0);
    }
}
