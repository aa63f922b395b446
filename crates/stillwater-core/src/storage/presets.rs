//! Breath presets and the breathing settings record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kv::{keys, KeyValueStore, KeyValueStoreExt};
use super::Preferences;
use crate::breath::{BreathDurations, Profile};

/// A calibrated breathing pattern saved by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathPreset {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub durations: BreathDurations,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

impl BreathPreset {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathMode {
    #[default]
    Default,
    Custom,
}

/// Which pattern the breathing practice uses.
///
/// Stored documents are merged over the defaults, so a record missing a
/// field still loads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreathSettings {
    pub current_mode: BreathMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_preset_id: Option<String>,
    pub selected_profile: Profile,
}

impl<S: KeyValueStore> Preferences<S> {
    /// Presets with usable durations. Invalid entries stay in the store
    /// but are left out here.
    pub fn presets(&self) -> Vec<BreathPreset> {
        let (valid, invalid): (Vec<_>, Vec<_>) = self
            .stored_presets()
            .into_iter()
            .partition(|p| p.durations.validate().is_ok());
        if !invalid.is_empty() {
            let ids: Vec<&str> = invalid.iter().map(|p| p.id.as_str()).collect();
            tracing::warn!(?ids, "skipping stored presets with invalid durations");
        }
        valid
    }

    /// The stored list as is; writes go through this so nothing is lost.
    fn stored_presets(&self) -> Vec<BreathPreset> {
        self.store()
            .read_or::<Vec<BreathPreset>>(keys::BREATH_PRESETS, Vec::new())
    }

    pub fn preset(&self, id: &str) -> Option<BreathPreset> {
        self.presets().into_iter().find(|p| p.id == id)
    }

    /// Store a new preset with a fresh id and creation time.
    pub fn save_preset(&self, name: &str, durations: BreathDurations) -> BreathPreset {
        let preset = BreathPreset {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            durations,
            created_at: Utc::now().timestamp_millis(),
        };
        let mut presets = self.stored_presets();
        presets.push(preset.clone());
        self.store().write(keys::BREATH_PRESETS, &presets);
        preset
    }

    /// Replace a preset's durations and optionally its name.
    pub fn update_preset(
        &self,
        id: &str,
        durations: BreathDurations,
        name: Option<&str>,
    ) -> Option<BreathPreset> {
        let mut presets = self.stored_presets();
        let preset = presets.iter_mut().find(|p| p.id == id)?;
        preset.durations = durations;
        if let Some(name) = name {
            preset.name = name.to_string();
        }
        let updated = preset.clone();
        self.store().write(keys::BREATH_PRESETS, &presets);
        Some(updated)
    }

    /// Remove a preset. If it was selected, the settings fall back to default mode.
    ///
    /// Returns whether a preset was removed.
    pub fn delete_preset(&self, id: &str) -> bool {
        let mut presets = self.stored_presets();
        let before = presets.len();
        presets.retain(|p| p.id != id);
        let removed = presets.len() != before;
        self.store().write(keys::BREATH_PRESETS, &presets);

        let settings = self.breath_settings();
        if settings.selected_preset_id.as_deref() == Some(id) {
            self.save_breath_settings(&BreathSettings {
                current_mode: BreathMode::Default,
                selected_preset_id: None,
                ..settings
            });
        }
        removed
    }

    pub fn breath_settings(&self) -> BreathSettings {
        self.store()
            .read_or(keys::BREATH_SETTINGS, BreathSettings::default())
    }

    pub fn save_breath_settings(&self, settings: &BreathSettings) {
        self.store().write(keys::BREATH_SETTINGS, settings);
    }
}
