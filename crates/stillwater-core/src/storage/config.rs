//! TOML-based application configuration.
//!
//! Holds the tunables of each practice feature:
//! - Default breath durations and visual scale bounds
//! - Calibration band
//! - Ambient mixer gain, sample rate and sample directory
//! - Mindfulness bell defaults
//! - Guidance API endpoint and model
//! - Server bind address
//!
//! Configuration is stored at `~/.config/stillwater/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::breath::{BreathDurations, PhaseBounds, ScaleBounds};
use crate::error::ConfigError;

/// Breath pacer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathConfig {
    #[serde(default = "default_inhale")]
    pub inhale_sec: f64,
    #[serde(default = "default_hold_high")]
    pub hold_high_sec: f64,
    #[serde(default = "default_exhale")]
    pub exhale_sec: f64,
    #[serde(default = "default_hold_low")]
    pub hold_low_sec: f64,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    #[serde(default = "default_min_phase")]
    pub min_phase_sec: f64,
    #[serde(default = "default_max_phase")]
    pub max_phase_sec: f64,
}

/// Tap calibration band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default = "default_min_cycle")]
    pub min_cycle_sec: f64,
    #[serde(default = "default_max_cycle")]
    pub max_cycle_sec: f64,
}

/// Ambient engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientConfig {
    #[serde(default = "default_master_gain")]
    pub master_gain: f64,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Directory holding `rain.wav`, `stream.wav` and `bowls.wav`.
    /// Channels without a file are synthesized.
    #[serde(default)]
    pub samples_dir: Option<String>,
    #[serde(default = "default_ramp_ms")]
    pub ramp_ms: u64,
}

/// Mindfulness bell defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BellConfig {
    #[serde(default = "default_bell_minutes")]
    pub minutes: u32,
    #[serde(default = "default_bell_interval")]
    pub interval_min: u32,
    #[serde(default = "default_bell_frequency")]
    pub frequency_hz: f64,
}

/// Guidance text generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Environment variable the API key is read from.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/stillwater/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub breath: BreathConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub ambient: AmbientConfig,
    #[serde(default)]
    pub bell: BellConfig,
    #[serde(default)]
    pub guidance: GuidanceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

// Default functions
fn default_inhale() -> f64 {
    4.0
}
fn default_hold_high() -> f64 {
    4.0
}
fn default_exhale() -> f64 {
    6.0
}
fn default_hold_low() -> f64 {
    2.0
}
fn default_min_scale() -> f64 {
    0.6
}
fn default_max_scale() -> f64 {
    1.0
}
fn default_min_phase() -> f64 {
    0.3
}
fn default_max_phase() -> f64 {
    60.0
}
fn default_min_cycle() -> f64 {
    6.0
}
fn default_max_cycle() -> f64 {
    24.0
}
fn default_master_gain() -> f64 {
    0.9
}
fn default_sample_rate() -> u32 {
    44_100
}
fn default_ramp_ms() -> u64 {
    200
}
fn default_bell_minutes() -> u32 {
    10
}
fn default_bell_interval() -> u32 {
    3
}
fn default_bell_frequency() -> f64 {
    880.0
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f64 {
    0.8
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_timeout() -> u64 {
    60
}
fn default_bind() -> String {
    "127.0.0.1:8787".into()
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            inhale_sec: default_inhale(),
            hold_high_sec: default_hold_high(),
            exhale_sec: default_exhale(),
            hold_low_sec: default_hold_low(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            min_phase_sec: default_min_phase(),
            max_phase_sec: default_max_phase(),
        }
    }
}

impl BreathConfig {
    /// Default durations, or the built-in 4/4/6/2 if the configured ones are invalid.
    pub fn durations(&self) -> BreathDurations {
        BreathDurations::new(
            self.inhale_sec,
            self.hold_high_sec,
            self.exhale_sec,
            self.hold_low_sec,
        )
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "configured breath durations are invalid, using defaults");
            BreathDurations::default()
        })
    }

    /// Calibration phase clamp, or 0.3-60 s if the configured pair is unusable.
    pub fn phase_bounds(&self) -> PhaseBounds {
        PhaseBounds::new(self.min_phase_sec, self.max_phase_sec).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "configured phase bounds are invalid, using defaults");
            PhaseBounds::default()
        })
    }

    pub fn scale_bounds(&self) -> ScaleBounds {
        ScaleBounds {
            min: self.min_scale,
            max: self.max_scale,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_cycle_sec: default_min_cycle(),
            max_cycle_sec: default_max_cycle(),
        }
    }
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            master_gain: default_master_gain(),
            sample_rate: default_sample_rate(),
            samples_dir: None,
            ramp_ms: default_ramp_ms(),
        }
    }
}

impl Default for BellConfig {
    fn default() -> Self {
        Self {
            minutes: default_bell_minutes(),
            interval_min: default_bell_interval(),
            frequency_hz: default_bell_frequency(),
        }
    }
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if key.is_empty() {
            return Err(unknown());
        }
        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                // Unset optionals (null) and strings both take the raw text.
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of `config.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. The value keeps the type
    /// of the existing entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Every leaf key with its current value, in dot-path form.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Overwrite the stored configuration with the defaults.
    pub fn reset() -> Result<Self, ConfigError> {
        let cfg = Self::default();
        cfg.save()?;
        Ok(cfg)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Self::default()
        })
    }
}
