mod config;
pub mod database;
pub mod intention;
pub mod kv;
pub mod mixer;
pub mod mood;
pub mod presets;
pub mod streak;

pub use config::{
    AmbientConfig, BellConfig, BreathConfig, CalibrationConfig, Config, GuidanceConfig,
    ServerConfig,
};
pub use database::SqliteStore;
pub use intention::DEFAULT_INTENTION;
pub use kv::{keys, KeyValueStore, KeyValueStoreExt, MemoryStore, UnavailableStore};
pub use mixer::{clamp_level, ChannelLevels, MixerState};
pub use mood::{Energy, Mood, MoodLogEntry, MOOD_LOG_CAPACITY};
pub use presets::{BreathMode, BreathPreset, BreathSettings};
pub use streak::StreakState;

use std::path::PathBuf;

/// Overrides the data directory outright.
pub const DATA_DIR_ENV: &str = "STILLWATER_DATA_DIR";
/// Set to `dev` to use the development data directory.
pub const ENV_VAR: &str = "STILLWATER_ENV";

/// Returns `~/.config/stillwater[-dev]/` based on STILLWATER_ENV.
///
/// Set STILLWATER_ENV=dev to use development data directory, or
/// STILLWATER_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var(ENV_VAR).unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("stillwater-dev")
    } else {
        base_dir.join("stillwater")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Typed access to every persisted preference.
///
/// Reads never fail: missing or corrupt documents yield defaults. Writes are
/// best effort.
#[derive(Debug, Default)]
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Preferences over whichever backend could be opened.
pub type DynPreferences = Preferences<Box<dyn KeyValueStore>>;

impl DynPreferences {
    /// Open the on-disk store, or fall back to an in-memory one.
    ///
    /// The fallback keeps the app usable when the data directory is not
    /// writable; nothing is persisted in that case.
    pub fn open_default() -> Self {
        match SqliteStore::open() {
            Ok(store) => Self::new(Box::new(store)),
            Err(e) => {
                tracing::warn!(error = %e, "preference store unavailable, using memory");
                Self::new(Box::new(MemoryStore::new()))
            }
        }
    }
}
