//! # Stillwater Core Library
//!
//! This library provides the core logic for Stillwater, a mindfulness
//! practice toolkit. Every operation is available through the standalone
//! CLI; the HTTP server only hosts the guidance proxy.
//!
//! ## Architecture
//!
//! - **Breath**: A frame-driven pacer that requires the caller to invoke
//!   `tick()` with elapsed time, plus tap calibration and ratio profiles
//! - **Ambient**: A sample-or-synthesis sound engine rendering into buffers
//! - **Storage**: SQLite-backed preference documents and TOML configuration
//! - **Guidance**: Client for an OpenAI-compatible chat completion API
//!
//! ## Key Components
//!
//! - [`BreathPacer`]: Breath phase state machine
//! - [`BreathPractice`]: Pacer bound to saved presets and settings
//! - [`AmbientEngine`]: Rain, stream and bowls mixer
//! - [`Preferences`]: Typed access to persisted preferences
//! - [`Config`]: Application configuration management

pub mod ambient;
pub mod bell;
pub mod breath;
pub mod error;
pub mod events;
pub mod guidance;
pub mod storage;
pub mod topics;

pub use ambient::{AmbientEngine, AmbientMixer, AudioBuffer, Channel};
pub use bell::{BellReason, MindfulBell};
pub use breath::{
    BreathDurations, BreathPacer, BreathPhase, BreathPractice, PacerState, Profile, TapCalibrator,
    TapOutcome,
};
pub use error::{AudioError, ConfigError, CoreError, GuidanceError, StorageError, ValidationError};
pub use events::Event;
pub use guidance::{GuidanceClient, GuidanceRequest, GuidanceResponse};
pub use storage::{Config, DynPreferences, MemoryStore, Preferences, SqliteStore};
