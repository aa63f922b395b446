//! Core error types for stillwater-core.
//!
//! Nothing in this library is fatal to a practice session: storage reads
//! fall back to defaults, audio failures fall back to synthesis, and guidance
//! failures become error payloads. The types below describe what went wrong
//! for the callers that do want to know.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stillwater-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Preference storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ambient audio errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Guidance generation errors
    #[error("Guidance error: {0}")]
    Guidance(#[from] GuidanceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Preference storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another writer
    #[error("Store is locked")]
    Locked,

    /// Backend cannot be used at all (no data directory, closed handle)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A phase duration is negative or not a finite number
    #[error("Invalid duration for {phase}: {value}")]
    InvalidDuration { phase: &'static str, value: f64 },

    /// All four phases add up to nothing
    #[error("Breath cycle must be longer than zero seconds")]
    EmptyCycle,

    /// Measured calibration interval is outside the accepted band
    #[error("Cycle {measured:.1}s is outside {min}-{max}s")]
    CycleOutOfRange { measured: f64, min: f64, max: f64 },

    /// No preset with this id
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Ambient audio errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Sample exists but could not be decoded
    #[error("Failed to decode sample {path}: {message}")]
    DecodeFailed { path: PathBuf, message: String },

    /// Sample format the engine cannot play
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Engine has been torn down
    #[error("Audio engine is closed")]
    Closed,

    /// Requested render length is negative, not a number or too long
    #[error("Cannot render {seconds}s of audio (allowed 0-{max}s)")]
    RenderLength { seconds: f64, max: f64 },

    /// Failed to write rendered audio
    #[error("Failed to write audio: {0}")]
    WriteFailed(String),
}

/// Guidance generation errors.
#[derive(Error, Debug)]
pub enum GuidanceError {
    /// No API credential available to the proxy
    #[error("Missing {0}")]
    MissingCredential(String),

    /// Upstream API answered with a non-success status
    #[error("Upstream error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    /// Network or client failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Configured API base is not a usable URL
    #[error("Invalid guidance endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream answered 2xx with a body that is not a chat completion
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// Request body could not be understood
    #[error("Bad request")]
    BadRequest,
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseBusy
                    || code.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::Unsupported => AudioError::UnsupportedFormat("wav variant".into()),
            other => AudioError::WriteFailed(other.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_shows_range() {
        let err = ValidationError::CycleOutOfRange {
            measured: 5.94,
            min: 6.0,
            max: 24.0,
        };
        assert_eq!(err.to_string(), "Cycle 5.9s is outside 6-24s");
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let err = GuidanceError::MissingCredential("OPENAI_API_KEY".into());
        assert_eq!(err.to_string(), "Missing OPENAI_API_KEY");
    }
}
