//! Guidance text generation.
//!
//! A short meditation script is requested from an OpenAI-compatible chat
//! completion API, given the user's mood, energy and topic.

mod client;

pub use client::GuidanceClient;

use serde::{Deserialize, Serialize};

use crate::error::GuidanceError;

pub const SYSTEM_PROMPT: &str = "You write meditations that are short, kind, and non-clinical.";

/// Context for a guidance request. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl GuidanceRequest {
    /// Parse a request body. Anything that is not a JSON object with
    /// optional string fields is a bad request.
    pub fn from_json(body: &[u8]) -> Result<Self, GuidanceError> {
        serde_json::from_slice(body).map_err(|_| GuidanceError::BadRequest)
    }
}

/// The user prompt sent alongside [`SYSTEM_PROMPT`].
pub fn build_prompt(req: &GuidanceRequest) -> String {
    let mood = req.mood.as_deref().unwrap_or("unknown");
    let energy = req.energy.as_deref().unwrap_or("unknown");
    let topic = req.topic.as_deref().unwrap_or("general");
    format!(
        "You are a gentle meditation teacher. Write a concise (120-180 words) guidance \
         for a short practice. Context: mood={mood}, energy={energy}, topic={topic}. \
         Tone: warm, spiritual, grounded. Include brief breath pacing and one compassion \
         cue. Avoid medical claims."
    )
}

/// Body returned to guidance callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuidanceResponse {
    Content { content: String },
    Error { error: String },
}

impl GuidanceResponse {
    pub fn error(message: impl Into<String>) -> Self {
        GuidanceResponse::Error {
            error: message.into(),
        }
    }
}
