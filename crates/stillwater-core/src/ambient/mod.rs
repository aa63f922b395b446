//! Ambient soundscape: rain, stream and singing bowls mixed under a
//! breath-following envelope.
//!
//! Each channel plays a looped sample when one is available and falls back
//! to synthesized sound otherwise. The engine renders into plain sample
//! buffers; where the audio goes is up to the caller.

pub mod engine;
pub mod graph;
pub mod mixer;
pub mod sample;
pub mod synth;

pub use engine::{AmbientEngine, ContextState, EnableReport};
pub use graph::GainParam;
pub use mixer::AmbientMixer;
pub use sample::{write_wav, DirSampleLoader, NoSamples, SampleLoader};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Rain,
    Stream,
    Bowls,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Rain, Channel::Stream, Channel::Bowls];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Rain => "rain",
            Channel::Stream => "stream",
            Channel::Bowls => "bowls",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Channel::Rain => 0,
            Channel::Stream => 1,
            Channel::Bowls => 2,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rain" => Ok(Channel::Rain),
            "stream" => Ok(Channel::Stream),
            "bowls" => Ok(Channel::Bowls),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// Mono PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }
}
