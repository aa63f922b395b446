//! Practice topics and their suggested sessions.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    pub title: &'static str,
    pub minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub slug: &'static str,
    pub title: &'static str,
    /// One-line summary for lists.
    pub hint: &'static str,
    pub description: &'static str,
    pub sessions: &'static [Session],
}

impl Topic {
    pub fn total_minutes(&self) -> u32 {
        self.sessions.iter().map(|s| s.minutes).sum()
    }
}

const fn session(title: &'static str, minutes: u32) -> Session {
    Session { title, minutes }
}

pub const TOPICS: &[Topic] = &[
    Topic {
        slug: "anxiety",
        title: "Anxiety Relief",
        hint: "Soften the nervous system",
        description: "Calming, grounding practices to soothe the nervous system.",
        sessions: &[
            session("Box Breathing", 5),
            session("Body Scan for Safety", 10),
            session("Loving-Kindness for Fear", 12),
        ],
    },
    Topic {
        slug: "apathy",
        title: "Apathy & Low Motivation",
        hint: "Gentle activation",
        description: "Gentle activation and reconnecting with purpose.",
        sessions: &[
            session("Small Sparks", 7),
            session("Values Check-in", 9),
            session("Energy Awakening", 12),
        ],
    },
    Topic {
        slug: "sleep",
        title: "Sleep",
        hint: "Wind down and rest",
        description: "Wind down with breath, relaxation and soft attention.",
        sessions: &[
            session("Breath Downshift", 8),
            session("Progressive Relaxation", 12),
        ],
    },
    Topic {
        slug: "focus",
        title: "Focus",
        hint: "Clear, steady attention",
        description: "Build steady attention and reduce distraction.",
        sessions: &[
            session("Single-Point Focus", 8),
            session("Counting the Breath", 10),
        ],
    },
    Topic {
        slug: "self-compassion",
        title: "Self-Compassion",
        hint: "Kindness inward",
        description: "Kind attention to inner experience and emotions.",
        sessions: &[
            session("Soften, Soothe, Allow", 12),
            session("Hand on Heart", 7),
        ],
    },
    Topic {
        slug: "stress",
        title: "Stress",
        hint: "Release and ease",
        description: "Release tension and create inner spaciousness.",
        sessions: &[
            session("Tension Sweep", 6),
            session("Exhale Lengthening", 5),
        ],
    },
];

/// Look a topic up by slug.
pub fn find(slug: &str) -> Option<&'static Topic> {
    TOPICS.iter().find(|t| t.slug == slug)
}
