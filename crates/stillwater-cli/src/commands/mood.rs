use chrono::Utc;
use clap::Subcommand;
use stillwater_core::storage::{Energy, Mood};
use stillwater_core::Event;

use super::{open_prefs, print_json, print_line, CmdResult};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Record a check-in
    Log {
        /// bad, okay, good or great
        mood: Mood,
        /// low, medium or high
        energy: Energy,
    },
    /// List recent check-ins, newest first
    List {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub fn run(action: MoodAction) -> CmdResult {
    let prefs = open_prefs();
    match action {
        MoodAction::Log { mood, energy } => {
            let entry = prefs.record_mood(mood, energy, Utc::now());
            print_line(&Event::MoodLogged {
                id: entry.id,
                mood: entry.mood,
                energy: entry.energy,
                at: entry.date,
            })?;
        }
        MoodAction::List { limit } => print_json(&prefs.recent_moods(limit))?,
    }
    Ok(())
}
