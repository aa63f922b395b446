use chrono::{Local, Utc};
use clap::Subcommand;
use serde::Serialize;
use stillwater_core::Event;

use super::{open_prefs, print_json, print_line, CmdResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current streak
    Show,
    /// Count today as a practice day
    Log,
}

#[derive(Serialize)]
struct StreakView {
    /// Days in a row, or 0 once a day was missed.
    current: u32,
    stored: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_practice: Option<chrono::DateTime<Utc>>,
}

pub fn run(action: StreakAction) -> CmdResult {
    let prefs = open_prefs();
    match action {
        StreakAction::Show => {
            let state = prefs.streak();
            let now = Local::now();
            print_json(&StreakView {
                current: state.current_on(now.date_naive(), &Local),
                stored: state.streak_days,
                last_practice: state.last_practice,
            })?;
        }
        StreakAction::Log => {
            let now = Local::now();
            let state = prefs.log_practice(&now);
            print_line(&Event::StreakUpdated {
                streak_days: state.streak_days,
                last_practice: now.date_naive(),
                at: now.with_timezone(&Utc),
            })?;
        }
    }
    Ok(())
}
