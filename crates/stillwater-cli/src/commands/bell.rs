use std::path::PathBuf;
use std::time::Duration;

use clap::Subcommand;
use stillwater_core::ambient::write_wav;
use stillwater_core::bell::bell_sound;
use stillwater_core::{Config, MindfulBell};

use super::{print_json, print_line, sample_loader, CmdResult};

#[derive(Subcommand)]
pub enum BellAction {
    /// Run a timed sit, printing each bell as a JSON line
    Run {
        /// Session length (defaults to bell.minutes)
        #[arg(long)]
        minutes: Option<u32>,
        /// Minutes between bells (defaults to bell.interval_min)
        #[arg(long)]
        interval: Option<u32>,
        /// Do not wait in real time
        #[arg(long)]
        fast: bool,
    },
    /// Write the bell sound to a WAV file
    Sound {
        #[arg(long)]
        out: PathBuf,
    },
}

pub fn run(action: BellAction) -> CmdResult {
    let config = Config::load_or_default();
    match action {
        BellAction::Run {
            minutes,
            interval,
            fast,
        } => {
            let mut bell = MindfulBell::new(
                minutes.unwrap_or(config.bell.minutes),
                interval.unwrap_or(config.bell.interval_min),
            )?;
            let step = Duration::from_secs(1);
            print_line(&bell.start())?;
            while bell.is_running() {
                if !fast {
                    std::thread::sleep(step);
                }
                for event in bell.tick(step) {
                    print_line(&event)?;
                }
            }
        }
        BellAction::Sound { out } => {
            let mut loader = sample_loader(&config.ambient);
            let sound = bell_sound(&mut loader, config.bell.frequency_hz, config.ambient.sample_rate);
            write_wav(&out, &sound)?;
            print_json(&serde_json::json!({
                "path": out,
                "seconds": sound.duration_secs(),
            }))?;
        }
    }
    Ok(())
}
