use std::path::PathBuf;

use clap::Subcommand;
use stillwater_core::ambient::write_wav;
use stillwater_core::breath::BreathPractice;
use stillwater_core::{AmbientEngine, AmbientMixer, Channel, Config};

use super::{open_prefs, print_json, print_line, sample_loader, CmdResult};

#[derive(Subcommand)]
pub enum MixerAction {
    /// Print the stored mixer state as JSON
    Show,
    /// Turn ambient sound on
    Enable,
    /// Turn ambient sound off
    Disable,
    /// Set a channel level (0.0 - 1.0, clamped)
    Set {
        /// rain, stream or bowls
        channel: Channel,
        #[arg(allow_negative_numbers = true)]
        level: f64,
    },
    /// Render the current mix to a WAV file
    Render {
        /// Output path
        #[arg(long)]
        out: PathBuf,
        /// Length in seconds
        #[arg(long, default_value = "10")]
        seconds: f64,
        /// Follow the active breathing pattern
        #[arg(long)]
        breath: bool,
    },
}

pub fn run(action: MixerAction) -> CmdResult {
    let config = Config::load_or_default();
    let prefs = open_prefs();
    let engine = AmbientEngine::from_config(&config.ambient);
    let mut mixer = AmbientMixer::new(&prefs, engine, sample_loader(&config.ambient));

    match action {
        MixerAction::Show => print_json(&mixer.state())?,
        MixerAction::Enable => {
            let report = mixer.set_enabled(true)?;
            print_line(&report.to_event())?;
        }
        MixerAction::Disable => {
            let report = mixer.set_enabled(false)?;
            print_line(&report.to_event())?;
        }
        MixerAction::Set { channel, level } => print_json(&mixer.set_volume(channel, level))?,
        MixerAction::Render { out, seconds, breath } => {
            // Rendering is an explicit request for sound, so the stored
            // toggle is not consulted.
            let levels = mixer.state().levels();
            let mut engine = mixer.into_engine();
            let report = engine.set_enabled(true, levels, &mut sample_loader(&config.ambient))?;
            if breath {
                let practice = BreathPractice::from_config(&prefs, &config.breath);
                engine.sync_with_breath(Some(practice.active_durations()));
            }
            let buffer = engine.render_seconds(seconds)?;
            engine.close();
            write_wav(&out, &buffer)?;
            tracing::debug!(path = %out.display(), seconds, "rendered ambient mix");
            print_json(&serde_json::json!({
                "path": out,
                "seconds": buffer.duration_secs(),
                "peak": buffer.peak(),
                "synthesized": report.synthesized,
            }))?;
        }
    }
    Ok(())
}
