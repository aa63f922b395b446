use std::io::BufRead;
use std::time::{Duration, Instant};

use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use stillwater_core::breath::{
    ratios_from_durations, CueSink, PhaseBounds, TapCalibrator, TapOutcome,
};
use stillwater_core::storage::{BreathMode, BreathPreset, BreathSettings};
use stillwater_core::error::Result;
use stillwater_core::{
    BreathDurations, BreathPhase, BreathPractice, Config, CoreError, Event, Profile,
};

use super::{open_prefs, print_json, print_line, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Default,
    Custom,
}

impl From<ModeArg> for BreathMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Default => BreathMode::Default,
            ModeArg::Custom => BreathMode::Custom,
        }
    }
}

#[derive(Subcommand)]
pub enum BreathAction {
    /// Pace breathing, printing one event per line
    Run {
        /// Stop after this many full cycles
        #[arg(long, default_value = "1")]
        cycles: u64,
        /// Frame length in milliseconds
        #[arg(long, default_value = "50")]
        frame_ms: u64,
        /// Do not sleep between frames
        #[arg(long)]
        fast: bool,
    },
    /// Calibrate the cycle length and save it as a preset.
    ///
    /// Without --cycle, press Enter at the start of two consecutive inhales.
    Calibrate {
        /// Measured cycle length in seconds
        #[arg(long)]
        cycle: Option<f64>,
        /// Preset name
        #[arg(long)]
        name: Option<String>,
    },
    /// Select a ratio profile (default, keep, box, coherent, relax, 478)
    Profile { profile: Profile },
    /// Switch between the default pattern and saved presets
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },
    /// List saved presets
    Presets,
    /// Select a saved preset
    Select { id: String },
    /// Delete a saved preset
    DeletePreset { id: String },
    /// Print the active pattern and settings as JSON
    Status,
}

#[derive(Serialize)]
struct Status {
    settings: BreathSettings,
    durations: BreathDurations,
    breaths_per_minute: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<BreathPreset>,
}

/// Prints the vibration pattern for each phase to stderr.
struct StderrHaptics;

impl CueSink for StderrHaptics {
    fn phase_entered(&mut self, phase: BreathPhase, _cycle: u64) {
        eprintln!("{phase}: vibrate {:?}", phase.haptic_pattern());
    }
}

pub fn run(action: BreathAction) -> CmdResult {
    let config = Config::load_or_default();
    let prefs = open_prefs();
    let mut practice = BreathPractice::from_config(&prefs, &config.breath);

    match action {
        BreathAction::Run {
            cycles,
            frame_ms,
            fast,
        } => {
            let frame = Duration::from_millis(frame_ms.max(1));
            let mut cues = StderrHaptics;
            print_line(&practice.start(&mut cues))?;
            while practice.pacer().cycles() < cycles {
                if !fast {
                    std::thread::sleep(frame);
                }
                for event in practice.tick(frame, &mut cues) {
                    print_line(&event)?;
                }
            }
            if let Some(event) = practice.stop() {
                print_line(&event)?;
            }
        }
        BreathAction::Calibrate { cycle, name } => {
            let calibrator =
                TapCalibrator::new(config.calibration.min_cycle_sec, config.calibration.max_cycle_sec);
            let cycle_sec = match cycle {
                Some(measured) => calibrator.check(measured)?,
                None => tap_cycle(calibrator, config.breath.phase_bounds())?,
            };
            let preset = practice.apply_calibration(cycle_sec, name.as_deref());
            print_line(&Event::CalibrationAccepted {
                cycle_sec,
                durations: preset.durations,
                at: chrono::Utc::now(),
            })?;
            print_json(&preset)?;
        }
        BreathAction::Profile { profile } => {
            print_json(&practice.set_profile(profile))?;
        }
        BreathAction::Mode { mode } => {
            print_json(&practice.set_mode(mode.into()))?;
        }
        BreathAction::Presets => {
            print_json(&prefs.presets())?;
        }
        BreathAction::Select { id } => {
            print_json(&practice.select_preset(&id)?)?;
        }
        BreathAction::DeletePreset { id } => {
            practice.delete_preset(&id)?;
            print_json(&practice.settings())?;
        }
        BreathAction::Status => {
            let durations = practice.active_durations();
            print_json(&Status {
                settings: practice.settings(),
                durations,
                breaths_per_minute: durations.breaths_per_minute(),
                preset: practice.active_preset(),
            })?;
        }
    }
    Ok(())
}

/// Read Enter presses from stdin until two taps give an accepted cycle.
fn tap_cycle(mut calibrator: TapCalibrator, bounds: PhaseBounds) -> Result<f64> {
    let origin = Instant::now();
    let current = ratios_from_durations(&BreathDurations::default());
    eprintln!("{}", calibrator.hint());
    for line in std::io::stdin().lock().lines() {
        line?;
        let outcome = calibrator.tap(origin.elapsed());
        match &outcome {
            TapOutcome::Accepted { cycle_sec, .. } => return Ok(*cycle_sec),
            TapOutcome::AwaitingSecondTap { hint, .. } => eprintln!("{hint}"),
            TapOutcome::Rejected { hint, .. } => {
                if let Some(event) = outcome.to_event(Profile::Default, current, bounds) {
                    print_line(&event)?;
                }
                eprintln!("{hint}");
            }
        }
    }
    Err(CoreError::Custom("calibration cancelled".into()))
}
