use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "stillwater", version, about = "Stillwater mindfulness toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Breath pacer, calibration and presets
    Breath {
        #[command(subcommand)]
        action: commands::breath::BreathAction,
    },
    /// Ambient sound mixer
    Mixer {
        #[command(subcommand)]
        action: commands::mixer::MixerAction,
    },
    /// Mood check-ins
    Mood {
        #[command(subcommand)]
        action: commands::mood::MoodAction,
    },
    /// Practice streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Mindfulness bell timer
    Bell {
        #[command(subcommand)]
        action: commands::bell::BellAction,
    },
    /// Daily intention
    Intention {
        #[command(subcommand)]
        action: commands::intention::IntentionAction,
    },
    /// Practice topics
    Topics {
        #[command(subcommand)]
        action: commands::topics::TopicsAction,
    },
    /// Generated meditation guidance
    Guidance {
        #[command(subcommand)]
        action: commands::guidance::GuidanceAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr; stdout carries JSON only.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stillwater_core=warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Breath { action } => commands::breath::run(action),
        Commands::Mixer { action } => commands::mixer::run(action),
        Commands::Mood { action } => commands::mood::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Bell { action } => commands::bell::run(action),
        Commands::Intention { action } => commands::intention::run(action),
        Commands::Topics { action } => commands::topics::run(action),
        Commands::Guidance { action } => commands::guidance::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
