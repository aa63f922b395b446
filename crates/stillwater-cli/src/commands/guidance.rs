use clap::Subcommand;
use stillwater_core::storage::{Energy, Mood};
use stillwater_core::topics;
use stillwater_core::{Config, CoreError, GuidanceClient, GuidanceRequest, GuidanceResponse};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum GuidanceAction {
    /// Generate a short meditation script
    Generate {
        #[arg(long)]
        mood: Option<Mood>,
        #[arg(long)]
        energy: Option<Energy>,
        /// Topic slug (see `stillwater topics list`)
        #[arg(long)]
        topic: Option<String>,
    },
}

pub fn run(action: GuidanceAction) -> CmdResult {
    let config = Config::load_or_default();
    match action {
        GuidanceAction::Generate {
            mood,
            energy,
            topic,
        } => {
            if let Some(slug) = topic.as_deref() {
                if topics::find(slug).is_none() {
                    return Err(CoreError::Custom(format!("unknown topic: {slug}")));
                }
            }
            let req = GuidanceRequest {
                mood: mood.map(|m| m.as_str().to_string()),
                energy: energy.map(|e| e.as_str().to_string()),
                topic,
            };
            let client = GuidanceClient::new(config.guidance);
            let runtime = tokio::runtime::Runtime::new()?;
            let content = runtime.block_on(client.generate(&req))?;
            print_json(&GuidanceResponse::Content { content })?;
        }
    }
    Ok(())
}
