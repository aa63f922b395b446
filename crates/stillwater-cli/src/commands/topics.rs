use clap::Subcommand;
use stillwater_core::topics::{self, TOPICS};
use stillwater_core::CoreError;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum TopicsAction {
    /// List practice topics
    List,
    /// Show a topic and its sessions
    Show { slug: String },
}

pub fn run(action: TopicsAction) -> CmdResult {
    match action {
        TopicsAction::List => {
            for topic in TOPICS {
                println!("{:<16} {:<24} {}", topic.slug, topic.title, topic.hint);
            }
        }
        TopicsAction::Show { slug } => {
            let topic = topics::find(&slug).ok_or_else(|| CoreError::Custom(format!("unknown topic: {slug}")))?;
            print_json(topic)?;
        }
    }
    Ok(())
}
