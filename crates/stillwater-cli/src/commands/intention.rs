use clap::Subcommand;
use stillwater_core::ValidationError;

use super::{open_prefs, CmdResult};

#[derive(Subcommand)]
pub enum IntentionAction {
    /// Print today's intention
    Get,
    /// Replace the intention
    Set {
        /// Intention text
        text: Vec<String>,
    },
}

pub fn run(action: IntentionAction) -> CmdResult {
    let prefs = open_prefs();
    match action {
        IntentionAction::Get => println!("{}", prefs.intention()),
        IntentionAction::Set { text } => {
            let text = text.join(" ");
            if text.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "intention".into(),
                    message: "must not be empty".into(),
                }
                .into());
            }
            prefs.set_intention(&text);
            println!("{}", prefs.intention());
        }
    }
    Ok(())
}
