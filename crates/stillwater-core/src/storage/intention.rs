use super::kv::{keys, KeyValueStore, KeyValueStoreExt};
use super::Preferences;

pub const DEFAULT_INTENTION: &str = "I intend to be present.";

impl<S: KeyValueStore> Preferences<S> {
    /// The user's daily intention.
    pub fn intention(&self) -> String {
        self.store()
            .read_or(keys::INTENTION, DEFAULT_INTENTION.to_string())
    }

    pub fn set_intention(&self, text: &str) {
        self.store().write(keys::INTENTION, text.trim());
    }
}
