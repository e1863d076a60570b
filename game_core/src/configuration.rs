use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Bot-wide settings, shared by the dispatcher and the transports
#[derive(Clone, Debug, Deserialize, Resource, Serialize, getset::CopyGetters, getset::Getters)]
#[serde(default)]
pub struct BotConfiguration {
    /// Prefix of the top level commands the bot answers itself (`gs!games`, `gs!help`)
    #[getset(get = "pub")]
    command_prefix: String,
    /// Delay between two frames of the event loop
    #[getset(get_copy = "pub")]
    tick_millis: u64,
}

impl Default for BotConfiguration {
    fn default() -> Self {
        BotConfiguration {
            command_prefix: "gs!".to_string(),
            tick_millis: 50,
        }
    }
}

impl BotConfiguration {
    pub fn games_command(&self) -> String {
        format!("{}games", self.command_prefix)
    }

    pub fn help_command(&self) -> String {
        format!("{}help", self.command_prefix)
    }
}
