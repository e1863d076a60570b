pub mod board;
pub mod configuration;
pub mod module;
pub mod player;
pub mod render;
pub mod session;
pub mod wheel;

use game_core::catalog::Catalog;
use game_core::prelude::*;

pub use self::configuration::WheelConfiguration;
pub use self::module::{WheelOfDiscord, MODULE_NAME};
pub use self::session::{Game, GameError};

/// Loads the answer catalog and registers the Wheel of Discord module.
/// Add after `GameshowCorePlugin` so the bot command prefix is known.
#[derive(Debug, Default)]
pub struct WheelOfDiscordPlugin {
    config: WheelConfiguration,
}

impl WheelOfDiscordPlugin {
    pub fn new(config: WheelConfiguration) -> Self {
        WheelOfDiscordPlugin { config }
    }
}

impl Plugin for WheelOfDiscordPlugin {
    fn build(&self, app: &mut App) {
        let prefix = app
            .world()
            .get_resource::<BotConfiguration>()
            .cloned()
            .unwrap_or_default()
            .command_prefix()
            .clone();
        match Catalog::load_dir(self.config.categories_dir()) {
            Ok(catalog) => {
                app.register_game_module(WheelOfDiscord::new(self.config.clone(), catalog, prefix));
            },
            Err(err) => {
                log::warn!("{MODULE_NAME} reported an error while initializing: {err}");
            },
        }
    }
}
