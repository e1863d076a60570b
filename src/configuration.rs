use std::path::{Path, PathBuf};

use game_core::prelude::BotConfiguration;
use serde::{Deserialize, Serialize};
use wheel_game::WheelConfiguration;

const CONFIG_FILE_NAME: &str = "gameshow.toml";

/// Contents of `gameshow.toml`, one table per concern
#[derive(Clone, Debug, Default, Deserialize, Serialize, getset::Getters)]
#[serde(default)]
pub struct GameshowConfig {
    #[getset(get = "pub")]
    bot: BotConfiguration,
    #[getset(get = "pub")]
    wheel_of_discord: WheelConfiguration,
}

impl GameshowConfig {
    /// Reads the configuration file, using defaults when there is none
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::info!("No configuration file found, using defaults");
                    return Ok(GameshowConfig::default());
                },
            },
        };
        log::info!("Reading configuration from {path:?}");
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("could not read configuration {path:?}: {e}"))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn into_parts(self) -> (BotConfiguration, WheelConfiguration) {
        (self.bot, self.wheel_of_discord)
    }
}

/// `$XDG_CONFIG_HOME/gameshow/gameshow.toml`, or the same under `~/.config`
fn default_config_path() -> Option<PathBuf> {
    let mut path = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| {
            let mut pathbuf = homedir::get_my_home().ok().flatten()?;
            pathbuf.push(".config");
            Some(pathbuf)
        })?;
    path.push("gameshow");
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn tables_are_optional() {
        let config = GameshowConfig::parse(
            r#"
            [wheel_of_discord]
            max_players = 4
            "#,
        )
        .expect("valid configuration");
        assert_eq!(config.wheel_of_discord().max_players(), 4);
        assert_eq!(config.wheel_of_discord().number_of_rounds(), 5);
        assert_eq!(config.bot().command_prefix(), "gs!");
    }

    #[test]
    fn bot_table_sets_the_prefix() {
        let config = GameshowConfig::parse("[bot]\ncommand_prefix = \"!\"\ntick_millis = 5").unwrap();
        let (bot, _) = config.into_parts();
        assert_eq!(bot.command_prefix(), "!");
        assert_eq!(bot.tick_millis(), 5);
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(GameshowConfig::parse("[wheel_of_discord]\nglyphs = \"hologram\"").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("gameshow-no-such-config.toml");
        assert!(GameshowConfig::load(Some(&path)).is_err());
    }
}
