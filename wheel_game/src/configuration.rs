use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::render::GlyphSet;
use crate::wheel::{RewardWheel, Spin};

#[derive(Clone, Debug, Deserialize, Serialize, getset::CopyGetters, getset::Getters)]
#[serde(default)]
pub struct WheelConfiguration {
    /// Directory of `*.json` category files
    #[getset(get = "pub")]
    categories_dir: PathBuf,
    #[getset(get_copy = "pub")]
    max_players: usize,
    /// Seconds between `start` and the first round
    #[getset(get_copy = "pub")]
    time_to_start: u64,
    #[getset(get_copy = "pub")]
    number_of_rounds: usize,
    #[getset(get_copy = "pub")]
    vowel_price: u32,
    #[getset(get_copy = "pub")]
    minimum_solve: u32,
    /// Seconds a player has for each action before the turn passes
    #[getset(get_copy = "pub")]
    turn_timeout: u64,
    #[getset(get_copy = "pub")]
    glyphs: GlyphSet,
    wheel: Option<Vec<Spin>>,
}

impl Default for WheelConfiguration {
    fn default() -> Self {
        WheelConfiguration {
            categories_dir: PathBuf::from("assets/categories"),
            max_players: 3,
            time_to_start: 20,
            number_of_rounds: 5,
            vowel_price: 250,
            minimum_solve: 1000,
            turn_timeout: 45,
            glyphs: GlyphSet::default(),
            wheel: None,
        }
    }
}

impl WheelConfiguration {
    pub fn wheel(&self) -> RewardWheel {
        self.wheel
            .clone()
            .map(RewardWheel::new)
            .unwrap_or_default()
    }

    pub fn lobby_delay(&self) -> Duration {
        Duration::from_secs(self.time_to_start)
    }

    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs(self.turn_timeout)
    }

    pub fn with_categories_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.categories_dir = dir.into();
        self
    }

    pub fn with_wheel(mut self, segments: Vec<Spin>) -> Self {
        self.wheel = Some(segments);
        self
    }

    pub fn with_number_of_rounds(mut self, number_of_rounds: usize) -> Self {
        self.number_of_rounds = number_of_rounds;
        self
    }

    pub fn with_time_to_start(mut self, seconds: u64) -> Self {
        self.time_to_start = seconds;
        self
    }

    pub fn with_turn_timeout(mut self, seconds: u64) -> Self {
        self.turn_timeout = seconds;
        self
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn defaults_match_the_classic_show() {
        let config = WheelConfiguration::default();
        assert_eq!(config.max_players(), 3);
        assert_eq!(config.number_of_rounds(), 5);
        assert_eq!(config.vowel_price(), 250);
        assert_eq!(config.minimum_solve(), 1000);
        assert_eq!(config.wheel(), RewardWheel::default());
    }

    #[test]
    fn reads_partial_toml() {
        let config: WheelConfiguration = toml::from_str(
            r#"
            turn_timeout = 10
            glyphs = "plain"
            wheel = [1000, "Bankrupt"]
            "#,
        )
        .expect("valid configuration");
        assert_eq!(config.turn_duration(), Duration::from_secs(10));
        assert_eq!(config.glyphs(), GlyphSet::Plain);
        assert_eq!(config.wheel().segments(), [Spin::Reward(1000), Spin::Bankrupt]);
        assert_eq!(config.time_to_start(), 20);
    }
}
