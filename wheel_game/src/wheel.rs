use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where the wheel stopped
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "SegmentRepr", into = "SegmentRepr")]
pub enum Spin {
    Reward(u32),
    Lose,
    Bankrupt,
}

/// How segments are written in configuration: a number or a name
#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum SegmentRepr {
    Reward(u32),
    Named(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RewardWheel {
    segments: Vec<Spin>,
}

impl TryFrom<SegmentRepr> for Spin {
    type Error = String;

    fn try_from(value: SegmentRepr) -> Result<Self, Self::Error> {
        match value {
            SegmentRepr::Reward(amount) => Ok(Spin::Reward(amount)),
            SegmentRepr::Named(name) if name.eq_ignore_ascii_case("lose") => Ok(Spin::Lose),
            SegmentRepr::Named(name) if name.eq_ignore_ascii_case("bankrupt") => Ok(Spin::Bankrupt),
            SegmentRepr::Named(name) => Err(format!("unknown wheel segment [{name}]")),
        }
    }
}

impl From<Spin> for SegmentRepr {
    fn from(value: Spin) -> Self {
        match value {
            Spin::Reward(amount) => SegmentRepr::Reward(amount),
            Spin::Lose => SegmentRepr::Named("Lose".to_string()),
            Spin::Bankrupt => SegmentRepr::Named("Bankrupt".to_string()),
        }
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spin::Reward(amount) => write!(f, "${amount}"),
            Spin::Lose => f.write_str("Lose a Turn"),
            Spin::Bankrupt => f.write_str("Bankrupt"),
        }
    }
}

impl Spin {
    pub fn reward(&self) -> Option<u32> {
        match self {
            Spin::Reward(amount) => Some(*amount),
            _ => None,
        }
    }
}

impl Default for RewardWheel {
    fn default() -> Self {
        let mut segments = vec![Spin::Bankrupt; 3];
        segments.push(Spin::Lose);
        segments.extend([500; 5].map(Spin::Reward));
        segments.push(Spin::Reward(550));
        segments.extend([600; 3].map(Spin::Reward));
        segments.extend([650; 3].map(Spin::Reward));
        segments.extend([700; 3].map(Spin::Reward));
        segments.extend([800, 900, 1000, 2500, 10000].map(Spin::Reward));
        RewardWheel { segments }
    }
}

impl RewardWheel {
    /// A wheel with custom segments, falling back to the standard wheel when empty
    pub fn new(segments: Vec<Spin>) -> Self {
        if segments.is_empty() {
            log::warn!("Empty wheel configured, using the standard wheel");
            return RewardWheel::default();
        }
        RewardWheel { segments }
    }

    pub fn segments(&self) -> &[Spin] {
        &self.segments
    }

    /// Picks a segment uniformly, so repeated segments weigh more
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Spin {
        *self
            .segments
            .choose(rng)
            .expect("wheel always has at least one segment")
    }
}
