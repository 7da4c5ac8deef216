//! Decision policies.
//!
//! The board never asks an agent anything it cannot legally do: every call to
//! [`Agent::decide`] comes with the complete list of legal options, and the
//! answer must be one of them.
mod basic;
mod simple;

pub use basic::{BasicBot, tiles_required};
pub use simple::{PassiveBot, RandomBot, YesBot};

use crate::claim::ClaimKind;
use crate::config::RuleConfig;
use crate::hand::Hand;
use crate::tile::{Tile, Wind};
use std::fmt;
use std::str::FromStr;
use anyhow::{Error, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    Discard { tile: Tile },
    /// Declare a win on the tile just drawn.
    SelfDrawWin,
    /// Declare a concealed kong, or upgrade an exposed pong, with the tile
    /// just drawn.
    SelfKong { tile: Tile },
    Claim { claim: ClaimKind },
    Pass,
}

/// What a player may see when deciding.
#[derive(Debug, Clone, Copy)]
pub struct PlayerView<'a> {
    pub player: u8,
    /// 0 is the dealer.
    pub seat: u8,
    /// While a drawn tile is being considered for a win or a kong it is not
    /// part of `hand` yet.
    pub hand: &'a Hand,
    /// The tile drawn this turn, if any.
    pub drawn: Option<Tile>,
    /// The discard currently open to claims.
    pub latest_tile: Option<Tile>,
    pub discarder: Option<u8>,
    pub prevailing_wind: Wind,
    pub tiles_left: usize,
    pub rules: &'a RuleConfig,
}

pub trait Agent {
    fn name(&self) -> String;

    /// Picks one of `options`, which is never empty.
    fn decide(&mut self, view: &PlayerView<'_>, options: &[Decision]) -> Result<Decision>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    #[default]
    Basic,
    Random,
    Yes,
    Passive,
}

impl Decision {
    #[inline]
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Higher is more eager. Wins rank first, passing last.
    #[must_use]
    pub const fn eagerness(self) -> u8 {
        match self {
            Self::SelfDrawWin => 5,
            Self::Claim { claim } => claim.priority(),
            Self::SelfKong { .. } => 3,
            Self::Discard { .. } | Self::Pass => 0,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discard { tile } => write!(f, "discard {tile}"),
            Self::SelfDrawWin => f.write_str("self-draw win"),
            Self::SelfKong { tile } => write!(f, "kong {tile}"),
            Self::Claim { claim } => write!(f, "{claim}"),
            Self::Pass => f.write_str("pass"),
        }
    }
}

/// The most eager option, the first one among equals.
#[must_use]
pub fn most_eager(options: &[Decision]) -> Option<Decision> {
    options
        .iter()
        .copied()
        .reduce(|best, d| if d.eagerness() > best.eagerness() { d } else { best })
}

/// The discard options among `options`.
pub fn discards(options: &[Decision]) -> impl Iterator<Item = Tile> + '_ {
    options.iter().filter_map(|d| match *d {
        Decision::Discard { tile } => Some(tile),
        _ => None,
    })
}

impl AgentKind {
    pub const ALL: [Self; 4] = [Self::Basic, Self::Random, Self::Yes, Self::Passive];

    /// Builds an agent for `player`. Randomized agents derive their stream
    /// from both `seed` and `player`, so four agents of the same kind at one
    /// table do not mirror each other.
    #[must_use]
    pub fn build(self, seed: u64, player: u8) -> Box<dyn Agent> {
        let seed = seed ^ (u64::from(player) << 56) ^ 0x9e37_79b9_7f4a_7c15;
        match self {
            Self::Basic => Box::new(BasicBot::new()),
            Self::Random => Box::new(RandomBot::new(seed)),
            Self::Yes => Box::new(YesBot::new(seed)),
            Self::Passive => Box::new(PassiveBot),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Random => "random",
            Self::Yes => "yes",
            Self::Passive => "passive",
        }
    }
}

impl FromStr for AgentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Self::Basic,
            "random" => Self::Random,
            "yes" => Self::Yes,
            "passive" => Self::Passive,
            _ => bail!("unknown agent {s:?}, expected one of basic, random, yes, passive"),
        })
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
