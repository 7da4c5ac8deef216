//! Fan scoring over decompositions.
//!
//! Rules are applied in a fixed order and two of them end the evaluation
//! early: great dragons and great winds return the fan accumulated so far
//! plus their own, skipping the suit and pong/chow checks.
use super::decompose::{self, Decomposition, Group};
use crate::config::RuleConfig;
use crate::hand::{Hand, Meld};
use crate::tile::{Tile, Wind};
use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    NoBonusTiles,
    AllFlowers,
    AllSeasons,
    SeatFlower,
    SeatSeason,
    GreatDragons,
    SmallDragons,
    DragonPong,
    GreatWinds,
    SmallWinds,
    PrevailingWind,
    SeatWind,
    PureOneSuit,
    MixedOneSuit,
    AllPongs,
    AllChows,
    ThirteenOrphans,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub fan: u8,
    pub patterns: Vec<Pattern>,
}

/// The evaluation of a complete hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    pub fan: u8,
    pub patterns: Vec<Pattern>,
    /// `None` for thirteen orphans.
    pub decomposition: Option<Decomposition>,
}

/// Seat information needed for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinContext {
    pub prevailing_wind: Wind,
    /// 0 is the dealer.
    pub seat: u8,
}

#[derive(Debug)]
pub struct FanCalculator<'a> {
    /// Must include the winning tile (i.e. must be 3n+2).
    pub concealed: &'a [Tile],
    pub melds: &'a [Meld],
    pub bonus: &'a [Tile],
    pub prevailing_wind: Wind,
    pub seat: u8,
    pub rules: &'a RuleConfig,
}

impl Pattern {
    #[must_use]
    pub const fn fan(self) -> u8 {
        match self {
            Self::NoBonusTiles
            | Self::SeatFlower
            | Self::SeatSeason
            | Self::DragonPong
            | Self::PrevailingWind
            | Self::SeatWind
            | Self::AllChows => 1,
            Self::AllFlowers | Self::AllSeasons => 2,
            Self::MixedOneSuit | Self::AllPongs => 3,
            Self::SmallDragons | Self::PureOneSuit => 5,
            Self::SmallWinds => 6,
            Self::GreatDragons => 8,
            Self::GreatWinds | Self::ThirteenOrphans => 13,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoBonusTiles => "No flowers",
            Self::AllFlowers => "Flower set",
            Self::AllSeasons => "Season set",
            Self::SeatFlower => "Seat flower",
            Self::SeatSeason => "Seat season",
            Self::GreatDragons => "Great dragons",
            Self::SmallDragons => "Small dragons",
            Self::DragonPong => "Dragon pong",
            Self::GreatWinds => "Great winds",
            Self::SmallWinds => "Small winds",
            Self::PrevailingWind => "Prevailing wind",
            Self::SeatWind => "Seat wind",
            Self::PureOneSuit => "All one suit",
            Self::MixedOneSuit => "Mixed one suit",
            Self::AllPongs => "All pongs",
            Self::AllChows => "All chows",
            Self::ThirteenOrphans => "Thirteen orphans",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.fan())
    }
}

impl Breakdown {
    fn add(&mut self, pattern: Pattern) {
        self.fan = self.fan.saturating_add(pattern.fan());
        self.patterns.push(pattern);
    }
}

impl Score {
    #[inline]
    #[must_use]
    pub const fn is_accepted(&self, min_fan: u8) -> bool {
        self.fan >= min_fan
    }
}

/// Scores one grouping of a hand.
///
/// `groups` holds the pair and every meld, concealed or exposed. Only the
/// first pair is treated as the eye when checking for all pongs or all
/// chows. An empty list scores nothing.
#[must_use]
pub fn score_groups(groups: &[Group], bonus: &[Tile], prevailing_wind: Wind, seat: u8) -> Breakdown {
    let mut ret = Breakdown::default();
    if groups.is_empty() {
        return ret;
    }
    let seat = seat % 4;

    let mut flowers = 0_u8;
    let mut seasons = 0_u8;
    for t in bonus {
        if let Some(n) = t.bonus_number() {
            if t.is_flower() {
                flowers |= 1 << (n - 1);
            } else {
                seasons |= 1 << (n - 1);
            }
        }
    }
    if bonus.is_empty() {
        ret.add(Pattern::NoBonusTiles);
    } else if flowers == 0b1111 {
        ret.add(Pattern::AllFlowers);
    } else if seasons == 0b1111 {
        ret.add(Pattern::AllSeasons);
    } else {
        if (flowers >> seat) & 1 == 1 {
            ret.add(Pattern::SeatFlower);
        }
        if (seasons >> seat) & 1 == 1 {
            ret.add(Pattern::SeatSeason);
        }
    }

    let (dragons, rest): (Vec<Group>, Vec<Group>) =
        groups.iter().copied().partition(|g| g.tile().is_dragon());
    let (winds, mut rest): (Vec<Group>, Vec<Group>) =
        rest.into_iter().partition(|g| g.tile().is_wind());

    if dragons.len() == 3 {
        if dragons.iter().all(|g| g.len() == 3) {
            ret.add(Pattern::GreatDragons);
            return ret;
        }
        ret.add(Pattern::SmallDragons);
    } else {
        for _ in dragons.iter().filter(|g| g.len() > 2) {
            ret.add(Pattern::DragonPong);
        }
    }

    if winds.len() == 4 {
        if winds.iter().all(|g| g.len() == 3) {
            ret.add(Pattern::GreatWinds);
            return ret;
        }
        ret.add(Pattern::SmallWinds);
    } else {
        let has_pong_of = |wind: Wind| winds.iter().any(|g| g.len() > 2 && g.tile() == wind.tile());
        if has_pong_of(prevailing_wind) {
            ret.add(Pattern::PrevailingWind);
        }
        if has_pong_of(Wind::from_seat(seat)) {
            ret.add(Pattern::SeatWind);
        }
    }

    // An all-honor hand has no suit to match.
    if !rest.is_empty() && rest.windows(2).all(|w| w[0].suit() == w[1].suit()) {
        if dragons.is_empty() && winds.is_empty() {
            ret.add(Pattern::PureOneSuit);
        } else {
            ret.add(Pattern::MixedOneSuit);
        }
    }

    if let Some(eye) = rest.iter().position(|g| g.is_pair()) {
        rest.remove(eye);
    }
    if rest.iter().all(|g| g.is_triplet()) {
        ret.add(Pattern::AllPongs);
    } else if rest.iter().all(|g| g.is_chow()) {
        ret.add(Pattern::AllChows);
    }

    ret
}

/// Fan only, for callers that do not need the breakdown.
#[inline]
#[must_use]
pub fn score(groups: &[Group], bonus: &[Tile], prevailing_wind: Wind, seat: u8) -> u8 {
    score_groups(groups, bonus, prevailing_wind, seat).fan
}

impl FanCalculator<'_> {
    #[must_use]
    pub fn is_thirteen_orphans(&self) -> bool {
        self.rules.thirteen_orphans
            && self.melds.is_empty()
            && decompose::is_thirteen_orphans(self.concealed)
    }

    #[must_use]
    pub fn decompositions(&self) -> Vec<Decomposition> {
        decompose::decompositions(self.concealed, self.melds, self.rules.search)
    }

    /// Structural completeness, ignoring the fan floor.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_thirteen_orphans() || !self.decompositions().is_empty()
    }

    /// Every decomposition with its score, in search order.
    #[must_use]
    pub fn scores(&self) -> Vec<Score> {
        if self.is_thirteen_orphans() {
            return vec![Score {
                fan: Pattern::ThirteenOrphans.fan(),
                patterns: vec![Pattern::ThirteenOrphans],
                decomposition: None,
            }];
        }
        self.decompositions()
            .into_iter()
            .map(|d| {
                let Breakdown { fan, patterns } =
                    score_groups(&d.groups, self.bonus, self.prevailing_wind, self.seat);
                Score {
                    fan,
                    patterns,
                    decomposition: Some(d),
                }
            })
            .collect()
    }

    /// The highest scoring decomposition. The earliest one wins ties.
    #[must_use]
    pub fn search_fan(&self) -> Option<Score> {
        self.scores()
            .into_iter()
            .reduce(|best, s| if s.fan > best.fan { s } else { best })
    }
}

/// Evaluates a hand holding 14 slots, e.g. right after a draw or with a
/// claimed tile added.
///
/// Returns `None` if the hand is not complete. The fan floor is not applied
/// here, see [`Score::is_accepted`].
#[must_use]
pub fn evaluate_winning(hand: &Hand, ctx: WinContext, rules: &RuleConfig) -> Option<Score> {
    FanCalculator {
        concealed: hand.concealed(),
        melds: hand.melds(),
        bonus: hand.bonus_tiles(),
        prevailing_wind: ctx.prevailing_wind,
        seat: ctx.seat,
        rules,
    }
    .search_fan()
}

/// Same as [`evaluate_winning`] for a 13-slot hand and a candidate tile,
/// without touching the hand.
#[must_use]
pub fn evaluate_with(hand: &Hand, tile: Tile, ctx: WinContext, rules: &RuleConfig) -> Option<Score> {
    let concealed = hand.concealed_with(tile);
    FanCalculator {
        concealed: &concealed,
        melds: hand.melds(),
        bonus: hand.bonus_tiles(),
        prevailing_wind: ctx.prevailing_wind,
        seat: ctx.seat,
        rules,
    }
    .search_fan()
}
