//! Claims against a discarded tile and their priority.
use crate::algo::fan::{self, WinContext};
use crate::config::RuleConfig;
use crate::hand::Hand;
use crate::tile::Tile;
use std::cmp::Reverse;
use std::fmt;
use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;

/// Where the claimed tile sits in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChowKind {
    /// The claimed tile is the highest, e.g. 12 + 3.
    Lower,
    /// e.g. 13 + 2
    Middle,
    /// The claimed tile is the lowest, e.g. 23 + 1.
    Upper,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "claim", rename_all = "snake_case")]
pub enum ClaimKind {
    Win,
    Kong,
    #[default]
    Pong,
    /// `support` holds the positions of the two concealed tiles that complete
    /// the run, taken before the claimed tile enters the hand.
    Chow {
        chow: ChowKind,
        support: (usize, usize),
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub player: u8,
    pub kind: ClaimKind,
}

impl ChowKind {
    pub const ALL: [Self; 3] = [Self::Lower, Self::Middle, Self::Upper];

    /// The two tiles a hand must hold to claim `tile` this way.
    #[must_use]
    pub const fn support_tiles(self, tile: Tile) -> Option<(Tile, Tile)> {
        match self {
            Self::Lower => match tile.prev_in_suit() {
                Some(b) => match b.prev_in_suit() {
                    Some(a) => Some((a, b)),
                    None => None,
                },
                None => None,
            },
            Self::Middle => match (tile.prev_in_suit(), tile.next_in_suit()) {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            },
            Self::Upper => match tile.next_in_suit() {
                Some(a) => match a.next_in_suit() {
                    Some(b) => Some((a, b)),
                    None => None,
                },
                None => None,
            },
        }
    }

    /// Lowest tile of the run formed by claiming `tile`.
    #[must_use]
    pub fn run_start(self, tile: Tile) -> Option<Tile> {
        self.support_tiles(tile)
            .map(|(a, _)| if self == Self::Upper { tile } else { a })
    }
}

impl ClaimKind {
    /// Win 4, kong 3, pong 2, chow 1. Passing is the absence of a claim.
    #[inline]
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Win => 4,
            Self::Kong => 3,
            Self::Pong => 2,
            Self::Chow { .. } => 1,
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => f.write_str("win"),
            Self::Kong => f.write_str("kong"),
            Self::Pong => f.write_str("pong"),
            Self::Chow { chow, .. } => write!(f, "chow ({chow:?})"),
        }
    }
}

/// Seats from `from` to `to` in turn order. The player right after `from` is
/// at distance 1.
#[inline]
#[must_use]
pub const fn forward_distance(from: u8, to: u8) -> u8 {
    (to + 4 - from % 4) % 4
}

/// Every claim `hand` can make on `tile`.
///
/// Only the player right after the discarder may chow, and kongs need a
/// replacement tile on the wall. The caller passes both conditions in.
#[must_use]
pub fn legal_claims(
    hand: &Hand,
    tile: Tile,
    ctx: WinContext,
    rules: &RuleConfig,
    can_chow: bool,
    can_kong: bool,
) -> ArrayVec<[ClaimKind; 6]> {
    let mut ret = ArrayVec::new();
    if tile.is_bonus() {
        return ret;
    }

    if fan::evaluate_with(hand, tile, ctx, rules).is_some_and(|s| s.is_accepted(rules.min_fan)) {
        ret.push(ClaimKind::Win);
    }
    let count = hand.count(tile);
    if can_kong && count >= 3 {
        ret.push(ClaimKind::Kong);
    }
    if count >= 2 {
        ret.push(ClaimKind::Pong);
    }
    if can_chow {
        for chow in ChowKind::ALL {
            if let Some((a, b)) = chow.support_tiles(tile)
                && let (Some(i), Some(j)) = (hand.find(a), hand.find(b))
            {
                ret.push(ClaimKind::Chow {
                    chow,
                    support: (i, j),
                });
            }
        }
    }
    ret
}

/// Picks the claim that gets executed.
///
/// The highest priority wins. Among equal priorities the player closest to
/// the discarder in turn order wins.
#[must_use]
pub fn resolve_priority(claims: &[Claim], discarder: u8) -> Option<Claim> {
    claims
        .iter()
        .copied()
        .min_by_key(|c| (Reverse(c.kind.priority()), forward_distance(discarder, c.player)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::test::hand;
    use crate::t;
    use crate::tile::Wind;

    const CTX: WinContext = WinContext {
        prevailing_wind: Wind::East,
        seat: 1,
    };

    fn chow(player: u8) -> Claim {
        Claim {
            player,
            kind: ClaimKind::Chow {
                chow: ChowKind::Middle,
                support: (0, 1),
            },
        }
    }

    #[test]
    fn pong_beats_chow() {
        let pong = Claim {
            player: 2,
            kind: ClaimKind::Pong,
        };
        assert_eq!(resolve_priority(&[chow(1), pong], 0), Some(pong));
        assert_eq!(resolve_priority(&[pong, chow(1)], 0), Some(pong));
        assert_eq!(resolve_priority(&[chow(1)], 0), Some(chow(1)));
        assert_eq!(resolve_priority(&[], 0), None);
    }

    #[test]
    fn nearest_win() {
        let win = |player| Claim {
            player,
            kind: ClaimKind::Win,
        };
        assert_eq!(resolve_priority(&[win(0), win(3)], 1), Some(win(3)));
        assert_eq!(resolve_priority(&[win(3), win(0)], 1), Some(win(3)));
        assert_eq!(resolve_priority(&[win(2), win(0)], 3), Some(win(0)));
        let kong = Claim {
            player: 0,
            kind: ClaimKind::Kong,
        };
        assert_eq!(resolve_priority(&[kong, win(2)], 1), Some(win(2)));
    }

    #[test]
    fn distance() {
        assert_eq!(forward_distance(0, 1), 1);
        assert_eq!(forward_distance(1, 0), 3);
        assert_eq!(forward_distance(3, 0), 1);
        assert_eq!(forward_distance(2, 2), 0);
    }

    #[test]
    fn chow_support() {
        assert_eq!(ChowKind::Lower.support_tiles(t!(3s)), Some((t!(1s), t!(2s))));
        assert_eq!(ChowKind::Middle.support_tiles(t!(3s)), Some((t!(2s), t!(4s))));
        assert_eq!(ChowKind::Upper.support_tiles(t!(3s)), Some((t!(4s), t!(5s))));
        assert_eq!(ChowKind::Lower.support_tiles(t!(2m)), None);
        assert_eq!(ChowKind::Upper.support_tiles(t!(8p)), None);
        assert_eq!(ChowKind::Middle.support_tiles(t!(E)), None);
        assert_eq!(ChowKind::Middle.run_start(t!(5p)), Some(t!(4p)));
        assert_eq!(ChowKind::Upper.run_start(t!(5p)), Some(t!(5p)));
    }

    #[test]
    fn claims_on_a_hand() {
        let h = hand("123p 456p 789p 11s 45s");
        let rules = RuleConfig::default();

        let claims = legal_claims(&h, t!(3s), CTX, &rules, true, true);
        assert_eq!(
            claims.as_slice(),
            [ClaimKind::Chow {
                chow: ChowKind::Upper,
                support: (11, 12),
            }],
        );
        assert!(legal_claims(&h, t!(3s), CTX, &rules, false, true).is_empty());

        // Complete but only 2 fan.
        let loose = RuleConfig {
            min_fan: 1,
            ..Default::default()
        };
        let claims = legal_claims(&h, t!(3s), CTX, &loose, false, true);
        assert_eq!(claims.as_slice(), [ClaimKind::Win]);

        let claims = legal_claims(&h, t!(1s), CTX, &rules, true, true);
        assert_eq!(claims.as_slice(), [ClaimKind::Pong]);
        assert!(legal_claims(&h, t!(E), CTX, &rules, true, true).is_empty());
    }

    #[test]
    fn kong_needs_a_replacement() {
        let h = hand("111p 456p 789p 11s 45s");
        let rules = RuleConfig::default();
        let claims = legal_claims(&h, t!(1p), CTX, &rules, false, true);
        assert_eq!(claims.as_slice(), [ClaimKind::Kong, ClaimKind::Pong]);
        let claims = legal_claims(&h, t!(1p), CTX, &rules, false, false);
        assert_eq!(claims.as_slice(), [ClaimKind::Pong]);
    }
}
