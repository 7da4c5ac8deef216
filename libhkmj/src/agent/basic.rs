use super::{Agent, Decision, PlayerView, discards, most_eager};
use crate::tile::{MELD_KINDS, Tile};
use crate::tuz;
use anyhow::{Context, Result};

/// Claims whatever ranks highest and discards the tile that leaves the
/// fewest tiles required.
#[derive(Debug, Default)]
pub struct BasicBot;

impl BasicBot {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// A rough distance to a complete hand: `8 - 2 * complete - partial - pair`.
///
/// `melds` exposed melds count as complete sets. Sets are read greedily from
/// the lowest tile, triplets before runs, then pairs and two-tile shapes. A
/// complete hand gives -1, a hand one tile away gives 0.
#[must_use]
pub fn tiles_required(concealed: &[Tile], melds: usize) -> i8 {
    let mut counts = [0_u8; MELD_KINDS];
    for t in concealed.iter().filter(|t| !t.is_bonus()) {
        counts[t.as_usize()] += 1;
    }
    let suited_rank = |i: usize| (i < tuz!(E)).then_some(i % 9);

    let mut complete = melds.min(4) as i8;
    let mut partial = 0_i8;
    let mut pair = false;
    for i in 0..MELD_KINDS {
        while counts[i] >= 3 {
            counts[i] -= 3;
            complete += 1;
        }
        if let Some(rank) = suited_rank(i) {
            while rank <= 6 && counts[i] > 0 && counts[i + 1] > 0 && counts[i + 2] > 0 {
                counts[i] -= 1;
                counts[i + 1] -= 1;
                counts[i + 2] -= 1;
                complete += 1;
            }
        }
        if counts[i] >= 2 {
            counts[i] -= 2;
            if pair {
                partial += 1;
            } else {
                pair = true;
            }
        }
        if let Some(rank) = suited_rank(i) {
            while rank <= 7 && counts[i] > 0 && counts[i + 1] > 0 {
                counts[i] -= 1;
                counts[i + 1] -= 1;
                partial += 1;
            }
            while rank <= 6 && counts[i] > 0 && counts[i + 2] > 0 {
                counts[i] -= 1;
                counts[i + 2] -= 1;
                partial += 1;
            }
        }
    }

    let complete = complete.min(4);
    let partial = partial.min(4 - complete);
    8 - 2 * complete - partial - i8::from(pair)
}

impl Agent for BasicBot {
    fn name(&self) -> String {
        "basic".to_owned()
    }

    fn decide(&mut self, view: &PlayerView<'_>, options: &[Decision]) -> Result<Decision> {
        let best = most_eager(options).context("no options")?;
        if best.eagerness() > 0 {
            return Ok(best);
        }

        let concealed = view.hand.concealed();
        let melds = view.hand.melds().len();
        let mut choice = None;
        for tile in discards(options) {
            let Some(idx) = concealed.iter().position(|&t| t == tile) else {
                continue;
            };
            let mut rest = concealed.to_vec();
            rest.remove(idx);
            let required = tiles_required(&rest, melds);
            if choice.is_none_or(|(_, r)| required < r) {
                choice = Some((tile, required));
            }
        }
        Ok(choice.map_or(best, |(tile, _)| Decision::Discard { tile }))
    }
}

#[cfg(test)]
mod test {
    use super::super::test::view;
    use super::*;
    use crate::claim::ClaimKind;
    use crate::config::RuleConfig;
    use crate::hand::test::hand;
    use crate::t;

    fn required(s: &str) -> i8 {
        tiles_required(hand(s).concealed(), 0)
    }

    #[test]
    fn distance() {
        assert_eq!(required("123p 456p 789p 11s 45s"), 0);
        assert_eq!(required("123p 456p 789p 11s 345s"), -1);
        assert_eq!(required("13p 46p 79p 159s 159m ESW"), 8 - 3);
        assert_eq!(required("ESWN CFP 19p 19s 19m"), 8);
        // Exposed melds count as sets.
        assert_eq!(tiles_required(&t![1s, 1s, 4s, 5s], 3), 0);
    }

    #[test]
    fn drops_the_isolated_tile() {
        let rules = RuleConfig::default();
        let h = hand("123p 456p 789p 11s 45s E");
        let options: Vec<_> = h
            .concealed()
            .iter()
            .map(|&tile| Decision::Discard { tile })
            .collect();
        let d = BasicBot.decide(&view(&h, Some(t!(E)), &rules), &options).unwrap();
        assert_eq!(d, Decision::Discard { tile: t!(E) });
    }

    #[test]
    fn always_claims() {
        let rules = RuleConfig::default();
        let h = hand("123p 456p 789p 11s 45s");
        let options = [
            Decision::Claim {
                claim: ClaimKind::Pong,
            },
            Decision::Pass,
        ];
        let d = BasicBot.decide(&view(&h, None, &rules), &options).unwrap();
        assert_eq!(d, options[0]);
        let d = BasicBot.decide(&view(&h, None, &rules), &[Decision::Pass]).unwrap();
        assert_eq!(d, Decision::Pass);
    }
}
