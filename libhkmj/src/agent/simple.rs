use super::{Agent, Decision, PlayerView, discards, most_eager};
use anyhow::{Context, Result};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Picks uniformly among the options, except that a win is always taken.
pub struct RandomBot {
    rng: ChaCha12Rng,
}

/// Takes every claim and kong it is offered and discards at random.
pub struct YesBot {
    rng: ChaCha12Rng,
}

/// Never claims, never declares a win and discards the tile it drew.
pub struct PassiveBot;

impl RandomBot {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomBot {
    fn name(&self) -> String {
        "random".to_owned()
    }

    fn decide(&mut self, _: &PlayerView<'_>, options: &[Decision]) -> Result<Decision> {
        if let Some(win) = most_eager(options).filter(|d| d.eagerness() >= 4) {
            return Ok(win);
        }
        options.choose(&mut self.rng).copied().context("no options")
    }
}

impl YesBot {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for YesBot {
    fn name(&self) -> String {
        "yes".to_owned()
    }

    fn decide(&mut self, _: &PlayerView<'_>, options: &[Decision]) -> Result<Decision> {
        let best = most_eager(options).context("no options")?;
        if best.eagerness() > 0 {
            return Ok(best);
        }
        let tiles: Vec<_> = discards(options).collect();
        if tiles.is_empty() {
            return Ok(best);
        }
        let idx = self.rng.random_range(0..tiles.len());
        Ok(Decision::Discard { tile: tiles[idx] })
    }
}

impl Agent for PassiveBot {
    fn name(&self) -> String {
        "passive".to_owned()
    }

    fn decide(&mut self, view: &PlayerView<'_>, options: &[Decision]) -> Result<Decision> {
        if let Some(&pass) = options.iter().find(|d| d.is_pass()) {
            return Ok(pass);
        }
        if let Some(tile) = view.drawn
            && let Some(&d) = options.iter().find(|d| **d == Decision::Discard { tile })
        {
            return Ok(d);
        }
        options.first().copied().context("no options")
    }
}

#[cfg(test)]
mod test {
    use super::super::test::view;
    use super::*;
    use crate::claim::{ChowKind, ClaimKind};
    use crate::config::RuleConfig;
    use crate::hand::test::hand;
    use crate::t;

    #[test]
    fn passive_discards_the_draw() {
        let rules = RuleConfig::default();
        let h = hand("123p 456p 789p 11s 45s");
        let options = [
            Decision::Discard { tile: t!(1p) },
            Decision::Discard { tile: t!(5s) },
        ];
        let d = PassiveBot.decide(&view(&h, Some(t!(5s)), &rules), &options).unwrap();
        assert_eq!(d, Decision::Discard { tile: t!(5s) });
        let d = PassiveBot
            .decide(&view(&h, None, &rules), &[Decision::SelfDrawWin, Decision::Pass])
            .unwrap();
        assert_eq!(d, Decision::Pass);
    }

    #[test]
    fn yes_and_random_take_wins() {
        let rules = RuleConfig::default();
        let h = hand("123p 456p 789p 11s 45s");
        let options = [
            Decision::Pass,
            Decision::Claim {
                claim: ClaimKind::Chow {
                    chow: ChowKind::Upper,
                    support: (11, 12),
                },
            },
            Decision::Claim { claim: ClaimKind::Win },
        ];
        let mut yes = YesBot::new(3);
        let mut random = RandomBot::new(3);
        for _ in 0..16 {
            assert_eq!(yes.decide(&view(&h, None, &rules), &options).unwrap(), options[2]);
            assert_eq!(random.decide(&view(&h, None, &rules), &options).unwrap(), options[2]);
        }
        assert_eq!(yes.decide(&view(&h, None, &rules), &options[..2]).unwrap(), options[1]);
    }

    #[test]
    fn seeded() {
        let rules = RuleConfig::default();
        let h = hand("123p 456p 789p 11s 45s");
        let options: Vec<_> = h
            .concealed()
            .iter()
            .map(|&tile| Decision::Discard { tile })
            .collect();
        let run = |seed| {
            let mut bot = RandomBot::new(seed);
            (0..10)
                .map(|_| bot.decide(&view(&h, None, &rules), &options).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
