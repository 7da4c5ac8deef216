use super::board::Board;
use super::result::{GameResult, HandRecord, RoundOutcome};
use super::wall::Wall;
use crate::agent::Agent;
use crate::config::TableConfig;
use crate::tile::Wind;
use anyhow::{Context, Result, ensure};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// A series of hands between four agents.
///
/// Play starts with East prevailing and player 0 dealing. The deal passes on
/// whenever someone other than the dealer wins; after four passes the
/// prevailing wind advances, and the table ends once North has gone round.
pub struct Table {
    config: TableConfig,
    agents: Vec<Box<dyn Agent>>,
}

impl Table {
    /// Builds the agents named in `config`.
    #[must_use]
    pub fn new(config: TableConfig) -> Self {
        let agents = (0..4)
            .map(|p| config.agents[p as usize].build(config.seed, p))
            .collect();
        Self { config, agents }
    }

    pub fn with_agents(config: TableConfig, agents: Vec<Box<dyn Agent>>) -> Result<Self> {
        ensure!(agents.len() == 4, "expected 4 agents, got {}", agents.len());
        Ok(Self { config, agents })
    }

    pub fn run(mut self) -> Result<GameResult> {
        let mut rng = ChaCha12Rng::seed_from_u64(self.config.seed);
        let mut totals = [0; 4];
        let mut hands = vec![];
        let mut prevailing_wind = Wind::East;
        let mut dealer = 0;
        let mut passes = 0;
        let mut finished = false;

        for hand_no in 0..self.config.max_hands {
            let board = Board {
                hand_no,
                dealer,
                prevailing_wind,
                wall: Wall::new_shuffled(rng.random()),
                rules: self.config.rules,
            };
            let mut state = board.deal()?;
            state
                .run(&mut self.agents)
                .with_context(|| format!("in hand {hand_no} of table {}", self.config.seed))?;
            let (outcome, events) = state.end()?;

            for (total, delta) in totals.iter_mut().zip(outcome.deltas()) {
                *total += delta;
            }
            let rotate = matches!(outcome, RoundOutcome::Win { winner, .. } if winner != dealer);
            hands.push(HandRecord {
                hand_no,
                prevailing_wind,
                dealer,
                outcome,
                events,
            });

            if rotate {
                dealer = (dealer + 1) % 4;
                passes += 1;
                if passes == 4 {
                    passes = 0;
                    match prevailing_wind.next() {
                        Some(next) => prevailing_wind = next,
                        None => {
                            finished = true;
                            break;
                        }
                    }
                }
            }
        }

        log::info!("table {} done after {} hands: {totals:?}", self.config.seed, hands.len());
        Ok(GameResult {
            seed: self.config.seed,
            names: std::array::from_fn(|p| self.agents[p].name()),
            totals,
            hands,
            finished,
        })
    }
}
