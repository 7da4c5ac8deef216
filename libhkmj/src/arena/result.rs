use crate::algo::fan::{Pattern, Score};
use crate::event::Event;
use crate::tile::{Tile, Wind};
use ahash::AHashMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundOutcome {
    Win {
        winner: u8,
        /// `None` for a self-draw.
        discarder: Option<u8>,
        winning_tile: Tile,
        score: Score,
        deltas: [i32; 4],
    },
    /// The wall ran out.
    Draw,
}

#[derive(Debug, Clone, Serialize)]
pub struct HandRecord {
    pub hand_no: u32,
    pub prevailing_wind: Wind,
    pub dealer: u8,
    pub outcome: RoundOutcome,
    #[serde(skip)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameResult {
    pub seed: u64,
    pub names: [String; 4],
    pub totals: [i32; 4],
    pub hands: Vec<HandRecord>,
    /// `false` if the table stopped at the hand cap before North finished.
    pub finished: bool,
}

/// Aggregates over many tables.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub tables: u32,
    pub hands: u32,
    pub draws: u32,
    pub self_draws: u32,
    pub wins: [u32; 4],
    pub points: [i64; 4],
    pub fan_total: u64,
    pub patterns: AHashMap<Pattern, u32>,
}

impl RoundOutcome {
    #[must_use]
    pub const fn winner(&self) -> Option<u8> {
        match self {
            Self::Win { winner, .. } => Some(*winner),
            Self::Draw => None,
        }
    }

    #[must_use]
    pub const fn deltas(&self) -> [i32; 4] {
        match self {
            Self::Win { deltas, .. } => *deltas,
            Self::Draw => [0; 4],
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        matches!(self, Self::Draw)
    }
}

impl GameResult {
    /// Hands won by each player.
    #[must_use]
    pub fn wins(&self) -> [u32; 4] {
        let mut ret = [0; 4];
        for winner in self.hands.iter().filter_map(|h| h.outcome.winner()) {
            ret[winner as usize] += 1;
        }
        ret
    }

    /// Players ordered by total, best first. Ties keep seat order.
    #[must_use]
    pub fn ranking(&self) -> [u8; 4] {
        let mut ret = [0, 1, 2, 3];
        ret.sort_by_key(|&p| std::cmp::Reverse(self.totals[p as usize]));
        ret
    }
}

impl Summary {
    pub fn add(&mut self, result: &GameResult) {
        self.tables += 1;
        for (acc, &t) in self.points.iter_mut().zip(&result.totals) {
            *acc += i64::from(t);
        }
        for record in &result.hands {
            self.hands += 1;
            match &record.outcome {
                RoundOutcome::Draw => self.draws += 1,
                RoundOutcome::Win {
                    winner,
                    discarder,
                    score,
                    ..
                } => {
                    self.wins[*winner as usize] += 1;
                    if discarder.is_none() {
                        self.self_draws += 1;
                    }
                    self.fan_total += u64::from(score.fan);
                    for &p in &score.patterns {
                        *self.patterns.entry(p).or_default() += 1;
                    }
                }
            }
        }
    }

    #[must_use]
    pub fn win_rates(&self) -> [f64; 4] {
        let hands = f64::from(self.hands.max(1));
        self.wins.map(|w| f64::from(w) / hands)
    }

    #[must_use]
    pub fn avg_points(&self) -> [f64; 4] {
        let tables = f64::from(self.tables.max(1));
        self.points.map(|p| p as f64 / tables)
    }

    #[must_use]
    pub fn avg_fan(&self) -> f64 {
        let wins: u32 = self.wins.iter().sum();
        if wins == 0 { 0. } else { self.fan_total as f64 / f64::from(wins) }
    }

    /// Pattern counts, most frequent first.
    #[must_use]
    pub fn pattern_counts(&self) -> Vec<(Pattern, u32)> {
        let mut ret: Vec<_> = self.patterns.iter().map(|(&p, &n)| (p, n)).collect();
        ret.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name().cmp(b.0.name())));
        ret
    }
}
