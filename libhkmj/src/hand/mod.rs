pub mod item;
pub mod parse;

pub use item::{Meld, MeldKind};
pub use parse::{parse_meld, parse_tile, parse_tiles};

use crate::tile::{Category, Tile};
use std::fmt;
use std::str::FromStr;
use anyhow::{Context, Error, Result, bail, ensure};
use serde::Serialize;
use tinyvec::ArrayVec;

/// A player's tiles.
///
/// `concealed` is kept sorted after every mutation. Exposed melds and bonus
/// tiles are stored apart and never take part in the concealed search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Hand {
    concealed: Vec<Tile>,
    melds: ArrayVec<[Meld; 4]>,
    bonus: ArrayVec<[Tile; 8]>,
    discards: Vec<Tile>,
}

impl Hand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a hand, sorting `concealed` and checking that no kind appears
    /// more than four times across concealed tiles and melds.
    pub fn from_parts(concealed: Vec<Tile>, melds: &[Meld], bonus: &[Tile]) -> Result<Self> {
        ensure!(melds.len() <= 4, "too many melds: {}", melds.len());
        let mut hand = Self::new();
        for tile in concealed {
            hand.insert(tile)?;
        }
        hand.melds.extend(melds.iter().copied());
        for &tile in bonus {
            hand.add_bonus(tile)?;
        }
        let mut counts = [0_u8; crate::tile::MELD_KINDS];
        let meld_tiles = hand.melds.iter().flat_map(|m| m.tiles());
        for tile in hand.concealed.iter().copied().chain(meld_tiles) {
            let c = &mut counts[tile.as_usize()];
            *c += 1;
            ensure!(*c <= 4, "more than four copies of {tile}");
        }
        Ok(hand)
    }

    #[inline]
    #[must_use]
    pub fn concealed(&self) -> &[Tile] {
        &self.concealed
    }

    #[inline]
    #[must_use]
    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }

    #[inline]
    #[must_use]
    pub fn bonus_tiles(&self) -> &[Tile] {
        &self.bonus
    }

    #[inline]
    #[must_use]
    pub fn discards(&self) -> &[Tile] {
        &self.discards
    }

    /// Concealed tiles plus three per meld. A kong also counts as three here,
    /// so this is 13 between turns and 14 while holding a drawn or claimed
    /// tile.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.concealed.len() + 3 * self.melds.len()
    }

    /// Number of physical tiles, counting the fourth tile of each kong.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.concealed.len() + self.melds.iter().map(|m| m.len()).sum::<usize>()
    }

    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        let lo = self.concealed.partition_point(|&t| t < tile);
        let hi = self.concealed.partition_point(|&t| t <= tile);
        hi - lo
    }

    /// Index of the first concealed copy of `tile`.
    #[must_use]
    pub fn find(&self, tile: Tile) -> Option<usize> {
        let idx = self.concealed.partition_point(|&t| t < tile);
        (self.concealed.get(idx) == Some(&tile)).then_some(idx)
    }

    pub fn insert(&mut self, tile: Tile) -> Result<()> {
        ensure!(
            tile.category() != Category::Bonus,
            "bonus tile {tile} cannot enter the concealed hand",
        );
        let idx = self.concealed.partition_point(|&t| t <= tile);
        self.concealed.insert(idx, tile);
        Ok(())
    }

    pub fn remove(&mut self, tile: Tile) -> Result<()> {
        let idx = self
            .find(tile)
            .with_context(|| format!("tile {tile} is not in the concealed hand"))?;
        self.concealed.remove(idx);
        Ok(())
    }

    pub fn remove_n(&mut self, tile: Tile, n: usize) -> Result<()> {
        let have = self.count(tile);
        ensure!(have >= n, "need {n} copies of {tile}, the hand holds {have}");
        for _ in 0..n {
            self.remove(tile)?;
        }
        Ok(())
    }

    pub fn remove_at(&mut self, idx: usize) -> Result<Tile> {
        ensure!(
            idx < self.concealed.len(),
            "index {idx} out of range for {} concealed tiles",
            self.concealed.len(),
        );
        Ok(self.concealed.remove(idx))
    }

    pub fn add_bonus(&mut self, tile: Tile) -> Result<()> {
        ensure!(tile.is_bonus(), "{tile} is not a bonus tile");
        ensure!(!self.bonus.contains(&tile), "duplicate bonus tile {tile}");
        self.bonus.push(tile);
        Ok(())
    }

    pub fn expose(&mut self, meld: Meld) -> Result<()> {
        ensure!(self.melds.len() < 4, "rule violation: a fifth meld {meld}");
        self.melds.push(meld);
        Ok(())
    }

    /// Upgrades the exposed pong of `tile` into a kong.
    pub fn upgrade_pong(&mut self, tile: Tile) -> Result<()> {
        let meld = self
            .melds
            .iter_mut()
            .find(|m| m.kind() == MeldKind::Pong && m.tile() == tile)
            .with_context(|| format!("no exposed pong of {tile}"))?;
        meld.upgrade()
    }

    #[must_use]
    pub fn has_pong(&self, tile: Tile) -> bool {
        self.melds
            .iter()
            .any(|m| m.kind() == MeldKind::Pong && m.tile() == tile)
    }

    pub fn discard(&mut self, tile: Tile) -> Result<()> {
        self.remove(tile)?;
        self.discards.push(tile);
        Ok(())
    }

    /// Takes back the most recent discard after another player claimed it.
    pub fn retract_discard(&mut self, tile: Tile) -> Result<()> {
        match self.discards.last() {
            Some(&last) if last == tile => {
                self.discards.pop();
                Ok(())
            }
            last => bail!("claimed tile {tile} does not match last discard {last:?}"),
        }
    }

    /// Sorted copy of the concealed tiles with `tile` added.
    #[must_use]
    pub fn concealed_with(&self, tile: Tile) -> Vec<Tile> {
        let mut ret = Vec::with_capacity(self.concealed.len() + 1);
        let idx = self.concealed.partition_point(|&t| t <= tile);
        ret.extend_from_slice(&self.concealed[..idx]);
        ret.push(tile);
        ret.extend_from_slice(&self.concealed[idx..]);
        ret
    }
}

impl FromStr for Hand {
    type Err = Error;

    /// Bonus tiles in the string go to the bonus set, everything else is
    /// concealed.
    fn from_str(s: &str) -> Result<Self> {
        let (bonus, concealed): (Vec<_>, Vec<_>) =
            parse_tiles(s)?.into_iter().partition(|t| t.is_bonus());
        Self::from_parts(concealed, &[], &bonus)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&tiles_to_string(&self.concealed))?;
        for meld in &self.melds {
            write!(f, " {meld}")?;
        }
        if !self.bonus.is_empty() {
            write!(f, " +{}", tiles_to_string(&self.bonus))?;
        }
        Ok(())
    }
}

/// Writes tiles in compact notation, grouping consecutive suited tiles of the
/// same suit, for example `"123p 55m EEE"`.
#[must_use]
pub fn tiles_to_string(tiles: &[Tile]) -> String {
    let mut ret = String::new();
    let mut i = 0;
    while i < tiles.len() {
        if !ret.is_empty() {
            ret.push(' ');
        }
        let tile = tiles[i];
        match tile.suit() {
            Some(suit) => {
                let start = i;
                while i < tiles.len() && tiles[i].suit() == Some(suit) {
                    i += 1;
                }
                for t in &tiles[start..i] {
                    ret.push(char::from(b'0' + t.rank().unwrap_or_default()));
                }
                // The suffix is the last character of any tile in the run.
                let s = tile.to_string();
                ret.push_str(&s[1..]);
            }
            None if tile.is_bonus() => {
                let start = i;
                while i < tiles.len() && tiles[i].is_bonus() {
                    i += 1;
                }
                for t in &tiles[start..i] {
                    ret.push_str(&t.to_string()[..1]);
                }
                ret.push('f');
            }
            None => {
                let start = i;
                while i < tiles.len() && tiles[i].is_honor() {
                    i += 1;
                }
                for t in &tiles[start..i] {
                    ret.push_str(&t.to_string());
                }
            }
        }
    }
    ret
}
