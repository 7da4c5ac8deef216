use crate::tile::{MELD_KINDS, TILE_KINDS, Tile};
use anyhow::{Result, ensure};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha12Rng;

/// Number of physical tiles in a full set.
pub const WALL_SIZE: usize = 4 * MELD_KINDS + (TILE_KINDS - MELD_KINDS);

/// The draw pile. Tiles are drawn from the back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wall {
    tiles: Vec<Tile>,
}

impl Wall {
    /// Four copies of every meld kind and one of every bonus tile, in order.
    #[must_use]
    pub fn full_set() -> Vec<Tile> {
        let mut ret = Vec::with_capacity(WALL_SIZE);
        for tile in Tile::all() {
            let copies = if tile.is_bonus() { 1 } else { 4 };
            ret.extend(std::iter::repeat_n(tile, copies));
        }
        ret
    }

    #[must_use]
    pub fn new_shuffled(seed: u64) -> Self {
        let mut tiles = Self::full_set();
        tiles.shuffle(&mut ChaCha12Rng::seed_from_u64(seed));
        Self { tiles }
    }

    /// A wall that yields `tiles` in the given order.
    ///
    /// The wall may be partial but cannot hold more copies of a kind than a
    /// full set does.
    pub fn from_tiles(mut tiles: Vec<Tile>) -> Result<Self> {
        let mut counts = [0_u8; TILE_KINDS];
        for &tile in &tiles {
            let c = &mut counts[tile.as_usize()];
            *c += 1;
            let max = if tile.is_bonus() { 1 } else { 4 };
            ensure!(*c <= max, "more than {max} copies of {tile} in the wall");
        }
        tiles.reverse();
        Ok(Self { tiles })
    }

    #[inline]
    pub fn draw(&mut self) -> Option<Tile> {
        self.tiles.pop()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
