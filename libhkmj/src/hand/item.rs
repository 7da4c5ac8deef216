use super::tiles_to_string;
use crate::tile::Tile;
use std::fmt;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    #[default]
    Pong,
    Kong,
    Chow,
}

/// An exposed meld, or a concealed kong declared on a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meld {
    kind: MeldKind,
    /// The lowest tile for chows.
    tile: Tile,
    concealed: bool,
}

impl Meld {
    pub fn pong(tile: Tile) -> Result<Self> {
        ensure!(!tile.is_bonus(), "bonus tile {tile} cannot form a pong");
        Ok(Self {
            kind: MeldKind::Pong,
            tile,
            concealed: false,
        })
    }

    pub fn kong(tile: Tile, concealed: bool) -> Result<Self> {
        ensure!(!tile.is_bonus(), "bonus tile {tile} cannot form a kong");
        Ok(Self {
            kind: MeldKind::Kong,
            tile,
            concealed,
        })
    }

    /// `lowest` is the first tile of the run.
    pub fn chow(lowest: Tile) -> Result<Self> {
        ensure!(
            lowest.rank().is_some_and(|r| r <= 7),
            "{lowest} cannot start a chow",
        );
        Ok(Self {
            kind: MeldKind::Chow,
            tile: lowest,
            concealed: false,
        })
    }

    #[inline]
    #[must_use]
    pub const fn kind(self) -> MeldKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn tile(self) -> Tile {
        self.tile
    }

    #[inline]
    #[must_use]
    pub const fn is_concealed(self) -> bool {
        self.concealed
    }

    #[must_use]
    pub const fn len(self) -> usize {
        match self.kind {
            MeldKind::Kong => 4,
            _ => 3,
        }
    }

    #[must_use]
    pub fn tiles(self) -> ArrayVec<[Tile; 4]> {
        match self.kind {
            MeldKind::Pong => [self.tile; 3].into_iter().collect(),
            MeldKind::Kong => ArrayVec::from([self.tile; 4]),
            MeldKind::Chow => {
                let mut ret = ArrayVec::new();
                let mut t = Some(self.tile);
                for _ in 0..3 {
                    if let Some(tile) = t {
                        ret.push(tile);
                        t = tile.next_in_suit();
                    }
                }
                ret
            }
        }
    }

    /// Turns an exposed pong into an exposed kong.
    pub fn upgrade(&mut self) -> Result<()> {
        ensure!(
            self.kind == MeldKind::Pong,
            "rule violation: only a pong can be upgraded, got {self}",
        );
        self.kind = MeldKind::Kong;
        Ok(())
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiles = tiles_to_string(&self.tiles());
        match (self.kind, self.concealed) {
            (MeldKind::Kong, true) => write!(f, "{{{tiles}}}"),
            (MeldKind::Kong, false) => write!(f, "[{tiles}]"),
            _ => write!(f, "({tiles})"),
        }
    }
}
