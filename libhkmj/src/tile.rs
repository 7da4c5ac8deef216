use std::fmt;
use std::str::FromStr;
use anyhow::{Context, Error, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Number of distinct tile kinds, bonus tiles included.
pub const TILE_KINDS: usize = 42;
/// Number of kinds that can take part in melds.
pub const MELD_KINDS: usize = 34;

const SUIT_CHARS: [char; 3] = ['p', 's', 'm'];
const HONOR_CHARS: [char; 7] = ['E', 'S', 'W', 'N', 'C', 'F', 'P'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Suited,
    Honor,
    Bonus,
}

/// Suits in sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Circle,
    Bamboo,
    Character,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wind {
    East,
    South,
    West,
    North,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dragon {
    Red,
    Green,
    White,
}

/// A tile kind. Physical copies of the same kind compare equal.
///
/// Ids are laid out so that the derived ordering follows circle, bamboo,
/// character, wind, dragon, flower, season, then rank:
///
/// | id      | tiles          |
/// |---------|----------------|
/// | 0..=8   | `1p`..`9p`     |
/// | 9..=17  | `1s`..`9s`     |
/// | 18..=26 | `1m`..`9m`     |
/// | 27..=30 | `E S W N`      |
/// | 31..=33 | `C F P`        |
/// | 34..=37 | flowers `1f`..`4f` |
/// | 38..=41 | seasons `5f`..`8f` |
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct Tile(u8);

#[macro_export]
macro_rules! tu8 {
    (1p) => {
        0_u8
    };
    (2p) => {
        1_u8
    };
    (3p) => {
        2_u8
    };
    (4p) => {
        3_u8
    };
    (5p) => {
        4_u8
    };
    (6p) => {
        5_u8
    };
    (7p) => {
        6_u8
    };
    (8p) => {
        7_u8
    };
    (9p) => {
        8_u8
    };
    (1s) => {
        9_u8
    };
    (2s) => {
        10_u8
    };
    (3s) => {
        11_u8
    };
    (4s) => {
        12_u8
    };
    (5s) => {
        13_u8
    };
    (6s) => {
        14_u8
    };
    (7s) => {
        15_u8
    };
    (8s) => {
        16_u8
    };
    (9s) => {
        17_u8
    };
    (1m) => {
        18_u8
    };
    (2m) => {
        19_u8
    };
    (3m) => {
        20_u8
    };
    (4m) => {
        21_u8
    };
    (5m) => {
        22_u8
    };
    (6m) => {
        23_u8
    };
    (7m) => {
        24_u8
    };
    (8m) => {
        25_u8
    };
    (9m) => {
        26_u8
    };
    (E) => {
        27_u8
    };
    (S) => {
        28_u8
    };
    (W) => {
        29_u8
    };
    (N) => {
        30_u8
    };
    (C) => {
        31_u8
    };
    (F) => {
        32_u8
    };
    (P) => {
        33_u8
    };
    (1f) => {
        34_u8
    };
    (2f) => {
        35_u8
    };
    (3f) => {
        36_u8
    };
    (4f) => {
        37_u8
    };
    (5f) => {
        38_u8
    };
    (6f) => {
        39_u8
    };
    (7f) => {
        40_u8
    };
    (8f) => {
        41_u8
    };
    (1z) => {
        27_u8
    };
    (2z) => {
        28_u8
    };
    (3z) => {
        29_u8
    };
    (4z) => {
        30_u8
    };
    (5z) => {
        31_u8
    };
    (6z) => {
        32_u8
    };
    (7z) => {
        33_u8
    };
    ($first:tt, $($rest:tt),+ $(,)?) => {
        [$crate::tu8!($first), $($crate::tu8!($rest)),+]
    };
}

#[macro_export]
macro_rules! tuz {
    ($s:tt) => {
        $crate::tu8!($s) as usize
    };
    ($first:tt, $($rest:tt),+ $(,)?) => {
        [$crate::tuz!($first), $($crate::tuz!($rest)),+]
    };
}

#[macro_export]
macro_rules! t {
    ($s:tt) => {
        $crate::tile::Tile::new_const($crate::tu8!($s))
    };
    ($first:tt, $($rest:tt),+ $(,)?) => {
        [$crate::t!($first), $($crate::t!($rest)),+]
    };
}

#[macro_export]
macro_rules! matches_tu8 {
    ($o:expr, $($s:tt)|* $(|)?) => {
        matches!($o, $($crate::tu8!($s))|*)
    };
}

impl Tile {
    /// The 13 kinds of the thirteen orphans hand.
    pub const ORPHANS: [Self; 13] = crate::t![1p, 9p, 1s, 9s, 1m, 9m, E, S, W, N, C, F, P];

    /// Used by the tile macros. Panics on an out-of-range id, which the macros
    /// never produce.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_const(id: u8) -> Self {
        assert!((id as usize) < TILE_KINDS, "tile id out of range");
        Self(id)
    }

    pub fn suited(suit: Suit, rank: u8) -> Result<Self> {
        ensure!((1..=9).contains(&rank), "invalid rank {rank} for suit {suit:?}");
        Ok(Self(suit as u8 * 9 + rank - 1))
    }

    #[must_use]
    pub const fn from_wind(wind: Wind) -> Self {
        Self(27 + wind as u8)
    }

    /// `n` in `1..=4`: plum, orchid, chrysanthemum, bamboo.
    pub fn flower(n: u8) -> Result<Self> {
        ensure!((1..=4).contains(&n), "invalid flower number {n}");
        Ok(Self(33 + n))
    }

    /// `n` in `1..=4`: spring, summer, autumn, winter.
    pub fn season(n: u8) -> Result<Self> {
        ensure!((1..=4).contains(&n), "invalid season number {n}");
        Ok(Self(37 + n))
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn category(self) -> Category {
        match self.0 {
            0..=26 => Category::Suited,
            27..=33 => Category::Honor,
            _ => Category::Bonus,
        }
    }

    #[must_use]
    pub const fn suit(self) -> Option<Suit> {
        match self.0 {
            0..=8 => Some(Suit::Circle),
            9..=17 => Some(Suit::Bamboo),
            18..=26 => Some(Suit::Character),
            _ => None,
        }
    }

    /// Rank in `1..=9` for suited tiles.
    #[must_use]
    pub const fn rank(self) -> Option<u8> {
        if self.is_suited() { Some(self.0 % 9 + 1) } else { None }
    }

    #[must_use]
    pub const fn wind(self) -> Option<Wind> {
        match self.0 {
            27 => Some(Wind::East),
            28 => Some(Wind::South),
            29 => Some(Wind::West),
            30 => Some(Wind::North),
            _ => None,
        }
    }

    #[must_use]
    pub const fn dragon(self) -> Option<Dragon> {
        match self.0 {
            31 => Some(Dragon::Red),
            32 => Some(Dragon::Green),
            33 => Some(Dragon::White),
            _ => None,
        }
    }

    /// Flower or season number in `1..=4` for bonus tiles.
    #[must_use]
    pub const fn bonus_number(self) -> Option<u8> {
        match self.0 {
            34..=37 => Some(self.0 - 33),
            38..=41 => Some(self.0 - 37),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_suited(self) -> bool {
        self.0 < 27
    }

    #[inline]
    #[must_use]
    pub const fn is_honor(self) -> bool {
        matches!(self.0, 27..=33)
    }

    #[inline]
    #[must_use]
    pub const fn is_wind(self) -> bool {
        matches!(self.0, 27..=30)
    }

    #[inline]
    #[must_use]
    pub const fn is_dragon(self) -> bool {
        matches!(self.0, 31..=33)
    }

    #[inline]
    #[must_use]
    pub const fn is_bonus(self) -> bool {
        self.0 >= 34
    }

    #[inline]
    #[must_use]
    pub const fn is_flower(self) -> bool {
        matches!(self.0, 34..=37)
    }

    #[inline]
    #[must_use]
    pub const fn is_season(self) -> bool {
        matches!(self.0, 38..=41)
    }

    /// Terminals and honors.
    #[must_use]
    pub const fn is_orphan(self) -> bool {
        self.is_honor() || self.is_suited() && matches!(self.0 % 9, 0 | 8)
    }

    /// The next rank of the same suit, if any.
    #[must_use]
    pub const fn next_in_suit(self) -> Option<Self> {
        if self.is_suited() && self.0 % 9 < 8 { Some(Self(self.0 + 1)) } else { None }
    }

    #[must_use]
    pub const fn prev_in_suit(self) -> Option<Self> {
        if self.is_suited() && self.0 % 9 > 0 { Some(Self(self.0 - 1)) } else { None }
    }

    /// All 42 kinds in sort order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..TILE_KINDS as u8).map(Self)
    }
}

impl Wind {
    pub const ALL: [Self; 4] = [Self::East, Self::South, Self::West, Self::North];

    /// Seat 0 is the dealer and sits East.
    #[must_use]
    pub const fn from_seat(seat: u8) -> Self {
        Self::ALL[(seat % 4) as usize]
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::East => Some(Self::South),
            Self::South => Some(Self::West),
            Self::West => Some(Self::North),
            Self::North => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn tile(self) -> Tile {
        Tile::from_wind(self)
    }
}

impl TryFrom<u8> for Tile {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self> {
        ensure!((v as usize) < TILE_KINDS, "invalid tile id {v}");
        Ok(Self(v))
    }
}

impl TryFrom<usize> for Tile {
    type Error = Error;

    fn try_from(v: usize) -> Result<Self> {
        let id = u8::try_from(v).with_context(|| format!("invalid tile id {v}"))?;
        Self::try_from(id)
    }
}

impl FromStr for Tile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        match *bytes {
            [b] => {
                let idx = HONOR_CHARS
                    .iter()
                    .position(|&c| c as u8 == b)
                    .with_context(|| format!("invalid tile {s:?}"))?;
                Ok(Self(27 + idx as u8))
            }
            [n @ b'1'..=b'9', kind] => {
                let n = n - b'0';
                match kind {
                    b'p' => Self::suited(Suit::Circle, n),
                    b's' => Self::suited(Suit::Bamboo, n),
                    b'm' => Self::suited(Suit::Character, n),
                    b'z' if n <= 7 => Ok(Self(26 + n)),
                    b'f' if n <= 8 => Ok(Self(33 + n)),
                    _ => bail!("invalid tile {s:?}"),
                }
            }
            _ => bail!("invalid tile {s:?}"),
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0..=26 => write!(f, "{}{}", self.0 % 9 + 1, SUIT_CHARS[self.0 as usize / 9]),
            27..=33 => write!(f, "{}", HONOR_CHARS[self.0 as usize - 27]),
            _ => write!(f, "{}f", self.0 - 33),
        }
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Wind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "e" | "east" => Self::East,
            "s" | "south" => Self::South,
            "w" | "west" => Self::West,
            "n" | "north" => Self::North,
            _ => bail!("invalid wind {s:?}"),
        })
    }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tile(), f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn notation() {
        for tile in Tile::all() {
            let s = tile.to_string();
            assert_eq!(s.parse::<Tile>().unwrap(), tile, "{s}");
        }
        assert_eq!("1z".parse::<Tile>().unwrap(), t!(E));
        assert_eq!("7z".parse::<Tile>().unwrap(), t!(P));
        assert_eq!("5f".parse::<Tile>().unwrap(), Tile::season(1).unwrap());
        assert!("0p".parse::<Tile>().is_err());
        assert!("8z".parse::<Tile>().is_err());
        assert!("9f".parse::<Tile>().is_err());
        assert!("X".parse::<Tile>().is_err());
        assert!("".parse::<Tile>().is_err());
    }

    #[test]
    fn construction_fails_fast() {
        assert!(Tile::suited(Suit::Bamboo, 0).is_err());
        assert!(Tile::suited(Suit::Bamboo, 10).is_err());
        assert!(Tile::flower(5).is_err());
        assert!(Tile::season(0).is_err());
        assert!(Tile::try_from(42_u8).is_err());
        assert!(Tile::try_from(1000_usize).is_err());
        assert_eq!(Tile::suited(Suit::Character, 9).unwrap(), t!(9m));
    }

    #[test]
    fn ordering() {
        let mut tiles = t![P, 5f, E, 1m, 9s, 1p, C, 1f];
        tiles.sort_unstable();
        assert_eq!(tiles, t![1p, 9s, 1m, E, C, P, 1f, 5f]);
    }

    #[test]
    fn classification() {
        assert_eq!(t!(3s).suit(), Some(Suit::Bamboo));
        assert_eq!(t!(3s).rank(), Some(3));
        assert_eq!(t!(W).wind(), Some(Wind::West));
        assert_eq!(t!(F).dragon(), Some(Dragon::Green));
        assert_eq!(t!(F).category(), Category::Honor);
        assert_eq!(t!(8f).category(), Category::Bonus);
        assert!(t!(8f).is_season());
        assert!(t!(4f).is_flower());
        assert_eq!(t!(8f).bonus_number(), Some(4));
        assert!(t!(9m).is_orphan());
        assert!(!t!(8m).is_orphan());
        assert_eq!(t!(9p).next_in_suit(), None);
        assert_eq!(t!(8p).next_in_suit(), Some(t!(9p)));
        assert_eq!(t!(1s).prev_in_suit(), None);
        assert!(matches_tu8!(t!(C).as_u8(), C | F | P));
    }

    #[test]
    fn serde_as_notation() {
        let json = serde_json::to_string(&t![5m, N]).unwrap();
        assert_eq!(json, r#"["5m","N"]"#);
        let back: Vec<Tile> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t![5m, N]);
    }
}
