//! Partitions a concealed hand into one pair and melds.
//!
//! The search works on a per-kind count view of the hand rather than on the
//! sorted tile list itself. Each pair candidate gets its own copy of the view,
//! so branches never share mutable state.
//!
//! With [`SearchStrategy::Greedy`], only one partition is produced per pair
//! candidate: at the lowest remaining tile a triplet is always preferred over a
//! run, with no backtracking. [`SearchStrategy::Backtracking`] enumerates
//! every partition.
use crate::hand::{Meld, MeldKind};
use crate::tile::{MELD_KINDS, Suit, Tile};
use serde::{Deserialize, Serialize};
use tinyvec::ArrayVec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    #[default]
    Greedy,
    Backtracking,
}

/// One group of a decomposition. Chows carry their lowest tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "tile", rename_all = "snake_case")]
pub enum Group {
    Pair(Tile),
    Pong(Tile),
    Kong(Tile),
    Chow(Tile),
}

/// The concealed groups found by the search followed by the exposed melds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Decomposition {
    pub groups: ArrayVec<[Group; 5]>,
}

type Counts = [u8; MELD_KINDS];

impl Default for Group {
    fn default() -> Self {
        Self::Pair(Tile::default())
    }
}

impl Group {
    #[inline]
    #[must_use]
    pub const fn tile(self) -> Tile {
        match self {
            Self::Pair(t) | Self::Pong(t) | Self::Kong(t) | Self::Chow(t) => t,
        }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Pair(_) => 2,
            Self::Pong(_) | Self::Chow(_) => 3,
            Self::Kong(_) => 4,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_pair(self) -> bool {
        matches!(self, Self::Pair(_))
    }

    /// Pongs and kongs.
    #[inline]
    #[must_use]
    pub const fn is_triplet(self) -> bool {
        matches!(self, Self::Pong(_) | Self::Kong(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_chow(self) -> bool {
        matches!(self, Self::Chow(_))
    }

    #[inline]
    #[must_use]
    pub const fn suit(self) -> Option<Suit> {
        self.tile().suit()
    }
}

impl From<Meld> for Group {
    fn from(meld: Meld) -> Self {
        match meld.kind() {
            MeldKind::Pong => Self::Pong(meld.tile()),
            MeldKind::Kong => Self::Kong(meld.tile()),
            MeldKind::Chow => Self::Chow(meld.tile()),
        }
    }
}

impl Decomposition {
    #[must_use]
    pub fn pair(&self) -> Option<Tile> {
        self.groups.iter().find(|g| g.is_pair()).map(|g| g.tile())
    }
}

/// Returns the per-kind counts of `tiles`, or `None` if a bonus tile is present.
fn counts_of(tiles: &[Tile]) -> Option<Counts> {
    let mut counts = [0; MELD_KINDS];
    for t in tiles {
        *counts.get_mut(t.as_usize())? += 1;
    }
    Some(counts)
}

/// The two kinds completing a run that starts at `idx`, if `idx` is a suited
/// tile of rank 7 or less.
const fn run_followers(idx: usize) -> Option<(usize, usize)> {
    if idx < crate::tuz!(E) && idx % 9 <= 6 { Some((idx + 1, idx + 2)) } else { None }
}

fn lowest(counts: &Counts, from: usize) -> Option<usize> {
    (from..MELD_KINDS).find(|&i| counts[i] > 0)
}

/// Greedily splits the remaining tiles into melds, appending them to
/// `groups`. Returns `false` as soon as the lowest tile fits neither a
/// triplet nor a run.
pub fn fit_remaining(counts: &mut Counts, groups: &mut ArrayVec<[Group; 5]>) -> bool {
    let mut from = 0;
    while let Some(idx) = lowest(counts, from) {
        let tile = Tile::new_const(idx as u8);
        if counts[idx] >= 3 {
            counts[idx] -= 3;
            groups.push(Group::Pong(tile));
        } else if let Some((a, b)) = run_followers(idx)
            && counts[a] > 0
            && counts[b] > 0
        {
            counts[idx] -= 1;
            counts[a] -= 1;
            counts[b] -= 1;
            groups.push(Group::Chow(tile));
        } else {
            return false;
        }
        from = idx;
    }
    true
}

fn fit_all(
    counts: Counts,
    from: usize,
    groups: ArrayVec<[Group; 5]>,
    out: &mut Vec<ArrayVec<[Group; 5]>>,
) {
    let Some(idx) = lowest(&counts, from) else {
        out.push(groups);
        return;
    };
    let tile = Tile::new_const(idx as u8);
    if counts[idx] >= 3 {
        let mut c = counts;
        c[idx] -= 3;
        let mut g = groups;
        g.push(Group::Pong(tile));
        fit_all(c, idx, g, out);
    }
    if let Some((a, b)) = run_followers(idx)
        && counts[a] > 0
        && counts[b] > 0
    {
        let mut c = counts;
        c[idx] -= 1;
        c[a] -= 1;
        c[b] -= 1;
        let mut g = groups;
        g.push(Group::Chow(tile));
        fit_all(c, idx, g, out);
    }
}

/// All partitions of `concealed` into one pair plus melds, pair first.
///
/// `concealed` must hold `3n + 2` tiles with `n <= 4`; any other size, or a
/// bonus tile, yields no partition. Pair candidates are tried in ascending
/// tile order, once per kind.
#[must_use]
pub fn decompose(concealed: &[Tile], strategy: SearchStrategy) -> Vec<ArrayVec<[Group; 5]>> {
    let mut ret = vec![];
    if concealed.len() % 3 != 2 || concealed.len() > 14 {
        return ret;
    }
    let Some(counts) = counts_of(concealed) else {
        return ret;
    };
    for idx in (0..MELD_KINDS).filter(|&i| counts[i] >= 2) {
        let mut remaining = counts;
        remaining[idx] -= 2;
        let mut groups = ArrayVec::new();
        groups.push(Group::Pair(Tile::new_const(idx as u8)));
        match strategy {
            SearchStrategy::Greedy => {
                if fit_remaining(&mut remaining, &mut groups) {
                    ret.push(groups);
                }
            }
            SearchStrategy::Backtracking => fit_all(remaining, 0, groups, &mut ret),
        }
    }
    ret
}

/// Thirteen distinct terminal and honor kinds plus one duplicate among them.
#[must_use]
pub fn is_thirteen_orphans(concealed: &[Tile]) -> bool {
    if concealed.len() != 14 {
        return false;
    }
    let Some(counts) = counts_of(concealed) else {
        return false;
    };
    Tile::ORPHANS.iter().all(|t| counts[t.as_usize()] >= 1)
        && Tile::ORPHANS.iter().any(|t| counts[t.as_usize()] == 2)
}

/// Full decompositions of a hand: each concealed partition followed by the
/// exposed melds.
#[must_use]
pub fn decompositions(
    concealed: &[Tile],
    melds: &[Meld],
    strategy: SearchStrategy,
) -> Vec<Decomposition> {
    if concealed.len() + 3 * melds.len() != 14 {
        return vec![];
    }
    decompose(concealed, strategy)
        .into_iter()
        .map(|mut groups| {
            groups.extend(melds.iter().copied().map(Group::from));
            Decomposition { groups }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::parse_tiles;
    use crate::t;

    fn tiles(s: &str) -> Vec<Tile> {
        let mut ret = parse_tiles(s).unwrap();
        ret.sort_unstable();
        ret
    }

    fn greedy(s: &str) -> Vec<ArrayVec<[Group; 5]>> {
        decompose(&tiles(s), SearchStrategy::Greedy)
    }

    #[test]
    fn simple_hands() {
        let found = greedy("123p 456p 789s EEE 55m");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].as_slice(),
            [
                Group::Pair(t!(5m)),
                Group::Chow(t!(1p)),
                Group::Chow(t!(4p)),
                Group::Chow(t!(7s)),
                Group::Pong(t!(E)),
            ],
        );
        assert!(greedy("123p 456p 789s EEE 5m 6m").is_empty());
        assert!(greedy("13579p 2468s ESWNC").is_empty());
    }

    #[test]
    fn pair_candidates() {
        // 22 leaves 111 234 345 345, 55 leaves four triplets. 11, 33 and 44
        // all strand a tile.
        let found = greedy("111222333444p 55p");
        let pairs: Vec<_> = found.iter().map(|g| g[0]).collect();
        assert_eq!(pairs, [Group::Pair(t!(2p)), Group::Pair(t!(5p))]);

        let found = greedy("111p 111m 222p 333p 44p");
        let pairs: Vec<_> = found.iter().map(|g| g[0]).collect();
        assert_eq!(pairs, [Group::Pair(t!(1p)), Group::Pair(t!(4p))]);
        assert!(found[1][1..].iter().all(|g| g.is_triplet()));
    }

    #[test]
    fn triplet_first() {
        // Greedy reads 111 222 333 as triplets only, backtracking finds runs
        // as well.
        let hand = tiles("111222333789p 55m");
        let greedy = decompose(&hand, SearchStrategy::Greedy);
        assert_eq!(greedy.len(), 1);
        assert_eq!(greedy[0].iter().filter(|g| g.is_triplet()).count(), 3);

        let all = decompose(&hand, SearchStrategy::Backtracking);
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|g| g[1..].iter().all(|g| g.is_chow())));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(decompose(&tiles("11p"), SearchStrategy::Greedy).len() == 1);
        assert!(decompose(&tiles("1p"), SearchStrategy::Greedy).is_empty());
        assert!(decompose(&tiles("11p 1f"), SearchStrategy::Greedy).is_empty());
        assert!(decompose(&tiles("111p 222p 333p 444p 555p 66p"), SearchStrategy::Greedy).is_empty());
        // 89 of a suit and honors never form runs.
        assert!(greedy("789p 89s 1m ESW 111m 22m").is_empty());
        assert!(greedy("EEE SSS WWW NN CFP").is_empty());
    }

    #[test]
    fn no_false_groups() {
        // A single copy never becomes a pair or triplet.
        for found in greedy("123p 456p 789p 123s 11m") {
            for g in found {
                if let Group::Pair(t) | Group::Pong(t) = g {
                    assert_eq!(t, t!(1m));
                }
            }
        }
    }

    #[test]
    fn with_exposed_melds() {
        let melds = [Meld::pong(t!(C)).unwrap(), Meld::kong(t!(9s), false).unwrap()];
        let found = decompositions(&tiles("123p 456p 77m"), &melds, SearchStrategy::Greedy);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pair(), Some(t!(7m)));
        assert_eq!(found[0].groups[3..], [Group::Pong(t!(C)), Group::Kong(t!(9s))]);
        assert!(decompositions(&tiles("123p 456p 77m"), &melds[..1], SearchStrategy::Greedy).is_empty());
    }

    #[test]
    fn thirteen_orphans() {
        assert!(is_thirteen_orphans(&tiles("19p 19s 19m ESWNCFP 9m")));
        assert!(!is_thirteen_orphans(&tiles("19p 19s 19m ESWNCFP")));
        assert!(!is_thirteen_orphans(&tiles("19p 19s 19m ESWNCF 99m")));
        assert!(!is_thirteen_orphans(&tiles("19p 19s 19m ESWNCFP 5m")));
    }
}
