use super::item::Meld;
use crate::tile::Tile;
use anyhow::{Context, Result, bail, ensure};

/// Reads a compact tile string such as `"123p 55m EEE 1f"`.
///
/// Digits are buffered until a suffix (`p`, `s`, `m`, `z` or `f`) applies to
/// them. Honors may also be written as single letters. Order is preserved.
pub fn parse_tiles(s: &str) -> Result<Vec<Tile>> {
    ensure!(s.is_ascii(), "hand {s} contains non-ascii content");

    let mut tiles = vec![];
    let mut stack = vec![];

    for &b in s.as_bytes() {
        match b {
            b'0'..=b'9' => stack.push(b),
            b'p' | b's' | b'm' | b'z' | b'f' => {
                ensure!(!stack.is_empty(), "suffix {} without digits in {s:?}", b as char);
                for n in stack.drain(..) {
                    let tile = [n, b];
                    let tile = std::str::from_utf8(&tile)?.parse()?;
                    tiles.push(tile);
                }
            }
            b'E' | b'S' | b'W' | b'N' | b'C' | b'F' | b'P' => {
                ensure!(stack.is_empty(), "dangling digits before {} in {s:?}", b as char);
                tiles.push((b as char).to_string().parse()?);
            }
            _ if b.is_ascii_whitespace() => (),
            _ => bail!("unexpected byte {b} in {s:?}"),
        };
    }
    ensure!(stack.is_empty(), "dangling digits at the end of {s:?}");

    Ok(tiles)
}

pub fn parse_tile(s: &str) -> Result<Tile> {
    let tiles = parse_tiles(s)?;
    ensure!(tiles.len() == 1, "expected exactly one tile in {s:?}");
    tiles.into_iter().next().context("missing tile")
}

/// `"EEE"` is a pong, `"5555p"` a kong and `"345s"` a chow.
pub fn parse_meld(s: &str) -> Result<Meld> {
    let mut tiles = parse_tiles(s)?;
    tiles.sort_unstable();
    match *tiles.as_slice() {
        [a, b, c] if a == b && b == c => Meld::pong(a),
        [a, b, c] if a.next_in_suit() == Some(b) && b.next_in_suit() == Some(c) => {
            Meld::chow(a)
        }
        [a, b, c, d] if a == b && b == c && c == d => Meld::kong(a, false),
        _ => bail!("{s:?} is not a meld"),
    }
}
