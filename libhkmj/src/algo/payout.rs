//! Point settlement for a finished hand.
use anyhow::{Result, ensure};

/// What the discarder pays for a discard win at `fan`.
///
/// The value doubles per fan up to 3, then grows in tiers of three fan and
/// stops at 10.
#[must_use]
pub const fn discard_value(fan: u8) -> i32 {
    match fan {
        0 => 4,
        1 => 8,
        2 => 16,
        3 => 32,
        4..=6 => 64,
        7..=9 => 128,
        _ => 256,
    }
}

/// What each of the three others pays on a self-draw.
#[inline]
#[must_use]
pub const fn self_draw_share(fan: u8) -> i32 {
    if fan == 0 { 0 } else { discard_value(fan) / 2 }
}

/// Point deltas for every player.
///
/// `discarder` is `None` for a self-draw. The deltas always sum to zero.
pub fn settle(fan: u8, winner: u8, discarder: Option<u8>) -> Result<[i32; 4]> {
    ensure!(winner < 4, "invalid winner {winner}");
    let mut deltas = [0; 4];
    let winner = winner as usize;
    match discarder {
        Some(d) => {
            ensure!(d < 4, "invalid discarder {d}");
            ensure!(
                d as usize != winner,
                "rule violation: player {winner} cannot win on their own discard",
            );
            let value = discard_value(fan);
            deltas[winner] = value;
            deltas[d as usize] = -value;
        }
        None => {
            let share = self_draw_share(fan);
            for (i, delta) in deltas.iter_mut().enumerate() {
                *delta = if i == winner { 3 * share } else { -share };
            }
        }
    }
    ensure!(deltas.iter().sum::<i32>() == 0, "unbalanced settlement {deltas:?}");
    Ok(deltas)
}
