//! The in-memory record of a hand.
//!
//! Every mutation of the board appends one event. Events carry full
//! information, hidden tiles included, and serialize one object per line,
//! tagged by `type`.
use crate::algo::fan::Pattern;
use crate::tile::{Tile, Wind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KongKind {
    /// Claimed from a discard.
    Exposed,
    /// Four concealed copies.
    Concealed,
    /// An exposed pong completed with a drawn tile.
    Upgrade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StartHand {
        hand_no: u32,
        prevailing_wind: Wind,
        dealer: u8,
        /// Concealed tiles of each player after the deal, by player.
        tiles: [Vec<Tile>; 4],
        /// Bonus tiles set aside during the deal.
        bonus: [Vec<Tile>; 4],
    },
    Draw {
        actor: u8,
        tile: Tile,
    },
    /// A bonus tile set aside. A replacement draw follows.
    Bonus {
        actor: u8,
        tile: Tile,
    },
    Discard {
        actor: u8,
        tile: Tile,
    },
    Pong {
        actor: u8,
        target: u8,
        tile: Tile,
    },
    Kong {
        actor: u8,
        /// The discarder for an exposed kong.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<u8>,
        tile: Tile,
        kind: KongKind,
    },
    Chow {
        actor: u8,
        target: u8,
        tile: Tile,
        /// Lowest tile of the run.
        run: Tile,
    },
    Win {
        actor: u8,
        /// `None` for a self-draw.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<u8>,
        tile: Tile,
        fan: u8,
        patterns: Vec<Pattern>,
        deltas: [i32; 4],
    },
    ExhaustiveDraw,
}

impl Event {
    /// The player who performed the action, if any.
    #[must_use]
    pub const fn actor(&self) -> Option<u8> {
        match *self {
            Self::Draw { actor, .. }
            | Self::Bonus { actor, .. }
            | Self::Discard { actor, .. }
            | Self::Pong { actor, .. }
            | Self::Kong { actor, .. }
            | Self::Chow { actor, .. }
            | Self::Win { actor, .. } => Some(actor),
            Self::StartHand { .. } | Self::ExhaustiveDraw => None,
        }
    }

    /// Whether this event ends a hand.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Win { .. } | Self::ExhaustiveDraw)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::t;
    use serde_json::json;

    #[test]
    fn tagged_json() {
        let ev = Event::Kong {
            actor: 2,
            target: None,
            tile: t!(C),
            kind: KongKind::Concealed,
        };
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({"type": "kong", "actor": 2, "tile": "C", "kind": "concealed"}),
        );
        let parsed: Event =
            serde_json::from_str(r#"{"type":"discard","actor":1,"tile":"7m"}"#).unwrap();
        assert_eq!(parsed, Event::Discard { actor: 1, tile: t!(7m) });
        assert_eq!(parsed.actor(), Some(1));
        assert_eq!(
            serde_json::to_string(&Event::ExhaustiveDraw).unwrap(),
            r#"{"type":"exhaustive_draw"}"#,
        );
        assert!(Event::ExhaustiveDraw.is_terminal());
    }
}
