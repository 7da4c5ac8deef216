//! Hong Kong mahjong: hand decomposition, fan scoring and a turn and claim
//! arbiter for four players.
//!
//! Tiles are written in a compact notation throughout: `1p`..`9p`,
//! `1s`..`9s` and `1m`..`9m` for the circle, bamboo and character suits,
//! `E S W N` for the winds, `C F P` for the red, green and white dragons, and
//! `1f`..`8f` for the four flowers followed by the four seasons.
//!
//! ```
//! use hkmj::algo::fan::{WinContext, evaluate_winning};
//! use hkmj::config::RuleConfig;
//! use hkmj::hand::Hand;
//! use hkmj::tile::Wind;
//!
//! let hand: Hand = "111p 111m 222p 333p 44p 2f".parse()?;
//! let ctx = WinContext {
//!     prevailing_wind: Wind::East,
//!     seat: 0,
//! };
//! let score = evaluate_winning(&hand, ctx, &RuleConfig::default()).unwrap();
//! assert_eq!(score.fan, 3);
//! assert!(score.is_accepted(3));
//! # anyhow::Ok(())
//! ```
#![deny(rust_2018_idioms, let_underscore_drop, clippy::unwrap_used)]
#![warn(clippy::must_use_candidate, clippy::redundant_clone)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod tile;

pub mod agent;
pub mod algo;
pub mod arena;
pub mod claim;
pub mod config;
pub mod event;
pub mod hand;
