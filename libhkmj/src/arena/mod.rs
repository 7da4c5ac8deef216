pub mod board;
pub mod game;
pub mod result;
pub mod wall;


pub use board::{Board, BoardState, Phase, Poll};
pub use game::Table;
pub use result::{GameResult, HandRecord, RoundOutcome, Summary};
pub use wall::Wall;
