pub mod board;
pub mod config;
pub mod game;
pub mod input;
pub mod piece;
pub mod ranking;

pub mod test_helpers;
