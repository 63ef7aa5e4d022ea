pub use shakmaty;

pub mod analyzer;
pub mod board_utils;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod mercy;
pub mod moment;
pub mod notation;
pub mod record;
pub mod stockfish;
pub mod tactics;
