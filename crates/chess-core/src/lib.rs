//! Chess game containers and a lightweight PGN reader.

pub mod game_data;
pub mod pgn;
