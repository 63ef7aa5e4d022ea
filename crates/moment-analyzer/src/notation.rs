//! FEN/SAN/UCI conversions on top of shakmaty.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::error::AnalyzerError;

/// Placeholder for fields the engine could not provide
pub const UNAVAILABLE: &str = "N/A";

pub fn fen_of(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

pub fn position_from_fen(fen: &str) -> Result<Chess, AnalyzerError> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| AnalyzerError::InvalidPosition(format!("{fen}: {e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| AnalyzerError::InvalidPosition(format!("{fen}: {e}")))
}

/// SAN with check/mate suffix
pub fn san_of(position: &Chess, m: Move) -> String {
    SanPlus::from_move(position.clone(), m).to_string()
}

pub fn uci_of(m: Move) -> String {
    m.to_uci(CastlingMode::Standard).to_string()
}

/// Resolve a SAN token against `position`; `None` if unparsable, illegal or ambiguous.
pub fn parse_san(position: &Chess, san: &str) -> Option<Move> {
    let parsed: SanPlus = san.parse().ok()?;
    parsed.san.to_move(position).ok()
}

/// Convert engine UCI moves into legal moves, stopping at the first one that does not apply.
pub fn parse_uci_line(position: &Chess, uci_moves: &[String]) -> Vec<Move> {
    let mut pos = position.clone();
    let mut line = Vec::with_capacity(uci_moves.len());
    for text in uci_moves {
        let Some(m) = text
            .parse::<UciMove>()
            .ok()
            .and_then(|uci| uci.to_move(&pos).ok())
        else {
            break;
        };
        pos.play_unchecked(m);
        line.push(m);
    }
    line
}

/// First `limit` moves of a line rendered as SAN
pub fn san_line(position: &Chess, moves: &[Move], limit: usize) -> Vec<String> {
    let mut pos = position.clone();
    let mut sans = Vec::new();
    for &m in moves.iter().take(limit) {
        if !pos.is_legal(m) {
            break;
        }
        sans.push(san_of(&pos, m));
        pos.play_unchecked(m);
    }
    sans
}
