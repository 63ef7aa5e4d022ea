use std::collections::HashMap;

use moment_analyzer::engine::{EngineEval, PositionAnalyser, Score, SearchLimit};
use moment_analyzer::error::AnalyzerError;
use moment_analyzer::notation::{fen_of, parse_san};
use moment_analyzer::shakmaty::{Chess, Color, Position};

pub const LIMIT: SearchLimit = SearchLimit::Nodes(1);

/// Engine stand-in answering from a table keyed by FEN.
#[derive(Default)]
pub struct ScriptedEngine {
    answers: HashMap<String, (Score, Vec<String>)>,
    /// Fail every call after this many have succeeded
    pub fail_after: Option<usize>,
    pub calls: usize,
}

impl ScriptedEngine {
    /// Script a position with a White-perspective score.
    pub fn set_white_cp(&mut self, position: &Chess, white_cp: i32, pv: &[&str]) {
        let cp = if position.turn() == Color::White { white_cp } else { -white_cp };
        self.set(position, Score::Cp(cp), pv);
    }

    /// Script a position with a raw side-to-move score.
    pub fn set(&mut self, position: &Chess, score: Score, pv: &[&str]) {
        self.answers.insert(
            fen_of(position),
            (score, pv.iter().map(|m| m.to_string()).collect()),
        );
    }
}

impl PositionAnalyser for ScriptedEngine {
    async fn analyse(&mut self, position: &Chess, _limit: SearchLimit) -> Result<EngineEval, AnalyzerError> {
        if self.fail_after.is_some_and(|n| self.calls >= n) {
            return Err(AnalyzerError::Engine("scripted engine crashed".into()));
        }
        self.calls += 1;

        let (score, pv) = self
            .answers
            .get(&fen_of(position))
            .cloned()
            .unwrap_or((Score::Cp(0), Vec::new()));
        Ok(EngineEval {
            turn: position.turn(),
            score,
            pv,
        })
    }
}

/// Positions after 0..=n plies of a SAN sequence from `start`
pub fn replay(start: &Chess, sans: &[&str]) -> Vec<Chess> {
    let mut positions = vec![start.clone()];
    let mut pos = start.clone();
    for san in sans {
        let m = parse_san(&pos, san).unwrap_or_else(|| panic!("illegal test move {san}"));
        pos.play_unchecked(m);
        positions.push(pos.clone());
    }
    positions
}

/// Minimal PGN with player headers and numbered movetext
pub fn pgn(white: &str, black: &str, sans: &[&str]) -> String {
    let mut movetext = String::new();
    for (i, san) in sans.iter().enumerate() {
        if i % 2 == 0 {
            movetext.push_str(&format!("{}. ", i / 2 + 1));
        }
        movetext.push_str(san);
        movetext.push(' ');
    }
    format!("[White \"{white}\"]\n[Black \"{black}\"]\n[Result \"*\"]\n\n{movetext}*\n")
}
