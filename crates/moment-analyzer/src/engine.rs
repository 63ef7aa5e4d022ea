//! Engine-facing types: scores, search limits and the analysis seam used by the driver.

use std::future::Future;
use std::time::Duration;

use shakmaty::{Chess, Color};

use crate::error::AnalyzerError;

/// Mate scores are clamped to this many centipawns
pub const MATE_SCORE_CP: i32 = 10_000;

/// Engine score as reported over UCI, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Cp(i32),
    /// Mate in N for the side to move (negative: getting mated). `Mate(0)` means already mated.
    Mate(i32),
}

impl Score {
    /// Centipawns for the side to move with mates clamped to ±[`MATE_SCORE_CP`]
    pub fn to_cp(self) -> i32 {
        match self {
            Score::Cp(cp) => cp,
            Score::Mate(m) if m > 0 => MATE_SCORE_CP,
            Score::Mate(_) => -MATE_SCORE_CP,
        }
    }
}

/// How long the engine may think about one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    MoveTime(Duration),
    Nodes(u32),
}

/// Result of analysing one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEval {
    /// Side to move in the analysed position
    pub turn: Color,
    pub score: Score,
    /// Principal variation in UCI notation, possibly empty
    pub pv: Vec<String>,
}

impl EngineEval {
    /// Centipawn score from `color`'s perspective
    pub fn cp_for(&self, color: Color) -> i32 {
        let cp = self.score.to_cp();
        if color == self.turn { cp } else { -cp }
    }

    /// Signed mate distance from `color`'s perspective (positive: `color` mates)
    pub fn mate_for(&self, color: Color) -> Option<i32> {
        match self.score {
            Score::Mate(m) if color == self.turn => Some(m),
            Score::Mate(m) => Some(-m),
            Score::Cp(_) => None,
        }
    }

    /// Unsigned mate distance, whoever is mating
    pub fn mate_distance(&self) -> Option<i32> {
        match self.score {
            Score::Mate(m) => Some(m.abs()),
            Score::Cp(_) => None,
        }
    }
}

/// Anything that can evaluate a position: a UCI engine process or a scripted stand-in.
pub trait PositionAnalyser {
    fn analyse(
        &mut self,
        position: &Chess,
        limit: SearchLimit,
    ) -> impl Future<Output = Result<EngineEval, AnalyzerError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(turn: Color, score: Score) -> EngineEval {
        EngineEval {
            turn,
            score,
            pv: Vec::new(),
        }
    }

    #[test]
    fn test_cp_perspective() {
        let e = eval(Color::Black, Score::Cp(-40));
        assert_eq!(e.cp_for(Color::Black), -40);
        assert_eq!(e.cp_for(Color::White), 40);
        assert_eq!(e.mate_for(Color::White), None);
    }

    #[test]
    fn test_mate_clamping() {
        let e = eval(Color::White, Score::Mate(3));
        assert_eq!(e.cp_for(Color::White), MATE_SCORE_CP);
        assert_eq!(e.cp_for(Color::Black), -MATE_SCORE_CP);
        assert_eq!(e.mate_for(Color::Black), Some(-3));
        assert_eq!(e.mate_distance(), Some(3));
    }

    #[test]
    fn test_already_mated() {
        // Side to move is checkmated: the other side is winning.
        let e = eval(Color::Black, Score::Mate(0));
        assert_eq!(e.cp_for(Color::Black), -MATE_SCORE_CP);
        assert_eq!(e.cp_for(Color::White), MATE_SCORE_CP);
    }
}
