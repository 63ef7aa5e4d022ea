//! Per-ply evaluation record, normalised to the mover's perspective.

use shakmaty::{Chess, Color, Move};

use crate::engine::EngineEval;
use crate::notation::parse_uci_line;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRecord {
    /// 1-based ply index in the mainline
    pub half_move: u32,
    pub mover: Color,
    pub cp_before: i32,
    pub cp_after: i32,
    /// Mate distance of the best line before the move, only when the mover mates
    pub best_mate_in: Option<i32>,
    /// Mate distance after the move, only when the mover still mates
    pub played_mate_in: Option<i32>,
    /// Mate distance of the refutation line, whoever mates
    pub refutation_mate_in: Option<i32>,
    pub played_move: Option<Move>,
    pub best_move: Option<Move>,
    pub best_pv: Vec<Move>,
    pub refutation_pv: Vec<Move>,
}

impl EvaluationRecord {
    /// Build a record from the engine's view of the positions before and after `played`.
    pub fn from_evals(
        half_move: u32,
        mover: Color,
        played: Move,
        before: &Chess,
        after: &Chess,
        eval_before: &EngineEval,
        eval_after: &EngineEval,
    ) -> Self {
        let best_pv = parse_uci_line(before, &eval_before.pv);
        let refutation_pv = parse_uci_line(after, &eval_after.pv);

        Self {
            half_move,
            mover,
            cp_before: eval_before.cp_for(mover),
            cp_after: eval_after.cp_for(mover),
            best_mate_in: eval_before.mate_for(mover).filter(|m| *m > 0),
            played_mate_in: eval_after.mate_for(mover).filter(|m| *m > 0),
            refutation_mate_in: eval_after.mate_distance(),
            played_move: Some(played),
            best_move: best_pv.first().copied(),
            best_pv,
            refutation_pv,
        }
    }
}
