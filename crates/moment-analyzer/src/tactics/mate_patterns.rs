/// Mate detectors: forced mate, back-rank mate

use shakmaty::{Chess, Move, Position};

use super::TacticType;

/// Play out a mating line; back-rank mate if it ends with the mated king on its home rank.
/// A line that is illegal or stops short of mate still counts as a forced mate.
pub fn mate_label(position: &Chess, line: &[Move]) -> TacticType {
    let mut pos = position.clone();
    for &m in line {
        if !pos.is_legal(m) {
            return TacticType::ForcedMate;
        }
        pos.play_unchecked(m);
    }

    if pos.is_checkmate() {
        let loser = pos.turn();
        if pos
            .board()
            .king_of(loser)
            .is_some_and(|king| king.rank() == loser.backrank())
        {
            return TacticType::BackRankMate;
        }
    }
    TacticType::ForcedMate
}
