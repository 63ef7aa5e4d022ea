/// Tactic pattern classification for flagged moves
/// Detectors run in a fixed priority order; the first match decides the label

pub mod attacks;
pub mod line_geometry;
pub mod mate_patterns;
pub mod pins;

use serde::{Deserialize, Serialize};
use shakmaty::{Bitboard, Chess, Color, Move, Position};

/// Mates longer than this are left to the other detectors
pub const MAX_FORCED_MATE: i32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticType {
    ForcedMate,
    BackRankMate,
    Skewer,
    Pin,
    DiscoveredAttack,
    HangingPiece,
    HangingPawn,
    LosingExchange,
    Fork,
    TrappedPiece,
    Positional,
    Unknown,
}

impl TacticType {
    pub fn label(self) -> &'static str {
        match self {
            TacticType::ForcedMate => "Forced Mate",
            TacticType::BackRankMate => "Back-Rank Mate",
            TacticType::Skewer => "Skewer",
            TacticType::Pin => "Pin",
            TacticType::DiscoveredAttack => "Discovered Attack",
            TacticType::HangingPiece => "Hanging Piece",
            TacticType::HangingPawn => "Hanging Pawn",
            TacticType::LosingExchange => "Losing Exchange",
            TacticType::Fork => "Fork",
            TacticType::TrappedPiece => "Trapped Piece",
            TacticType::Positional => "Positional",
            TacticType::Unknown => "Unknown",
        }
    }
}

/// The first refutation move and the positions around it
pub struct Refutation<'a> {
    /// Baseline for pin comparison
    pub reference: &'a Chess,
    /// Position the refutation is played from
    pub position: &'a Chess,
    pub refutation: Move,
    pub after: Chess,
    /// Side that made the flagged move and now faces the refutation
    pub mover: Color,
}

impl Refutation<'_> {
    pub fn opponent(&self) -> Color {
        !self.mover
    }

    /// Squares the refuting side's pieces arrived on (both pieces when castling)
    pub fn arrived(&self) -> Bitboard {
        let opponent = self.opponent();
        self.after.board().by_color(opponent) & !self.position.board().by_color(opponent)
    }
}

/// Label the tactic behind a flagged move.
///
/// `position` is the position right after the flagged move, `line` the opponent's best
/// continuation from it and `mover` the side that made the flagged move. `before` is the
/// position prior to the flagged move; pins are measured against it when present.
pub fn classify_tactic(
    position: &Chess,
    line: &[Move],
    mate_in: Option<i32>,
    mover: Color,
    before: Option<&Chess>,
) -> TacticType {
    if mate_in.is_some_and(|n| n <= MAX_FORCED_MATE) {
        return mate_patterns::mate_label(position, line);
    }

    let Some(&refutation) = line.first() else {
        return TacticType::Unknown;
    };
    if !position.is_legal(refutation) {
        return TacticType::Unknown;
    }

    let mut after = position.clone();
    after.play_unchecked(refutation);

    let ctx = Refutation {
        reference: before.unwrap_or(position),
        position,
        refutation,
        after,
        mover,
    };

    if line_geometry::skewer(&ctx) {
        TacticType::Skewer
    } else if pins::new_pin(&ctx) {
        TacticType::Pin
    } else if line_geometry::discovered_attack(&ctx) {
        TacticType::DiscoveredAttack
    } else if let Some(capture) = attacks::capture_label(&ctx) {
        capture
    } else if attacks::fork(&ctx) {
        TacticType::Fork
    } else if attacks::trapped_piece(&ctx) {
        TacticType::TrappedPiece
    } else {
        TacticType::Positional
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::{parse_san, position_from_fen};

    fn classify(fen: &str, san: &str, mover: Color) -> TacticType {
        let pos = position_from_fen(fen).unwrap();
        let m = parse_san(&pos, san).unwrap();
        classify_tactic(&pos, &[m], None, mover, None)
    }

    #[test]
    fn test_empty_line_is_unknown() {
        let pos = Chess::default();
        assert_eq!(classify_tactic(&pos, &[], None, Color::Black, None), TacticType::Unknown);
    }

    #[test]
    fn test_short_mate_without_line_is_forced_mate() {
        let pos = Chess::default();
        assert_eq!(
            classify_tactic(&pos, &[], Some(3), Color::Black, None),
            TacticType::ForcedMate
        );
    }

    #[test]
    fn test_long_mate_falls_through() {
        let pos = Chess::default();
        let e4 = parse_san(&pos, "e4").unwrap();
        assert_eq!(
            classify_tactic(&pos, &[e4], Some(12), Color::Black, None),
            TacticType::Positional
        );
        assert_eq!(
            classify_tactic(&pos, &[e4], Some(7), Color::Black, None),
            TacticType::ForcedMate
        );
    }

    #[test]
    fn test_pin_wins_over_hanging_pawn() {
        // dxe5 also opens the d-file: the queen now pins d2 to the white queen.
        let fen = "rnbqkbnr/ppp1pppp/3p4/4P3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        assert_eq!(classify(fen, "dxe5", Color::White), TacticType::Pin);
    }

    #[test]
    fn test_hanging_pawn() {
        assert_eq!(
            classify("4k3/8/8/3p4/4P3/8/8/4K3 b - - 0 1", "dxe4", Color::White),
            TacticType::HangingPawn
        );
    }

    #[test]
    fn test_en_passant_is_hanging_pawn() {
        assert_eq!(
            classify("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 1", "dxe6", Color::Black),
            TacticType::HangingPawn
        );
    }

    #[test]
    fn test_hanging_piece() {
        assert_eq!(
            classify(
                "r1bqkb1r/pppppppp/5n2/3N4/8/8/PPPPPPPP/R1BQKBNR b KQkq - 0 1",
                "Nxd5",
                Color::White
            ),
            TacticType::HangingPiece
        );
    }

    #[test]
    fn test_losing_exchange() {
        assert_eq!(
            classify("4k3/8/8/8/4N2q/3P4/8/3K4 b - - 0 1", "Qxe4", Color::White),
            TacticType::LosingExchange
        );
    }

    #[test]
    fn test_skewer() {
        assert_eq!(
            classify("6k1/4q3/8/4n3/8/8/8/R5K1 w - - 0 1", "Re1", Color::Black),
            TacticType::Skewer
        );
    }

    #[test]
    fn test_skewer_needs_valuable_piece_behind() {
        assert_eq!(
            classify("6k1/4n3/8/4q3/8/8/8/R5K1 w - - 0 1", "Re1", Color::Black),
            TacticType::Positional
        );
    }

    #[test]
    fn test_discovered_check() {
        assert_eq!(
            classify("3k4/8/8/8/8/8/3B4/3RK3 w - - 0 1", "Be3", Color::Black),
            TacticType::DiscoveredAttack
        );
    }

    #[test]
    fn test_discovered_attack_on_queen() {
        assert_eq!(
            classify("3qk3/8/8/8/3N4/8/8/3RK3 w - - 0 1", "Nb5", Color::Black),
            TacticType::DiscoveredAttack
        );
    }

    #[test]
    fn test_fork() {
        assert_eq!(
            classify("r3k3/8/8/3N4/8/8/8/4K3 w - - 0 1", "Nc7+", Color::Black),
            TacticType::Fork
        );
    }

    #[test]
    fn test_trapped_piece() {
        assert_eq!(
            classify("4k3/8/8/8/8/1P6/r1P5/N3K3 b - - 0 1", "Ke7", Color::White),
            TacticType::TrappedPiece
        );
    }

    #[test]
    fn test_cheaper_capture_of_defended_piece_is_hanging() {
        // The rook is defended by e3, but a knight for a rook still wins material.
        assert_eq!(
            classify("6k1/8/8/5n2/3R4/4P3/8/6K1 b - - 0 1", "Nxd4", Color::White),
            TacticType::HangingPiece
        );
    }

    #[test]
    fn test_capture_with_discovered_check_is_discovered_attack() {
        assert_eq!(
            classify("3k4/8/7n/8/8/8/3B4/3RK3 w - - 0 1", "Bxh6", Color::Black),
            TacticType::DiscoveredAttack
        );
    }

    #[test]
    fn test_bishop_cannot_skewer() {
        // Rook in front of rook on the diagonal, but the attacker is only a bishop.
        assert_eq!(
            classify("k7/6r1/8/4r3/8/8/5B2/7K w - - 0 1", "Bd4", Color::Black),
            TacticType::Positional
        );
    }

    #[test]
    fn test_existing_attacker_is_not_discovered() {
        // The a1 rook was already on the a5 rook before Kh2.
        assert_eq!(
            classify("7k/8/8/r7/8/8/8/R6K w - - 0 1", "Kh2", Color::Black),
            TacticType::Positional
        );
    }

    #[test]
    fn test_fork_needs_a_new_target() {
        // Both rooks were already attacked from d4.
        assert_eq!(
            classify("1k6/8/8/8/r2Q3r/8/8/6K1 w - - 0 1", "Qe4", Color::Black),
            TacticType::Positional
        );
    }

    #[test]
    fn test_attacked_piece_with_escape_is_not_trapped() {
        assert_eq!(
            classify("4k3/8/8/8/8/8/r1P5/N3K3 b - - 0 1", "Ke7", Color::White),
            TacticType::Positional
        );
    }

    #[test]
    fn test_quiet_reply_is_positional() {
        let pos = position_from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let d5 = parse_san(&pos, "d5").unwrap();
        assert_eq!(
            classify_tactic(&pos, &[d5], None, Color::White, None),
            TacticType::Positional
        );
    }

    #[test]
    fn test_labels_are_distinct() {
        let all = [
            TacticType::ForcedMate,
            TacticType::BackRankMate,
            TacticType::Skewer,
            TacticType::Pin,
            TacticType::DiscoveredAttack,
            TacticType::HangingPiece,
            TacticType::HangingPawn,
            TacticType::LosingExchange,
            TacticType::Fork,
            TacticType::TrappedPiece,
            TacticType::Positional,
            TacticType::Unknown,
        ];
        let labels: std::collections::HashSet<_> = all.iter().map(|t| t.label()).collect();
        assert_eq!(labels.len(), all.len());
    }
}
