/// Attack-based detectors: hanging material, fork, trapped piece

use shakmaty::{Position, Role};

use super::{Refutation, TacticType};
use crate::board_utils::{is_attacked_by, landing_square, piece_value};

/// Label for a refutation that captures: hanging pawn, losing exchange or hanging piece.
/// `None` when the refutation is not a capture.
pub fn capture_label(ctx: &Refutation) -> Option<TacticType> {
    let m = ctx.refutation;
    let captured = m.capture()?;

    if m.is_en_passant() || captured == Role::Pawn {
        return Some(TacticType::HangingPawn);
    }

    let defended = is_attacked_by(ctx.position.board(), ctx.mover, m.to());
    if defended && piece_value(m.role()) > piece_value(captured) {
        Some(TacticType::LosingExchange)
    } else {
        Some(TacticType::HangingPiece)
    }
}

/// Fork: the moved piece attacks two or more mover pieces (pawns aside), at least one of them newly
pub fn fork(ctx: &Refutation) -> bool {
    let m = ctx.refutation;
    let Some(from) = m.from() else {
        return false;
    };
    let to = landing_square(m);

    let after = ctx.after.board();
    let targets_now = after.attacks_from(to) & after.by_color(ctx.mover) & !after.by_role(Role::Pawn);
    if targets_now.count() < 2 {
        return false;
    }

    let before = ctx.position.board();
    let targets_before =
        before.attacks_from(from) & before.by_color(ctx.mover) & !before.by_role(Role::Pawn);

    (targets_now & !targets_before).any()
}

/// Trapped piece: an attacked mover knight/bishop/rook/queen with no safe legal move
pub fn trapped_piece(ctx: &Refutation) -> bool {
    let pos = &ctx.after;
    let board = pos.board();
    let opponent = ctx.opponent();
    let candidates = board.by_color(ctx.mover) & !board.by_role(Role::Pawn) & !board.kings();
    let legal = pos.legal_moves();

    candidates.into_iter().any(|sq| {
        if !is_attacked_by(board, opponent, sq) {
            return false;
        }
        let Some(role) = board.role_at(sq) else {
            return false;
        };
        let value = piece_value(role);

        let has_escape = legal.iter().filter(|m| m.from() == Some(sq)).any(|&m| {
            let mut sim = pos.clone();
            sim.play_unchecked(m);
            let safe = !is_attacked_by(sim.board(), opponent, m.to());
            let wins_enough = board.role_at(m.to()).is_some_and(|r| piece_value(r) >= value);
            safe || wins_enough
        });
        !has_escape
    })
}
