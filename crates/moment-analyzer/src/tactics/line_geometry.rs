/// Line geometry detectors: skewer, discovered attack

use shakmaty::{Position, Role};

use super::Refutation;
use crate::board_utils::{
    attackers, first_blocker_behind, is_clear_between, is_ray_piece, landing_square, piece_value,
    slides_toward, ROOK_VALUE,
};

/// Skewer: the moved slider hits a mover piece with an equal or more valuable mover piece behind it
pub fn skewer(ctx: &Refutation) -> bool {
    let to = landing_square(ctx.refutation);
    let board = ctx.after.board();
    let Some(role) = board.role_at(to) else {
        return false;
    };
    if !is_ray_piece(role) || piece_value(role) < ROOK_VALUE {
        return false;
    }

    let fronts = board.by_color(ctx.mover) & !board.by_role(Role::Pawn) & !board.kings();
    fronts.into_iter().any(|front| {
        if !slides_toward(role, to, front) || !is_clear_between(board, to, front) {
            return false;
        }
        let Some(behind) = first_blocker_behind(board, to, front) else {
            return false;
        };
        match (board.piece_at(front), board.piece_at(behind)) {
            (Some(front_piece), Some(back_piece)) => {
                back_piece.color == ctx.mover && piece_value(front_piece.role) <= piece_value(back_piece.role)
            }
            _ => false,
        }
    })
}

/// Discovered attack: check from a piece that did not move, or a new attacker on a mover queen/rook
pub fn discovered_attack(ctx: &Refutation) -> bool {
    let arrived = ctx.arrived();

    if (ctx.after.checkers() & !arrived).any() {
        return true;
    }

    let opponent = ctx.opponent();
    let after = ctx.after.board();
    let before = ctx.position.board();
    let heavy = after.by_color(ctx.mover) & after.rooks_and_queens();

    heavy.into_iter().any(|sq| {
        let new_attackers =
            attackers(after, opponent, sq) & !attackers(before, opponent, sq) & !arrived;
        new_attackers.any()
    })
}
