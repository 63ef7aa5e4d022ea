/// Board utility functions for tactical analysis
/// Attacker sets, pins and the ray helpers shared by the line-based detectors

use shakmaty::{attacks, Bitboard, Board, Color, Move, Role, Square};

// Piece values for material comparisons
pub const PAWN_VALUE: i32 = 1;
pub const KNIGHT_VALUE: i32 = 3;
pub const BISHOP_VALUE: i32 = 3;
pub const ROOK_VALUE: i32 = 5;
pub const QUEEN_VALUE: i32 = 9;
pub const KING_VALUE: i32 = 100;

/// Piece value including king
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => KING_VALUE,
    }
}

/// Is this a ray (sliding) piece type?
pub fn is_ray_piece(role: Role) -> bool {
    matches!(role, Role::Queen | Role::Rook | Role::Bishop)
}

/// Pieces of `color` attacking `square` with the current occupancy
pub fn attackers(board: &Board, color: Color, square: Square) -> Bitboard {
    board.attacks_to(square, color, board.occupied())
}

pub fn is_attacked_by(board: &Board, color: Color, square: Square) -> bool {
    attackers(board, color, square).any()
}

/// Destination square of a move; the king's target square for castling
pub fn landing_square(m: Move) -> Square {
    match (m, m.castling_side()) {
        (Move::Castle { king, .. }, Some(side)) => Square::from_coords(side.king_to_file(), king.rank()),
        _ => m.to(),
    }
}

/// Squares strictly between `a` and `b`, empty if they share no line
pub fn ray_between(a: Square, b: Square) -> Bitboard {
    attacks::between(a, b)
}

/// Can a piece of `role` on `from` move along the line towards `to` on an empty board?
pub fn slides_toward(role: Role, from: Square, to: Square) -> bool {
    let straight = attacks::rook_attacks(from, Bitboard::EMPTY).contains(to);
    let diagonal = attacks::bishop_attacks(from, Bitboard::EMPTY).contains(to);
    match role {
        Role::Rook => straight,
        Role::Bishop => diagonal,
        Role::Queen => straight || diagonal,
        _ => false,
    }
}

/// Line from `from` to `through` is clear of pieces
pub fn is_clear_between(board: &Board, from: Square, through: Square) -> bool {
    (ray_between(from, through) & board.occupied()).is_empty()
}

/// First occupied square beyond `through` on the line running from `from` through `through`.
pub fn first_blocker_behind(board: &Board, from: Square, through: Square) -> Option<Square> {
    if from == through {
        return None;
    }
    let occupied = board.occupied();
    (attacks::ray(from, through) & occupied)
        .into_iter()
        .filter(|&sq| sq != through && ray_between(from, sq).contains(through))
        .find(|&sq| (ray_between(through, sq) & occupied).is_empty())
}

/// The `color` piece on `square` is pinned to its own king by an enemy slider.
pub fn is_pinned(board: &Board, color: Color, square: Square) -> bool {
    let Some(king) = board.king_of(color) else {
        return false;
    };
    if square == king || board.color_at(square) != Some(color) {
        return false;
    }

    let snipers = (attacks::rook_attacks(king, Bitboard::EMPTY) & board.rooks_and_queens()
        | attacks::bishop_attacks(king, Bitboard::EMPTY) & board.bishops_and_queens())
        & board.by_color(!color);

    snipers
        .into_iter()
        .any(|sniper| (ray_between(king, sniper) & board.occupied()).single_square() == Some(square))
}

/// All `color` pieces pinned to their king
pub fn absolute_pins(board: &Board, color: Color) -> Bitboard {
    (board.by_color(color) & !board.kings())
        .into_iter()
        .filter(|&sq| is_pinned(board, color, sq))
        .collect()
}

/// `color` pieces that an enemy slider attacks with a more valuable `color` piece right behind them
pub fn relative_pins(board: &Board, color: Color) -> Bitboard {
    let sliders = (board.rooks_and_queens() | board.bishops_and_queens()) & board.by_color(!color);
    let fronts = board.by_color(color) & !board.kings();
    let mut pinned = Bitboard::EMPTY;

    for slider in sliders {
        let Some(slider_role) = board.role_at(slider) else {
            continue;
        };
        for front in fronts {
            if !slides_toward(slider_role, slider, front) || !is_clear_between(board, slider, front) {
                continue;
            }
            let Some(behind) = first_blocker_behind(board, slider, front) else {
                continue;
            };
            let (Some(front_piece), Some(back_piece)) = (board.piece_at(front), board.piece_at(behind)) else {
                continue;
            };
            if back_piece.color == color && piece_value(front_piece.role) < piece_value(back_piece.role) {
                pinned.add(front);
            }
        }
    }

    pinned
}
