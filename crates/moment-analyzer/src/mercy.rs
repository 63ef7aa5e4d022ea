//! Decided-position filter: no flags once a game is already won or lost on both sides of a move.

/// Beyond this margin (strictly) a position counts as decided
pub const DECIDED_MARGIN_CP: i32 = 500;

/// Both evaluations are past the margin and agree on who is winning.
pub fn is_decided(cp_before: i32, cp_after: i32) -> bool {
    cp_before.abs() > DECIDED_MARGIN_CP
        && cp_after.abs() > DECIDED_MARGIN_CP
        && cp_before.signum() == cp_after.signum()
}
