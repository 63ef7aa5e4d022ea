/// Pin detector: a pin on the mover's pieces that did not exist before

use shakmaty::Position;

use super::Refutation;
use crate::board_utils::{absolute_pins, relative_pins};

/// New absolute or relative pin after the refutation, compared with the reference position
pub fn new_pin(ctx: &Refutation) -> bool {
    let before = ctx.reference.board();
    let after = ctx.after.board();

    let new_absolute = absolute_pins(after, ctx.mover) & !absolute_pins(before, ctx.mover);
    let new_relative = relative_pins(after, ctx.mover) & !relative_pins(before, ctx.mover);

    new_absolute.any() || new_relative.any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::{parse_san, position_from_fen};
    use shakmaty::Color;

    fn refutation<'a>(position: &'a shakmaty::Chess, reference: &'a shakmaty::Chess, san: &str, mover: Color) -> Refutation<'a> {
        let m = parse_san(position, san).unwrap();
        let mut after = position.clone();
        after.play_unchecked(m);
        Refutation {
            reference,
            position,
            refutation: m,
            after,
            mover,
        }
    }

    #[test]
    fn test_bishop_pins_knight_to_king() {
        let pos = position_from_fen("4k3/4b3/8/8/8/8/3N4/4K3 b - - 0 1").unwrap();
        let ctx = refutation(&pos, &pos, "Bb4", Color::White);
        assert!(new_pin(&ctx));
    }

    #[test]
    fn test_existing_pin_is_not_new() {
        // The knight is already pinned; the bishop just slides further back on the same diagonal.
        let pos = position_from_fen("4k3/8/8/8/1b6/8/3N4/4K3 b - - 0 1").unwrap();
        let ctx = refutation(&pos, &pos, "Ba5", Color::White);
        assert!(!new_pin(&ctx));
    }
}
