/// Moment classification: pure functions only
/// Turns mover-perspective evaluations into a flagged moment and assembles the output record

use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Position, Role, Square};

use crate::board_utils::landing_square;
use crate::mercy::is_decided;
use crate::notation::{fen_of, san_line, san_of, uci_of, UNAVAILABLE};
use crate::record::EvaluationRecord;
use crate::tactics::{classify_tactic, TacticType};

/// Centipawns that must be lost against the best move before anything is flagged
const SWING_THRESHOLD: i32 = 200;

/// A blunder leaves the mover worse than this
const LOST_THRESHOLD: i32 = -100;

/// A missed chance starts from at least this advantage
const ADVANTAGE_THRESHOLD: i32 = 200;

/// Longest mate still counted as a missed mate
const MAX_MISSED_MATE: i32 = 5;

const CRITICAL_SWING: i32 = 500;
const MAJOR_SWING: i32 = 300;

/// Moves shown for best/refutation lines
const LINE_PREVIEW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentType {
    Blunder,
    MissedChance,
    MissedMate,
}

impl MomentType {
    pub fn label(self) -> &'static str {
        match self {
            MomentType::Blunder => "Blunder",
            MomentType::MissedChance => "Missed Opportunity",
            MomentType::MissedMate => "Missed Mate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

pub fn severity_for_swing(swing: i32) -> Severity {
    let magnitude = swing.abs();
    if magnitude >= CRITICAL_SWING {
        Severity::Critical
    } else if magnitude >= MAJOR_SWING {
        Severity::Major
    } else {
        Severity::Minor
    }
}

/// Classify a move from mover-perspective scores. `None` means not flagged.
pub fn classify_moment(
    cp_before: i32,
    cp_after: i32,
    best_mate_in: Option<i32>,
    played_mate_in: Option<i32>,
) -> Option<(MomentType, Severity)> {
    let swing = cp_before - cp_after;
    let severity = severity_for_swing(swing);

    let missed_mate = best_mate_in.is_some_and(|m| m > 0 && m <= MAX_MISSED_MATE);
    let played_mate = played_mate_in.is_some_and(|m| m > 0);
    if missed_mate && !played_mate {
        return Some((MomentType::MissedMate, severity));
    }

    if swing >= SWING_THRESHOLD && cp_after < LOST_THRESHOLD {
        return Some((MomentType::Blunder, severity));
    }

    if swing >= SWING_THRESHOLD && cp_before >= ADVANTAGE_THRESHOLD && cp_after >= LOST_THRESHOLD {
        return Some((MomentType::MissedChance, severity));
    }

    None
}

/// Mover piece the refutation wins on its first move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPiece {
    pub color: String,
    pub piece: String,
    pub square: String,
}

/// A flagged ply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrucialMoment {
    pub half_move_number: u32,
    pub hero_color: String,
    /// Position before the move
    pub fen: String,
    pub move_played_san: String,
    pub move_played_uci: String,
    pub best_move_san: String,
    pub best_move_uci: String,
    pub eval_before: i32,
    pub eval_after: i32,
    /// `eval_after - eval_before`; negative when the mover made things worse
    pub eval_swing: i32,
    pub moment_type: MomentType,
    pub severity: Severity,
    pub tactic_type: TacticType,
    pub mate_in: Option<i32>,
    pub pv_line: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_line: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refutation_line: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_piece: Option<CapturedPiece>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Run the mercy filter, the moment classifier and, when flagged, the tactic classifier.
///
/// `before` and `after` are the positions around `record.played_move`.
pub fn build_moment(record: &EvaluationRecord, before: &Chess, after: &Chess) -> Option<CrucialMoment> {
    // Delivering mate is never a mistake, whatever the engine scores say.
    if after.is_checkmate() {
        return None;
    }
    if is_decided(record.cp_before, record.cp_after) {
        return None;
    }

    let (moment_type, severity) = classify_moment(
        record.cp_before,
        record.cp_after,
        record.best_mate_in,
        record.played_mate_in,
    )?;

    let is_blunder = moment_type == MomentType::Blunder;
    let (tactic_type, mate_in) = if is_blunder {
        let tactic = classify_tactic(
            after,
            &record.refutation_pv,
            record.refutation_mate_in,
            record.mover,
            Some(before),
        );
        (tactic, record.refutation_mate_in)
    } else {
        // The missed line is judged from the side that would have suffered it.
        let tactic = classify_tactic(
            before,
            &record.best_pv,
            record.best_mate_in,
            !record.mover,
            None,
        );
        (tactic, record.best_mate_in)
    };

    let (move_played_san, move_played_uci) = match record.played_move {
        Some(m) => (san_of(before, m), uci_of(m)),
        None => (UNAVAILABLE.to_string(), UNAVAILABLE.to_string()),
    };
    let (best_move_san, best_move_uci) = match record.best_move {
        Some(m) if before.is_legal(m) => (san_of(before, m), uci_of(m)),
        _ => (UNAVAILABLE.to_string(), UNAVAILABLE.to_string()),
    };

    let pv_line = san_line(before, &record.best_pv, LINE_PREVIEW);

    Some(CrucialMoment {
        half_move_number: record.half_move,
        hero_color: color_name(record.mover).to_string(),
        fen: fen_of(before),
        move_played_san,
        move_played_uci,
        best_move_san,
        best_move_uci,
        eval_before: record.cp_before,
        eval_after: record.cp_after,
        eval_swing: record.cp_after - record.cp_before,
        moment_type,
        severity,
        tactic_type,
        mate_in,
        best_line: (!is_blunder).then(|| pv_line.clone()),
        pv_line,
        refutation_line: is_blunder.then(|| san_line(after, &record.refutation_pv, LINE_PREVIEW)),
        captured_piece: if is_blunder {
            captured_by_refutation(record, after)
        } else {
            None
        },
        explanation: None,
    })
}

fn captured_by_refutation(record: &EvaluationRecord, after: &Chess) -> Option<CapturedPiece> {
    let first = *record.refutation_pv.first()?;
    let role = first.capture()?;
    // En passant lands behind the captured pawn.
    let square = if first.is_en_passant() {
        Square::from_coords(first.to().file(), first.from()?.rank())
    } else {
        landing_square(first)
    };
    if after.board().color_at(square) != Some(record.mover) {
        return None;
    }
    Some(CapturedPiece {
        color: color_name(record.mover).to_string(),
        piece: role_name(role).to_string(),
        square: square.to_string(),
    })
}

pub fn color_name(color: Color) -> &'static str {
    color.fold_wb("white", "black")
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_sign_grid_is_decided() {
        let values: [i32; 8] = [-10_000, -2_000, -900, -501, 501, 900, 2_000, 10_000];
        for &before in &values {
            for &after in &values {
                if before.signum() == after.signum() {
                    assert!(is_decided(before, after), "{before} -> {after}");
                }
            }
        }
    }

    #[test]
    fn test_blunder() {
        assert_eq!(
            classify_moment(0, -300, None, None),
            Some((MomentType::Blunder, Severity::Major))
        );
    }

    #[test]
    fn test_missed_mate() {
        assert_eq!(
            classify_moment(10_000, 200, Some(3), None),
            Some((MomentType::MissedMate, Severity::Critical))
        );
    }

    #[test]
    fn test_missed_mate_requires_short_mate() {
        // Mate in 6 falls through to the swing rules.
        assert_eq!(
            classify_moment(10_000, 200, Some(6), None),
            Some((MomentType::MissedChance, Severity::Critical))
        );
    }

    #[test]
    fn test_playing_a_mate_is_not_missed() {
        assert_eq!(classify_moment(10_000, 10_000, Some(3), Some(5)), None);
    }

    #[test]
    fn test_missed_chance() {
        assert_eq!(
            classify_moment(300, 100, None, None),
            Some((MomentType::MissedChance, Severity::Minor))
        );
    }

    #[test]
    fn test_small_losses_are_not_flagged() {
        assert_eq!(classify_moment(50, -120, None, None), None);
        // Lost 250 but the position was never good and is still playable.
        assert_eq!(classify_moment(100, -100, None, None), None);
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(severity_for_swing(600), Severity::Critical);
        assert_eq!(severity_for_swing(500), Severity::Critical);
        assert_eq!(severity_for_swing(350), Severity::Major);
        assert_eq!(severity_for_swing(300), Severity::Major);
        assert_eq!(severity_for_swing(200), Severity::Minor);
        assert_eq!(severity_for_swing(-600), Severity::Critical);
    }
}
