//! Core game analysis logic
//!
//! Replays a game's mainline, asks the engine about the position before and after every ply,
//! and collects crucial moments for the hero plus an evaluation trace for charting.

use chess_core::game_data::{GameData, GameMetadata};
use chess_core::pgn::parse_pgn;
use serde::Serialize;
use shakmaty::{Chess, Color, Position};
use tracing::{debug, info, warn};

use crate::engine::{PositionAnalyser, SearchLimit};
use crate::error::AnalyzerError;
use crate::moment::{build_moment, color_name, CrucialMoment, MomentType};
use crate::notation::{fen_of, parse_san, position_from_fen, san_of};
use crate::record::EvaluationRecord;

/// Per-run analysis settings
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Username whose moves are classified; both sides when `None` or unmatched
    pub hero: Option<String>,
    pub limit: SearchLimit,
}

/// One applied ply of the evaluation chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub half_move: u32,
    pub san: String,
    pub is_white: bool,
    /// Evaluation after the move, White's perspective
    pub eval_cp: i32,
    /// Mate distance after the move, White's perspective
    pub mate_in: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moment_type: Option<MomentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moment_index: Option<usize>,
}

/// A recorded move that could not be replayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPly {
    pub half_move: u32,
    pub san: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameAnalysis {
    pub metadata: GameMetadata,
    pub hero_color: Option<String>,
    pub moments: Vec<CrucialMoment>,
    pub trace: Vec<TraceEntry>,
    pub skipped: Vec<SkippedPly>,
}

impl GameAnalysis {
    fn empty(metadata: GameMetadata) -> Self {
        Self {
            metadata,
            hero_color: None,
            moments: Vec::new(),
            trace: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Which colour `hero` played, matched case-insensitively against the player headers
pub fn hero_color(metadata: &GameMetadata, hero: Option<&str>) -> Option<Color> {
    let hero = hero?.trim();
    if metadata.white.eq_ignore_ascii_case(hero) {
        Some(Color::White)
    } else if metadata.black.eq_ignore_ascii_case(hero) {
        Some(Color::Black)
    } else {
        None
    }
}

/// Parse a single PGN game and analyse it. Unparsable input yields an empty analysis.
pub async fn analyze_pgn<A: PositionAnalyser>(
    engine: &mut A,
    pgn: &str,
    options: &AnalysisOptions,
) -> Result<GameAnalysis, AnalyzerError> {
    match parse_pgn(pgn) {
        Some(game) => analyze_game(engine, &game, options).await,
        None => {
            warn!(bytes = pgn.len(), "No playable game in PGN, nothing to analyse");
            Ok(GameAnalysis::empty(GameMetadata::default()))
        }
    }
}

/// Analyse a parsed game ply by ply.
///
/// Any engine failure aborts the whole game: later evaluations depend on every earlier ply.
pub async fn analyze_game<A: PositionAnalyser>(
    engine: &mut A,
    game: &GameData,
    options: &AnalysisOptions,
) -> Result<GameAnalysis, AnalyzerError> {
    let mut analysis = GameAnalysis::empty(game.metadata.clone());

    let mut position = match game.start_fen.as_deref() {
        Some(fen) => match position_from_fen(fen) {
            Ok(pos) => pos,
            Err(e) => {
                warn!(error = %e, "Unusable start position, nothing to analyse");
                return Ok(analysis);
            }
        },
        None => Chess::default(),
    };

    let hero = hero_color(&game.metadata, options.hero.as_deref());
    if options.hero.is_some() && hero.is_none() {
        warn!(
            hero = options.hero.as_deref().unwrap_or_default(),
            white = %game.metadata.white,
            black = %game.metadata.black,
            "Hero not found in game headers, classifying both sides"
        );
    }
    analysis.hero_color = hero.map(|c| color_name(c).to_string());

    info!(
        white = %game.metadata.white,
        black = %game.metadata.black,
        plies = game.moves.len(),
        "Starting analysis"
    );

    for (idx, san) in game.moves.iter().enumerate() {
        let half_move = idx as u32 + 1;

        let Some(played) = parse_san(&position, san) else {
            // Later tokens would be replayed with the wrong side to move.
            warn!(
                half_move,
                san = %san,
                remaining = game.moves.len() - idx,
                "Move does not apply to the replayed position, stopping replay"
            );
            let reason = format!("not playable in {}", fen_of(&position));
            analysis.skipped.push(SkippedPly {
                half_move,
                san: san.clone(),
                reason,
            });
            for (offset, rest) in game.moves[idx + 1..].iter().enumerate() {
                analysis.skipped.push(SkippedPly {
                    half_move: half_move + offset as u32 + 1,
                    san: rest.clone(),
                    reason: format!("follows unplayable move {san}"),
                });
            }
            break;
        };

        let mover = position.turn();
        let eval_before = engine.analyse(&position, options.limit).await?;

        let before = position.clone();
        position.play_unchecked(played);
        let eval_after = engine.analyse(&position, options.limit).await?;

        let mut entry = TraceEntry {
            half_move,
            san: san_of(&before, played),
            is_white: mover.is_white(),
            eval_cp: eval_after.cp_for(Color::White),
            mate_in: eval_after.mate_for(Color::White),
            moment_type: None,
            moment_index: None,
        };

        if hero.map_or(true, |h| h == mover) {
            let record = EvaluationRecord::from_evals(
                half_move,
                mover,
                played,
                &before,
                &position,
                &eval_before,
                &eval_after,
            );
            debug!(
                half_move,
                cp_before = record.cp_before,
                cp_after = record.cp_after,
                "Evaluated hero move"
            );

            if let Some(moment) = build_moment(&record, &before, &position) {
                info!(
                    half_move,
                    moment = ?moment.moment_type,
                    tactic = ?moment.tactic_type,
                    swing = moment.eval_swing,
                    "Crucial moment"
                );
                entry.moment_type = Some(moment.moment_type);
                entry.moment_index = Some(analysis.moments.len());
                analysis.moments.push(moment);
            }
        }

        analysis.trace.push(entry);
    }

    info!(
        moments = analysis.moments.len(),
        skipped = analysis.skipped.len(),
        "Analysis complete"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(white: &str, black: &str) -> GameMetadata {
        GameMetadata {
            white: white.to_string(),
            black: black.to_string(),
            ..GameMetadata::default()
        }
    }

    #[test]
    fn test_hero_color() {
        let meta = metadata("Alice", "bob");
        assert_eq!(hero_color(&meta, Some("alice")), Some(Color::White));
        assert_eq!(hero_color(&meta, Some(" BOB ")), Some(Color::Black));
        assert_eq!(hero_color(&meta, Some("carol")), None);
        assert_eq!(hero_color(&meta, None), None);
    }
}
