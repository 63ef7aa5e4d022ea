//! Cross-game analysis history persisted as JSON

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzer::GameAnalysis;
use crate::error::AnalyzerError;
use crate::moment::{MomentType, Severity};
use crate::tactics::TacticType;

/// Games kept in the rolling window
pub const MAX_RECENT_GAMES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentSummary {
    pub half_move_number: u32,
    pub moment_type: MomentType,
    pub tactic_type: TacticType,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryGame {
    pub date: Option<String>,
    pub opponent: String,
    pub result: String,
    pub hero_color: Option<String>,
    pub moment_count: usize,
    pub moments: Vec<MomentSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisHistory {
    pub games: Vec<HistoryGame>,
    pub tactic_counts: BTreeMap<TacticType, u32>,
    pub total_blunders: u32,
    pub total_missed: u32,
}

impl AnalysisHistory {
    /// Load history from `path`; missing or unreadable files start a fresh history.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read history, starting fresh");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(history) => history,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt history file, starting fresh");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AnalyzerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), games = self.games.len(), "History saved");
        Ok(())
    }

    /// Fold one analysed game into the history.
    pub fn record(&mut self, analysis: &GameAnalysis) {
        let metadata = &analysis.metadata;
        let opponent = match analysis.hero_color.as_deref() {
            Some("white") => metadata.black.clone(),
            Some("black") => metadata.white.clone(),
            _ => format!("{} vs {}", metadata.white, metadata.black),
        };

        let mut moments = Vec::with_capacity(analysis.moments.len());
        for moment in &analysis.moments {
            *self.tactic_counts.entry(moment.tactic_type).or_insert(0) += 1;
            match moment.moment_type {
                MomentType::Blunder => self.total_blunders += 1,
                MomentType::MissedChance | MomentType::MissedMate => self.total_missed += 1,
            }
            moments.push(MomentSummary {
                half_move_number: moment.half_move_number,
                moment_type: moment.moment_type,
                tactic_type: moment.tactic_type,
                severity: moment.severity,
            });
        }

        self.games.push(HistoryGame {
            date: metadata.date.clone(),
            opponent,
            result: metadata.result.clone(),
            hero_color: analysis.hero_color.clone(),
            moment_count: moments.len(),
            moments,
        });

        if self.games.len() > MAX_RECENT_GAMES {
            let excess = self.games.len() - MAX_RECENT_GAMES;
            self.games.drain(..excess);
        }
    }

    /// The `n` most frequent tactics, most frequent first
    pub fn top_tactics(&self, n: usize) -> Vec<(TacticType, u32)> {
        let mut counts: Vec<(TacticType, u32)> =
            self.tactic_counts.iter().map(|(t, c)| (*t, *c)).collect();
        // Stable sort keeps enum order among ties.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(n);
        counts
    }
}
