//! Analyzer configuration from environment variables

use std::env;
use std::time::Duration;

use crate::engine::SearchLimit;
use crate::error::AnalyzerError;

#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Time budget per analysed position
    pub time_per_position: Duration,

    /// Fixed node budget per position; takes precedence over the time budget when set
    pub nodes_per_position: Option<u32>,

    /// Stockfish `Threads` option
    pub engine_threads: u32,

    /// Stockfish `Hash` option in megabytes
    pub engine_hash_mb: u32,

    /// Longest wait for a single search before the engine is considered hung
    pub engine_timeout: Duration,

    /// Number of engine processes (games analysed concurrently)
    pub engine_workers: usize,

    /// Username whose moves are classified; both sides when unset
    pub hero_username: Option<String>,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, AnalyzerError> {
        let stockfish_path = env::var("STOCKFISH_PATH")
            .unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string());

        let time_ms: u64 = parse_var("ANALYSIS_TIME_MS").unwrap_or(100);
        if time_ms == 0 {
            return Err(AnalyzerError::Config("ANALYSIS_TIME_MS must be positive"));
        }

        let nodes_per_position = parse_var("NODES_PER_POSITION").filter(|n: &u32| *n > 0);

        let engine_workers = parse_var("ENGINE_WORKERS")
            .filter(|n: &usize| *n > 0)
            .unwrap_or_else(num_cpus::get);

        let hero_username = env::var("HERO_USERNAME")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            stockfish_path,
            time_per_position: Duration::from_millis(time_ms),
            nodes_per_position,
            engine_threads: parse_var("ENGINE_THREADS").unwrap_or(1),
            engine_hash_mb: parse_var("ENGINE_HASH_MB").unwrap_or(64),
            engine_timeout: Duration::from_secs(parse_var("ENGINE_TIMEOUT_SECS").unwrap_or(30)),
            engine_workers,
            hero_username,
        })
    }

    /// Search limit handed to the engine for every position
    pub fn search_limit(&self) -> SearchLimit {
        match self.nodes_per_position {
            Some(nodes) => SearchLimit::Nodes(nodes),
            None => SearchLimit::MoveTime(self.time_per_position),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
