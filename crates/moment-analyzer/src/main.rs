//! Crucial-moment analyzer
//!
//! Reads PGN files, analyses every game with a pool of native Stockfish processes and prints
//! the flagged moments as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use moment_analyzer::analyzer::{self, AnalysisOptions};
use moment_analyzer::config::AnalyzerConfig;
use moment_analyzer::error::AnalyzerError;
use moment_analyzer::history::AnalysisHistory;
use moment_analyzer::stockfish::StockfishEngine;

const USAGE: &str = "usage: moment-analyzer [--hero NAME] [--history PATH] <file.pgn>...";

struct CliArgs {
    hero: Option<String>,
    history: Option<PathBuf>,
    files: Vec<PathBuf>,
}

/// Parse `--hero NAME`, `--history PATH` and PGN paths from CLI args
fn parse_args() -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs {
        hero: None,
        history: None,
        files: Vec::new(),
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--hero" => cli.hero = Some(args.next().context("--hero needs a username")?),
            "--history" => {
                cli.history = Some(PathBuf::from(args.next().context("--history needs a path")?))
            }
            "-h" | "--help" => anyhow::bail!(USAGE),
            _ => cli.files.push(PathBuf::from(arg)),
        }
    }

    if cli.files.is_empty() {
        anyhow::bail!(USAGE);
    }
    Ok(cli)
}

async fn spawn_engine(config: &AnalyzerConfig) -> Result<StockfishEngine, AnalyzerError> {
    StockfishEngine::new(
        &config.stockfish_path,
        config.engine_threads,
        config.engine_hash_mb,
        config.engine_timeout,
    )
    .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let cli = parse_args()?;
    let config = AnalyzerConfig::load()?;
    let options = AnalysisOptions {
        hero: cli.hero.or_else(|| config.hero_username.clone()),
        limit: config.search_limit(),
    };
    info!(
        stockfish_path = %config.stockfish_path,
        limit = ?options.limit,
        hero = ?options.hero,
        "Analyzer config loaded"
    );

    let mut games = Vec::new();
    for path in &cli.files {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        games.extend(chess_core::pgn::split_games(&text));
    }
    if games.is_empty() {
        warn!("No games found in input");
        println!("[]");
        return Ok(());
    }

    // One Stockfish process per worker; a game never spans engines
    let num_workers = config.engine_workers.clamp(1, games.len());
    info!(num_workers, games = games.len(), "Creating Stockfish engine pool");

    let mut engines: Vec<Arc<Mutex<StockfishEngine>>> = Vec::with_capacity(num_workers);
    for i in 0..num_workers {
        let engine = spawn_engine(&config)
            .await
            .context("failed to spawn Stockfish")?;
        info!(engine_id = i, "Stockfish engine ready");
        engines.push(Arc::new(Mutex::new(engine)));
    }

    let semaphore = Arc::new(Semaphore::new(num_workers));
    let mut handles = Vec::with_capacity(games.len());

    for (i, pgn) in games.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let engine = engines[i % num_workers].clone();
        let options = options.clone();
        let config = config.clone();

        handles.push(tokio::spawn(async move {
            let _permit = permit; // Hold until done
            let mut engine = engine.lock().await;

            let result = async {
                engine.new_game().await?;
                analyzer::analyze_pgn(&mut *engine, &pgn, &options).await
            }
            .await;

            // A dead engine would fail every later game on this slot
            if matches!(result, Err(AnalyzerError::Engine(_))) {
                match spawn_engine(&config).await {
                    Ok(fresh) => *engine = fresh,
                    Err(e) => error!(error = %e, "Failed to respawn Stockfish"),
                }
            }
            result
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    let mut failed = 0u32;
    for (i, handle) in handles.into_iter().enumerate() {
        let game = i + 1;
        match handle.await {
            Ok(Ok(analysis)) => results.push(analysis),
            Ok(Err(e)) => {
                error!(game, error = %e, "Analysis failed");
                failed += 1;
            }
            Err(e) => {
                error!(game, error = %e, "Analysis task aborted");
                failed += 1;
            }
        }
    }
    info!(analysed = results.len(), failed, "All games processed");

    if let Some(path) = &cli.history {
        let mut history = AnalysisHistory::load(path);
        for analysis in &results {
            history.record(analysis);
        }
        for (tactic, count) in history.top_tactics(3) {
            info!(tactic = tactic.label(), count, "Recurring tactic");
        }
        history.save(path)?;
    }

    println!("{}", serde_json::to_string_pretty(&results)?);

    // Clean up engines
    info!("Shutting down Stockfish engines");
    for engine in engines {
        let mut engine = engine.lock().await;
        engine.quit().await;
    }

    Ok(())
}
