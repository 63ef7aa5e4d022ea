//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::time::Duration;

use shakmaty::{Chess, Position};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

use crate::engine::{EngineEval, PositionAnalyser, Score, SearchLimit};
use crate::error::AnalyzerError;
use crate::notation::fen_of;

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// Longest wait for any single line of engine output
    timeout: Duration,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(
        path: &str,
        threads: u32,
        hash_mb: u32,
        timeout: Duration,
    ) -> Result<Self, AnalyzerError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| AnalyzerError::Engine(format!("Failed to spawn Stockfish: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| AnalyzerError::Engine("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| AnalyzerError::Engine("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            timeout,
        };

        engine.handshake(threads, hash_mb).await?;
        Ok(engine)
    }

    async fn handshake(&mut self, threads: u32, hash_mb: u32) -> Result<(), AnalyzerError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        // Configure for analysis
        self.send(&format!("setoption name Threads value {threads}")).await?;
        self.send(&format!("setoption name Hash value {hash_mb}")).await?;
        self.send("setoption name UCI_AnalyseMode value true").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Clear engine state between unrelated games
    pub async fn new_game(&mut self) -> Result<(), AnalyzerError> {
        self.send("ucinewgame").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), AnalyzerError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| AnalyzerError::Engine(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| AnalyzerError::Engine(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line; EOF means the process died
    async fn read_line(&mut self) -> Result<String, AnalyzerError> {
        let mut line = String::new();
        let read = tokio::time::timeout(self.timeout, self.stdout.read_line(&mut line))
            .await
            .map_err(|_| AnalyzerError::Engine("Stockfish did not answer in time".into()))?
            .map_err(|e| AnalyzerError::Engine(format!("Failed to read from Stockfish: {e}")))?;
        if read == 0 {
            return Err(AnalyzerError::Engine("Stockfish closed its output".into()));
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), AnalyzerError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    /// Run one search and collect the final score and principal variation
    async fn search(&mut self, fen: &str, limit: SearchLimit) -> Result<(Score, Vec<String>), AnalyzerError> {
        self.send(&format!("position fen {fen}")).await?;
        let go = match limit {
            SearchLimit::MoveTime(time) => format!("go movetime {}", time.as_millis().max(1)),
            SearchLimit::Nodes(nodes) => format!("go nodes {nodes}"),
        };
        self.send(&go).await?;

        let mut score = None;
        let mut pv = Vec::new();

        loop {
            let line = self.read_line().await?;

            if line.starts_with("info") && !line.starts_with("info string") {
                if parse_multipv_index(&line).is_some_and(|idx| idx != 1) {
                    continue;
                }
                if let Some(parsed) = parse_score(&line) {
                    score = Some(parsed);
                }
                if line.contains(" pv ") {
                    pv = parse_pv(&line);
                }
            } else if let Some(rest) = line.strip_prefix("bestmove") {
                let best = rest.split_whitespace().next().unwrap_or("(none)");
                if pv.is_empty() && best != "(none)" {
                    pv.push(best.to_string());
                }
                break;
            }
        }

        let score = score.ok_or_else(|| {
            AnalyzerError::Engine(format!("Stockfish returned no score for {fen}"))
        })?;
        Ok((score, pv))
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        if let Err(e) = self.process.wait().await {
            warn!(error = %e, "Stockfish did not exit cleanly");
        }
    }
}

impl PositionAnalyser for StockfishEngine {
    async fn analyse(&mut self, position: &Chess, limit: SearchLimit) -> Result<EngineEval, AnalyzerError> {
        let fen = fen_of(position);
        let (score, pv) = self.search(&fen, limit).await?;
        Ok(EngineEval {
            turn: position.turn(),
            score,
            pv,
        })
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        let _ = self.process.start_kill();
    }
}

/// Parse `score cp N` or `score mate N` from an info line
fn parse_score(line: &str) -> Option<Score> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let idx = parts.iter().position(|p| *p == "score")?;
    let value: i32 = parts.get(idx + 2)?.parse().ok()?;
    match *parts.get(idx + 1)? {
        "cp" => Some(Score::Cp(value)),
        "mate" => Some(Score::Mate(value)),
        _ => None,
    }
}

/// Parse multipv index from info line
fn parse_multipv_index(line: &str) -> Option<u32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "multipv" && i + 1 < parts.len() {
            return parts[i + 1].parse().ok();
        }
    }
    None
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut in_pv = false;
    let mut moves = Vec::new();

    for part in parts {
        if part == "pv" {
            in_pv = true;
            continue;
        }
        if in_pv {
            // PV ends at next keyword or end of line
            if part.starts_with("bmc") || part == "string" {
                break;
            }
            moves.push(part.to_string());
        }
    }

    moves
}
