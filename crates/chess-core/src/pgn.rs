//! PGN parsing utilities: lightweight regex-based parser.

use regex::Regex;

use crate::game_data::{GameData, GameMetadata};

const SAN_PATTERN: &str = r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|(?:O-O-O|O-O)[+#]?";

/// Parse a single PGN game into a GameData struct.
///
/// Returns `None` when the text carries no mainline moves.
pub fn parse_pgn(pgn: &str) -> Option<GameData> {
    let header_re = Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).ok()?;

    let mut metadata = GameMetadata::default();
    let mut setup = None;
    let mut fen = None;

    for cap in header_re.captures_iter(pgn) {
        let key = &cap[1];
        let value = cap[2].to_string();
        match key {
            "White" => metadata.white = value,
            "Black" => metadata.black = value,
            "Result" => metadata.result = value,
            "Date" => metadata.date = Some(value),
            "TimeControl" => metadata.time_control = Some(value),
            "ECO" => metadata.eco = Some(value),
            "Event" => metadata.event = Some(value),
            "Site" | "Link" => metadata.site = Some(value),
            "SetUp" => setup = Some(value),
            "FEN" => fen = Some(value),
            _ => {}
        }
    }

    // A FEN header without SetUp is still honoured; SetUp "0" means the standard start.
    let start_fen = match setup.as_deref() {
        Some("0") => None,
        _ => fen.filter(|f| !f.trim().is_empty()),
    };

    let moves = extract_moves(pgn)?;
    if moves.is_empty() {
        return None;
    }

    Some(GameData {
        metadata,
        moves,
        start_fen,
    })
}

/// Split a PGN file holding several games into one string per game.
///
/// A new game starts at the first header line that follows movetext.
pub fn split_games(text: &str) -> Vec<String> {
    let mut games = Vec::new();
    let mut current = String::new();
    let mut in_movetext = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && in_movetext {
            if !current.trim().is_empty() {
                games.push(std::mem::take(&mut current));
            }
            in_movetext = false;
        }
        if !trimmed.is_empty() && !trimmed.starts_with('[') {
            in_movetext = true;
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.trim().is_empty() {
        games.push(current);
    }
    games
}

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
fn extract_moves(pgn: &str) -> Option<Vec<String>> {
    let header_re = Regex::new(r"\[[^\]]*\]").ok()?;
    let comment_re = Regex::new(r"\{[^}]*\}").ok()?;
    let line_comment_re = Regex::new(r"(?m);.*$").ok()?;
    let variation_re = Regex::new(r"\([^()]*\)").ok()?;
    let move_number_re = Regex::new(r"\d+\.(?:\.\.)?").ok()?;
    let move_re = Regex::new(SAN_PATTERN).ok()?;

    // Comments go first: they may contain brackets and parentheses.
    let no_comments = comment_re.replace_all(pgn, " ");
    let no_comments = line_comment_re.replace_all(&no_comments, " ");
    let no_headers = header_re.replace_all(&no_comments, " ");

    // Strip variations innermost-first until none are left.
    let mut movetext = no_headers.into_owned();
    while variation_re.is_match(&movetext) {
        movetext = variation_re.replace_all(&movetext, " ").into_owned();
    }
    let movetext = move_number_re.replace_all(&movetext, " ");

    Some(
        move_re
            .find_iter(&movetext)
            .map(|m| m.as_str().to_string())
            .collect(),
    )
}
