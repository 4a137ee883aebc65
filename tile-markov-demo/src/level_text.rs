//! Text export of a level: every tile contributes one piece to each of 8 rows.

use std::collections::HashMap;
use std::path::Path;

use tile_markov_core::error::Result;
use tile_markov_core::io::read_text;
use tile_markov_core::model::Symbol;

/// Number of text rows a tile is drawn on.
pub const ROWS: usize = 8;

/// Piece written for a tile without a pattern, or for an empty row.
const FALLBACK_PIECE: &str = "0";

/// Row patterns of each tile type.
#[derive(Debug, Default)]
pub struct TilePatterns {
    patterns: HashMap<Symbol, Vec<String>>,
}

impl TilePatterns {
    /// Reads patterns from a file. See `parse` for the format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::parse(&read_text(path)?))
    }

    /// Parses one tile per line: `<tile>: <row0> <row1> ... <row7>`.
    ///
    /// Blank lines and lines starting with `#` are ignored. Lines without
    /// exactly 8 rows or with a bad tile number are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut patterns = HashMap::new();

        for (number, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((tile, rows)) = line.split_once(':') else {
                log::warn!("pattern line {number}: missing ':'");
                continue;
            };
            let Ok(tile) = tile.trim().parse::<Symbol>() else {
                log::warn!("pattern line {number}: bad tile number {:?}", tile.trim());
                continue;
            };
            let rows: Vec<String> = rows.split_whitespace().map(str::to_owned).collect();
            if rows.len() != ROWS {
                log::warn!("pattern line {number}: expected {ROWS} rows, got {}", rows.len());
                continue;
            }
            patterns.insert(tile, rows);
        }

        Self { patterns }
    }

    /// Renders `history` as 8 lines, each ending with a newline.
    ///
    /// An empty history renders as an empty string.
    pub fn render(&self, history: &[Symbol]) -> String {
        if history.is_empty() {
            return String::new();
        }

        let mut rows = vec![String::new(); ROWS];
        for tile in history {
            match self.patterns.get(tile) {
                Some(pattern) => {
                    for (row, piece) in rows.iter_mut().zip(pattern) {
                        row.push_str(if piece.is_empty() { FALLBACK_PIECE } else { piece.as_str() });
                    }
                }
                None => rows.iter_mut().for_each(|row| row.push_str(FALLBACK_PIECE)),
            }
        }

        rows.into_iter().map(|row| row + "\n").collect()
    }
}
