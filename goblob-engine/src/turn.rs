use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Point;

/// A single move in a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Play(Point),
    Pass,
}

impl Move {
    pub fn play(col: u8, row: u8) -> Self {
        Move::Play((col, row))
    }

    pub fn is_play(&self) -> bool {
        matches!(self, Move::Play(_))
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Move::Pass)
    }

    pub fn point(&self) -> Option<Point> {
        match self {
            Move::Play(point) => Some(*point),
            Move::Pass => None,
        }
    }
}

impl std::str::FromStr for Move {
    type Err = String;

    /// Parses `pass` or `col,row`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "pass" {
            return Ok(Move::Pass);
        }
        let (col, row) = s.split_once(',').ok_or_else(|| format!("invalid move: {s}"))?;
        let col = col.trim().parse().map_err(|_| format!("invalid column: {s}"))?;
        let row = row.trim().parse().map_err(|_| format!("invalid row: {s}"))?;
        Ok(Move::Play((col, row)))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Play((col, row)) => write!(f, "{col},{row}"),
            Move::Pass => write!(f, "pass"),
        }
    }
}
