use std::fmt;

use crate::record::GamePhase;
use crate::turn::Move;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoError {
    /// The intersection already holds a stone.
    Overwrite,
    Suicide,
    NotOnBoard,
    EmptyHistory,
    HistoryFull { limit: usize },
    WrongPhase { expected: GamePhase, actual: GamePhase },
    /// A move from an authoritative list was rejected by the local board.
    Desynchronized { index: usize, mv: Move },
    InvalidConfiguration(String),
    InvalidRecord(String),
}

impl fmt::Display for GoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoError::Overwrite => write!(f, "overwrite"),
            GoError::Suicide => write!(f, "suicide"),
            GoError::NotOnBoard => write!(f, "not on board"),
            GoError::EmptyHistory => write!(f, "empty history"),
            GoError::HistoryFull { limit } => write!(f, "history full ({limit} moves)"),
            GoError::WrongPhase { expected, actual } => {
                write!(f, "wrong phase: expected {expected}, got {actual}")
            }
            GoError::Desynchronized { index, mv } => {
                write!(f, "state desynchronized: move {index} ({mv}) rejected")
            }
            GoError::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
            GoError::InvalidRecord(msg) => write!(f, "invalid record: {msg}"),
        }
    }
}

impl std::error::Error for GoError {}

impl GoError {
    /// Illegal-move errors are recoverable: the caller may simply try another move.
    pub fn is_illegal_move(&self) -> bool {
        matches!(
            self,
            GoError::Overwrite | GoError::Suicide | GoError::NotOnBoard
        )
    }
}
