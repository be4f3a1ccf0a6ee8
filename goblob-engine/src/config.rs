use serde::{Deserialize, Serialize};

use crate::board::BoardSize;
use crate::error::GoError;
use crate::stone::Stone;

pub const DEFAULT_KOMI: f64 = 7.5;
pub const MAX_HANDICAP: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// Both players share one device.
    Local,
    /// One player against the Monte-Carlo search.
    Ai,
    /// Players on different devices exchanging records.
    Remote,
}

impl GameType {
    /// Only remote games negotiate their configuration.
    pub fn negotiates(self) -> bool {
        self == GameType::Remote
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    /// Stones on the board after dead stones are removed.
    #[default]
    Area,
}

fn default_komi() -> f64 {
    DEFAULT_KOMI
}

/// Everything both players must agree on before the first move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfiguration {
    pub board_size: BoardSize,
    #[serde(default)]
    pub handicap: u8,
    #[serde(default = "default_komi")]
    pub komi: f64,
    #[serde(default)]
    pub score_type: ScoreType,
    pub game_type: GameType,
    pub black: Player,
    pub white: Player,
}

impl GameConfiguration {
    pub fn new(board_size: BoardSize, game_type: GameType, black: Player, white: Player) -> Self {
        Self {
            board_size,
            handicap: 0,
            komi: DEFAULT_KOMI,
            score_type: ScoreType::Area,
            game_type,
            black,
            white,
        }
    }

    pub fn with_handicap(mut self, handicap: u8) -> Self {
        self.handicap = handicap;
        self
    }

    pub fn with_komi(mut self, komi: f64) -> Self {
        self.komi = komi;
        self
    }

    pub fn player(&self, stone: Stone) -> &Player {
        match stone {
            Stone::Black => &self.black,
            Stone::White => &self.white,
        }
    }

    pub fn color_of(&self, player_id: &str) -> Option<Stone> {
        Stone::BOTH
            .into_iter()
            .find(|&stone| self.player(stone).id == player_id)
    }

    /// Exchange colors between the two players.
    pub fn swap_players(&mut self) {
        std::mem::swap(&mut self.black, &mut self.white);
    }

    /// White opens handicap games.
    pub fn first_player(&self) -> Stone {
        if self.handicap > 0 {
            Stone::White
        } else {
            Stone::Black
        }
    }

    pub fn validate(&self) -> Result<(), GoError> {
        if !self.komi.is_finite() {
            return Err(GoError::InvalidConfiguration(format!(
                "komi must be finite, got {}",
                self.komi
            )));
        }
        if self.handicap > MAX_HANDICAP {
            return Err(GoError::InvalidConfiguration(format!(
                "handicap {} exceeds {MAX_HANDICAP}",
                self.handicap
            )));
        }
        if self.black.id == self.white.id {
            return Err(GoError::InvalidConfiguration(format!(
                "player {} cannot play both colors",
                self.black.id
            )));
        }
        Ok(())
    }
}
