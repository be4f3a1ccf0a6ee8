use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Point;
use crate::board::BoardSize;
use crate::config::GameConfiguration;
use crate::error::GoError;
use crate::stone::Stone;
use crate::turn::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    ConfigurationNegotiation,
    InGame,
    EndGameNegotiation,
    Finished,
}

impl GamePhase {
    /// Phases in which dead-stone marks may exist.
    pub fn has_marks(&self) -> bool {
        matches!(self, GamePhase::EndGameNegotiation | GamePhase::Finished)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::ConfigurationNegotiation => write!(f, "configuration_negotiation"),
            GamePhase::InGame => write!(f, "in_game"),
            GamePhase::EndGameNegotiation => write!(f, "end_game_negotiation"),
            GamePhase::Finished => write!(f, "finished"),
        }
    }
}

impl std::str::FromStr for GamePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "configuration_negotiation" => Ok(GamePhase::ConfigurationNegotiation),
            "in_game" => Ok(GamePhase::InGame),
            "end_game_negotiation" => Ok(GamePhase::EndGameNegotiation),
            "finished" => Ok(GamePhase::Finished),
            _ => Err(format!("unknown phase: {s}")),
        }
    }
}

/// Transport form of a game. The board is never stored; it is rebuilt from `moves`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub match_id: String,
    pub phase: GamePhase,
    pub turn: Stone,
    pub configuration: GameConfiguration,
    #[serde(default)]
    pub moves: Vec<Move>,
    #[serde(default)]
    pub dead_stones: Vec<Point>,
    /// Colors that accepted the current dead-stone marking.
    #[serde(default)]
    pub marking_done: Vec<Stone>,
}

impl GameRecord {
    /// Most moves a record of the given size may carry.
    pub fn move_limit(size: BoardSize) -> usize {
        4 * size.positions()
    }

    /// Structural checks that do not need a board.
    pub fn validate(&self) -> Result<(), GoError> {
        self.configuration.validate()?;

        let limit = Self::move_limit(self.configuration.board_size);
        if self.moves.len() > limit {
            return Err(GoError::InvalidRecord(format!(
                "{} moves exceed the limit of {limit}",
                self.moves.len()
            )));
        }

        if !self.phase.has_marks() && !(self.dead_stones.is_empty() && self.marking_done.is_empty())
        {
            return Err(GoError::InvalidRecord(format!(
                "dead-stone marks outside end game ({})",
                self.phase
            )));
        }

        let size = self.configuration.board_size.to_int();
        let on_board = |&(col, row): &Point| col < size && row < size;
        if let Some(point) = self
            .moves
            .iter()
            .filter_map(Move::point)
            .chain(self.dead_stones.iter().copied())
            .find(|p| !on_board(p))
        {
            return Err(GoError::InvalidRecord(format!(
                "point {},{} is off a {} board",
                point.0, point.1, self.configuration.board_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameType, Player};
    use serde_json::json;

    fn record() -> GameRecord {
        GameRecord {
            match_id: "m1".to_string(),
            phase: GamePhase::InGame,
            turn: Stone::White,
            configuration: GameConfiguration::new(
                BoardSize::Five,
                GameType::Remote,
                Player::new("a", "A"),
                Player::new("b", "B"),
            ),
            moves: vec![Move::play(2, 2)],
            dead_stones: Vec::new(),
            marking_done: Vec::new(),
        }
    }

    #[test]
    fn phase_round_trips_through_str() {
        for phase in [
            GamePhase::ConfigurationNegotiation,
            GamePhase::InGame,
            GamePhase::EndGameNegotiation,
            GamePhase::Finished,
        ] {
            assert_eq!(phase.to_string().parse::<GamePhase>(), Ok(phase));
        }
        assert!("scoring".parse::<GamePhase>().is_err());
    }

    #[test]
    fn move_limit_scales_with_size() {
        assert_eq!(GameRecord::move_limit(BoardSize::Five), 100);
        assert_eq!(GameRecord::move_limit(BoardSize::Nineteen), 1444);
    }

    #[test]
    fn json_shape() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["phase"], json!("in_game"));
        assert_eq!(value["turn"], json!(-1));
        assert_eq!(value["moves"], json!([{"play": [2, 2]}]));
        assert_eq!(value["dead_stones"], json!([]));
    }

    #[test]
    fn marks_are_optional_in_json() {
        let mut value = serde_json::to_value(record()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("dead_stones");
        obj.remove("marking_done");
        let parsed: GameRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn validate_accepts_valid_record() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn validate_rejects_oversized_history() {
        let mut r = record();
        r.moves = vec![Move::Pass; 101];
        assert!(matches!(r.validate(), Err(GoError::InvalidRecord(_))));
    }

    #[test]
    fn validate_rejects_marks_during_play() {
        let mut r = record();
        r.dead_stones = vec![(2, 2)];
        assert!(r.validate().is_err());
        r.phase = GamePhase::EndGameNegotiation;
        assert!(r.validate().is_ok());
    }

    #[test]
    fn validate_rejects_off_board_points() {
        let mut r = record();
        r.moves.push(Move::play(5, 0));
        assert!(matches!(r.validate(), Err(GoError::InvalidRecord(_))));
    }
}
