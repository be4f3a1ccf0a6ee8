pub mod bitset;
pub mod board;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod reconcile;
pub mod record;
pub mod score;
pub mod search;
pub mod stone;
pub mod turn;

/// Board coordinate as `(column, row)`, origin top-left.
pub type Point = (u8, u8);

pub use bitset::BitSet;
pub use board::{Board, BoardSize, Group};
pub use config::{GameConfiguration, GameType, Player, ScoreType};
pub use controller::GameController;
pub use error::GoError;
pub use history::GameHistory;
pub use reconcile::{Reconciliation, reconcile};
pub use record::{GamePhase, GameRecord};
pub use score::Score;
pub use search::{MonteCarlo, SearchConfig};
pub use stone::Stone;
pub use turn::Move;
