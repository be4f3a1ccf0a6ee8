//! Turn-based game session shared by local, AI and remote play.
//!
//! A controller walks one game through
//! `ConfigurationNegotiation -> InGame -> EndGameNegotiation -> Finished` and is the only
//! writer of phase, turn and dead-stone marks. Callers re-read its state after every
//! mutator; nothing is broadcast.

use crate::Point;
use crate::bitset::BitSet;
use crate::board::Board;
use crate::config::{GameConfiguration, GameType, Player};
use crate::error::GoError;
use crate::history::GameHistory;
use crate::reconcile::{self, Reconciliation};
use crate::record::{GamePhase, GameRecord};
use crate::score::{self, Score};
use crate::search::{MonteCarlo, SearchConfig};
use crate::stone::Stone;
use crate::turn::Move;

#[derive(Debug, Clone)]
pub struct GameController {
    local_id: String,
    match_id: String,
    phase: GamePhase,
    turn: Stone,
    configuration: GameConfiguration,
    history: GameHistory,
    dead_stones: BitSet,
    /// Acceptance of the current marking, indexed by `Stone::index`.
    marking_done: [bool; 2],
    search: MonteCarlo,
}

impl GameController {
    /// Start a new game proposed by `local_id`.
    ///
    /// Local and AI games start straight in play. Remote games open with the proposal on
    /// the table and the other player to answer it.
    pub fn new(
        local_id: impl Into<String>,
        match_id: impl Into<String>,
        configuration: GameConfiguration,
    ) -> Result<Self, GoError> {
        let local_id = local_id.into();
        configuration.validate()?;
        check_participant(&configuration, &local_id)?;

        let history = GameHistory::new(configuration.board_size, configuration.handicap);
        let (phase, turn) = if configuration.game_type.negotiates() {
            let local = configuration
                .color_of(&local_id)
                .ok_or_else(|| not_a_participant(&local_id))?;
            (GamePhase::ConfigurationNegotiation, local.opp())
        } else {
            (GamePhase::InGame, configuration.first_player())
        };

        Ok(Self {
            local_id,
            match_id: match_id.into(),
            phase,
            turn,
            configuration,
            history,
            dead_stones: BitSet::new(),
            marking_done: [false; 2],
            search: MonteCarlo::default(),
        })
    }

    /// Rebuild a session from its transport form.
    pub fn from_record(local_id: impl Into<String>, record: GameRecord) -> Result<Self, GoError> {
        let local_id = local_id.into();
        record.validate()?;
        check_participant(&record.configuration, &local_id)?;

        let config = &record.configuration;
        let history = GameHistory::with_moves(config.board_size, config.handicap, &record.moves)
            .map_err(|err| GoError::InvalidRecord(err.to_string()))?;
        check_record_state(&record, &history)?;
        let dead_stones = marks_from_points(history.board(), &record.dead_stones)?;

        Ok(Self {
            local_id,
            match_id: record.match_id,
            phase: record.phase,
            turn: record.turn,
            configuration: record.configuration,
            history,
            dead_stones,
            marking_done: done_flags(&record.marking_done),
            search: MonteCarlo::default(),
        })
    }

    /// Start a session from a configuration and the moves already played.
    ///
    /// Phase and turn come from the replayed moves: play continues unless the moves end
    /// in two passes, which resumes dead-stone marking with `dead_stones` marked.
    pub fn with_moves(
        local_id: impl Into<String>,
        match_id: impl Into<String>,
        configuration: GameConfiguration,
        moves: &[Move],
        dead_stones: &[Point],
    ) -> Result<Self, GoError> {
        let history =
            GameHistory::with_moves(configuration.board_size, configuration.handicap, moves)
                .map_err(|err| GoError::InvalidRecord(err.to_string()))?;
        let phase = if history.is_game_over() {
            GamePhase::EndGameNegotiation
        } else {
            GamePhase::InGame
        };
        let record = GameRecord {
            match_id: match_id.into(),
            phase,
            turn: history.current_color(),
            configuration,
            moves: moves.to_vec(),
            dead_stones: dead_stones.to_vec(),
            marking_done: Vec::new(),
        };
        Self::from_record(local_id, record)
    }

    pub fn with_search(mut self, config: SearchConfig) -> Self {
        self.search = MonteCarlo::new(config);
        self
    }

    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            match_id: self.match_id.clone(),
            phase: self.phase,
            turn: self.turn,
            configuration: self.configuration.clone(),
            moves: self.history.moves().to_vec(),
            dead_stones: self.dead_stones(),
            marking_done: Stone::BOTH
                .into_iter()
                .filter(|s| self.marking_done[s.index()])
                .collect(),
        }
    }

    // -- Queries --

    pub fn mode(&self) -> GamePhase {
        self.phase
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn configuration(&self) -> &GameConfiguration {
        &self.configuration
    }

    pub fn history(&self) -> &GameHistory {
        &self.history
    }

    pub fn board(&self) -> &Board {
        self.history.board()
    }

    /// Color whose action the game is waiting for.
    pub fn current_color(&self) -> Stone {
        self.turn
    }

    pub fn current_player(&self) -> &Player {
        self.configuration.player(self.turn)
    }

    pub fn opponent(&self) -> &Player {
        self.configuration.player(self.turn.opp())
    }

    /// Whether this device should act now. Local games share one device, so always.
    pub fn is_local_turn(&self) -> bool {
        self.configuration.game_type == GameType::Local || self.current_player().id == self.local_id
    }

    pub fn is_game_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// Marked points in ascending index order.
    pub fn dead_stones(&self) -> Vec<Point> {
        let board = self.board();
        self.dead_stones.iter().map(|pos| board.point(pos)).collect()
    }

    pub fn is_marking_done(&self, stone: Stone) -> bool {
        self.marking_done[stone.index()]
    }

    // -- Configuration negotiation --

    /// Answer the proposal on the table with `proposal` for the player to move.
    ///
    /// An identical proposal is agreement and starts play; returns `true`. Anything else
    /// is a counter-proposal that replaces the configuration and hands the turn to the
    /// other player; returns `false`.
    pub fn propose_configuration(&mut self, proposal: GameConfiguration) -> Result<bool, GoError> {
        self.expect_phase(GamePhase::ConfigurationNegotiation)?;
        proposal.validate()?;
        if proposal.game_type != self.configuration.game_type {
            return Err(GoError::InvalidConfiguration(
                "game type cannot change during negotiation".to_string(),
            ));
        }

        let proposer = self.current_player().id.clone();
        let opponent = self.opponent().id.clone();
        let (Some(proposer_color), Some(_)) =
            (proposal.color_of(&proposer), proposal.color_of(&opponent))
        else {
            return Err(GoError::InvalidConfiguration(
                "players cannot change during negotiation".to_string(),
            ));
        };

        if proposal == self.configuration {
            self.turn = self.configuration.first_player();
            let config = &self.configuration;
            self.history = GameHistory::new(config.board_size, config.handicap);
            self.set_phase(GamePhase::InGame);
            return Ok(true);
        }

        self.history = GameHistory::new(proposal.board_size, proposal.handicap);
        self.configuration = proposal;
        self.turn = proposer_color.opp();
        tracing::debug!(match_id = %self.match_id, proposer = %proposer, "counter-proposal");
        Ok(false)
    }

    // -- Play --

    /// Play `mv` for the color to move. An illegal move changes nothing.
    pub fn play_move(&mut self, mv: Move) -> Result<(), GoError> {
        self.expect_phase(GamePhase::InGame)?;
        let limit = GameRecord::move_limit(self.configuration.board_size);
        if self.history.len() >= limit {
            return Err(GoError::HistoryFull { limit });
        }

        self.history.play(mv)?;
        self.turn = self.history.current_color();
        if self.history.is_game_over() {
            self.dead_stones.clear();
            self.marking_done = [false; 2];
            self.set_phase(GamePhase::EndGameNegotiation);
        }
        Ok(())
    }

    /// Monte-Carlo suggestion for the color to move.
    pub fn suggest_move(&self, iterations: usize) -> Result<Move, GoError> {
        self.expect_phase(GamePhase::InGame)?;
        Ok(self.search.best_move(&self.history, iterations))
    }

    // -- End game --

    /// Toggle the chain at `point` between dead and alive. The turn does not change;
    /// every earlier acceptance is withdrawn when the marks change.
    pub fn toggle_dead_stone(&mut self, point: Point) -> Result<bool, GoError> {
        self.expect_phase(GamePhase::EndGameNegotiation)?;
        let changed = score::toggle_dead_chain(self.history.board(), &mut self.dead_stones, point)?;
        if changed {
            self.marking_done = [false; 2];
        }
        Ok(changed)
    }

    /// The player to move accepts the current marking. Once both colors have accepted the
    /// same marking the game is finished; otherwise the other player decides next.
    pub fn marking_turn_done(&mut self) -> Result<(), GoError> {
        self.expect_phase(GamePhase::EndGameNegotiation)?;
        self.marking_done[self.turn.index()] = true;
        if self.marking_done.iter().all(|&done| done) {
            self.set_phase(GamePhase::Finished);
        } else {
            self.turn = self.turn.opp();
        }
        Ok(())
    }

    pub fn score(&self) -> Result<Score, GoError> {
        self.expect_phase(GamePhase::Finished)?;
        Ok(score::area_score(
            self.history.board(),
            &self.dead_stones,
            self.configuration.komi,
        ))
    }

    // -- Remote updates --

    /// Adopt an authoritative record for this match.
    ///
    /// Moves are converged with the minimal undo/replay; phase, turn, configuration and
    /// marks are then taken from the record once they agree with the converged moves.
    /// Any error leaves the session unchanged.
    pub fn reconcile(&mut self, record: GameRecord) -> Result<Reconciliation, GoError> {
        record.validate()?;
        if record.match_id != self.match_id {
            return Err(GoError::InvalidRecord(format!(
                "record for match {} applied to match {}",
                record.match_id, self.match_id
            )));
        }
        check_participant(&record.configuration, &self.local_id)?;

        let config = &record.configuration;
        let mut history = if config.board_size == self.history.board_size()
            && config.handicap == self.history.handicap()
        {
            self.history.clone()
        } else {
            GameHistory::new(config.board_size, config.handicap)
        };
        let result = reconcile::reconcile(&mut history, &record.moves)?;
        check_record_state(&record, &history)?;
        let dead_stones = marks_from_points(history.board(), &record.dead_stones)?;

        self.history = history;
        self.dead_stones = dead_stones;
        self.marking_done = done_flags(&record.marking_done);
        self.configuration = record.configuration;
        self.turn = record.turn;
        if record.phase != self.phase {
            self.set_phase(record.phase);
        }
        Ok(result)
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<(), GoError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GoError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn set_phase(&mut self, phase: GamePhase) {
        tracing::debug!(match_id = %self.match_id, from = %self.phase, to = %phase, "phase changed");
        self.phase = phase;
    }
}

/// Non-local games must name the local player on one side.
fn check_participant(config: &GameConfiguration, local_id: &str) -> Result<(), GoError> {
    if config.game_type == GameType::Local || config.color_of(local_id).is_some() {
        Ok(())
    } else {
        Err(not_a_participant(local_id))
    }
}

/// Phase and turn must agree with the moves they were recorded with.
fn check_record_state(record: &GameRecord, history: &GameHistory) -> Result<(), GoError> {
    let over = history.is_game_over();
    let problem = match record.phase {
        GamePhase::ConfigurationNegotiation if !history.is_empty() => {
            format!("{} moves played before configuration agreement", history.len())
        }
        GamePhase::InGame if over => "moves end in two passes but play continues".to_string(),
        GamePhase::InGame if record.turn != history.current_color() => format!(
            "{} to play after {} moves, record says {}",
            history.current_color(),
            history.len(),
            record.turn
        ),
        GamePhase::EndGameNegotiation | GamePhase::Finished if !over => {
            format!("{} without two closing passes", record.phase)
        }
        _ => return Ok(()),
    };
    Err(GoError::InvalidRecord(problem))
}

fn not_a_participant(local_id: &str) -> GoError {
    GoError::InvalidConfiguration(format!("{local_id} does not play in this game"))
}

fn marks_from_points(board: &Board, points: &[Point]) -> Result<BitSet, GoError> {
    let mut marks = BitSet::new();
    for &point in points {
        let pos = board
            .index(point)
            .map_err(|err| GoError::InvalidRecord(err.to_string()))?;
        if board.stone_at_index(pos).is_none() {
            return Err(GoError::InvalidRecord(format!(
                "dead stone at empty point {},{}",
                point.0, point.1
            )));
        }
        marks.insert(pos);
    }
    Ok(marks)
}

fn done_flags(colors: &[Stone]) -> [bool; 2] {
    let mut flags = [false; 2];
    for stone in colors {
        flags[stone.index()] = true;
    }
    flags
}
