use crate::board::{Board, BoardSize};
use crate::error::GoError;
use crate::stone::Stone;
use crate::turn::Move;

/// Board plus the ordered moves that produced it.
///
/// The board is a cache of the move list: `undo` pops the last move and replays the
/// remaining ones onto an empty board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHistory {
    handicap: u8,
    moves: Vec<Move>,
    board: Board,
}

impl GameHistory {
    pub fn new(size: BoardSize, handicap: u8) -> Self {
        Self {
            handicap,
            moves: Vec::new(),
            board: Board::new(size),
        }
    }

    /// Replay `moves` from an empty board. Fails on the first rejected move.
    pub fn with_moves(size: BoardSize, handicap: u8, moves: &[Move]) -> Result<Self, GoError> {
        let mut history = Self::new(size, handicap);
        for (index, &mv) in moves.iter().enumerate() {
            history
                .play(mv)
                .map_err(|_| GoError::Desynchronized { index, mv })?;
        }
        Ok(history)
    }

    // -- Accessors --

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_size(&self) -> BoardSize {
        self.board.size()
    }

    pub fn handicap(&self) -> u8 {
        self.handicap
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn is_last_move_pass(&self) -> bool {
        self.last_move().is_some_and(Move::is_pass)
    }

    /// Both players passed in a row.
    pub fn is_game_over(&self) -> bool {
        matches!(self.moves.as_slice(), [.., a, b] if a.is_pass() && b.is_pass())
    }

    /// White opens handicap games.
    pub fn first_player(&self) -> Stone {
        if self.handicap > 0 {
            Stone::White
        } else {
            Stone::Black
        }
    }

    pub fn current_color(&self) -> Stone {
        self.color_of_move(self.moves.len())
    }

    fn color_of_move(&self, index: usize) -> Stone {
        if index % 2 == 0 {
            self.first_player()
        } else {
            self.first_player().opp()
        }
    }

    // -- Game actions --

    /// Apply `mv` for the player to move. A rejected move leaves the history unchanged.
    pub fn play(&mut self, mv: Move) -> Result<(), GoError> {
        if let Move::Play(point) = mv {
            self.board.play(self.current_color(), point)?;
        }
        self.moves.push(mv);
        Ok(())
    }

    /// Remove the last move and rebuild the board from the remaining ones.
    pub fn undo(&mut self) -> Result<Move, GoError> {
        let last = self.moves.pop().ok_or(GoError::EmptyHistory)?;
        self.rebuild();
        Ok(last)
    }

    /// Drop every move.
    pub fn restart(&mut self) {
        self.moves.clear();
        self.board.empty();
    }

    fn rebuild(&mut self) {
        self.board.empty();
        for index in 0..self.moves.len() {
            if let Move::Play(point) = self.moves[index] {
                let stone = self.color_of_move(index);
                // Every stored move was legal when it was first played.
                let replayed = self.board.play(stone, point);
                debug_assert!(replayed.is_ok(), "stored move {index} failed to replay");
            }
        }
    }
}
