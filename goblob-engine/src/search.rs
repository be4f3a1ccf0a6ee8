//! Flat Monte-Carlo move search.
//!
//! Every legal move (and pass) is a candidate. The iteration budget is split evenly
//! across candidates, each candidate's playouts run on their own board clone, and the
//! candidate with the best mean final score wins. Candidates share nothing, so they are
//! evaluated in parallel with rayon; every candidate seeds its own RNG from the search
//! seed and its index, which keeps results independent of thread scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::history::GameHistory;
use crate::stone::Stone;
use crate::turn::Move;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Chance that a playout turn passes instead of playing.
    pub pass_probability: f64,
    /// Playouts stop after `move_limit_factor * size²` moves.
    pub move_limit_factor: usize,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pass_probability: 0.02,
            move_limit_factor: 3,
            seed: 0x5E41_DEAD,
        }
    }
}

/// Accumulated playout results for one first move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub mv: Move,
    pub playouts: usize,
    pub total_score: f64,
}

impl Candidate {
    pub fn mean(&self) -> Option<f64> {
        (self.playouts > 0).then(|| self.total_score / self.playouts as f64)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonteCarlo {
    config: SearchConfig,
}

impl MonteCarlo {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Best move for the player to move in `history`.
    pub fn best_move(&self, history: &GameHistory, iterations: usize) -> Move {
        self.best_move_on(history.board(), history.current_color(), iterations)
    }

    pub fn best_move_on(&self, board: &Board, to_move: Stone, iterations: usize) -> Move {
        let legal = legal_moves(board, to_move);
        match legal.as_slice() {
            [] => return Move::Pass,
            [only] => return Move::Play(board.point(*only)),
            _ => {}
        }

        let candidates = self.evaluate(board, to_move, iterations);
        let mut best: Option<(Move, f64)> = None;
        // Candidates come in index order with pass last, so a strict comparison keeps
        // the lowest index on ties.
        for candidate in &candidates {
            let Some(mean) = candidate.mean() else {
                continue;
            };
            if best.is_none_or(|(_, m)| mean > m) {
                best = Some((candidate.mv, mean));
            }
        }
        let mv = best.map_or(Move::Pass, |(mv, _)| mv);
        tracing::debug!(
            candidates = candidates.len(),
            iterations,
            best = %mv,
            "monte carlo search finished"
        );
        mv
    }

    /// Run the budgeted playouts for every candidate, in candidate order.
    pub fn evaluate(&self, board: &Board, to_move: Stone, iterations: usize) -> Vec<Candidate> {
        let moves: Vec<Option<usize>> = legal_moves(board, to_move)
            .into_iter()
            .map(Some)
            .chain(std::iter::once(None))
            .collect();
        let per_candidate = iterations / moves.len();
        let remainder = iterations % moves.len();

        moves
            .par_iter()
            .enumerate()
            .map(|(index, &first)| {
                let budget = per_candidate + usize::from(index < remainder);
                let mut rng = fastrand::Rng::with_seed(
                    self.config
                        .seed
                        .wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
                );
                let mut total_score = 0.0;
                for _ in 0..budget {
                    total_score += self.simulate(board, to_move, first, &mut rng);
                }
                Candidate {
                    mv: first.map_or(Move::Pass, |pos| Move::Play(board.point(pos))),
                    playouts: budget,
                    total_score,
                }
            })
            .collect()
    }

    /// Play `first` then random moves to the end, scoring for `to_move`.
    fn simulate(
        &self,
        board: &Board,
        to_move: Stone,
        first: Option<usize>,
        rng: &mut fastrand::Rng,
    ) -> f64 {
        let mut board = board.clone();
        let mut passes = 0;
        match first {
            Some(pos) => {
                if board.play_index(to_move, pos).is_err() {
                    return board.score(to_move);
                }
            }
            None => passes = 1,
        }

        let limit = self.config.move_limit_factor * board.positions();
        let mut color = to_move.opp();
        let mut moves = 0;
        while passes < 2 && moves < limit {
            let played =
                rng.f64() >= self.config.pass_probability && play_random(&mut board, color, rng);
            passes = if played { 0 } else { passes + 1 };
            color = color.opp();
            moves += 1;
        }

        board.score(to_move)
    }
}

/// Best move with the default search configuration.
pub fn best_move(history: &GameHistory, iterations: usize) -> Move {
    MonteCarlo::default().best_move(history, iterations)
}

fn legal_moves(board: &Board, stone: Stone) -> Vec<usize> {
    board
        .empty_positions()
        .filter(|&pos| board.is_legal_index(stone, pos))
        .collect()
}

/// Play a uniformly random legal move that does not fill one of `color`'s own eyes.
/// Returns false when no such move exists.
fn play_random(board: &mut Board, color: Stone, rng: &mut fastrand::Rng) -> bool {
    let mut empty: Vec<usize> = board.empty_positions().collect();
    while !empty.is_empty() {
        let v = empty.swap_remove(rng.usize(..empty.len()));
        if !board.is_eye(color, v) && board.play_index(color, v).is_ok() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardSize;

    fn board_from_layout(layout: &[&str]) -> Board {
        let size = BoardSize::from_int(layout.len() as u8).unwrap();
        let mut board = Board::new(size);
        for (row, line) in layout.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                let stone = match c {
                    'B' => Stone::Black,
                    'W' => Stone::White,
                    _ => continue,
                };
                board.play(stone, (col as u8, row as u8)).unwrap();
            }
        }
        board
    }

    #[test]
    fn budget_is_split_evenly_with_remainder_first() {
        // Three legal points for Black plus pass.
        let board = board_from_layout(&["+B+BW", "BB+BW", "BBBBW", "WWWWW", "+W+W+"]);
        let legal = legal_moves(&board, Stone::Black);
        let search = MonteCarlo::default();
        let candidates = search.evaluate(&board, Stone::Black, 10);
        assert_eq!(candidates.len(), legal.len() + 1);
        let budgets: Vec<usize> = candidates.iter().map(|c| c.playouts).collect();
        assert_eq!(budgets.iter().sum::<usize>(), 10);
        let base = 10 / candidates.len();
        let extra = 10 % candidates.len();
        for (i, b) in budgets.iter().enumerate() {
            assert_eq!(*b, base + usize::from(i < extra));
        }
        assert_eq!(candidates.last().map(|c| c.mv), Some(Move::Pass));
    }

    #[test]
    fn returns_pass_without_legal_moves() {
        // Every empty point is a black eye that White cannot fill.
        let board = board_from_layout(&["+B+B+", "BBBBB", "+B+B+", "BBBBB", "+B+B+"]);
        let search = MonteCarlo::default();
        assert_eq!(search.best_move_on(&board, Stone::White, 100), Move::Pass);
    }

    #[test]
    fn returns_only_legal_move() {
        // White's only move captures the whole black group through its last liberty.
        let board = board_from_layout(&["+BBBB", "BBBBB", "BBBBB", "BBBBB", "BBBBB"]);
        assert_eq!(legal_moves(&board, Stone::White), vec![0]);
        for iterations in [1, 2, 50] {
            assert_eq!(best_move_for(&board, Stone::White, iterations), Move::play(0, 0));
        }
        assert_eq!(best_move_for(&board, Stone::Black, 10), Move::Pass);
    }

    fn best_move_for(board: &Board, stone: Stone, iterations: usize) -> Move {
        MonteCarlo::default().best_move_on(board, stone, iterations)
    }

    #[test]
    fn search_is_deterministic() {
        let board = board_from_layout(&["+++++", "+B+++", "++W++", "+++++", "+++++"]);
        let a = MonteCarlo::default().evaluate(&board, Stone::Black, 200);
        let b = MonteCarlo::default().evaluate(&board, Stone::Black, 200);
        assert_eq!(a, b);
    }

    #[test]
    fn search_leaves_input_untouched() {
        let board = board_from_layout(&["+++++", "+B+++", "++W++", "+++++", "+++++"]);
        let before = board.clone();
        let _ = MonteCarlo::default().best_move_on(&board, Stone::Black, 100);
        assert_eq!(board, before);
    }

    #[test]
    fn capture_outscores_pass() {
        // White's lone stone at (4,0) hangs on (4,1). Every Black line ends with the
        // capture, passing first does not.
        let board = board_from_layout(&["BBBBW", "BBBB+", "BBBBB", "BBBBB", "BBB++"]);
        let search = MonteCarlo::new(SearchConfig {
            pass_probability: 0.0,
            ..SearchConfig::default()
        });
        let candidates = search.evaluate(&board, Stone::Black, 40);
        let capture = candidates[0];
        let pass = candidates[candidates.len() - 1];
        assert_eq!(capture.mv, Move::play(4, 1));
        assert_eq!(capture.mean(), Some(23.0));
        assert_eq!(pass.mean(), Some(20.0));
        assert_eq!(search.best_move_on(&board, Stone::Black, 40), Move::play(4, 1));
    }

    #[test]
    fn ties_go_to_lowest_index() {
        // Playouts always pass, so every first stone scores exactly 1.
        let board = Board::new(BoardSize::Five);
        let search = MonteCarlo::new(SearchConfig {
            pass_probability: 1.0,
            ..SearchConfig::default()
        });
        let candidates = search.evaluate(&board, Stone::Black, 26);
        assert!(candidates.iter().all(|c| c.playouts == 1));
        assert!(candidates[..25].iter().all(|c| c.mean() == Some(1.0)));
        assert_eq!(candidates[25].mean(), Some(0.0));
        assert_eq!(search.best_move_on(&board, Stone::Black, 26), Move::play(0, 0));
    }

    #[test]
    fn candidate_mean() {
        let c = Candidate {
            mv: Move::Pass,
            playouts: 4,
            total_score: 10.0,
        };
        assert_eq!(c.mean(), Some(2.5));
        let empty = Candidate { playouts: 0, ..c };
        assert_eq!(empty.mean(), None);
    }

    #[test]
    fn playout_terminates_on_empty_board() {
        let board = Board::new(BoardSize::Nine);
        let search = MonteCarlo::default();
        let mut rng = fastrand::Rng::with_seed(7);
        let score = search.simulate(&board, Stone::Black, None, &mut rng);
        assert!(score.abs() <= 81.0);
    }
}
