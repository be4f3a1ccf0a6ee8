use serde::Serialize;

use crate::Point;
use crate::bitset::BitSet;
use crate::board::Board;
use crate::error::GoError;
use crate::stone::Stone;

/// Final area count. Komi goes to White.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub black_stones: u32,
    pub white_stones: u32,
    pub komi: f64,
}

impl Score {
    pub fn black_total(&self) -> f64 {
        self.black_stones as f64
    }

    pub fn white_total(&self) -> f64 {
        self.white_stones as f64 + self.komi
    }

    /// `None` on a draw.
    pub fn winner(&self) -> Option<Stone> {
        let diff = self.black_total() - self.white_total();
        if diff > 0.0 {
            Some(Stone::Black)
        } else if diff < 0.0 {
            Some(Stone::White)
        } else {
            None
        }
    }

    pub fn won_by(&self) -> f64 {
        (self.black_total() - self.white_total()).abs()
    }

    pub fn result(&self) -> String {
        format_result(self.black_total(), self.white_total())
    }
}

/// Count the stones left once `dead` is taken off the board.
pub fn area_score(board: &Board, dead: &BitSet, komi: f64) -> Score {
    let alive = board.without(dead);
    Score {
        black_stones: alive.stones(Stone::Black).len() as u32,
        white_stones: alive.stones(Stone::White).len() as u32,
        komi,
    }
}

/// Toggle all stones in the chain at `point` as dead/alive.
///
/// If any stone of the chain is marked, the whole chain is unmarked; otherwise the whole
/// chain is marked. Returns whether the marks changed, which is false on an empty point.
pub fn toggle_dead_chain(board: &Board, dead: &mut BitSet, point: Point) -> Result<bool, GoError> {
    let pos = board.index(point)?;
    let Some(group) = board.group_at(pos) else {
        return Ok(false);
    };
    if dead.intersects(&group.stones) {
        dead.difference_with(&group.stones);
    } else {
        dead.union_with(&group.stones);
    }
    Ok(true)
}

/// Returns "B+{diff}", "W+{diff}", or "Draw".
pub fn format_result(black_score: f64, white_score: f64) -> String {
    let diff = black_score - white_score;
    if diff > 0.0 {
        format!("B+{}", diff)
    } else if diff < 0.0 {
        format!("W+{}", -diff)
    } else {
        "Draw".to_string()
    }
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

    fn marked(board: &Board, dead: &BitSet) -> Vec<Point> {
        dead.iter().map(|pos| board.point(pos)).collect()
    }

    #[test]
    fn format_result_black_wins() {
        assert_eq!(format_result(10.0, 5.5), "B+4.5");
    }

    #[test]
    fn format_result_white_wins() {
        assert_eq!(format_result(5.0, 11.5), "W+6.5");
    }

    #[test]
    fn format_result_draw() {
        assert_eq!(format_result(5.0, 5.0), "Draw");
    }

    #[test]
    fn komi_decides_close_games() {
        let score = Score {
            black_stones: 13,
            white_stones: 12,
            komi: 0.5,
        };
        assert_eq!(score.winner(), Some(Stone::Black));
        assert_eq!(score.won_by(), 0.5);
        assert_eq!(score.result(), "B+0.5");

        let score = Score { komi: 7.5, ..score };
        assert_eq!(score.winner(), Some(Stone::White));
        assert_eq!(score.won_by(), 6.5);

        let score = Score { komi: 1.0, ..score };
        assert_eq!(score.winner(), None);
        assert_eq!(score.result(), "Draw");
    }

    #[test]
    fn area_score_counts_stones() {
        let board = board_from_layout(&["+B+W+", "+B+W+", "+B+W+", "+B+W+", "+BBW+"]);
        let score = area_score(&board, &BitSet::new(), 0.0);
        assert_eq!(score.black_stones, 6);
        assert_eq!(score.white_stones, 5);
    }

    #[test]
    fn area_score_drops_dead_stones() {
        let board = board_from_layout(&["BBBBB", "BBBBB", "BBWBB", "BB+BB", "BBBBB"]);
        let mut dead = BitSet::new();
        assert_eq!(toggle_dead_chain(&board, &mut dead, (2, 2)), Ok(true));
        let score = area_score(&board, &dead, 7.5);
        assert_eq!(score.black_stones, 23);
        assert_eq!(score.white_stones, 0);
        assert_eq!(score.result(), "B+15.5");
        assert_eq!(board.stone_at((2, 2)), Some(Stone::White));
    }

    #[test]
    fn toggle_marks_and_unmarks_whole_chain() {
        let board = board_from_layout(&["+++++", "+BWW+", "+BWW+", "+++++", "+++++"]);
        let mut dead = BitSet::new();
        assert_eq!(toggle_dead_chain(&board, &mut dead, (2, 1)), Ok(true));
        assert_eq!(marked(&board, &dead), vec![(2, 1), (3, 1), (2, 2), (3, 2)]);
        assert_eq!(toggle_dead_chain(&board, &mut dead, (3, 2)), Ok(true));
        assert!(dead.is_empty());
    }

    #[test]
    fn toggle_clears_partially_marked_chain() {
        let board = board_from_layout(&["+++++", "+BB++", "+++++", "+++++", "+++++"]);
        let mut dead = BitSet::single(board.index((1, 1)).unwrap());
        assert_eq!(toggle_dead_chain(&board, &mut dead, (2, 1)), Ok(true));
        assert!(dead.is_empty());
    }

    #[test]
    fn toggle_on_empty_is_noop() {
        let board = Board::new(BoardSize::Five);
        let mut dead = BitSet::new();
        assert_eq!(toggle_dead_chain(&board, &mut dead, (0, 0)), Ok(false));
        assert!(dead.is_empty());
        assert_eq!(
            toggle_dead_chain(&board, &mut dead, (7, 0)),
            Err(GoError::NotOnBoard)
        );
    }
}
