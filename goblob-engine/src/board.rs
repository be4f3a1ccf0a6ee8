//! Incremental Go rules engine.
//!
//! Stones are tracked per color as bitsets; every stone belongs to a group drawn from a
//! small per-color arena of ids, and each group carries its own stone and liberty masks.
//! `play` updates those masks in place (merge, capture, liberty refresh) instead of
//! flood-filling, so a move costs time proportional to the stones it touches.

use std::fmt;
use std::sync::OnceLock;

use arrayvec::ArrayVec;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::Point;
use crate::bitset::BitSet;
use crate::error::GoError;
use crate::stone::Stone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum BoardSize {
    Five = 5,
    Nine = 9,
    Thirteen = 13,
    Nineteen = 19,
}

impl BoardSize {
    pub const ALL: [BoardSize; 4] = [
        BoardSize::Five,
        BoardSize::Nine,
        BoardSize::Thirteen,
        BoardSize::Nineteen,
    ];

    pub fn from_int(v: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.to_int() == v)
    }

    pub fn to_int(self) -> u8 {
        self as u8
    }

    /// Number of intersections.
    pub fn positions(self) -> usize {
        let n = self.to_int() as usize;
        n * n
    }

    fn ordinal(self) -> usize {
        match self {
            BoardSize::Five => 0,
            BoardSize::Nine => 1,
            BoardSize::Thirteen => 2,
            BoardSize::Nineteen => 3,
        }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.to_int();
        write!(f, "{n}x{n}")
    }
}

/// Neighbor table for one board size, built once and shared by every board of that size.
fn neighbor_table(size: BoardSize) -> &'static [ArrayVec<usize, 4>] {
    static TABLES: [OnceLock<Vec<ArrayVec<usize, 4>>>; 4] = [const { OnceLock::new() }; 4];

    TABLES[size.ordinal()].get_or_init(|| {
        let n = size.to_int() as usize;
        (0..n * n)
            .map(|pos| {
                let (x, y) = (pos % n, pos / n);
                let mut result = ArrayVec::new();
                if x > 0 {
                    result.push(pos - 1);
                }
                if y > 0 {
                    result.push(pos - n);
                }
                if x + 1 < n {
                    result.push(pos + 1);
                }
                if y + 1 < n {
                    result.push(pos + n);
                }
                result
            })
            .collect()
    })
}

/// A connected set of same-colored stones and the empty points around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Group {
    pub stones: BitSet,
    pub liberties: BitSet,
}

const NO_GROUP: u16 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: BoardSize,
    black: BitSet,
    white: BitSet,
    /// Group id per position, `NO_GROUP` when empty.
    group_by_position: Vec<u16>,
    /// Group arena. Id 0 is unused, Black owns `1..=slots`, White owns `slots+1..=2*slots`.
    groups: Vec<Group>,
    slots: usize,
}

impl Board {
    pub fn new(size: BoardSize) -> Self {
        let positions = size.positions();
        // See `available_group` for the bound.
        let slots = positions / 2 + 2;
        Board {
            size,
            black: BitSet::new(),
            white: BitSet::new(),
            group_by_position: vec![NO_GROUP; positions],
            groups: vec![Group::default(); 2 * slots + 1],
            slots,
        }
    }

    /// Remove every stone.
    pub fn empty(&mut self) {
        self.black.clear();
        self.white.clear();
        self.group_by_position.fill(NO_GROUP);
        self.groups.fill(Group::default());
    }

    /// Overwrite this board with a deep copy of `other`.
    ///
    /// Boards are copied between instances of one size. A mismatch is a caller bug caught
    /// in debug builds; release builds take on `other`'s size along with its stones.
    pub fn copy_from(&mut self, other: &Board) {
        debug_assert_eq!(self.size, other.size, "copy between boards of different sizes");
        self.clone_from(other);
    }

    // -- Accessors --

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn positions(&self) -> usize {
        self.group_by_position.len()
    }

    pub fn on_board(&self, (col, row): Point) -> bool {
        let n = self.size.to_int();
        col < n && row < n
    }

    pub fn index(&self, point: Point) -> Result<usize, GoError> {
        if !self.on_board(point) {
            return Err(GoError::NotOnBoard);
        }
        Ok(point.1 as usize * self.size.to_int() as usize + point.0 as usize)
    }

    pub fn point(&self, pos: usize) -> Point {
        let n = self.size.to_int() as usize;
        ((pos % n) as u8, (pos / n) as u8)
    }

    pub fn neighbors(&self, pos: usize) -> &'static [usize] {
        &neighbor_table(self.size)[pos]
    }

    pub fn stone_at(&self, point: Point) -> Option<Stone> {
        self.index(point).ok().and_then(|pos| self.stone_at_index(pos))
    }

    pub fn stone_at_index(&self, pos: usize) -> Option<Stone> {
        self.color_of_group(self.group_by_position[pos])
    }

    pub fn stones(&self, stone: Stone) -> &BitSet {
        match stone {
            Stone::Black => &self.black,
            Stone::White => &self.white,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }

    /// The group holding the stone at `pos`, if any.
    pub fn group_at(&self, pos: usize) -> Option<&Group> {
        match self.group_by_position[pos] {
            NO_GROUP => None,
            id => Some(&self.groups[id as usize]),
        }
    }

    /// Every live group on the board with its color.
    pub fn groups(&self) -> impl Iterator<Item = (Stone, &Group)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, g)| !g.stones.is_empty())
            .filter_map(|(id, g)| self.color_of_group(id as u16).map(|c| (c, g)))
    }

    /// Points of the chain containing `point`, empty when the point holds no stone.
    pub fn chain(&self, point: Point) -> Vec<Point> {
        match self.index(point).ok().and_then(|pos| self.group_at(pos)) {
            Some(group) => group.stones.iter().map(|p| self.point(p)).collect(),
            None => Vec::new(),
        }
    }

    pub fn liberties(&self, point: Point) -> Vec<Point> {
        match self.index(point).ok().and_then(|pos| self.group_at(pos)) {
            Some(group) => group.liberties.iter().map(|p| self.point(p)).collect(),
            None => Vec::new(),
        }
    }

    /// Empty intersections in ascending index order.
    pub fn empty_positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.positions()).filter(|&pos| self.group_by_position[pos] == NO_GROUP)
    }

    /// An empty point whose neighbors are all `stone`. Filling it never helps in a playout.
    pub fn is_eye(&self, stone: Stone, pos: usize) -> bool {
        self.group_by_position[pos] == NO_GROUP
            && self
                .neighbors(pos)
                .iter()
                .all(|&n| self.stone_at_index(n) == Some(stone))
    }

    /// Area count: own stones minus opponent stones.
    pub fn score(&self, stone: Stone) -> f64 {
        let diff = self.black.len() as f64 - self.white.len() as f64;
        match stone {
            Stone::Black => diff,
            Stone::White => -diff,
        }
    }

    // -- Game actions --

    /// Place a stone. An illegal move leaves the board untouched.
    pub fn play(&mut self, stone: Stone, point: Point) -> Result<(), GoError> {
        let pos = self.index(point)?;
        self.play_index(stone, pos)
    }

    pub fn play_index(&mut self, stone: Stone, pos: usize) -> Result<(), GoError> {
        self.check_legal(stone, pos)?;
        self.place(stone, pos);
        Ok(())
    }

    pub fn is_legal(&self, stone: Stone, point: Point) -> bool {
        self.index(point)
            .and_then(|pos| self.check_legal(stone, pos))
            .is_ok()
    }

    pub fn is_legal_index(&self, stone: Stone, pos: usize) -> bool {
        self.check_legal(stone, pos).is_ok()
    }

    /// A copy of this board with the stones at `removed` taken off, groups recomputed.
    ///
    /// Removing stones only adds liberties, so re-placing the survivors one by one can
    /// neither capture nor commit suicide.
    pub fn without(&self, removed: &BitSet) -> Board {
        let mut board = Board::new(self.size);
        for stone in Stone::BOTH {
            let mut keep = *self.stones(stone);
            keep.difference_with(removed);
            for pos in &keep {
                board.place(stone, pos);
            }
        }
        board
    }

    /// Legality without mutation: the point must be empty, and after resolving captures
    /// the new stone's group must keep a liberty.
    fn check_legal(&self, stone: Stone, pos: usize) -> Result<(), GoError> {
        if self.group_by_position[pos] != NO_GROUP {
            return Err(GoError::Overwrite);
        }
        for &n in self.neighbors(pos) {
            match self.group_by_position[n] {
                NO_GROUP => return Ok(()),
                id => {
                    let group = &self.groups[id as usize];
                    let friendly = self.color_of_group(id) == Some(stone);
                    // `pos` is always one of the neighbor's liberties.
                    let only_liberty = group.liberties.len() == 1;
                    if friendly != only_liberty {
                        // A friend with another liberty, or a foe this move captures.
                        return Ok(());
                    }
                }
            }
        }
        Err(GoError::Suicide)
    }

    fn place(&mut self, stone: Stone, pos: usize) {
        match stone {
            Stone::Black => self.black.insert(pos),
            Stone::White => self.white.insert(pos),
        }

        let group = self.available_group(stone);
        self.group_by_position[pos] = group;
        self.groups[group as usize] = Group {
            stones: BitSet::single(pos),
            liberties: BitSet::new(),
        };

        for &n in self.neighbors(pos) {
            let neighbor = self.group_by_position[n];
            if neighbor == NO_GROUP {
                self.groups[group as usize].liberties.insert(n);
            } else if self.color_of_group(neighbor) == Some(stone) {
                if neighbor != group {
                    self.merge(group, neighbor);
                }
            } else {
                let foe = &mut self.groups[neighbor as usize];
                foe.liberties.remove(pos);
                if foe.liberties.is_empty() {
                    self.capture(neighbor);
                }
            }
        }

        self.groups[group as usize].liberties.remove(pos);
        debug_assert!(!self.groups[group as usize].liberties.is_empty());
    }

    /// Fold `from` into `into`, relabelling its stones.
    fn merge(&mut self, into: u16, from: u16) {
        let absorbed = std::mem::take(&mut self.groups[from as usize]);
        for pos in &absorbed.stones {
            self.group_by_position[pos] = into;
        }
        let target = &mut self.groups[into as usize];
        target.stones.union_with(&absorbed.stones);
        target.liberties.union_with(&absorbed.liberties);
    }

    fn capture(&mut self, group: u16) {
        let Some(color) = self.color_of_group(group) else {
            return;
        };
        let captured = std::mem::take(&mut self.groups[group as usize]).stones;
        for pos in &captured {
            self.black.remove(pos);
            self.white.remove(pos);
            self.group_by_position[pos] = NO_GROUP;
        }
        for pos in &captured {
            for &n in self.neighbors(pos) {
                let neighbor = self.group_by_position[n];
                if self.color_of_group(neighbor) == Some(color.opp()) {
                    self.groups[neighbor as usize].liberties.insert(pos);
                }
            }
        }
    }

    /// Lowest unused group id for `stone`.
    ///
    /// Same-colored groups are pairwise non-adjacent, so at most `ceil(n²/2)` of them
    /// exist after a move, plus the fresh group of the stone being placed before it
    /// merges. `slots = n²/2 + 2` covers both, so the search always finds a free id.
    fn available_group(&self, stone: Stone) -> u16 {
        let first = match stone {
            Stone::Black => 1,
            Stone::White => self.slots + 1,
        };
        (first..first + self.slots)
            .find(|&id| self.groups[id].stones.is_empty())
            .expect("group arena sized for every legal position") as u16
    }

    fn color_of_group(&self, id: u16) -> Option<Stone> {
        match id as usize {
            0 => None,
            id if id <= self.slots => Some(Stone::Black),
            _ => Some(Stone::White),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size.to_int() as usize;
        for row in 0..n {
            for col in 0..n {
                let ch = match self.stone_at_index(row * n + col) {
                    Some(Stone::Black) => 'X',
                    Some(Stone::White) => 'O',
                    None => '.',
                };
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
