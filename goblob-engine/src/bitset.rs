//! Fixed-capacity bitset over board positions.
//!
//! Sized for the largest supported board (19x19 = 361 positions), so a single
//! type serves every board size and stays `Copy`. Bits past `size²` are never set.

const WORD_BITS: usize = u64::BITS as usize;

/// Largest number of positions a board can have.
pub const MAX_POSITIONS: usize = 19 * 19;

const WORDS: usize = MAX_POSITIONS.div_ceil(WORD_BITS);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitSet {
    words: [u64; WORDS],
}

impl BitSet {
    pub const fn new() -> Self {
        BitSet { words: [0; WORDS] }
    }

    pub fn single(pos: usize) -> Self {
        let mut set = Self::new();
        set.insert(pos);
        set
    }

    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        self.words[pos / WORD_BITS] & (1u64 << (pos % WORD_BITS)) != 0
    }

    #[inline]
    pub fn insert(&mut self, pos: usize) {
        self.words[pos / WORD_BITS] |= 1u64 << (pos % WORD_BITS);
    }

    #[inline]
    pub fn remove(&mut self, pos: usize) {
        self.words[pos / WORD_BITS] &= !(1u64 << (pos % WORD_BITS));
    }

    /// Flip membership of `pos`, returning whether it is now present.
    pub fn toggle(&mut self, pos: usize) -> bool {
        self.words[pos / WORD_BITS] ^= 1u64 << (pos % WORD_BITS);
        self.contains(pos)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn clear(&mut self) {
        self.words = [0; WORDS];
    }

    pub fn union_with(&mut self, other: &BitSet) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= b;
        }
    }

    pub fn difference_with(&mut self, other: &BitSet) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a &= !b;
        }
    }

    pub fn intersects(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Positions in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            index: 0,
            current: self.words[0],
        }
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::new();
        for pos in iter {
            set.insert(pos);
        }
        set
    }
}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a> {
    words: &'a [u64; WORDS],
    index: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.index += 1;
            if self.index >= WORDS {
                return None;
            }
            self.current = self.words[self.index];
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.index * WORD_BITS + bit)
    }
}
