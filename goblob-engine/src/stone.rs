use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;
use std::ops::Neg;

/// Stone color. An empty intersection is `Option::<Stone>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum Stone {
    Black = 1,
    White = -1,
}

impl Stone {
    pub const BOTH: [Stone; 2] = [Stone::Black, Stone::White];

    pub fn opp(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }

    /// Dense index for per-color tables: Black = 0, White = 1.
    pub fn index(self) -> usize {
        match self {
            Stone::Black => 0,
            Stone::White => 1,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Stone::Black => "B",
            Stone::White => "W",
        }
    }
}

impl Neg for Stone {
    type Output = Self;

    fn neg(self) -> Self {
        self.opp()
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stone::Black => write!(f, "Black"),
            Stone::White => write!(f, "White"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent() {
        assert_eq!(Stone::Black.opp(), Stone::White);
        assert_eq!(Stone::White.opp(), Stone::Black);
    }

    #[test]
    fn negation() {
        assert_eq!(-Stone::Black, Stone::White);
        assert_eq!(-Stone::White, Stone::Black);
    }

    #[test]
    fn indices_are_dense() {
        assert_eq!(Stone::Black.index(), 0);
        assert_eq!(Stone::White.index(), 1);
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_value(Stone::Black).unwrap(), 1);
        assert_eq!(serde_json::to_value(Stone::White).unwrap(), -1);
        let back: Stone = serde_json::from_str("-1").unwrap();
        assert_eq!(back, Stone::White);
    }

    #[test]
    fn display() {
        assert_eq!(Stone::Black.to_string(), "Black");
        assert_eq!(Stone::White.letter(), "W");
    }
}
