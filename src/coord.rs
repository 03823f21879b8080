use std::fmt;
use std::ops;

use itertools::Itertools;

use crate::error::ChessError;
use crate::force::Force;


pub const NUM_ROWS: u8 = 8;
pub const NUM_COLS: u8 = 8;


// Row from a force's point of view: row 1 is the back rank of that force.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct SubjectiveRow {
    idx: u8,  // 0-based
}

impl SubjectiveRow {
    pub const fn from_one_based(idx: u8) -> Self {
        assert!(idx >= 1 && idx <= NUM_ROWS);
        Self { idx: idx - 1 }
    }
    pub fn to_row(self, force: Force) -> Row {
        match force {
            Force::White => Row::from_zero_based(self.idx),
            Force::Black => Row::from_zero_based(NUM_ROWS - self.idx - 1),
        }
    }
}


// Rank.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Row {
    idx: u8,  // 0-based
}

impl Row {
    pub const fn from_zero_based(idx: u8) -> Self {
        assert!(idx < NUM_ROWS);
        Self { idx }
    }
    pub fn try_from_zero_based(idx: i8) -> Option<Self> {
        (0..NUM_ROWS as i8).contains(&idx).then(|| Self { idx: idx as u8 })
    }
    pub fn from_algebraic(ch: char) -> Option<Self> {
        ('1'..='8').contains(&ch).then(|| Self { idx: ch as u8 - b'1' })
    }
    pub const fn to_zero_based(self) -> u8 { self.idx }
    pub const fn to_algebraic(self) -> char { (self.idx + b'1') as char }
    pub fn all() -> impl Iterator<Item = Self> + Clone { (0..NUM_ROWS).map(Self::from_zero_based) }
}

impl ops::Sub for Row {
    type Output = i8;
    fn sub(self, other: Self) -> Self::Output {
        (self.to_zero_based() as i8) - (other.to_zero_based() as i8)
    }
}


// File.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Col {
    idx: u8,  // 0-based
}

impl Col {
    pub const A: Col = Col::from_zero_based(0);
    pub const B: Col = Col::from_zero_based(1);
    pub const C: Col = Col::from_zero_based(2);
    pub const D: Col = Col::from_zero_based(3);
    pub const E: Col = Col::from_zero_based(4);
    pub const F: Col = Col::from_zero_based(5);
    pub const G: Col = Col::from_zero_based(6);
    pub const H: Col = Col::from_zero_based(7);

    pub const fn from_zero_based(idx: u8) -> Self {
        assert!(idx < NUM_COLS);
        Self { idx }
    }
    pub fn try_from_zero_based(idx: i8) -> Option<Self> {
        (0..NUM_COLS as i8).contains(&idx).then(|| Self { idx: idx as u8 })
    }
    pub fn from_algebraic(ch: char) -> Option<Self> {
        ('a'..='h').contains(&ch).then(|| Self { idx: ch as u8 - b'a' })
    }
    pub const fn to_zero_based(self) -> u8 { self.idx }
    pub const fn to_algebraic(self) -> char { (self.idx + b'a') as char }
    pub fn all() -> impl Iterator<Item = Self> + Clone { (0..NUM_COLS).map(Self::from_zero_based) }
}

impl ops::Sub for Col {
    type Output = i8;
    fn sub(self, other: Self) -> Self::Output {
        (self.to_zero_based() as i8) - (other.to_zero_based() as i8)
    }
}


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub row: Row,
    pub col: Col,
}

impl Coord {
    pub const fn new(row: Row, col: Col) -> Self { Self { row, col } }

    // Zero-based (file, rank), e.g. (0, 0) is a1 and (4, 3) is e4.
    pub fn from_file_rank(file: i8, rank: i8) -> Result<Self, ChessError> {
        match (Col::try_from_zero_based(file), Row::try_from_zero_based(rank)) {
            (Some(col), Some(row)) => Ok(Coord { row, col }),
            _ => Err(ChessError::OutOfRange { file, rank }),
        }
    }
    pub fn file(self) -> u8 { self.col.to_zero_based() }
    pub fn rank(self) -> u8 { self.row.to_zero_based() }

    // Accepts exactly a lowercase file letter followed by a rank digit: "a1" ..= "h8".
    pub fn from_algebraic(s: &str) -> Result<Self, ChessError> {
        let invalid = || ChessError::InvalidName(s.to_owned());
        let (col, row): (char, char) = s.chars().collect_tuple().ok_or_else(invalid)?;
        let col = Col::from_algebraic(col).ok_or_else(invalid)?;
        let row = Row::from_algebraic(row).ok_or_else(invalid)?;
        Ok(Coord { row, col })
    }
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.col.to_algebraic(), self.row.to_algebraic())
    }

    pub fn all() -> impl Iterator<Item = Coord> + Clone {
        Row::all().cartesian_product(Col::all()).map(|(row, col)| Coord { row, col })
    }

    pub fn offset(self, (d_row, d_col): (i8, i8)) -> Option<Coord> {
        let row = Row::try_from_zero_based(self.row.to_zero_based() as i8 + d_row)?;
        let col = Col::try_from_zero_based(self.col.to_zero_based() as i8 + d_col)?;
        Some(Coord { row, col })
    }

    const fn from_const_name(name: &str) -> Coord {
        let bytes = name.as_bytes();
        assert!(bytes.len() == 2);
        Coord::new(Row::from_zero_based(bytes[1] - b'1'), Col::from_zero_based(bytes[0] - b'A'))
    }
}

// Panics if the result is off the board. Only use when the target is known to exist.
impl ops::Add<(i8, i8)> for Coord {
    type Output = Self;
    fn add(self, other: (i8, i8)) -> Self::Output {
        self.offset(other)
            .unwrap_or_else(|| panic!("{self:?} + {other:?} is outside the board"))
    }
}

impl ops::Sub for Coord {
    type Output = (i8, i8);
    fn sub(self, other: Self) -> Self::Output { (self.row - other.row, self.col - other.col) }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.col.to_algebraic(), self.row.to_algebraic())
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Coord({self})") }
}


macro_rules! square_constants {
    ($($name:ident)*) => {
        impl Coord {
            $(pub const $name: Coord = Coord::from_const_name(stringify!($name));)*
        }
    };
}

square_constants! {
    A1 A2 A3 A4 A5 A6 A7 A8
    B1 B2 B3 B4 B5 B6 B7 B8
    C1 C2 C3 C4 C5 C6 C7 C8
    D1 D2 D3 D4 D5 D6 D7 D8
    E1 E2 E3 E4 E5 E6 E7 E8
    F1 F2 F3 F4 F5 F6 F7 F8
    G1 G2 G3 G4 G5 G6 G7 G8
    H1 H2 H3 H4 H5 H6 H7 H8
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        assert_eq!(Coord::all().count(), 64);
        for coord in Coord::all() {
            assert_eq!(Coord::from_algebraic(&coord.to_algebraic()), Ok(coord));
        }
        assert_eq!(Coord::E4.to_algebraic(), "e4");
        assert_eq!(Coord::from_algebraic("h8"), Ok(Coord::H8));
    }

    #[test]
    fn invalid_names() {
        for name in ["", "a", "a10", "i1", "a9", "a0", "A1", "1a", "e4 ", "ё4"] {
            assert_eq!(Coord::from_algebraic(name), Err(ChessError::InvalidName(name.to_owned())));
        }
    }

    #[test]
    fn file_rank() {
        assert_eq!(Coord::from_file_rank(0, 0), Ok(Coord::A1));
        assert_eq!(Coord::from_file_rank(4, 3), Ok(Coord::E4));
        assert_eq!(Coord::from_file_rank(7, 7), Ok(Coord::H8));
        assert_eq!(Coord::from_file_rank(8, 0), Err(ChessError::OutOfRange { file: 8, rank: 0 }));
        assert_eq!(Coord::from_file_rank(0, -1), Err(ChessError::OutOfRange { file: 0, rank: -1 }));
        assert_eq!(Coord::E4.file(), 4);
        assert_eq!(Coord::E4.rank(), 3);
    }

    #[test]
    fn offset() {
        assert_eq!(Coord::E4.offset((1, -1)), Some(Coord::D5));
        assert_eq!(Coord::A1.offset((-1, 0)), None);
        assert_eq!(Coord::H8.offset((0, 1)), None);
        assert_eq!(Coord::B1 + (2, 1), Coord::C3);
        assert_eq!(Coord::C3 - Coord::B1, (2, 1));
    }

    #[test]
    fn subjective_row() {
        assert_eq!(SubjectiveRow::from_one_based(2).to_row(Force::White), Row::from_zero_based(1));
        assert_eq!(SubjectiveRow::from_one_based(2).to_row(Force::Black), Row::from_zero_based(6));
    }
}
