use derive_new::new;
use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::coord::Coord;
use crate::force::Force;


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, EnumIter, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, EnumIter, Serialize, Deserialize)]
pub enum CastleDirection {
    ASide,
    HSide,
}

// Stable identity of a piece within a board. Squares refer to pieces by id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PieceId(u32);

impl PieceId {
    pub fn new() -> Self { PieceId(0) }
    // Returns the current value and advances the counter.
    pub fn inc(&mut self) -> Self {
        let id = *self;
        self.0 += 1;
        id
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, new)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub force: Force,
    // Back-reference to the square holding the piece.
    pub position: Coord,
    #[new(value = "0")]
    pub moves_made: u32,
}

impl Piece {
    pub fn has_moved(&self) -> bool { self.moves_made > 0 }
}

impl PieceKind {
    // Should not be used to construct moves in algebraic notation, because it returns a
    // non-empty name for a pawn (use `to_algebraic_for_move` instead).
    pub fn to_full_algebraic(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn to_algebraic_for_move(self) -> &'static str {
        match self {
            PieceKind::Pawn => "",
            PieceKind::Knight => "N",
            PieceKind::Bishop => "B",
            PieceKind::Rook => "R",
            PieceKind::Queen => "Q",
            PieceKind::King => "K",
        }
    }

    pub fn from_algebraic_char(notation: char) -> Option<Self> {
        use PieceKind::*;
        [Pawn, Knight, Bishop, Rook, Queen, King]
            .into_iter()
            .find(|kind| kind.to_full_algebraic() == notation)
    }

    // Bishops, rooks and queens: pieces whose attacks can be blocked along a line.
    pub fn is_sliding(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }

    pub fn can_promote_to(self) -> bool {
        matches!(self, PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }
}

// FEN-style letters: uppercase for White, lowercase for Black.
pub fn piece_to_ascii(kind: PieceKind, force: Force) -> char {
    let ch = kind.to_full_algebraic();
    match force {
        Force::White => ch,
        Force::Black => ch.to_ascii_lowercase(),
    }
}

pub fn piece_from_ascii(ch: char) -> Option<(PieceKind, Force)> {
    let force = if ch.is_ascii_uppercase() { Force::White } else { Force::Black };
    PieceKind::from_algebraic_char(ch.to_ascii_uppercase()).map(|kind| (kind, force))
}


#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn ascii_round_trip() {
        for kind in PieceKind::iter() {
            for force in Force::iter() {
                assert_eq!(piece_from_ascii(piece_to_ascii(kind, force)), Some((kind, force)));
            }
        }
        assert_eq!(piece_from_ascii('x'), None);
        assert_eq!(piece_from_ascii('.'), None);
    }

    #[test]
    fn move_prefix() {
        assert_eq!(PieceKind::Pawn.to_algebraic_for_move(), "");
        assert_eq!(PieceKind::Knight.to_algebraic_for_move(), "N");
        assert_eq!(PieceKind::King.to_algebraic_for_move(), "K");
    }

    #[test]
    fn piece_id_counter() {
        let mut next = PieceId::new();
        let a = next.inc();
        let b = next.inc();
        assert_ne!(a, b);
        assert!(a < b);
    }
}
