use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::coord::{Col, Coord, NUM_COLS, NUM_ROWS, Row, SubjectiveRow};
use crate::error::ChessError;
use crate::force::Force;
use crate::grid::{GenericGrid, OccupancyGrid};
use crate::internal_error_message;
use crate::piece::{Piece, PieceId, PieceKind, piece_from_ascii, piece_to_ascii};


const BACK_RANK: [PieceKind; NUM_COLS as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];


#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Square {
    coord: Coord,
    pub(crate) occupant: Option<PieceId>,
    // Pieces (of either side) that currently attack this square. Maintained by
    // `ControlledSquares`.
    pub(crate) attacked_by: HashSet<PieceId>,
}

impl Square {
    fn new(coord: Coord) -> Self {
        Square {
            coord,
            occupant: None,
            attacked_by: HashSet::new(),
        }
    }

    pub fn coord(&self) -> Coord { self.coord }
    pub fn name(&self) -> String { self.coord.to_algebraic() }
    pub fn occupant(&self) -> Option<PieceId> { self.occupant }
    pub fn attacked_by(&self) -> &HashSet<PieceId> { &self.attacked_by }
    pub fn is_free(&self) -> bool { self.occupant.is_none() }
}


// The 64 squares are created once and live as long as the board. Pieces live in an arena
// keyed by id; a square refers to its occupant by id and a piece refers to its square by
// coordinate.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    squares: GenericGrid<Square>,
    pieces: BTreeMap<PieceId, Piece>,
    next_piece_id: PieceId,
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: GenericGrid::from_fn(Square::new),
            pieces: BTreeMap::new(),
            next_piece_id: PieceId::new(),
        }
    }

    pub fn classic() -> Self {
        let mut board = Board::empty();
        for force in Force::iter() {
            let first_row = SubjectiveRow::from_one_based(1).to_row(force);
            let second_row = SubjectiveRow::from_one_based(2).to_row(force);
            for (col, kind) in Col::all().zip(BACK_RANK) {
                board.spawn(kind, force, Coord::new(first_row, col));
                board.spawn(PieceKind::Pawn, force, Coord::new(second_row, col));
            }
        }
        board
    }

    // Parses a diagram: eight rows of eight whitespace-separated tokens, rank 8 first.
    // "." is an empty square, letters are pieces (uppercase for White). Example:
    //   . . . . k . . .
    //   . . . . . . . .
    //   ...
    //   . . . . K . . R
    pub fn from_diagram(diagram: &str) -> Result<Self, ChessError> {
        let rows = diagram
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.split_ascii_whitespace().collect_vec())
            .collect_vec();
        if rows.len() != NUM_ROWS as usize {
            return Err(ChessError::InvalidDiagram(format!(
                "expected {NUM_ROWS} rows, found {}",
                rows.len()
            )));
        }
        let mut board = Board::empty();
        for (row_idx, row) in rows.iter().rev().enumerate() {
            if row.len() != NUM_COLS as usize {
                return Err(ChessError::InvalidDiagram(format!(
                    "expected {NUM_COLS} squares in row {}, found {}",
                    row_idx + 1,
                    row.len()
                )));
            }
            for (col_idx, token) in row.iter().enumerate() {
                let pos =
                    Coord::new(Row::from_zero_based(row_idx as u8), Col::from_zero_based(col_idx as u8));
                let ch = as_single_char(token)
                    .ok_or_else(|| ChessError::InvalidDiagram(format!("bad token {token:?}")))?;
                if ch == '.' {
                    continue;
                }
                let (kind, force) = piece_from_ascii(ch)
                    .ok_or_else(|| ChessError::InvalidDiagram(format!("unknown piece {ch:?}")))?;
                board.spawn(kind, force, pos);
            }
        }
        Ok(board)
    }

    pub fn to_diagram(&self) -> String {
        Row::all()
            .collect_vec()
            .into_iter()
            .rev()
            .map(|row| {
                Col::all()
                    .map(|col| match self.piece_at(Coord::new(row, col)) {
                        Some(piece) => piece_to_ascii(piece.kind, piece.force),
                        None => '.',
                    })
                    .join(" ")
            })
            .join("\n")
    }

    pub fn square(&self, pos: Coord) -> &Square { &self.squares[pos] }
    pub(crate) fn square_mut(&mut self, pos: Coord) -> &mut Square { &mut self.squares[pos] }

    // Zero-based file and rank.
    pub fn square_at(&self, file: i8, rank: i8) -> Result<&Square, ChessError> {
        Ok(self.square(Coord::from_file_rank(file, rank)?))
    }

    pub fn squares(&self) -> impl Iterator<Item = &Square> { self.squares.iter().map(|(_, sq)| sq) }

    pub fn name_of(pos: Coord) -> String { pos.to_algebraic() }
    pub fn coord_of(name: &str) -> Result<Coord, ChessError> { Coord::from_algebraic(name) }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> { self.pieces.get(&id) }
    pub fn piece_at(&self, pos: Coord) -> Option<&Piece> {
        self.squares[pos].occupant.and_then(|id| self.pieces.get(&id))
    }
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> { self.pieces.values() }
    pub fn pieces_of(&self, force: Force) -> impl Iterator<Item = &Piece> {
        self.pieces.values().filter(move |piece| piece.force == force)
    }
    pub fn num_pieces(&self) -> usize { self.pieces.len() }

    pub fn find_king(&self, force: Force) -> Option<Coord> {
        self.pieces_of(force)
            .find(|piece| piece.kind == PieceKind::King)
            .map(|piece| piece.position)
    }

    pub fn occupancy(&self) -> OccupancyGrid {
        OccupancyGrid::from_fn(|pos| self.piece_at(pos).copied())
    }

    pub fn add_piece(
        &mut self, kind: PieceKind, force: Force, pos: Coord,
    ) -> Result<PieceId, ChessError> {
        if let Some(other) = self.squares[pos].occupant {
            return Err(ChessError::InvariantViolation(internal_error_message!(
                "cannot add a piece to {pos}: occupied by {other:?}"
            )));
        }
        Ok(self.spawn(kind, force, pos))
    }

    fn spawn(&mut self, kind: PieceKind, force: Force, pos: Coord) -> PieceId {
        let id = self.next_piece_id.inc();
        self.pieces.insert(id, Piece::new(id, kind, force, pos));
        self.squares[pos].occupant = Some(id);
        id
    }

    // Moves the piece to `to`. The destination is set before the origin is cleared, so the
    // piece never disappears from the grid. `to` must be empty: captured pieces have to be
    // removed first.
    pub fn place_piece(&mut self, id: PieceId, to: Coord) -> Result<(), ChessError> {
        let from = self.piece_or_err(id)?.position;
        if let Some(other) = self.squares[to].occupant {
            if other != id {
                return Err(ChessError::InvariantViolation(internal_error_message!(
                    "cannot place {id:?} on {to}: occupied by {other:?}"
                )));
            }
        }
        self.squares[to].occupant = Some(id);
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.position = to;
        }
        if from != to {
            self.squares[from].occupant = None;
        }
        Ok(())
    }

    pub fn remove_piece(&mut self, id: PieceId) -> Result<Piece, ChessError> {
        let piece = self.pieces.remove(&id).ok_or_else(|| {
            ChessError::InvariantViolation(internal_error_message!("{id:?} is not on the board"))
        })?;
        let square = &mut self.squares[piece.position];
        if square.occupant == Some(id) {
            square.occupant = None;
        }
        Ok(piece)
    }

    pub fn promote(&mut self, id: PieceId, kind: PieceKind) -> Result<(), ChessError> {
        self.piece_mut_or_err(id)?.kind = kind;
        Ok(())
    }

    pub fn mark_moved(&mut self, id: PieceId) -> Result<(), ChessError> {
        self.piece_mut_or_err(id)?.moves_made += 1;
        Ok(())
    }

    pub(crate) fn clear_attackers(&mut self) {
        for square in self.squares.values_mut() {
            square.attacked_by.clear();
        }
    }

    // Checks that squares and pieces agree on where each piece is. Every piece must be the
    // occupant of exactly the square it points to, and every occupant must exist.
    pub fn verify_invariants(&self) -> Result<(), ChessError> {
        for piece in self.pieces.values() {
            let occupant = self.squares[piece.position].occupant;
            if occupant != Some(piece.id) {
                return Err(ChessError::InvariantViolation(internal_error_message!(
                    "{:?} claims {} which holds {occupant:?}",
                    piece.id,
                    piece.position
                )));
            }
        }
        for (pos, square) in self.squares.iter() {
            if let Some(id) = square.occupant {
                match self.pieces.get(&id) {
                    Some(piece) if piece.position == pos => {}
                    Some(piece) => {
                        return Err(ChessError::InvariantViolation(internal_error_message!(
                            "{pos} holds {id:?} which is at {}",
                            piece.position
                        )));
                    }
                    None => {
                        return Err(ChessError::InvariantViolation(internal_error_message!(
                            "{pos} holds unknown {id:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn piece_or_err(&self, id: PieceId) -> Result<&Piece, ChessError> {
        self.pieces.get(&id).ok_or_else(|| {
            ChessError::InvariantViolation(internal_error_message!("{id:?} is not on the board"))
        })
    }

    fn piece_mut_or_err(&mut self, id: PieceId) -> Result<&mut Piece, ChessError> {
        self.pieces.get_mut(&id).ok_or_else(|| {
            ChessError::InvariantViolation(internal_error_message!("{id:?} is not on the board"))
        })
    }
}

fn as_single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn classic_setup() {
        let board = Board::classic();
        assert_eq!(board.num_pieces(), 32);
        assert_eq!(board.pieces_of(Force::White).count(), 16);
        assert_eq!(board.pieces_of(Force::Black).count(), 16);
        for col in Col::all() {
            let white = board.piece_at(Coord::new(Row::from_zero_based(0), col)).unwrap();
            let black = board.piece_at(Coord::new(Row::from_zero_based(7), col)).unwrap();
            assert_eq!(white.kind, black.kind);
            assert_eq!(white.force, Force::White);
            assert_eq!(black.force, Force::Black);
        }
        assert_eq!(board.find_king(Force::White), Some(Coord::E1));
        assert_eq!(board.find_king(Force::Black), Some(Coord::E8));
        assert_eq!(board.piece_at(Coord::D8).unwrap().kind, PieceKind::Queen);
        board.verify_invariants().unwrap();
    }

    #[test]
    fn diagram_round_trip() {
        let diagram = "\
            r n b q k b n r
            p p p p p p p p
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            P P P P P P P P
            R N B Q K B N R";
        let board = Board::from_diagram(diagram).unwrap();
        assert_eq!(board.to_diagram(), Board::classic().to_diagram());
        assert_eq!(Board::from_diagram(&board.to_diagram()).unwrap().to_diagram(), board.to_diagram());
    }

    #[test]
    fn bad_diagrams() {
        assert!(matches!(Board::from_diagram(". . ."), Err(ChessError::InvalidDiagram(_))));
        let bad_piece = ". . . . . . . .\n".repeat(7) + ". . . . X . . .";
        assert!(matches!(Board::from_diagram(&bad_piece), Err(ChessError::InvalidDiagram(_))));
    }

    #[test]
    fn square_at() {
        let board = Board::classic();
        assert_eq!(board.square_at(0, 0).unwrap().name(), "a1");
        assert_eq!(board.square_at(4, 3).unwrap().coord(), Coord::E4);
        assert!(board.square_at(4, 3).unwrap().is_free());
        assert_eq!(board.square_at(8, 0).unwrap_err(), ChessError::OutOfRange { file: 8, rank: 0 });
        assert_eq!(board.square_at(0, -1).unwrap_err(), ChessError::OutOfRange { file: 0, rank: -1 });
        assert_eq!(Board::coord_of("e4"), Ok(Coord::E4));
        assert_eq!(Board::name_of(Coord::E4), "e4");
        assert!(Board::coord_of("z9").is_err());
    }

    #[test]
    fn place_piece() {
        let mut board = Board::classic();
        let pawn = board.piece_at(Coord::E2).unwrap().id;
        board.place_piece(pawn, Coord::E4).unwrap();
        assert_eq!(board.square(Coord::E4).occupant(), Some(pawn));
        assert_eq!(board.square(Coord::E2).occupant(), None);
        assert_eq!(board.piece(pawn).unwrap().position, Coord::E4);
        board.verify_invariants().unwrap();

        let knight = board.piece_at(Coord::G1).unwrap().id;
        let before = board.clone();
        assert!(matches!(
            board.place_piece(knight, Coord::H1),
            Err(ChessError::InvariantViolation(_))
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn remove_and_promote() {
        let mut board = Board::classic();
        let queen = board.piece_at(Coord::D8).unwrap().id;
        let removed = board.remove_piece(queen).unwrap();
        assert_eq!(removed.kind, PieceKind::Queen);
        assert!(board.square(Coord::D8).is_free());
        assert_eq!(board.num_pieces(), 31);
        assert!(board.remove_piece(queen).is_err());

        let pawn = board.piece_at(Coord::A2).unwrap().id;
        board.promote(pawn, PieceKind::Knight).unwrap();
        board.mark_moved(pawn).unwrap();
        let pawn = board.piece(pawn).unwrap();
        assert_eq!(pawn.kind, PieceKind::Knight);
        assert!(pawn.has_moved());
        board.verify_invariants().unwrap();
    }

    #[test]
    fn detects_broken_back_reference() {
        let mut board = Board::classic();
        let rook = board.piece_at(Coord::A1).unwrap().id;
        board.pieces.get_mut(&rook).unwrap().position = Coord::A3;
        assert!(matches!(board.verify_invariants(), Err(ChessError::InvariantViolation(_))));
    }
}
