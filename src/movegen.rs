// Legal move generation: geometric candidates filtered by the safety of the mover's king,
// plus castling.

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::board::Board;
use crate::controlled::ControlledSquares;
use crate::coord::{Col, Coord, SubjectiveRow};
use crate::force::Force;
use crate::grid::OccupancyGrid;
use crate::movement::{self, LastMove};
use crate::piece::{CastleDirection, Piece, PieceKind};


// Everything needed to tell which moves are legal right now.
#[derive(Clone, Copy, Debug)]
pub struct Position<'a> {
    pub board: &'a Board,
    pub controlled: &'a ControlledSquares,
    pub active_force: Force,
    pub last_move: Option<LastMove>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CandidateMove {
    pub from: Coord,
    pub to: Coord,
    pub force: Force,
    pub piece_kind: PieceKind,
    // Square of the captured piece. Differs from `to` for en passant.
    pub capture: Option<Coord>,
    pub castling: Option<CastleDirection>,
}

impl CandidateMove {
    pub fn is_promotion(&self) -> bool {
        self.piece_kind == PieceKind::Pawn
            && self.to.row == SubjectiveRow::from_one_based(8).to_row(self.force)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CastlingSquares {
    pub king_from: Coord,
    pub king_to: Coord,
    pub rook_from: Coord,
    pub rook_to: Coord,
}

pub fn castling_squares(force: Force, direction: CastleDirection) -> CastlingSquares {
    let row = SubjectiveRow::from_one_based(1).to_row(force);
    let (king_to, rook_from, rook_to) = match direction {
        CastleDirection::ASide => (Col::C, Col::A, Col::D),
        CastleDirection::HSide => (Col::G, Col::H, Col::F),
    };
    CastlingSquares {
        king_from: Coord::new(row, Col::E),
        king_to: Coord::new(row, king_to),
        rook_from: Coord::new(row, rook_from),
        rook_to: Coord::new(row, rook_to),
    }
}

// Legal moves of the piece on `from`. Empty if there is no piece of the active force.
pub fn legal_moves(position: &Position, from: Coord) -> Vec<CandidateMove> {
    let Some(&piece) = position.board.piece_at(from) else {
        return Vec::new();
    };
    if piece.force != position.active_force {
        return Vec::new();
    }
    let mut grid = position.board.occupancy();
    let mut candidates = movement::reachable_squares(&grid, from, position.last_move)
        .into_iter()
        .map(|to| CandidateMove {
            from,
            to,
            force: piece.force,
            piece_kind: piece.kind,
            capture: movement::get_capture(&grid, from, to, position.last_move),
            castling: None,
        })
        .collect_vec();
    if piece.kind == PieceKind::King {
        let opponent = piece.force.opponent();
        candidates.retain(|mv| !position.controlled.is_controlled_by(opponent, mv.to));
        candidates.extend(castling_moves(position, &piece));
    }
    // The cache above is not enough: a king stepping back along a checking line and pins on
    // other pieces are only caught by playing the move out.
    candidates.retain(|mv| !exposes_king(&mut grid, mv));
    candidates
}

pub fn legal_destinations(position: &Position, from: Coord) -> Vec<Coord> {
    legal_moves(position, from).into_iter().map(|mv| mv.to).collect()
}

pub fn all_legal_moves(position: &Position) -> Vec<CandidateMove> {
    position
        .board
        .pieces_of(position.active_force)
        .flat_map(|piece| legal_moves(position, piece.position))
        .collect()
}

pub fn has_legal_moves(position: &Position) -> bool {
    position
        .board
        .pieces_of(position.active_force)
        .any(|piece| !legal_moves(position, piece.position).is_empty())
}

fn castling_moves(position: &Position, king: &Piece) -> Vec<CandidateMove> {
    let board = position.board;
    let opponent = king.force.opponent();
    if king.has_moved() {
        return Vec::new();
    }
    let mut moves = Vec::new();
    for direction in CastleDirection::iter() {
        let squares = castling_squares(king.force, direction);
        if king.position != squares.king_from {
            continue;
        }
        let rook_ready = board.piece_at(squares.rook_from).is_some_and(|rook| {
            rook.kind == PieceKind::Rook && rook.force == king.force && !rook.has_moved()
        });
        if !rook_ready {
            continue;
        }
        let path_free = squares_between(squares.king_from, squares.rook_from)
            .all(|pos| board.square(pos).is_free());
        let king_path_safe = squares_between(squares.king_from, squares.king_to)
            .chain([squares.king_from, squares.king_to])
            .all(|pos| !position.controlled.is_controlled_by(opponent, pos));
        if path_free && king_path_safe {
            moves.push(CandidateMove {
                from: squares.king_from,
                to: squares.king_to,
                force: king.force,
                piece_kind: PieceKind::King,
                capture: None,
                castling: Some(direction),
            });
        }
    }
    moves
}

// Squares strictly between two squares of the same row.
fn squares_between(a: Coord, b: Coord) -> impl Iterator<Item = Coord> {
    let (lo, hi) = if a.col <= b.col { (a.col, b.col) } else { (b.col, a.col) };
    Col::all()
        .filter(move |&col| col > lo && col < hi)
        .map(move |col| Coord::new(a.row, col))
}

// Plays the move on the grid and tells whether the mover's king ends up attacked.
// Grid is guaranteed to be returned intact.
fn exposes_king(grid: &mut OccupancyGrid, mv: &CandidateMove) -> bool {
    let Some(mut piece) = grid[mv.from] else {
        return false;
    };
    piece.position = mv.to;
    // Zero out capture separately because of en passant.
    let en_passant_victim = mv.capture.filter(|&pos| pos != mv.to);
    let rook_move = mv.castling.map(|direction| {
        let squares = castling_squares(mv.force, direction);
        let rook = grid[squares.rook_from].map(|rook| Piece { position: squares.rook_to, ..rook });
        (squares, rook)
    });
    let mut grid = grid.maybe_scoped_set(en_passant_victim.map(|pos| (pos, None)));
    let mut grid = grid.maybe_scoped_set(rook_move.map(|(squares, _)| (squares.rook_from, None)));
    let mut grid = grid.maybe_scoped_set(rook_move.map(|(squares, rook)| (squares.rook_to, rook)));
    let mut grid = grid.scoped_set(mv.from, None);
    let grid = grid.scoped_set(mv.to, Some(piece));
    let king_pos = if piece.kind == PieceKind::King {
        Some(mv.to)
    } else {
        movement::find_king(&grid, mv.force)
    };
    king_pos.is_some_and(|king_pos| movement::is_check_to(&grid, king_pos, mv.force))
}
