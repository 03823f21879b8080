// Geometric movement rules: where a piece can go or what it attacks given the current
// occupancy, without regard to the safety of its own king.

use std::collections::HashSet;

use crate::coord::{Coord, SubjectiveRow};
use crate::force::Force;
use crate::grid::OccupancyGrid;
use crate::piece::PieceKind;


// The previous move on the board. Needed to recognize en passant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LastMove {
    pub from: Coord,
    pub to: Coord,
    pub piece_kind: PieceKind,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ProtoReachability {
    Ok,
    OkIfCapturing,
    OkIfNonCapturing,
    Blocked,
    Impossible,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reachability {
    Ok,
    Blocked,
    Impossible,
}

impl Reachability {
    pub fn ok(self) -> bool { self == Reachability::Ok }
}


// Returns the square of the piece that would be captured by moving from `from` to `to`.
// This is `to` itself except for en passant.
pub fn get_capture(
    grid: &OccupancyGrid, from: Coord, to: Coord, last_move: Option<LastMove>,
) -> Option<Coord> {
    let piece = grid[from]?;
    if let Some(target) = grid[to] {
        if target.force == piece.force { None } else { Some(to) }
    } else if piece.kind == PieceKind::Pawn {
        let last = last_move?;
        let passed_over = last.piece_kind == PieceKind::Pawn
            && last.to.col == to.col
            && last.from.row - to.row == to.row - last.to.row;
        let victim_is_enemy = grid[last.to].is_some_and(|victim| victim.force != piece.force);
        if passed_over && victim_is_enemy { Some(last.to) } else { None }
    } else {
        None
    }
}

pub fn reachability(grid: &OccupancyGrid, from: Coord, to: Coord, capturing: bool) -> Reachability {
    use ProtoReachability::*;
    match proto_reachability(grid, from, to) {
        Ok => Reachability::Ok,
        OkIfCapturing => {
            if capturing { Reachability::Ok } else { Reachability::Blocked }
        }
        OkIfNonCapturing => {
            if !capturing { Reachability::Ok } else { Reachability::Blocked }
        }
        Blocked => Reachability::Blocked,
        Impossible => Reachability::Impossible,
    }
}

// All squares the piece on `from` may move to, ignoring check. Castling is not included.
pub fn reachable_squares(
    grid: &OccupancyGrid, from: Coord, last_move: Option<LastMove>,
) -> Vec<Coord> {
    Coord::all()
        .filter(|&to| {
            let capturing = get_capture(grid, from, to, last_move).is_some();
            reachability(grid, from, to, capturing).ok()
        })
        .collect()
}

// Whether the piece on `from` attacks `to`. Squares occupied by friendly pieces count:
// they are defended.
pub fn attacks(grid: &OccupancyGrid, from: Coord, to: Coord) -> bool {
    matches!(
        proto_reachability_modulo_destination_square(grid, from, to),
        ProtoReachability::Ok | ProtoReachability::OkIfCapturing
    )
}

pub fn controlled_squares(grid: &OccupancyGrid, from: Coord) -> HashSet<Coord> {
    Coord::all().filter(|&to| attacks(grid, from, to)).collect()
}

pub fn find_king(grid: &OccupancyGrid, force: Force) -> Option<Coord> {
    grid.iter().find_map(|(pos, piece)| {
        piece.filter(|p| p.kind == PieceKind::King && p.force == force).map(|_| pos)
    })
}

// Whether any piece of the opponent of `force` attacks `king_pos`.
pub fn is_check_to(grid: &OccupancyGrid, king_pos: Coord, force: Force) -> bool {
    grid.iter()
        .any(|(from, piece)| piece.is_some_and(|p| p.force != force) && attacks(grid, from, king_pos))
}

fn proto_reachability(grid: &OccupancyGrid, from: Coord, to: Coord) -> ProtoReachability {
    use ProtoReachability::*;
    let proto = proto_reachability_modulo_destination_square(grid, from, to);
    match proto {
        Blocked | Impossible => proto,
        Ok | OkIfCapturing | OkIfNonCapturing => {
            let same_force = match (grid[from], grid[to]) {
                (Some(mover), Some(target)) => mover.force == target.force,
                _ => false,
            };
            if same_force { Blocked } else { proto }
        }
    }
}

fn proto_reachability_modulo_destination_square(
    grid: &OccupancyGrid, from: Coord, to: Coord,
) -> ProtoReachability {
    use ProtoReachability::*;
    if to == from {
        return Impossible;
    }
    let Some(piece) = grid[from] else {
        return Impossible;
    };

    let (d_row, d_col) = to - from;
    let is_straight_move = d_row == 0 || d_col == 0;
    let is_diagonal_move = d_row.abs() == d_col.abs();
    // Tests that squares between `from` (exclusive) and `to` (exclusive) are free.
    // Only valid for straight or diagonal moves.
    let has_linear_passage = || {
        let direction = (d_row.signum(), d_col.signum());
        let mut pos = from + direction;
        while pos != to {
            if grid[pos].is_some() {
                return false;
            }
            pos = pos + direction;
        }
        true
    };
    let simple_linear_passage = || if has_linear_passage() { Ok } else { Blocked };

    match piece.kind {
        PieceKind::Pawn => {
            let dir_forward = piece.force.direction_forward();
            let second_row = SubjectiveRow::from_one_based(2).to_row(piece.force);
            let double_step_allowed = from.row == second_row && !piece.has_moved();
            if d_col.abs() == 1 && d_row == dir_forward {
                OkIfCapturing
            } else if d_col == 0
                && (d_row == dir_forward || (double_step_allowed && d_row == dir_forward * 2))
            {
                if has_linear_passage() { OkIfNonCapturing } else { Blocked }
            } else {
                Impossible
            }
        }
        PieceKind::Knight => {
            if sort_two((d_row.abs(), d_col.abs())) == (1, 2) { Ok } else { Impossible }
        }
        PieceKind::Bishop => {
            if is_diagonal_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::Rook => {
            if is_straight_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::Queen => {
            if is_straight_move || is_diagonal_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::King => {
            if d_row.abs() <= 1 && d_col.abs() <= 1 { Ok } else { Impossible }
        }
    }
}

fn sort_two<T: Ord>((a, b): (T, T)) -> (T, T) { if a <= b { (a, b) } else { (b, a) } }


#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::board::Board;

    fn sorted(squares: impl IntoIterator<Item = Coord>) -> Vec<Coord> {
        squares.into_iter().sorted().collect()
    }

    #[test]
    fn opening_moves() {
        let grid = Board::classic().occupancy();
        assert_eq!(sorted(reachable_squares(&grid, Coord::E2, None)), sorted([Coord::E3, Coord::E4]));
        assert_eq!(sorted(reachable_squares(&grid, Coord::G1, None)), sorted([Coord::F3, Coord::H3]));
        assert_eq!(reachable_squares(&grid, Coord::A1, None), vec![]);
        assert_eq!(reachable_squares(&grid, Coord::E1, None), vec![]);
        assert_eq!(reachable_squares(&grid, Coord::E4, None), vec![]);
    }

    #[test]
    fn pawn_double_step_only_once() {
        let mut board = Board::classic();
        let pawn = board.piece_at(Coord::E2).unwrap().id;
        board.place_piece(pawn, Coord::E3).unwrap();
        board.mark_moved(pawn).unwrap();
        let grid = board.occupancy();
        assert_eq!(reachable_squares(&grid, Coord::E3, None), vec![Coord::E4]);

        // Moved back to the starting rank: still cannot double-step.
        board.place_piece(pawn, Coord::E2).unwrap();
        let grid = board.occupancy();
        assert_eq!(reachable_squares(&grid, Coord::E2, None), vec![Coord::E3]);
    }

    #[test]
    fn pawn_blocked() {
        let board = Board::from_diagram(
            "
            . . . . k . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . n . . .
            . . . P P . . .
            . . . . K . . .
            ",
        )
        .unwrap();
        let grid = board.occupancy();
        assert_eq!(reachable_squares(&grid, Coord::E2, None), vec![]);
        assert_eq!(sorted(reachable_squares(&grid, Coord::D2, None)), sorted([Coord::D3, Coord::D4, Coord::E3]));
    }

    #[test]
    fn sliding_pieces_stop_at_blockers() {
        let board = Board::from_diagram(
            "
            . . . . k . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            p . . . . . . .
            . . . . . . . .
            . . . . . . . .
            R . N . K . . .
            ",
        )
        .unwrap();
        let grid = board.occupancy();
        assert_eq!(
            sorted(reachable_squares(&grid, Coord::A1, None)),
            sorted([Coord::A2, Coord::A3, Coord::A4, Coord::B1])
        );
        let controlled = controlled_squares(&grid, Coord::A1);
        assert!(controlled.contains(&Coord::C1));
        assert!(controlled.contains(&Coord::A4));
        assert!(!controlled.contains(&Coord::D1));
        assert!(!controlled.contains(&Coord::A5));
    }

    #[test]
    fn knight_in_corner() {
        let board = Board::from_diagram(
            "
            . . . . k . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            N . . . K . . .
            ",
        )
        .unwrap();
        let grid = board.occupancy();
        assert_eq!(sorted(reachable_squares(&grid, Coord::A1, None)), sorted([Coord::B3, Coord::C2]));
    }

    #[test]
    fn pawn_controls_diagonals_only() {
        let grid = Board::classic().occupancy();
        assert_eq!(
            sorted(controlled_squares(&grid, Coord::E2)),
            sorted([Coord::D3, Coord::F3])
        );
        assert_eq!(
            sorted(controlled_squares(&grid, Coord::A7)),
            sorted([Coord::B6])
        );
    }

    #[test]
    fn en_passant_capture() {
        let board = Board::from_diagram(
            "
            . . . . k . . .
            . . . . . . . .
            . . . . . . . .
            . . . p P . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . K . . .
            ",
        )
        .unwrap();
        let grid = board.occupancy();
        let double_step = LastMove { from: Coord::D7, to: Coord::D5, piece_kind: PieceKind::Pawn };
        assert_eq!(get_capture(&grid, Coord::E5, Coord::D6, Some(double_step)), Some(Coord::D5));
        assert_eq!(
            sorted(reachable_squares(&grid, Coord::E5, Some(double_step))),
            sorted([Coord::D6, Coord::E6])
        );
        let single_step = LastMove { from: Coord::D6, to: Coord::D5, piece_kind: PieceKind::Pawn };
        assert_eq!(get_capture(&grid, Coord::E5, Coord::D6, Some(single_step)), None);
        assert_eq!(reachable_squares(&grid, Coord::E5, Some(single_step)), vec![Coord::E6]);
    }

    #[test]
    fn check_detection() {
        let board = Board::from_diagram(
            "
            . . . . k . . .
            . . . . . . . .
            . . . . . . . .
            . B . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . K . . .
            ",
        )
        .unwrap();
        let grid = board.occupancy();
        assert_eq!(find_king(&grid, Force::Black), Some(Coord::E8));
        assert!(is_check_to(&grid, Coord::E8, Force::Black));
        assert!(!is_check_to(&grid, Coord::E1, Force::White));
    }
}
