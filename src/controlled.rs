// Squares attacked by each side, kept per piece so that a move only recomputes the pieces it
// can affect. Mirrors every change into `Square::attacked_by` on the board.

use std::collections::{HashMap, HashSet};

use enum_map::{EnumMap, enum_map};
use itertools::Itertools;

use crate::board::Board;
use crate::coord::Coord;
use crate::force::Force;
use crate::grid::OccupancyGrid;
use crate::movement;
use crate::piece::{Piece, PieceId};


#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ControlledSquares {
    by_force: EnumMap<Force, HashMap<PieceId, HashSet<Coord>>>,
}

impl ControlledSquares {
    // Computes everything from scratch and resets attackers on all board squares.
    pub fn build(board: &mut Board) -> Self {
        board.clear_attackers();
        let mut controlled = ControlledSquares { by_force: enum_map! { _ => HashMap::new() } };
        let grid = board.occupancy();
        let ids = board.pieces().map(|piece| piece.id).collect_vec();
        for id in ids {
            controlled.recompute_piece(board, &grid, id);
        }
        controlled
    }

    pub fn is_controlled_by(&self, force: Force, pos: Coord) -> bool {
        self.by_force[force].values().any(|squares| squares.contains(&pos))
    }

    pub fn controlled_by(&self, force: Force) -> HashSet<Coord> {
        self.by_force[force].values().flatten().copied().collect()
    }

    pub fn controlled_by_piece(&self, force: Force, id: PieceId) -> Option<&HashSet<Coord>> {
        self.by_force[force].get(&id)
    }

    // Brings the tracker up to date after the board has been changed by a move.
    //   - `touched`: every square whose occupancy changed;
    //   - `moved`: pieces that changed position or kind;
    //   - `removed`: captured pieces, already taken off the board.
    // Non-sliding pieces only change their attacks when they move. Sliding pieces also change
    // them when a square on one of their lines is vacated or filled, and such a square is
    // always part of the slider's current set (the first blocker is included).
    pub fn update_after_move(
        &mut self, board: &mut Board, touched: &[Coord], moved: &[PieceId], removed: &[Piece],
    ) {
        for piece in removed {
            self.forget_piece(board, piece.force, piece.id);
        }
        let mut affected: HashSet<PieceId> = moved.iter().copied().collect();
        for squares in self.by_force.values() {
            for (&id, controlled) in squares {
                let is_slider = board.piece(id).is_some_and(|piece| piece.kind.is_sliding());
                if is_slider && touched.iter().any(|pos| controlled.contains(pos)) {
                    affected.insert(id);
                }
            }
        }
        let grid = board.occupancy();
        for id in affected.into_iter().sorted() {
            self.recompute_piece(board, &grid, id);
        }
    }

    fn recompute_piece(&mut self, board: &mut Board, grid: &OccupancyGrid, id: PieceId) {
        let Some(&piece) = board.piece(id) else {
            return;
        };
        let new_squares = movement::controlled_squares(grid, piece.position);
        let old_squares =
            self.by_force[piece.force].insert(id, new_squares.clone()).unwrap_or_default();
        for pos in old_squares.difference(&new_squares) {
            board.square_mut(*pos).attacked_by.remove(&id);
        }
        for pos in new_squares.difference(&old_squares) {
            board.square_mut(*pos).attacked_by.insert(id);
        }
    }

    fn forget_piece(&mut self, board: &mut Board, force: Force, id: PieceId) {
        if let Some(squares) = self.by_force[force].remove(&id) {
            for pos in squares {
                board.square_mut(pos).attacked_by.remove(&id);
            }
        }
    }
}
