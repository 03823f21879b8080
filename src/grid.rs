use std::{fmt, mem, ops};

use ndarray::Array2;
use scopeguard::ScopeGuard;

use crate::coord::{Col, Coord, NUM_COLS, NUM_ROWS, Row};
use crate::piece::{Piece, piece_to_ascii};


// Plain occupancy snapshot of a board. Used for computing reachability and for trying out
// hypothetical moves without touching the board itself.
pub type OccupancyGrid = GenericGrid<Option<Piece>>;

#[derive(Clone, PartialEq, Eq)]
pub struct GenericGrid<T> {
    data: Array2<T>,
}

impl<T> GenericGrid<T> {
    pub fn from_fn(mut f: impl FnMut(Coord) -> T) -> Self {
        GenericGrid {
            data: Array2::from_shape_fn((NUM_ROWS as usize, NUM_COLS as usize), |(row, col)| {
                f(Coord::new(Row::from_zero_based(row as u8), Col::from_zero_based(col as u8)))
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> {
        Coord::all().map(move |pos| (pos, &self[pos]))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> { self.data.iter_mut() }

    // The change is reverted when the returned guard is dropped.
    pub fn scoped_set<'a>(
        &'a mut self, pos: Coord, value: T,
    ) -> ScopeGuard<&'a mut Self, impl FnOnce(&'a mut Self)> {
        let original = mem::replace(&mut self[pos], value);
        scopeguard::guard(self, move |grid: &mut Self| grid[pos] = original)
    }

    pub fn maybe_scoped_set<'a>(
        &'a mut self, change: Option<(Coord, T)>,
    ) -> ScopeGuard<&'a mut Self, impl FnOnce(&'a mut Self)> {
        let original = change.map(|(pos, value)| (pos, mem::replace(&mut self[pos], value)));
        scopeguard::guard(self, move |grid: &mut Self| {
            if let Some((pos, value)) = original {
                grid[pos] = value;
            }
        })
    }
}

impl<T> ops::Index<Coord> for GenericGrid<T> {
    type Output = T;
    fn index(&self, pos: Coord) -> &Self::Output { &self.data[coord_to_index(pos)] }
}

impl<T> ops::IndexMut<Coord> for GenericGrid<T> {
    fn index_mut(&mut self, pos: Coord) -> &mut Self::Output {
        &mut self.data[coord_to_index(pos)]
    }
}

fn coord_to_index(pos: Coord) -> [usize; 2] {
    [pos.row.to_zero_based() as usize, pos.col.to_zero_based() as usize]
}

impl<T: fmt::Debug> fmt::Debug for GenericGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid ")?;
        f.debug_map().entries(self.iter().map(|(pos, value)| (pos.to_algebraic(), value))).finish()
    }
}

impl OccupancyGrid {
    // Compact textual form, rank 8 first. Handy in assertion messages.
    pub fn to_ascii(&self) -> String {
        let mut ret = String::new();
        for row in Row::all().collect::<Vec<_>>().into_iter().rev() {
            for col in Col::all() {
                ret.push(match self[Coord::new(row, col)] {
                    Some(piece) => piece_to_ascii(piece.kind, piece.force),
                    None => '.',
                });
            }
            ret.push('\n');
        }
        ret
    }
}
