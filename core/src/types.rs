use ndarray::Array2;

/// Single coordinate axis used for row/column counts and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Size of an ndarray grid as `(rows, cols)`.
///
/// Grids are only ever built from a [`Coord2`] size, so both axes fit.
pub(crate) fn grid_size<T>(grid: &Array2<T>) -> Coord2 {
    let (rows, cols) = grid.dim();
    (
        Coord::try_from(rows).unwrap_or(Coord::MAX),
        Coord::try_from(cols).unwrap_or(Coord::MAX),
    )
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter {
        NeighborIter::new(center, grid_size(self))
    }
}

/// Iterates the Moore neighbourhood (up to 8 cells) of a center cell, clipped to the grid bounds.
///
/// The center itself is never yielded.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    row: Coord,
    col: Coord,
    row_end: Coord,
    col_start: Coord,
    col_end: Coord,
}

impl NeighborIter {
    pub fn new(center: Coord2, (rows, cols): Coord2) -> Self {
        let (row, col) = center;
        let col_start = col.saturating_sub(1);
        Self {
            center,
            row: row.saturating_sub(1),
            col: col_start,
            // exclusive ends, clipped to the grid
            row_end: row.saturating_add(2).min(rows),
            col_start,
            col_end: col.saturating_add(2).min(cols),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while self.row < self.row_end {
            if self.col >= self.col_end {
                self.row += 1;
                self.col = self.col_start;
                continue;
            }

            let item = (self.row, self.col);
            self.col += 1;
            if item != self.center {
                return Some(item);
            }
        }
        None
    }
}

/// Every coordinate of a `rows × cols` grid in row-major order.
pub fn iter_coords((rows, cols): Coord2) -> impl Iterator<Item = Coord2> {
    (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(center: Coord2, size: Coord2) -> Vec<Coord2> {
        NeighborIter::new(center, size).collect()
    }

    #[test]
    fn interior_cell_has_eight_neighbors() {
        let neighbors = collect((1, 1), (3, 3));

        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&(1, 1)));
    }

    #[test]
    fn corner_cell_is_clipped() {
        assert_eq!(collect((0, 0), (3, 3)), vec![(0, 1), (1, 0), (1, 1)]);
        assert_eq!(collect((2, 2), (3, 3)), vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn single_cell_grid_has_no_neighbors() {
        assert!(collect((0, 0), (1, 1)).is_empty());
    }

    #[test]
    fn edge_of_wide_board() {
        let neighbors = collect((0, 29), (16, 30));
        assert_eq!(neighbors, vec![(0, 28), (1, 28), (1, 29)]);
    }

    #[test]
    fn coords_are_row_major() {
        let coords: Vec<_> = iter_coords((2, 3)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }
}
