//! Flat square grid addressed by `(x, z)`.

use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

/// Square grid stored row-major by `z` (`index = x + z * size`).
///
/// Indexing with `grid[(x, z)]` panics when out of range; edge handling is
/// always explicit, never a clamped lookup. Use [`Grid::get`] where a
/// recoverable error is wanted.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a `size × size` grid with every cell set to `value`
    pub fn new(size: usize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }
}

impl<T> Grid<T> {
    /// Create a grid by evaluating `f(x, z)` for every cell
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for z in 0..size {
            for x in 0..size {
                cells.push(f(x, z));
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Flat index for `(x, z)`
    pub fn flat_index(&self, x: usize, z: usize) -> Result<usize> {
        if x >= self.size || z >= self.size {
            return Err(Error::IndexOutOfBounds {
                x,
                z,
                size: self.size,
            });
        }
        Ok(x + z * self.size)
    }

    pub fn get(&self, x: usize, z: usize) -> Result<&T> {
        let index = self.flat_index(x, z)?;
        Ok(&self.cells[index])
    }

    pub fn get_mut(&mut self, x: usize, z: usize) -> Result<&mut T> {
        let index = self.flat_index(x, z)?;
        Ok(&mut self.cells[index])
    }

    /// Cells in storage order (rows of constant `z`)
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Iterate `(x, z, &cell)` in storage order
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i % size, i / size, cell))
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, z): (usize, usize)) -> &T {
        match self.flat_index(x, z) {
            Ok(index) => &self.cells[index],
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, z): (usize, usize)) -> &mut T {
        match self.flat_index(x, z) {
            Ok(index) => &mut self.cells[index],
            Err(e) => panic!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let grid = Grid::from_fn(3, |x, z| x * 10 + z);
        assert_eq!(grid.as_slice()[1], 10);
        assert_eq!(grid.as_slice()[3], 1);
        assert_eq!(grid[(2, 1)], 21);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = Grid::new(4, 0.0_f32);
        assert!(grid.get(3, 3).is_ok());
        assert!(matches!(
            grid.get(4, 0),
            Err(Error::IndexOutOfBounds { x: 4, z: 0, size: 4 })
        ));
        assert!(grid.get(0, 4).is_err());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_panics_instead_of_clamping() {
        let grid = Grid::new(4, 0u8);
        let _ = grid[(0, 4)];
    }

    #[test]
    fn test_iter_cells_coordinates() {
        let grid = Grid::from_fn(2, |x, z| (x, z));
        for (x, z, cell) in grid.iter_cells() {
            assert_eq!(*cell, (x, z));
        }
    }
}
