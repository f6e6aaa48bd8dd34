use crate::math::*;
use itertools::iproduct;
use rayon::prelude::*;
use std::ops::{Index, IndexMut};

/// A cubic, cell-centered 3d array with `n` cells along each axis.
///
/// Cells are stored contiguously with axis 0 varying slowest, i.e. the cell `(i, j, k)` lives at
/// `i * n * n + j * n + k`. Every per-cell field in the crate (the particle lattice, the modulus
/// field, strain and stress, and the output voxel volume) uses this layout, so a flat particle
/// index and a grid coordinate always refer to the same cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3D<V> {
    n: usize,
    data: Vec<V>,
}

/// Flat index of the cell `coord` in a grid with `n` cells per side.
pub fn coord_to_index(n: usize, coord: UV) -> usize {
    coord.x * n * n + coord.y * n + coord.z
}

/// The number of cells `n³` in a grid with `n` cells per side, or `None` if a grid that large
/// could not be indexed or allocated, even for the largest per-cell value (a [`Mat`]).
pub fn checked_cell_count(n: usize) -> Option<usize> {
    let cells = n.checked_pow(3)?;
    let bytes = cells.checked_mul(std::mem::size_of::<Mat>())?;
    if bytes <= isize::MAX as usize {
        Some(cells)
    } else {
        None
    }
}

/// Inverse of [`coord_to_index`].
pub fn index_to_coord(n: usize, mut i: usize) -> UV {
    let x = i / (n * n);
    i -= x * n * n;
    let y = i / n;
    let z = i % n;
    UV::new(x, y, z)
}

impl<V> Grid3D<V> {
    /// Builds a grid by evaluating `f` at every cell, in storage order.
    pub fn from_fn<F: FnMut(UV) -> V>(n: usize, mut f: F) -> Self {
        let data = iproduct!(0..n, 0..n, 0..n)
            .map(|(i, j, k)| f(UV::new(i, j, k)))
            .collect();
        Grid3D { n, data }
    }

    /// Wraps an existing buffer. Returns `None` if `data` does not hold exactly `n³` cells.
    pub fn from_vec(n: usize, data: Vec<V>) -> Option<Self> {
        if data.len() == n * n * n {
            Some(Grid3D { n, data })
        } else {
            None
        }
    }

    /// The number of cells along each axis.
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn coord_to_index(&self, coord: UV) -> usize {
        coord_to_index(self.n, coord)
    }

    pub fn coord_in_grid(&self, coord: UV) -> bool {
        coord.iter().all(|&c| c < self.n)
    }

    pub fn get(&self, coord: UV) -> Option<&V> {
        if self.coord_in_grid(coord) {
            self.data.get(self.coord_to_index(coord))
        } else {
            None
        }
    }

    /// Iterates over every cell coordinate in storage order.
    pub fn cells(&self) -> impl Iterator<Item = UV> {
        let n = self.n;
        iproduct!(0..n, 0..n, 0..n).map(|(i, j, k)| UV::new(i, j, k))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[V] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<V> {
        self.data
    }

    pub fn map<W, F: FnMut(&V) -> W>(&self, f: F) -> Grid3D<W> {
        Grid3D {
            n: self.n,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<V: Send + Sync> Grid3D<V> {
    /// Evaluates `f` at every cell in parallel. Each cell is computed independently, so the
    /// result is identical to a sequential evaluation.
    pub fn par_from_fn<F>(n: usize, f: F) -> Self
    where
        F: Fn(UV) -> V + Sync + Send,
    {
        let data = (0..n * n * n)
            .into_par_iter()
            .map(|i| f(index_to_coord(n, i)))
            .collect();
        Grid3D { n, data }
    }
}

impl<V: Clone> Grid3D<V> {
    pub fn filled(n: usize, value: V) -> Self {
        Grid3D {
            n,
            data: vec![value; n * n * n],
        }
    }
}

impl<V> Index<UV> for Grid3D<V> {
    type Output = V;

    fn index(&self, coord: UV) -> &Self::Output {
        if !self.coord_in_grid(coord) {
            panic!("Attempted to get index out of bounds: {:?}", coord);
        }
        &self.data[self.coord_to_index(coord)]
    }
}

impl<V> IndexMut<UV> for Grid3D<V> {
    fn index_mut(&mut self, coord: UV) -> &mut Self::Output {
        if !self.coord_in_grid(coord) {
            panic!("Attempted to get index out of bounds: {:?}", coord);
        }
        let index = self.coord_to_index(coord);
        &mut self.data[index]
    }
}
