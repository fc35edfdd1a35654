// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::fmt::Display;
use std::io::{self, Write};
use std::ops::Index;

use crate::coord::{Coord, MeshDims};

/// A dense value per mesh node, addressed by coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    dims: MeshDims,
    values: Vec<T>,
}

impl<T> Matrix<T> {
    /// Build a matrix by evaluating `f` at every coordinate.
    pub fn from_fn(dims: MeshDims, f: impl FnMut(Coord) -> T) -> Self {
        let values = (0..dims.num_nodes())
            .filter_map(|id| dims.id_to_coord(id))
            .map(f)
            .collect();
        Self { dims, values }
    }

    #[must_use]
    pub fn dims(&self) -> MeshDims {
        self.dims
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&T> {
        let coord = Coord::new(x, y, z);
        self.dims
            .contains(&coord)
            .then(|| &self.values[self.dims.coord_to_id(&coord)])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// A matrix of the same shape holding `f` of every value.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            dims: self.dims,
            values: self.values.iter().map(f).collect(),
        }
    }
}

impl<T> Index<Coord> for Matrix<T> {
    type Output = T;

    fn index(&self, coord: Coord) -> &T {
        &self.values[self.dims.coord_to_id(&coord)]
    }
}

impl<T: Display> Matrix<T> {
    /// Write one line per `x`. Each line holds a bracketed group per `y` with
    /// the `z` values right aligned.
    pub fn write_rows(&self, w: &mut dyn Write) -> io::Result<()> {
        for x in 0..self.dims.x {
            for y in 0..self.dims.y {
                write!(w, "[   ")?;
                for z in 0..self.dims.z {
                    write!(w, "{:>6}", self[Coord::new(x, y, z)])?;
                }
                write!(w, "]")?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Significant;

    #[test]
    fn indexed_by_coord() {
        let dims = MeshDims::new(2, 3, 2);
        let matrix = Matrix::from_fn(dims, |c| c.x * 100 + c.y * 10 + c.z);
        assert_eq!(matrix[Coord::new(1, 2, 1)], 121);
        assert_eq!(matrix.get(0, 1, 1), Some(&11));
        assert_eq!(matrix.get(2, 0, 0), None);
        assert_eq!(matrix.iter().count(), 12);
    }

    #[test]
    fn rows_layout() {
        let dims = MeshDims::new(2, 2, 1);
        let matrix = Matrix::from_fn(dims, |c| c.x as f64 - 1.0);
        let mut out = Vec::new();
        matrix.write_rows(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[       -1][       -1]\n[        0][        0]\n"
        );
    }

    #[test]
    fn rows_of_fractions() {
        let dims = MeshDims::new(2, 1, 1);
        let matrix = Matrix::from_fn(dims, |c| (c.x + 1) as f64 / 4.0 + 1.0 / 3.0)
            .map(|v| Significant(*v));
        let mut out = Vec::new();
        matrix.write_rows(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[   0.583333]\n[   0.833333]\n"
        );
    }
}
