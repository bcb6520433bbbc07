use rand::Rng;

use crate::gaussian;

/// Dense row-major matrix of `f64` parameters.
///
/// Bias vectors are stored as single-column matrices so every parameter
/// container of a network shares one representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix filled with zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Creates a matrix with Xavier-scaled Gaussian entries.
    ///
    /// Each entry is drawn from `N(0, sqrt(2 / (rows + cols)))`.
    pub fn random_xavier<R>(rows: usize, cols: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        #[expect(clippy::cast_precision_loss)]
        let limit = (2.0 / (rows + cols) as f64).sqrt();
        Self::from_fn(rows, cols, |_, _| gaussian::random_gaussian(rng, 0.0, limit))
    }

    /// Builds a matrix from nested rows.
    ///
    /// Returns `None` when the rows are ragged.
    #[must_use]
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            data: rows.concat(),
        })
    }

    /// Returns the matrix as nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.row_iter().map(<[f64]>::to_vec).collect()
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Returns row `row` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "row index out of range");
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact(0) panics
        self.data.chunks_exact(self.cols.max(1))
    }

    /// Iterates over all entries in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.data.iter_mut()
    }

    /// Combines two same-shaped matrices entry by entry.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn zip_with<F>(&self, other: &Self, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> f64,
    {
        assert_eq!(self.dims(), other.dims(), "matrix shapes differ");
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Computes `bias + self · input` for a single-column `bias`.
    ///
    /// `input` must have exactly `cols` elements; callers check the shape.
    pub(crate) fn affine(&self, input: &[f64], bias: &Self) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.cols);
        debug_assert_eq!(bias.dims(), (self.rows, 1));
        self.row_iter()
            .zip(bias.values())
            .map(|(row, b)| row.iter().zip(input).fold(b, |acc, (w, x)| acc + x * w))
            .collect()
    }
}
