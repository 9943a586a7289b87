use crate::StrError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Holds a dense 2D array of doubles stored row by row
///
/// The same type is used for the global grid (owned by the coordinating
/// process only) and for the padded local tiles of every worker.
///
/// ```text
/// (i, j) → data[i * ncol + j]
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2d {
    nrow: usize,    // number of rows (≥ 1)
    ncol: usize,    // number of columns (≥ 1)
    data: Vec<f64>, // row-major values (nrow * ncol)
}

impl Grid2d {
    /// Allocates a new instance filled with zeros
    ///
    /// Returns an error (instead of aborting) if the memory cannot be reserved.
    pub fn new(nrow: usize, ncol: usize) -> Result<Self, StrError> {
        if nrow < 1 {
            return Err("nrow must be ≥ 1");
        }
        if ncol < 1 {
            return Err("ncol must be ≥ 1");
        }
        let dim = nrow.checked_mul(ncol).ok_or("grid dimensions are too large")?;
        let mut data = Vec::new();
        data.try_reserve_exact(dim).map_err(|_| "cannot allocate grid")?;
        data.resize(dim, 0.0);
        Ok(Grid2d { nrow, ncol, data })
    }

    /// Allocates a new instance filled with pseudo-random values in [0, 1)
    ///
    /// Each row is generated from its own seeded stream, thus the result only
    /// depends on `seed` and not on the number of worker threads.
    pub fn generate(nrow: usize, ncol: usize, seed: u64) -> Result<Self, StrError> {
        let mut grid = Grid2d::new(nrow, ncol)?;
        grid.data.par_chunks_mut(ncol).enumerate().for_each(|(i, row)| {
            let mut rng = StdRng::seed_from_u64((seed << 32) ^ (i as u64));
            row.iter_mut().for_each(|v| *v = rng.gen::<f64>());
        });
        Ok(grid)
    }

    /// Returns the dimensions (nrow, ncol)
    pub fn dims(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    /// Returns the (i, j) value
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.nrow && j < self.ncol);
        self.data[i * self.ncol + j]
    }

    /// Sets the (i, j) value
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < self.nrow && j < self.ncol);
        self.data[i * self.ncol + j] = value;
    }

    /// Returns the i-th row
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.ncol..(i + 1) * self.ncol]
    }

    /// Sets all values
    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Copies all values from another grid with the same dimensions
    pub fn copy_from(&mut self, other: &Grid2d) -> Result<(), StrError> {
        if other.dims() != self.dims() {
            return Err("grids must have the same dimensions");
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Returns an access to the underlying row-major data
    pub fn as_data(&self) -> &[f64] {
        &self.data
    }

    /// Returns a mutable access to the underlying row-major data
    pub fn as_data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
