use crate::{BlockLayout, StrError};

/// Holds the location of the valid (unpadded) sub-block owned by one process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub start: [usize; 2], // first global (row, col) of the block
    pub valid: [usize; 2], // number of valid rows and columns (≤ local dims)
}

/// Implements the static block decomposition of the global grid
///
/// Every process allocates a tile with `local[0] × local[1]` interior cells
/// (plus the 1-cell ghost ring). When a global dimension is not divisible by
/// the process-grid dimension, `local = ceil(global / grid)` and the last
/// process row/column owns fewer valid cells than its tile can hold (possibly
/// none at all). The excess (padding) is never transferred, computed on, or
/// collected.
///
/// ```text
/// global = 10 rows, grid = 3 process rows → local = 4, padded = 12
///
///   process row 0: global rows 0..4   (4 valid)
///   process row 1: global rows 4..8   (4 valid)
///   process row 2: global rows 8..10  (2 valid, 2 padding)
///
/// global = 6 rows, grid = 4 process rows → local = 2, padded = 8
///
///   process row 3: no valid rows
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub global: [usize; 2], // global number of rows and columns
    pub grid: [usize; 2],   // number of process rows and columns (Px, Py)
    pub local: [usize; 2],  // interior dimensions of every tile
    pub padded: [usize; 2], // grid * local
}

impl Partition {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `global_rows`, `global_cols` -- dimensions of the global grid (≥ 1)
    /// * `px`, `py` -- dimensions of the process grid (≥ 1 and ≤ the global dimensions)
    pub fn new(global_rows: usize, global_cols: usize, px: usize, py: usize) -> Result<Self, StrError> {
        if global_rows < 1 || global_cols < 1 {
            return Err("global dimensions must be ≥ 1");
        }
        if px < 1 || py < 1 {
            return Err("process grid dimensions must be ≥ 1");
        }
        if px > global_rows {
            return Err("process grid rows must be ≤ global rows");
        }
        if py > global_cols {
            return Err("process grid columns must be ≤ global columns");
        }
        let global = [global_rows, global_cols];
        let grid = [px, py];
        let mut local = [0, 0];
        let mut padded = [0, 0];
        for d in 0..2 {
            local[d] = (global[d] + grid[d] - 1) / grid[d];
            padded[d] = grid[d] * local[d];
        }
        Ok(Partition {
            global,
            grid,
            local,
            padded,
        })
    }

    /// Returns the number of processes
    pub fn size(&self) -> usize {
        self.grid[0] * self.grid[1]
    }

    /// Returns the process-grid coordinates of a rank (row-major rank order)
    pub fn coords_of(&self, rank: usize) -> [usize; 2] {
        [rank / self.grid[1], rank % self.grid[1]]
    }

    /// Returns the dimensions of a tile including the ghost ring
    pub fn tile_dims(&self) -> (usize, usize) {
        (self.local[0] + 2, self.local[1] + 2)
    }

    /// Returns the valid sub-block owned by the process at given coordinates
    pub fn block(&self, coords: [usize; 2]) -> Block {
        let mut start = [0, 0];
        let mut valid = [0, 0];
        for d in 0..2 {
            start[d] = coords[d] * self.local[d];
            valid[d] = usize::min(self.local[d], self.global[d].saturating_sub(start[d]));
        }
        Block { start, valid }
    }

    /// Returns the layout of a block within the global (row-major) grid
    pub fn global_layout(&self, coords: [usize; 2]) -> BlockLayout {
        let b = self.block(coords);
        BlockLayout::rectangle(self.global[1], b.start[0], b.start[1], b.valid[0], b.valid[1])
    }

    /// Returns the layout of a block within the interior of its tile
    pub fn tile_layout(&self, coords: [usize; 2]) -> BlockLayout {
        let b = self.block(coords);
        BlockLayout::rectangle(self.local[1] + 2, 1, 1, b.valid[0], b.valid[1])
    }

    /// Returns the transfer table: the global layout of each rank (row-major rank order)
    pub fn transfer_table(&self) -> Vec<BlockLayout> {
        let mut table = Vec::with_capacity(self.size());
        for row in 0..self.grid[0] {
            for col in 0..self.grid[1] {
                table.push(self.global_layout([row, col]));
            }
        }
        table
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
