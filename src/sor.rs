use crate::{CartTopology, Grid2d, Partition, StrError};
use std::f64::consts::PI;

/// Returns the relaxation factor used by all processes
///
/// ```text
///              2
/// ω = ——————————————————
///     1 + sin(π / nrow)
/// ```
///
/// **Note:** Only the global number of rows is considered, also for non-square grids.
pub fn relaxation_factor(global_rows: usize) -> f64 {
    2.0 / (1.0 + f64::sin(PI / global_rows as f64))
}

/// Holds the range of tile cells updated by the sweeps
///
/// Rows `i_min..i_max` and columns `j_min..j_max` (tile indices, the ghost ring
/// being row/column 0). The first and last global rows and columns hold fixed
/// values and are excluded wherever they fall, and the padding beyond the
/// valid cells is never included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepBounds {
    pub i_min: usize,
    pub i_max: usize,
    pub j_min: usize,
    pub j_max: usize,
    parity: usize, // (start_row + start_col) % 2 for the global coloring
}

/// Returns the tile index range of the updatable cells of a block along one axis
///
/// Updatable global indices are `1..global - 1`.
fn updatable(start: usize, valid: usize, global: usize) -> (usize, usize) {
    let first = usize::max(start, 1);
    let last = usize::min(start + valid, global.saturating_sub(1));
    (first - start + 1, usize::max(first, last) - start + 1)
}

impl SweepBounds {
    /// Allocates a new instance for the tile of a given process
    pub fn new(partition: &Partition, topology: &CartTopology) -> Self {
        let block = partition.block(topology.coords);
        let (i_min, i_max) = updatable(block.start[0], block.valid[0], partition.global[0]);
        let (j_min, j_max) = updatable(block.start[1], block.valid[1], partition.global[1]);
        SweepBounds {
            i_min,
            i_max,
            j_min,
            j_max,
            parity: (block.start[0] + block.start[1]) % 2,
        }
    }

    /// Returns true if there is nothing to update
    pub fn is_empty(&self) -> bool {
        self.i_min >= self.i_max || self.j_min >= self.j_max
    }

    /// Returns true if the tile cell (i, j) is red in the global coloring
    pub fn is_red(&self, i: usize, j: usize) -> bool {
        (i + j + self.parity) % 2 == 0
    }

    /// Returns the first column of row i with the given color
    fn first_column(&self, i: usize, red: bool) -> usize {
        if self.is_red(i, self.j_min) == red {
            self.j_min
        } else {
            self.j_min + 1
        }
    }

    /// Checks that the bounds leave the outer ring of the tile untouched
    fn check(&self, grid: &Grid2d) -> Result<(), StrError> {
        let (nrow, ncol) = grid.dims();
        if self.is_empty() {
            return Ok(());
        }
        if self.i_min < 1 || self.j_min < 1 || self.i_max >= nrow || self.j_max >= ncol {
            return Err("sweep bounds must be inside the tile interior");
        }
        Ok(())
    }
}

/// Updates the red cells of `current` reading neighbors from `previous` only
pub fn red_sweep(previous: &Grid2d, current: &mut Grid2d, bounds: &SweepBounds, omega: f64) -> Result<(), StrError> {
    if previous.dims() != current.dims() {
        return Err("previous and current tiles must have the same dimensions");
    }
    bounds.check(previous)?;
    let n = previous.dims().1;
    let w = omega / 4.0;
    let p = previous.as_data();
    let c = current.as_data_mut();
    for i in bounds.i_min..bounds.i_max {
        for j in (bounds.first_column(i, true)..bounds.j_max).step_by(2) {
            let k = i * n + j;
            c[k] = p[k] + w * (p[k - n] + p[k + n] + p[k - 1] + p[k + 1] - 4.0 * p[k]);
        }
    }
    Ok(())
}

/// Updates the black cells of `current` reading neighbors from `current`
///
/// At this point `current` holds the new red values, including the ghost ring
/// refreshed after the red sweep.
pub fn black_sweep(previous: &Grid2d, current: &mut Grid2d, bounds: &SweepBounds, omega: f64) -> Result<(), StrError> {
    if previous.dims() != current.dims() {
        return Err("previous and current tiles must have the same dimensions");
    }
    bounds.check(previous)?;
    let n = previous.dims().1;
    let w = omega / 4.0;
    let p = previous.as_data();
    let c = current.as_data_mut();
    for i in bounds.i_min..bounds.i_max {
        for j in (bounds.first_column(i, false)..bounds.j_max).step_by(2) {
            let k = i * n + j;
            c[k] = p[k] + w * (c[k - n] + c[k + n] + c[k - 1] + c[k + 1] - 4.0 * p[k]);
        }
    }
    Ok(())
}

/// Holds the previous and current iterates of a tile
///
/// The roles of the two buffers are exchanged by toggling an index.
pub struct TilePair {
    buffers: [Grid2d; 2],
    current: usize,
}

impl TilePair {
    /// Allocates two zeroed tiles
    pub fn new(nrow: usize, ncol: usize) -> Result<Self, StrError> {
        Ok(TilePair {
            buffers: [Grid2d::new(nrow, ncol)?, Grid2d::new(nrow, ncol)?],
            current: 0,
        })
    }

    /// Exchanges the roles of previous and current
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Returns the current iterate
    pub fn current(&self) -> &Grid2d {
        &self.buffers[self.current]
    }

    /// Returns the current iterate (mutable)
    pub fn current_mut(&mut self) -> &mut Grid2d {
        &mut self.buffers[self.current]
    }

    /// Returns the previous iterate
    pub fn previous(&self) -> &Grid2d {
        &self.buffers[1 - self.current]
    }

    /// Returns the previous iterate (mutable)
    pub fn previous_mut(&mut self) -> &mut Grid2d {
        &mut self.buffers[1 - self.current]
    }

    /// Copies current into previous (used once, after the initial distribution)
    pub fn duplicate_current(&mut self) -> Result<(), StrError> {
        let (first, second) = self.buffers.split_at_mut(1);
        if self.current == 0 {
            second[0].copy_from(&first[0])
        } else {
            first[0].copy_from(&second[0])
        }
    }

    /// Returns (previous, current) for a sweep
    pub fn split(&mut self) -> (&Grid2d, &mut Grid2d) {
        let (first, second) = self.buffers.split_at_mut(1);
        if self.current == 0 {
            (&second[0], &mut first[0])
        } else {
            (&first[0], &mut second[0])
        }
    }
}

/// Runs red-black SOR in place on a single array (serial reference)
///
/// The outer ring of the grid holds fixed values.
pub fn serial_red_black_sor(grid: &mut Grid2d, omega: f64, iterations: usize) {
    let (nrow, ncol) = grid.dims();
    let w = omega / 4.0;
    for _ in 0..iterations {
        for color in 0..2 {
            for i in 1..nrow.saturating_sub(1) {
                for j in 1..ncol.saturating_sub(1) {
                    if (i + j) % 2 == color {
                        let u = grid.get(i, j);
                        let sum = grid.get(i - 1, j) + grid.get(i + 1, j) + grid.get(i, j - 1) + grid.get(i, j + 1);
                        grid.set(i, j, u + w * (sum - 4.0 * u));
                    }
                }
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{black_sweep, red_sweep, relaxation_factor, serial_red_black_sor, SweepBounds, TilePair};
    use crate::{unpack, CartTopology, Grid2d, Partition};
    use russell_lab::{approx_eq, vec_approx_eq};
    use std::f64::consts::PI;

    fn bounds(gr: usize, gc: usize, px: usize, py: usize, rank: usize) -> SweepBounds {
        let part = Partition::new(gr, gc, px, py).unwrap();
        let topo = CartTopology::new(px, py, rank).unwrap();
        SweepBounds::new(&part, &topo)
    }

    #[test]
    fn relaxation_factor_works() {
        approx_eq(relaxation_factor(8), 2.0 / (1.0 + f64::sin(PI / 8.0)), 1e-15);
        assert!(relaxation_factor(1000) > 1.99);
        assert!(relaxation_factor(4) < 2.0);
    }

    #[test]
    fn bounds_work() {
        // single process: fixed outer ring
        let b = bounds(6, 5, 1, 1, 0);
        assert_eq!((b.i_min, b.i_max, b.j_min, b.j_max), (2, 6, 2, 5));
        // 2×2 over 8×8: interior sides extend to the ghost ring
        let b = bounds(8, 8, 2, 2, 0);
        assert_eq!((b.i_min, b.i_max, b.j_min, b.j_max), (2, 5, 2, 5));
        let b = bounds(8, 8, 2, 2, 3);
        assert_eq!((b.i_min, b.i_max, b.j_min, b.j_max), (1, 4, 1, 4));
        // padded last block: 10 rows over 3 → last block has 2 valid rows
        let b = bounds(10, 7, 3, 2, 5);
        assert_eq!((b.i_min, b.i_max, b.j_min, b.j_max), (1, 2, 1, 3));
        // a single global row has nothing to update
        assert!(bounds(1, 5, 1, 1, 0).is_empty());
        // 6 rows over 4 → blocks of 2, 2, 2, 0 rows: the last global row stays
        // fixed although rank 2 has a southern neighbor
        let b = bounds(6, 6, 4, 1, 2);
        assert_eq!((b.i_min, b.i_max, b.j_min, b.j_max), (1, 2, 2, 6));
        assert!(bounds(6, 6, 4, 1, 3).is_empty());
        // 9 columns over 6 → blocks of 2, 2, 2, 2, 1, 0 columns
        let b = bounds(4, 9, 1, 6, 3);
        assert_eq!((b.i_min, b.i_max, b.j_min, b.j_max), (2, 4, 1, 3));
        assert!(bounds(4, 9, 1, 6, 4).is_empty()); // only the last global column
        assert!(bounds(4, 9, 1, 6, 5).is_empty());
    }

    #[test]
    fn coloring_follows_global_coordinates() {
        // 9 rows over 3 process rows: the second block starts at global row 3
        let b = bounds(9, 4, 3, 1, 1);
        // tile (1, 1) is global (3, 0)
        assert!(!b.is_red(1, 1));
        assert!(b.is_red(1, 2));
        let b = bounds(9, 4, 3, 1, 0);
        assert!(b.is_red(1, 1));
    }

    #[test]
    fn red_sweep_updates_red_cells_only() {
        let b = bounds(4, 4, 1, 1, 0); // tile 6×6, cells (2..4, 2..4)
        let mut previous = Grid2d::new(6, 6).unwrap();
        previous.fill(1.0);
        previous.set(3, 2, 5.0); // black cell
        let mut current = Grid2d::new(6, 6).unwrap();
        red_sweep(&previous, &mut current, &b, 1.0).unwrap();
        // red: (2,2) and (3,3); neighbor (3,2) = 5 → 1 + 0.25 * (5 + 3 - 4)
        assert_eq!(current.get(2, 2), 2.0);
        assert_eq!(current.get(3, 3), 2.0);
        assert_eq!(current.get(2, 3), 0.0);
        assert_eq!(current.get(3, 2), 0.0);
    }

    #[test]
    fn black_sweep_reads_current_neighbors() {
        let b = bounds(4, 4, 1, 1, 0);
        let mut previous = Grid2d::new(6, 6).unwrap();
        previous.fill(1.0);
        let mut current = previous.clone();
        current.set(2, 2, 3.0); // new red value next to black (2,3) and (3,2)
        black_sweep(&previous, &mut current, &b, 1.0).unwrap();
        assert_eq!(current.get(2, 3), 1.5);
        assert_eq!(current.get(3, 2), 1.5);
        assert_eq!(current.get(2, 2), 3.0);
    }

    #[test]
    fn sweeps_capture_errors() {
        let b = bounds(4, 4, 1, 1, 0);
        let previous = Grid2d::new(6, 6).unwrap();
        let mut current = Grid2d::new(5, 6).unwrap();
        assert_eq!(
            red_sweep(&previous, &mut current, &b, 1.0).err(),
            Some("previous and current tiles must have the same dimensions")
        );
        let small = Grid2d::new(4, 4).unwrap();
        let mut other = small.clone();
        assert_eq!(
            black_sweep(&small, &mut other, &b, 1.0).err(),
            Some("sweep bounds must be inside the tile interior")
        );
    }

    #[test]
    fn tile_pair_swaps_without_copying() {
        let mut tiles = TilePair::new(3, 3).unwrap();
        tiles.current_mut().fill(1.0);
        tiles.previous_mut().fill(2.0);
        tiles.swap();
        assert_eq!(tiles.current().get(0, 0), 2.0);
        assert_eq!(tiles.previous().get(0, 0), 1.0);
        let (previous, current) = tiles.split();
        assert_eq!(previous.get(1, 1), 1.0);
        current.set(1, 1, 9.0);
        assert_eq!(tiles.current().get(1, 1), 9.0);
    }

    #[test]
    fn serial_keeps_uniform_grid_and_fixed_ring() {
        let mut grid = Grid2d::new(5, 6).unwrap();
        grid.fill(0.5);
        serial_red_black_sor(&mut grid, relaxation_factor(5), 10);
        vec_approx_eq(grid.as_data(), &[0.5; 30], 1e-15);

        let mut grid = Grid2d::generate(5, 6, 3).unwrap();
        let initial = grid.clone();
        serial_red_black_sor(&mut grid, relaxation_factor(5), 3);
        for j in 0..6 {
            assert_eq!(grid.get(0, j), initial.get(0, j));
            assert_eq!(grid.get(4, j), initial.get(4, j));
        }
        for i in 0..5 {
            assert_eq!(grid.get(i, 0), initial.get(i, 0));
            assert_eq!(grid.get(i, 5), initial.get(i, 5));
        }
    }

    #[test]
    fn single_tile_sweeps_match_serial() {
        let (gr, gc) = (7, 6);
        let part = Partition::new(gr, gc, 1, 1).unwrap();
        let topo = CartTopology::new(1, 1, 0).unwrap();
        let b = SweepBounds::new(&part, &topo);
        let omega = relaxation_factor(gr);
        let global = Grid2d::generate(gr, gc, 11).unwrap();
        let (nrow, ncol) = part.tile_dims();
        let mut tiles = TilePair::new(nrow, ncol).unwrap();
        unpack(global.as_data(), &part.tile_layout([0, 0]), tiles.current_mut().as_data_mut()).unwrap();
        tiles.duplicate_current().unwrap();
        let mut serial = global.clone();
        for _ in 0..4 {
            tiles.swap();
            let (previous, current) = tiles.split();
            red_sweep(previous, current, &b, omega).unwrap();
            black_sweep(previous, current, &b, omega).unwrap();
            serial_red_black_sor(&mut serial, omega, 1);
            for i in 0..gr {
                for j in 0..gc {
                    approx_eq(tiles.current().get(i + 1, j + 1), serial.get(i, j), 1e-15);
                }
            }
        }
    }
}
