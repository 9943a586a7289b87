use crate::StrError;

/// Specifies a direction in the process grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// Holds the non-periodic 2D Cartesian arrangement of processes seen by one rank
///
/// Ranks are numbered row by row: `rank = row * dims[1] + col`. North and
/// south move along the process rows; west and east along the process columns.
///
/// ```text
///          col 0   col 1   col 2
/// row 0      0       1       2
/// row 1      3       4       5
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartTopology {
    pub dims: [usize; 2],   // number of process rows and columns (Px, Py)
    pub coords: [usize; 2], // (row, col) of this rank
    pub rank: usize,
    pub north: Option<usize>,
    pub south: Option<usize>,
    pub east: Option<usize>,
    pub west: Option<usize>,
}

impl CartTopology {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `px` -- number of process rows (≥ 1)
    /// * `py` -- number of process columns (≥ 1)
    /// * `rank` -- rank of this process (< px * py)
    pub fn new(px: usize, py: usize, rank: usize) -> Result<Self, StrError> {
        if px < 1 || py < 1 {
            return Err("process grid dimensions must be ≥ 1");
        }
        if rank >= px * py {
            return Err("rank must be smaller than the number of processes");
        }
        let mut topology = CartTopology {
            dims: [px, py],
            coords: [rank / py, rank % py],
            rank,
            north: None,
            south: None,
            east: None,
            west: None,
        };
        let [row, col] = topology.coords;
        if row > 0 {
            topology.north = Some(topology.rank_of([row - 1, col]));
        }
        if row + 1 < px {
            topology.south = Some(topology.rank_of([row + 1, col]));
        }
        if col > 0 {
            topology.west = Some(topology.rank_of([row, col - 1]));
        }
        if col + 1 < py {
            topology.east = Some(topology.rank_of([row, col + 1]));
        }
        Ok(topology)
    }

    /// Returns the number of processes
    pub fn size(&self) -> usize {
        self.dims[0] * self.dims[1]
    }

    /// Returns the rank at given process-grid coordinates
    pub fn rank_of(&self, coords: [usize; 2]) -> usize {
        coords[0] * self.dims[1] + coords[1]
    }

    /// Returns the process-grid coordinates of a rank
    pub fn coords_of(&self, rank: usize) -> [usize; 2] {
        [rank / self.dims[1], rank % self.dims[1]]
    }

    /// Returns the neighbor in a direction, if any
    pub fn neighbor(&self, direction: Direction) -> Option<usize> {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
