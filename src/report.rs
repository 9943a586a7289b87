use crate::{Grid2d, Partition, StrError, Transport};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Holds the elapsed wall times (seconds) of one run
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timings {
    pub total: f64,       // timed region between the two barriers
    pub computation: f64, // red and black sweeps only
    pub convergence: f64, // local checks and reductions
}

impl Timings {
    /// Returns the time not spent computing (never negative)
    pub fn communication(&self) -> f64 {
        f64::max(0.0, self.total - self.computation)
    }

    /// Returns the maximum of each timing over all processes
    pub fn reduce_max<T: Transport>(&self, comm: &mut T) -> Result<Timings, StrError> {
        let mut values = [self.total, self.computation, self.convergence];
        comm.all_max(&mut values)?;
        Ok(Timings {
            total: values[0],
            computation: values[1],
            convergence: values[2],
        })
    }
}

/// Holds the results line printed by the coordinator
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub global: [usize; 2],
    pub grid: [usize; 2],
    pub iterations: usize,
    pub timings: Timings,
    pub midpoint: f64,
}

impl Report {
    /// Allocates a new instance taking the midpoint from the collected grid
    pub fn new(partition: &Partition, iterations: usize, timings: Timings, global: &Grid2d) -> Self {
        Report {
            global: partition.global,
            grid: partition.grid,
            iterations,
            timings,
            midpoint: global.get(partition.global[0] / 2, partition.global[1] / 2),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RedBlackSOR X {} Y {} Px {} Py {} Iter {} ComputationTime {:.6} TotalTime {:.6} CommunicationTime {:.6} ConvergenceTime {:.6} midpoint {:.6}",
            self.global[0],
            self.global[1],
            self.grid[0],
            self.grid[1],
            self.iterations,
            self.timings.computation,
            self.timings.total,
            self.timings.communication(),
            self.timings.convergence,
            self.midpoint,
        )
    }
}

/// Returns the name of the results file of a run
pub fn results_file_name(partition: &Partition) -> String {
    format!(
        "resRedBlackSORMPI_{}x{}_{}x{}",
        partition.global[0], partition.global[1], partition.grid[0], partition.grid[1]
    )
}

/// Writes the grid as text, one line per row
pub fn write_results(path: &Path, grid: &Grid2d) -> Result<(), StrError> {
    let file = File::create(path).map_err(|_| "cannot create results file")?;
    let mut buffer = BufWriter::new(file);
    let (nrow, _) = grid.dims();
    for i in 0..nrow {
        for v in grid.row(i) {
            write!(buffer, "{:.6} ", v).map_err(|_| "cannot write results file")?;
        }
        writeln!(buffer).map_err(|_| "cannot write results file")?;
    }
    buffer.flush().map_err(|_| "cannot write results file")
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
