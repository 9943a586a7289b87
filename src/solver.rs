use crate::{black_sweep, exchange_borders, gather, global_converged, local_converged, red_sweep, relaxation_factor};
use crate::{scatter, CartTopology, Grid2d, IterationMode, Partition, Report, StrError, SweepBounds, TilePair};
use crate::{Timings, Transport, TAG_BLACK, TAG_RED};
use russell_lab::Stopwatch;

/// Holds the input of a distributed run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    pub global_rows: usize,
    pub global_cols: usize,
    pub px: usize,
    pub py: usize,
    pub mode: IterationMode,
}

/// Holds the results of a distributed run as seen by one process
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub partition: Partition,
    pub iterations: usize,   // number of completed iterations
    pub timings: Timings,    // maximum over all processes
    pub grid: Option<Grid2d>, // collected global grid (coordinator only)
}

impl RunOutcome {
    /// Returns the results line (coordinator only)
    pub fn report(&self) -> Option<Report> {
        self.grid
            .as_ref()
            .map(|grid| Report::new(&self.partition, self.iterations, self.timings, grid))
    }
}

/// Converts nanoseconds to seconds
fn seconds(nanoseconds: u128) -> f64 {
    nanoseconds as f64 / 1e9
}

/// Runs the distributed red-black SOR on all processes of `comm`
///
/// Every process must call this function (SPMD). The coordinator passes the
/// initial global grid, which is distributed and then freed; the other
/// processes pass `None`.
///
/// Each iteration:
///
/// 1. swap previous and current
/// 2. exchange the borders of previous (tag 0)
/// 3. red sweep: previous → current
/// 4. exchange the borders of current (tag 1)
/// 5. black sweep: current (red values) → current
/// 6. if requested, check the global convergence
pub fn run<T: Transport>(comm: &mut T, config: &SolverConfig, global: Option<Grid2d>) -> Result<RunOutcome, StrError> {
    // decomposition
    config.mode.validate()?;
    let partition = Partition::new(config.global_rows, config.global_cols, config.px, config.py)?;
    if comm.size() != partition.size() {
        return Err("the number of processes must equal Px * Py");
    }
    let topology = CartTopology::new(config.px, config.py, comm.rank())?;
    let block = partition.block(topology.coords);
    let bounds = SweepBounds::new(&partition, &topology);
    let omega = relaxation_factor(config.global_rows);

    // distribute the initial values into both buffers
    let (nrow, ncol) = partition.tile_dims();
    let mut tiles = TilePair::new(nrow, ncol)?;
    scatter(comm, &partition, global, tiles.current_mut())?;
    tiles.duplicate_current()?;

    // iterate
    comm.barrier()?;
    let mut stopwatch = Stopwatch::new("");
    let mut computation = 0;
    let mut convergence = 0;
    let mut converged = false;
    let mut t = 0;
    while t < config.mode.max_iterations() && !converged {
        tiles.swap();

        exchange_borders(comm, tiles.previous_mut(), &topology, &block, TAG_RED)?;
        let mut sw = Stopwatch::new("");
        let (previous, current) = tiles.split();
        red_sweep(previous, current, &bounds, omega)?;
        computation += sw.stop();

        exchange_borders(comm, tiles.current_mut(), &topology, &block, TAG_BLACK)?;
        let mut sw = Stopwatch::new("");
        let (previous, current) = tiles.split();
        black_sweep(previous, current, &bounds, omega)?;
        computation += sw.stop();

        if let Some(threshold) = config.mode.check_at(t) {
            let mut sw = Stopwatch::new("");
            let local = local_converged(tiles.previous(), tiles.current(), &bounds, threshold);
            converged = global_converged(comm, local)?;
            convergence += sw.stop();
        }
        t += 1;
    }
    comm.barrier()?;
    let total = stopwatch.stop();

    // share the timings
    let timings = Timings {
        total: seconds(total),
        computation: seconds(computation),
        convergence: seconds(convergence),
    }
    .reduce_max(comm)?;

    // collect the results
    let grid = gather(comm, &partition, tiles.current())?;
    Ok(RunOutcome {
        partition,
        iterations: t,
        timings,
        grid,
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
