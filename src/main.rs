use msgpass::{mpi_finalize, mpi_init_thread, MpiThread};
use red_black_sor::{relaxation_factor, results_file_name, run, write_results, Grid2d, IterationMode};
use red_black_sor::{MpiTransport, Partition, SolverConfig, StrError, Transport, ROOT};
use std::path::Path;
use structopt::StructOpt;

// Approximate the solution of the Laplace equation
//
// ∂²u   ∂²u
// ——— + ——— = 0
// ∂x²   ∂y²
//
// on a (X × Y) grid with fixed boundary values, using red-black SOR over a
// (Px × Py) grid of MPI processes.
//
// Usage: mpirun -np <Px*Py> red_black_sor X Y Px Py

#[derive(StructOpt)]
#[structopt(name = "red_black_sor", about = "Red-black SOR with domain decomposition over MPI")]
struct Options {
    /// Number of rows of the global grid
    x: usize,

    /// Number of columns of the global grid
    y: usize,

    /// Number of process rows
    px: usize,

    /// Number of process columns
    py: usize,

    /// Seed of the initial values
    #[structopt(long, default_value = "1")]
    seed: u64,

    /// Writes the final grid to resRedBlackSORMPI_<X>x<Y>_<Px>x<Py>
    #[structopt(long)]
    print_results: bool,

    /// Prints setup messages
    #[structopt(long)]
    verbose: bool,
}

fn main() -> Result<(), StrError> {
    // parse command line arguments
    let opt = match Options::from_args_safe() {
        Ok(opt) => opt,
        Err(e) if e.use_stderr() => {
            eprintln!("{}", e.message);
            eprintln!("Usage: mpirun .... ./exec X Y Px Py");
            return Err("wrong command line arguments");
        }
        Err(e) => e.exit(),
    };

    // initialize the MPI engine
    mpi_init_thread(MpiThread::Serialized)?;

    // allocate MPI communicator and determine this processor's rank
    let mut comm = MpiTransport::new()?;
    let rank = comm.rank();
    let size = comm.size();

    // check the process grid
    if opt.px * opt.py != size {
        if rank == ROOT {
            eprintln!(
                "ERROR: Px * Py = {} * {} must equal the number of processes ({})",
                opt.px, opt.py, size
            );
        }
        return Err("the number of processes must equal Px * Py");
    }

    // check the decomposition on all processes
    let partition = match Partition::new(opt.x, opt.y, opt.px, opt.py) {
        Ok(partition) => partition,
        Err(e) => {
            if rank == ROOT {
                eprintln!("ERROR: {}", e);
            }
            return Err(e);
        }
    };

    // configuration
    let config = SolverConfig {
        global_rows: opt.x,
        global_cols: opt.y,
        px: opt.px,
        py: opt.py,
        mode: IterationMode::from_build(),
    };

    // message
    if opt.verbose && rank == ROOT {
        println!(
            "size = {}, X = {}, Y = {}, Px = {}, Py = {}, local = {:?}, padded = {:?}, omega = {}, mode = {:?}",
            size,
            opt.x,
            opt.y,
            opt.px,
            opt.py,
            partition.local,
            partition.padded,
            relaxation_factor(opt.x),
            config.mode
        );
    }

    // generate the initial values on the coordinator only
    let global = if rank == ROOT {
        Some(Grid2d::generate(opt.x, opt.y, opt.seed)?)
    } else {
        None
    };

    // run
    let outcome = match run(&mut comm, &config, global) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("ERROR (rank {}): {}", rank, e);
            return Err(e);
        }
    };

    // report
    if let Some(report) = outcome.report() {
        println!("{}", report);
        if opt.print_results {
            if let Some(grid) = &outcome.grid {
                let name = results_file_name(&outcome.partition);
                write_results(Path::new(&name), grid)?;
                if opt.verbose {
                    println!("results written to {}", name);
                }
            }
        }
    }

    // finalize the MPI engine
    mpi_finalize()
}
