/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

mod collector;
mod convergence;
mod grid;
mod halo;
mod layout;
mod mpi_transport;
mod partition;
mod report;
mod solver;
mod sor;
mod topology;
mod transport;
pub use crate::collector::*;
pub use crate::convergence::*;
pub use crate::grid::*;
pub use crate::halo::*;
pub use crate::layout::*;
pub use crate::mpi_transport::*;
pub use crate::partition::*;
pub use crate::report::*;
pub use crate::solver::*;
pub use crate::sor::*;
pub use crate::topology::*;
pub use crate::transport::*;
