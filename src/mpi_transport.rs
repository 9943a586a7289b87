use crate::{StrError, Transport};
use msgpass::{Communicator, MpiOpInt, MpiOpReal};

/// Implements the transport with MPI (one operating-system process per rank)
///
/// **Note:** The MPI engine must be initialized (e.g., with `mpi_init_thread`)
/// before allocating this struct and finalized after dropping it.
pub struct MpiTransport {
    comm: Communicator,
    rank: usize,
    size: usize,
}

impl MpiTransport {
    /// Allocates a new instance over all processes
    pub fn new() -> Result<Self, StrError> {
        let mut comm = Communicator::new()?;
        let rank = comm.rank()?;
        let size = comm.size()?;
        Ok(MpiTransport { comm, rank, size })
    }
}

impl Transport for MpiTransport {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&mut self, data: &[f64], to: usize, tag: i32) -> Result<(), StrError> {
        self.comm.send_f64(data, to as _, tag)
    }

    fn receive(&mut self, data: &mut [f64], from: usize, tag: i32) -> Result<(), StrError> {
        self.comm.receive_f64(data, from as _, tag)
    }

    fn barrier(&mut self) -> Result<(), StrError> {
        self.comm.barrier()
    }

    fn all_max(&mut self, values: &mut [f64]) -> Result<(), StrError> {
        let orig = values.to_vec();
        self.comm.allreduce_f64(values, &orig, MpiOpReal::Max)
    }

    fn all_true(&mut self, flag: bool) -> Result<bool, StrError> {
        let mut all_ok = [0];
        self.comm.allreduce_u32(&mut all_ok, &[flag as u32], MpiOpInt::And)?;
        Ok(all_ok[0] == 1)
    }
}
