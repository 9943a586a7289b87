use crate::{Grid2d, StrError, SweepBounds, Transport};

/// Number of iterations of the benchmark mode
pub const FIXED_ITERATIONS: usize = 256;

/// Number of iterations between two convergence checks
pub const CONVERGENCE_INTERVAL: usize = 100;

/// Maximum change of any cell for a tile to be considered converged
pub const CONVERGENCE_THRESHOLD: f64 = 1e-5;

/// Upper limit on the number of iterations when checking for convergence
pub const MAX_ITERATIONS: usize = 1_000_000;

/// Specifies how the iteration loop terminates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IterationMode {
    /// Runs the given number of iterations unconditionally
    Fixed(usize),

    /// Checks for global convergence every `interval` iterations
    Converge {
        interval: usize,
        threshold: f64,
        max_iterations: usize,
    },
}

impl IterationMode {
    /// Returns the mode selected at build time
    ///
    /// The `convergence` feature enables the convergence-checking build.
    pub fn from_build() -> Self {
        if cfg!(feature = "convergence") {
            IterationMode::Converge {
                interval: CONVERGENCE_INTERVAL,
                threshold: CONVERGENCE_THRESHOLD,
                max_iterations: MAX_ITERATIONS,
            }
        } else {
            IterationMode::Fixed(FIXED_ITERATIONS)
        }
    }

    /// Validates the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if let IterationMode::Converge {
            interval, threshold, ..
        } = self
        {
            if *interval < 1 {
                return Err("convergence interval must be ≥ 1");
            }
            if *threshold <= 0.0 {
                return Err("convergence threshold must be > 0");
            }
        }
        Ok(())
    }

    /// Returns the maximum number of iterations
    pub fn max_iterations(&self) -> usize {
        match self {
            IterationMode::Fixed(n) => *n,
            IterationMode::Converge { max_iterations, .. } => *max_iterations,
        }
    }

    /// Returns the threshold if convergence must be checked after iteration t (0-based)
    pub fn check_at(&self, t: usize) -> Option<f64> {
        match self {
            IterationMode::Fixed(_) => None,
            IterationMode::Converge {
                interval, threshold, ..
            } => {
                if t % interval == 0 {
                    Some(*threshold)
                } else {
                    None
                }
            }
        }
    }
}

/// Returns true if no updated cell changed by more than `threshold`
pub fn local_converged(previous: &Grid2d, current: &Grid2d, bounds: &SweepBounds, threshold: f64) -> bool {
    for i in bounds.i_min..bounds.i_max {
        for j in bounds.j_min..bounds.j_max {
            if f64::abs(current.get(i, j) - previous.get(i, j)) > threshold {
                return false;
            }
        }
    }
    true
}

/// Returns true on all processes if all processes converged in this round
pub fn global_converged<T: Transport>(comm: &mut T, local: bool) -> Result<bool, StrError> {
    comm.all_true(local)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{global_converged, local_converged, IterationMode, FIXED_ITERATIONS};
    use crate::{run_on_threads, CartTopology, Grid2d, Partition, SweepBounds, Transport};

    #[test]
    fn validate_captures_errors() {
        let mode = IterationMode::Converge {
            interval: 0,
            threshold: 1.0,
            max_iterations: 10,
        };
        assert_eq!(mode.validate().err(), Some("convergence interval must be ≥ 1"));
        let mode = IterationMode::Converge {
            interval: 1,
            threshold: 0.0,
            max_iterations: 10,
        };
        assert_eq!(mode.validate().err(), Some("convergence threshold must be > 0"));
        assert_eq!(IterationMode::Fixed(0).validate(), Ok(()));
    }

    #[test]
    fn from_build_works() {
        let mode = IterationMode::from_build();
        if cfg!(feature = "convergence") {
            assert!(matches!(mode, IterationMode::Converge { .. }));
        } else {
            assert_eq!(mode, IterationMode::Fixed(FIXED_ITERATIONS));
        }
    }

    #[test]
    fn check_at_works() {
        assert_eq!(IterationMode::Fixed(5).check_at(0), None);
        let mode = IterationMode::Converge {
            interval: 3,
            threshold: 0.1,
            max_iterations: 10,
        };
        let checked: Vec<_> = (0..7).filter(|t| mode.check_at(*t).is_some()).collect();
        assert_eq!(checked, &[0, 3, 6]);
        assert_eq!(mode.max_iterations(), 10);
    }

    #[test]
    fn local_converged_works() {
        let part = Partition::new(4, 4, 1, 1).unwrap();
        let bounds = SweepBounds::new(&part, &CartTopology::new(1, 1, 0).unwrap());
        let previous = Grid2d::new(6, 6).unwrap();
        let mut current = previous.clone();
        assert!(local_converged(&previous, &current, &bounds, 1e-3));
        // changes outside the bounds are ignored
        current.set(1, 1, 1.0);
        assert!(local_converged(&previous, &current, &bounds, 1e-3));
        current.set(3, 3, 0.01);
        assert!(!local_converged(&previous, &current, &bounds, 1e-3));
        assert!(local_converged(&previous, &current, &bounds, 0.1));
    }

    #[test]
    fn global_converged_requires_all() {
        let res = run_on_threads(4, |comm| {
            let all = global_converged(comm, true)?;
            let one_late = global_converged(comm, comm.rank() != 2)?;
            Ok((all, one_late))
        })
        .unwrap();
        assert!(res.iter().all(|(all, one_late)| *all && !*one_late));
    }
}
