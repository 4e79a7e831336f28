use crate::DEFAULT_MAX_ITERATIONS;

use rand::SeedableRng;
use rand_xoshiro::Xoroshiro128PlusPlus;

/// A builder struct to specify the parameters for k-means.
///
/// # Examples
/// ```
/// # use kcolors::KmeansOptions;
/// let options = KmeansOptions::new()
///     .max_iterations(300)
///     .seed(Some(42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KmeansOptions {
    /// The maximum number of iterations in each attempt.
    pub(crate) max_iterations: u32,
    /// The seed value for the random number generator, or `None` to seed from OS entropy.
    pub(crate) seed: Option<u64>,
    /// The maximum number of restarts after an empty cluster, or `None` for no limit.
    pub(crate) max_restarts: Option<u32>,
    /// The largest change in error still considered converged.
    pub(crate) convergence_tolerance: f64,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl KmeansOptions {
    /// Creates a new [`KmeansOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            max_restarts: None,
            convergence_tolerance: 0.0,
        }
    }

    /// Sets the maximum number of iterations to run before giving up on convergence.
    ///
    /// Reaching this limit is not an error. The result of the last iteration is returned instead.
    ///
    /// The default is [`DEFAULT_MAX_ITERATIONS`] (`1000`).
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the seed value for the random number generator used to pick the initial centroids.
    ///
    /// The default is `None`, which seeds the generator from OS entropy
    /// so that results vary from run to run.
    #[must_use]
    pub const fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the maximum number of times clustering may start over after a cluster became empty.
    ///
    /// Once exceeded, [`KmeansError::NoValidClusteringFound`](crate::KmeansError::NoValidClusteringFound)
    /// is returned.
    ///
    /// The default is `None`, meaning clustering restarts until it succeeds.
    /// Note that this will never terminate for inputs where every attempt yields an empty cluster.
    #[must_use]
    pub const fn max_restarts(mut self, max_restarts: Option<u32>) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Sets the largest absolute change in error between two iterations
    /// for which clustering is considered converged.
    ///
    /// The default is `0.0`, that is, clustering stops only once the error
    /// is exactly equal to the error of the previous iteration.
    #[must_use]
    pub const fn convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    /// Returns whether the error stopped changing.
    #[allow(clippy::float_cmp)]
    pub(crate) fn has_converged(&self, previous_error: f64, error: f64) -> bool {
        if self.convergence_tolerance > 0.0 {
            (previous_error - error).abs() <= self.convergence_tolerance
        } else {
            previous_error == error
        }
    }

    /// Creates the random number generator for a clustering run.
    pub(crate) fn rng(&self) -> Xoroshiro128PlusPlus {
        match self.seed {
            Some(seed) => Xoroshiro128PlusPlus::seed_from_u64(seed),
            None => Xoroshiro128PlusPlus::from_entropy(),
        }
    }
}
