//! Lloyd's k-means clustering over color samples.
//!
//! [`cluster`] is the main entry point. It picks `K` distinct samples at random as the
//! initial centroids and then alternates between two steps:
//! 1. [`assign`]: assign each sample to its nearest centroid.
//! 2. [`update_centroids`]: move each centroid to the mean of its assigned samples.
//!
//! After each iteration the total error ([`total_distance`]) is compared to that of the previous
//! iteration. Clustering stops once the error no longer changes or the iteration limit is reached.
//!
//! If a cluster ends up with no samples (an orphan cluster), its mean is undefined.
//! The whole attempt is then thrown away and clustering starts over with new random centroids.
//! By default there is no limit on the number of restarts, see [`KmeansOptions::max_restarts`].
//!
//! The individual steps are exposed as well, in case you want to drive the iterations yourself.

mod assign;
mod distance;
mod init;
mod options;
mod update;

pub use assign::*;
pub use distance::*;
pub use init::*;
pub use options::*;
pub use update::*;

use crate::{Channel, ClusterCount, ColorComponents, ColorSlice, KmeansError, KmeansOutput};

use palette::cast;
use rand::Rng;

/// The number of samples handled by each task in the parallel functions.
#[cfg(feature = "threads")]
pub(crate) const CHUNK_SIZE: usize = 4096;

#[inline]
pub(crate) fn squared_euclidean_distance<const N: usize>(x: [f64; N], y: [f64; N]) -> f64 {
    let mut dist = 0.0;
    for c in 0..N {
        let d = x[c] - y[c];
        dist += d * d;
    }
    dist
}

/// The three steps of an iteration, implemented serially or in parallel.
trait Steps {
    /// See [`assign`].
    fn assign<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        centroids: &[[f64; N]],
    ) -> Vec<u16>;

    /// See [`update_centroids`].
    fn update_centroids<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        memberships: &[u16],
        k: usize,
    ) -> Result<Vec<[f64; N]>, OrphanCluster>;

    /// See [`total_distance`].
    fn total_distance<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        memberships: &[u16],
        centroids: &[[f64; N]],
    ) -> f64;
}

/// Runs each step on the current thread.
struct Serial;

impl Steps for Serial {
    fn assign<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        centroids: &[[f64; N]],
    ) -> Vec<u16> {
        assign(samples, centroids)
    }

    fn update_centroids<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        memberships: &[u16],
        k: usize,
    ) -> Result<Vec<[f64; N]>, OrphanCluster> {
        update_centroids(samples, memberships, k)
    }

    fn total_distance<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        memberships: &[u16],
        centroids: &[[f64; N]],
    ) -> f64 {
        total_distance(samples, memberships, centroids)
    }
}

/// Runs each step on the current rayon thread pool.
#[cfg(feature = "threads")]
struct Parallel;

#[cfg(feature = "threads")]
impl Steps for Parallel {
    fn assign<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        centroids: &[[f64; N]],
    ) -> Vec<u16> {
        assign_par(samples, centroids)
    }

    fn update_centroids<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        memberships: &[u16],
        k: usize,
    ) -> Result<Vec<[f64; N]>, OrphanCluster> {
        update_centroids_par(samples, memberships, k)
    }

    fn total_distance<Component: Channel, const N: usize>(
        samples: &[[Component; N]],
        memberships: &[u16],
        centroids: &[[f64; N]],
    ) -> f64 {
        total_distance_par(samples, memberships, centroids)
    }
}

/// The result of a single attempt that did not run into an orphan cluster.
#[derive(Debug, Clone)]
struct Attempt<const N: usize> {
    /// The final (unrounded) centroids.
    centroids: Vec<[f64; N]>,
    /// The memberships the final centroids were computed from.
    memberships: Vec<u16>,
    /// The error of `memberships` against `centroids`.
    error: f64,
    /// The number of iterations run.
    iterations: u32,
    /// Whether the error stopped changing.
    converged: bool,
}

impl<const N: usize> Attempt<N> {
    fn into_output<Color, Component>(self, restarts: u32) -> KmeansOutput<Color>
    where
        Color: ColorComponents<Component, N>,
        Component: Channel,
    {
        let Self {
            centroids,
            memberships,
            error,
            iterations,
            converged,
        } = self;

        let mut counts = vec![0; centroids.len()];
        for &i in &memberships {
            counts[usize::from(i)] += 1;
        }

        let centroids = centroids
            .into_iter()
            .map(|centroid| cast::from_array(centroid.map(Component::from_centroid)))
            .collect();

        KmeansOutput {
            centroids,
            memberships,
            counts,
            error,
            iterations,
            restarts,
            converged,
        }
    }
}

/// Runs k-means from a fresh set of random centroids until convergence or the iteration limit.
fn attempt<S, Component, const N: usize, R>(
    samples: &[[Component; N]],
    k: usize,
    options: &KmeansOptions,
    rng: &mut R,
) -> Result<Attempt<N>, OrphanCluster>
where
    S: Steps,
    Component: Channel,
    R: Rng + ?Sized,
{
    let mut centroids = initial_centroids(samples, k, rng);

    if options.max_iterations == 0 {
        let memberships = S::assign(samples, &centroids);
        let error = S::total_distance(samples, &memberships, &centroids);
        return Ok(Attempt {
            centroids,
            memberships,
            error,
            iterations: 0,
            converged: false,
        });
    }

    // 0.0 stands in for the error of the (nonexistent) previous iteration
    let mut error = 0.0;
    let mut iterations = 0;
    loop {
        let memberships = S::assign(samples, &centroids);
        centroids = S::update_centroids(samples, &memberships, k)?;
        let new_error = S::total_distance(samples, &memberships, &centroids);
        iterations += 1;

        log::debug!("iteration {iterations}: error {new_error}");

        let converged = options.has_converged(error, new_error);
        error = new_error;

        if converged || iterations >= options.max_iterations {
            return Ok(Attempt {
                centroids,
                memberships,
                error,
                iterations,
                converged,
            });
        }
    }
}

/// Returns `k` as a `usize` if it is a valid number of clusters for `colors`.
fn validate<Color>(colors: ColorSlice<'_, Color>, k: ClusterCount) -> Result<usize, KmeansError> {
    let samples = colors.num_colors();
    let k = k.into_inner();
    if k == 0 || k > samples {
        Err(KmeansError::InvalidArgument { k, samples })
    } else {
        Ok(k as usize)
    }
}

/// Restarts attempts until one finishes without an orphan cluster
/// (or the restart limit is exceeded).
fn run<S, Color, Component, const N: usize, R>(
    colors: ColorSlice<'_, Color>,
    k: usize,
    options: &KmeansOptions,
    rng: &mut R,
) -> Result<KmeansOutput<Color>, KmeansError>
where
    S: Steps,
    Color: ColorComponents<Component, N>,
    Component: Channel,
    R: Rng + ?Sized,
{
    let samples: &[[Component; N]] = cast::into_array_slice(&colors);

    log::debug!("clustering {} samples into {k} clusters", samples.len());

    let mut restarts = 0;
    loop {
        match attempt::<S, _, N, _>(samples, k, options, rng) {
            Ok(result) => {
                if result.converged {
                    log::info!(
                        "converged after {} iterations with an error of {}",
                        result.iterations,
                        result.error
                    );
                } else {
                    log::info!(
                        "stopped at the iteration limit of {} with an error of {}",
                        options.max_iterations,
                        result.error
                    );
                }
                return Ok(result.into_output(restarts));
            }
            Err(orphan) => {
                if options.max_restarts.is_some_and(|max| restarts >= max) {
                    log::warn!("{orphan}, giving up after {restarts} restarts");
                    return Err(KmeansError::NoValidClusteringFound { restarts });
                }
                log::warn!("{orphan}, starting over");
                restarts += 1;
            }
        }
    }
}

/// Partitions `colors` into `k` clusters using Lloyd's k-means.
///
/// The initial centroids are drawn from a random number generator seeded by
/// [`KmeansOptions::seed`] (or from OS entropy if no seed is set).
///
/// # Errors
/// - [`KmeansError::InvalidArgument`] if `k` is `0` or greater than the number of colors.
///   This is checked before any work is done.
/// - [`KmeansError::NoValidClusteringFound`] if [`KmeansOptions::max_restarts`] was set and exceeded.
///
/// # Examples
/// ```
/// # use kcolors::{kmeans, ColorSlice, KmeansOptions, KmeansError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let colors = vec![
///     Srgb::new(0u8, 0, 0),
///     Srgb::new(0, 0, 0),
///     Srgb::new(255, 255, 255),
///     Srgb::new(255, 255, 255),
/// ];
/// let colors = ColorSlice::try_from(colors.as_slice())?;
///
/// let output = kmeans::cluster(colors, 2u8.into(), &KmeansOptions::new())?;
/// assert!(output.centroids.contains(&Srgb::new(0u8, 0, 0)));
/// assert!(output.centroids.contains(&Srgb::new(255u8, 255, 255)));
/// assert_eq!(output.error, 0.0);
/// # Ok(())
/// # }
/// ```
pub fn cluster<Color, Component, const N: usize>(
    colors: ColorSlice<'_, Color>,
    k: ClusterCount,
    options: &KmeansOptions,
) -> Result<KmeansOutput<Color>, KmeansError>
where
    Color: ColorComponents<Component, N>,
    Component: Channel,
{
    let k = validate(colors, k)?;
    run::<Serial, _, _, N, _>(colors, k, options, &mut options.rng())
}

/// Same as [`cluster`], but draws the initial centroids from the provided random number generator.
///
/// [`KmeansOptions::seed`] is ignored.
///
/// # Errors
/// See [`cluster`].
pub fn cluster_with_rng<Color, Component, const N: usize>(
    colors: ColorSlice<'_, Color>,
    k: ClusterCount,
    options: &KmeansOptions,
    rng: &mut (impl Rng + ?Sized),
) -> Result<KmeansOutput<Color>, KmeansError>
where
    Color: ColorComponents<Component, N>,
    Component: Channel,
{
    let k = validate(colors, k)?;
    run::<Serial, _, _, N, _>(colors, k, options, rng)
}

/// A parallel version of [`cluster`].
///
/// The memberships computed each iteration are the same as [`cluster`],
/// but the centroids and error may differ by floating point rounding,
/// so the results of the two functions are not guaranteed to be identical for the same seed.
///
/// # Errors
/// See [`cluster`].
#[cfg(feature = "threads")]
pub fn cluster_par<Color, Component, const N: usize>(
    colors: ColorSlice<'_, Color>,
    k: ClusterCount,
    options: &KmeansOptions,
) -> Result<KmeansOutput<Color>, KmeansError>
where
    Color: ColorComponents<Component, N> + Send + Sync,
    Component: Channel,
{
    let k = validate(colors, k)?;
    run::<Parallel, _, _, N, _>(colors, k, options, &mut options.rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use palette::{cast::AsArrays, Srgb};
    use rand::SeedableRng;
    use rand_xoshiro::Xoroshiro128PlusPlus;

    fn seeded(seed: u64) -> KmeansOptions {
        KmeansOptions::new().seed(Some(seed))
    }

    fn assert_valid_output(output: &KmeansOutput<Srgb<u8>>, k: usize, n: usize) {
        assert_eq!(output.centroids.len(), k);
        assert_eq!(output.counts.len(), k);
        assert_eq!(output.memberships.len(), n);
        assert!(output.memberships.iter().all(|&i| usize::from(i) < k));
        assert!(output.error >= 0.0);

        let mut counts = vec![0; k];
        for &i in &output.memberships {
            counts[usize::from(i)] += 1;
        }
        assert_eq!(counts, output.counts);
    }

    #[test]
    fn zero_clusters_is_rejected() {
        let colors = test_data_256();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();

        let result = cluster(colors, 0u8.into(), &KmeansOptions::new());
        assert_eq!(result, Err(KmeansError::InvalidArgument { k: 0, samples: 256 }));
    }

    #[test]
    fn rejected_input_consumes_no_randomness() {
        let colors = test_data_256();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();

        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(9);
        let result = cluster_with_rng(colors, 0u8.into(), &KmeansOptions::new(), &mut rng);
        assert!(result.is_err());
        assert_eq!(rng, Xoroshiro128PlusPlus::seed_from_u64(9));
    }

    #[test]
    fn more_clusters_than_samples_is_rejected() {
        let colors = test_data(10);
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();

        let result = cluster(colors, 11u8.into(), &seeded(0));
        assert_eq!(result, Err(KmeansError::InvalidArgument { k: 11, samples: 10 }));

        let empty: [Srgb<u8>; 0] = [];
        let result = cluster(ColorSlice::from_truncated(&empty), 1u8.into(), &seeded(0));
        assert_eq!(result, Err(KmeansError::InvalidArgument { k: 1, samples: 0 }));
    }

    #[test]
    fn two_colors() {
        let colors = [
            Srgb::new(0u8, 0, 0),
            Srgb::new(0, 0, 0),
            Srgb::new(255, 255, 255),
            Srgb::new(255, 255, 255),
        ];
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();

        for seed in 0..20 {
            let output = cluster(colors, 2u8.into(), &seeded(seed)).unwrap();
            assert_valid_output(&output, 2, 4);
            assert!(output.converged);
            assert_eq!(output.error, 0.0);

            let black = output.memberships[0];
            let white = output.memberships[2];
            assert_ne!(black, white);
            assert_eq!(output.memberships, vec![black, black, white, white]);
            assert_eq!(output.centroids[usize::from(black)], Srgb::new(0u8, 0, 0));
            assert_eq!(output.centroids[usize::from(white)], Srgb::new(255u8, 255, 255));
        }
    }

    #[test]
    fn single_cluster_is_floored_mean() {
        let colors = test_data_1024();
        let samples: &[[u8; 3]] = colors.as_arrays();
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        #[allow(clippy::cast_precision_loss)]
        let mean = {
            let mut sum = [0.0; 3];
            for sample in samples {
                for (s, &c) in sum.iter_mut().zip(sample) {
                    *s += f64::from(c);
                }
            }
            sum.map(|s| s / samples.len() as f64)
        };

        let output = cluster(slice, 1u8.into(), &seeded(1)).unwrap();
        assert_valid_output(&output, 1, samples.len());
        assert!(output.converged);
        assert_eq!(output.centroids[0], cast::from_array::<Srgb<u8>>(mean.map(u8::from_centroid)));

        let expected = total_distance(samples, &output.memberships, &[mean]);
        assert!((output.error - expected).abs() <= 1e-9 * expected);
    }

    #[test]
    fn one_cluster_per_sample() {
        let colors = (0..=255u8)
            .map(|i| Srgb::new(i, 255 - i, i / 2))
            .collect::<Vec<_>>();
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        let output = cluster(slice, 256u16.into(), &seeded(2)).unwrap();
        assert_valid_output(&output, 256, 256);
        assert!(output.counts.iter().all(|&n| n == 1));
        assert_eq!(output.error, 0.0);
        for (color, &i) in colors.iter().zip(&output.memberships) {
            assert_eq!(output.centroids[usize::from(i)], *color);
        }
    }

    #[test]
    fn valid_output_across_seeds() {
        let colors = test_data_1024();
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        for (seed, k) in [(0, 1u8), (1, 2), (2, 5), (3, 16), (4, 64)] {
            let output = cluster(slice, k.into(), &seeded(seed)).unwrap();
            assert_valid_output(&output, k.into(), colors.len());
            assert!(output.counts.iter().all(|&n| n > 0));
        }
    }

    #[test]
    fn finds_separated_blobs() {
        let colors = three_blobs();
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        // random initialization can leave two centroids in one blob, so search over seeds
        let found = (0..64).any(|seed| {
            let output = cluster(slice, 3u8.into(), &seeded(seed)).unwrap();
            assert_valid_output(&output, 3, colors.len());
            output.counts.iter().all(|&n| n == 100)
        });
        assert!(found);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let colors = test_data_1024();
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        let a = cluster(slice, 8u8.into(), &seeded(11)).unwrap();
        let b = cluster(slice, 8u8.into(), &seeded(11)).unwrap();
        assert_eq!(a, b);
    }

    fn squared_error(samples: &[[u8; 3]], memberships: &[u16], centroids: &[[f64; 3]]) -> f64 {
        samples
            .iter()
            .zip(memberships)
            .map(|(s, &i)| squared_euclidean_distance(s.map(f64::from), centroids[usize::from(i)]))
            .sum()
    }

    // The sum of Euclidean distances is not what the mean minimizes, so it can rise slightly
    // between iterations. The sum of squared distances never does (up to rounding).
    #[test]
    fn squared_error_never_increases() {
        let colors = test_data_1024();
        let samples: &[[u8; 3]] = colors.as_arrays();

        for seed in 0..50 {
            let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(seed);
            let k = 2 + (seed as usize % 12);
            let mut centroids = initial_centroids(samples, k, rng);
            let mut previous = f64::INFINITY;

            for _ in 0..100 {
                let memberships = assign(samples, &centroids);
                let Ok(new_centroids) = update_centroids(samples, &memberships, k) else {
                    break; // orphan cluster, this attempt would be restarted
                };
                centroids = new_centroids;
                assert!(total_distance(samples, &memberships, &centroids) >= 0.0);

                let error = squared_error(samples, &memberships, &centroids);
                assert!(error <= previous * (1.0 + 1e-12), "{error} > {previous}");
                if error == previous {
                    break;
                }
                previous = error;
            }
        }
    }

    #[test]
    fn converged_result_is_a_fixed_point() {
        let colors = test_data_1024();
        let samples: &[[u8; 3]] = colors.as_arrays();
        let options = KmeansOptions::new();

        for seed in 0..10 {
            let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(seed);
            let Ok(result) = attempt::<Serial, _, 3, _>(samples, 6, &options, rng) else {
                continue;
            };
            assert!(result.converged);

            let memberships = assign(samples, &result.centroids);
            assert_eq!(memberships, result.memberships);

            let centroids = update_centroids(samples, &memberships, 6).unwrap();
            assert_eq!(centroids, result.centroids);
            assert_eq!(total_distance(samples, &memberships, &centroids), result.error);
        }
    }

    #[test]
    fn iteration_limit_is_not_an_error() {
        let colors = test_data_1024();
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        let output = cluster(slice, 32u8.into(), &seeded(3).max_iterations(1)).unwrap();
        assert_valid_output(&output, 32, colors.len());
        assert_eq!(output.iterations, 1);
        assert!(!output.converged);
    }

    #[test]
    fn zero_iterations_returns_initial_centroids() {
        let colors = test_data_256();
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        let output = cluster(slice, 4u8.into(), &seeded(3).max_iterations(0)).unwrap();
        assert_valid_output(&output, 4, colors.len());
        assert_eq!(output.iterations, 0);
        assert!(output.centroids.iter().all(|c| colors.contains(c)));
    }

    #[test]
    fn orphan_clusters_restart() {
        // two distinct locations can never fill three clusters
        let colors = [
            Srgb::new(0u8, 0, 0),
            Srgb::new(0, 0, 0),
            Srgb::new(0, 0, 0),
            Srgb::new(255, 255, 255),
        ];
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        let result = cluster(slice, 3u8.into(), &seeded(0).max_restarts(Some(5)));
        assert_eq!(result, Err(KmeansError::NoValidClusteringFound { restarts: 5 }));

        let result = cluster(slice, 3u8.into(), &seeded(0).max_restarts(Some(0)));
        assert_eq!(result, Err(KmeansError::NoValidClusteringFound { restarts: 0 }));
    }

    #[test]
    fn orphan_clusters_recover() {
        // picking two of the black samples as initial centroids orphans a cluster,
        // any other pick succeeds
        let colors = [
            Srgb::new(0u8, 0, 0),
            Srgb::new(0, 0, 0),
            Srgb::new(0, 0, 0),
            Srgb::new(255, 255, 255),
        ];
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        let mut restarted = false;
        for seed in 0..32 {
            let output = cluster(slice, 2u8.into(), &seeded(seed)).unwrap();
            assert_valid_output(&output, 2, 4);
            assert!(output.counts.iter().all(|&n| n > 0));
            assert_eq!(output.error, 0.0);
            restarted |= output.restarts > 0;
        }
        assert!(restarted);
    }

    #[cfg(feature = "threads")]
    #[test]
    fn parallel_clustering() {
        let colors = three_blobs();
        let slice = ColorSlice::try_from(colors.as_slice()).unwrap();

        for seed in 0..5 {
            let output = cluster_par(slice, 3u8.into(), &seeded(seed)).unwrap();
            assert_valid_output(&output, 3, colors.len());
            assert_eq!(output, cluster_par(slice, 3u8.into(), &seeded(seed)).unwrap());
        }

        let result = cluster_par(slice, 0u8.into(), &seeded(0));
        assert_eq!(result, Err(KmeansError::InvalidArgument { k: 0, samples: 300 }));
    }
}
