use super::squared_euclidean_distance;
use crate::Channel;

#[cfg(feature = "threads")]
use {super::CHUNK_SIZE, rayon::prelude::*};

/// Sums the distances of a run of samples to their centroids.
#[inline]
fn sum_distances<Component, const N: usize>(
    samples: &[[Component; N]],
    memberships: &[u16],
    centroids: &[[f64; N]],
) -> f64
where
    Component: Channel,
{
    samples
        .iter()
        .zip(memberships)
        .map(|(sample, &i)| {
            squared_euclidean_distance(sample.map(Into::into), centroids[usize::from(i)]).sqrt()
        })
        .sum()
}

/// Computes the total error of a clustering:
/// the sum of the Euclidean distances between each sample and the centroid it is assigned to.
#[must_use]
pub fn total_distance<Component, const N: usize>(
    samples: &[[Component; N]],
    memberships: &[u16],
    centroids: &[[f64; N]],
) -> f64
where
    Component: Channel,
{
    sum_distances(samples, memberships, centroids)
}

/// A parallel version of [`total_distance`].
///
/// Distances are summed in fixed size chunks and the chunk sums are added in order,
/// so the result does not depend on thread scheduling.
#[cfg(feature = "threads")]
#[must_use]
pub fn total_distance_par<Component, const N: usize>(
    samples: &[[Component; N]],
    memberships: &[u16],
    centroids: &[[f64; N]],
) -> f64
where
    Component: Channel,
{
    samples
        .par_chunks(CHUNK_SIZE)
        .zip(memberships.par_chunks(CHUNK_SIZE))
        .map(|(samples, memberships)| sum_distances(samples, memberships, centroids))
        .collect::<Vec<_>>()
        .into_iter()
        .sum()
}
