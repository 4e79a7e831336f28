use super::squared_euclidean_distance;
use crate::Channel;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Returns the index of the centroid closest to `sample`.
///
/// Exact ties go to the lowest index.
#[inline]
fn nearest<const N: usize>(sample: [f64; N], centroids: &[[f64; N]]) -> u16 {
    let mut min_index = 0;
    let mut min_distance = f64::INFINITY;
    for (i, &centroid) in centroids.iter().enumerate() {
        let distance = squared_euclidean_distance(sample, centroid);
        if distance < min_distance {
            min_distance = distance;
            min_index = i;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    {
        min_index as u16
    }
}

/// Assigns each sample to its nearest centroid (by Euclidean distance),
/// returning the index of the centroid for each sample.
///
/// If multiple centroids are equally close, the one with the lowest index is chosen.
///
/// The length of `centroids` must not be greater than [`MAX_CLUSTERS`](crate::MAX_CLUSTERS).
#[must_use]
pub fn assign<Component, const N: usize>(
    samples: &[[Component; N]],
    centroids: &[[f64; N]],
) -> Vec<u16>
where
    Component: Channel,
{
    samples
        .iter()
        .map(|sample| nearest(sample.map(Into::into), centroids))
        .collect()
}

/// A parallel version of [`assign`]. The returned memberships are identical.
#[cfg(feature = "threads")]
#[must_use]
pub fn assign_par<Component, const N: usize>(
    samples: &[[Component; N]],
    centroids: &[[f64; N]],
) -> Vec<u16>
where
    Component: Channel,
{
    samples
        .par_iter()
        .map(|sample| nearest(sample.map(Into::into), centroids))
        .collect()
}
