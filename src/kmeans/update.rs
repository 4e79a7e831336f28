use crate::Channel;

use std::{error::Error, fmt::Display};

#[cfg(feature = "threads")]
use {super::CHUNK_SIZE, rayon::prelude::*};

/// An error signaling that a cluster was assigned no samples,
/// so its mean (the new centroid) is undefined.
///
/// The clustering functions recover from this by starting over with new initial centroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanCluster {
    /// The index of the (lowest) empty cluster.
    pub cluster: u32,
}

impl Display for OrphanCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cluster {} has no samples assigned to it", self.cluster)
    }
}

impl Error for OrphanCluster {}

/// Per cluster component sums and sample counts.
struct ClusterSums<const N: usize> {
    /// The component-wise sum of the samples in each cluster.
    sums: Vec<[f64; N]>,
    /// The number of samples in each cluster.
    counts: Vec<u32>,
}

impl<const N: usize> ClusterSums<N> {
    fn new(k: usize) -> Self {
        Self {
            sums: vec![[0.0; N]; k],
            counts: vec![0; k],
        }
    }

    fn add_samples<Component: Channel>(&mut self, samples: &[[Component; N]], memberships: &[u16]) {
        for (sample, &i) in samples.iter().zip(memberships) {
            let i = usize::from(i);
            for (s, &c) in self.sums[i].iter_mut().zip(sample) {
                *s += c.into();
            }
            self.counts[i] += 1;
        }
    }

    fn merge(&mut self, other: &Self) {
        for (sum, other) in self.sums.iter_mut().zip(&other.sums) {
            for (s, &o) in sum.iter_mut().zip(other) {
                *s += o;
            }
        }
        for (count, &other) in self.counts.iter_mut().zip(&other.counts) {
            *count += other;
        }
    }

    fn into_means(self) -> Result<Vec<[f64; N]>, OrphanCluster> {
        let Self { sums, counts } = self;

        if let Some(cluster) = counts.iter().position(|&n| n == 0) {
            #[allow(clippy::cast_possible_truncation)]
            return Err(OrphanCluster { cluster: cluster as u32 });
        }

        Ok(sums
            .into_iter()
            .zip(counts)
            .map(|(sum, n)| sum.map(|s| s / f64::from(n)))
            .collect())
    }
}

/// Computes the new centroids as the mean of the samples assigned to each of the `k` clusters.
///
/// # Errors
/// Returns [`OrphanCluster`] if any cluster has no samples assigned to it.
pub fn update_centroids<Component, const N: usize>(
    samples: &[[Component; N]],
    memberships: &[u16],
    k: usize,
) -> Result<Vec<[f64; N]>, OrphanCluster>
where
    Component: Channel,
{
    let mut sums = ClusterSums::new(k);
    sums.add_samples(samples, memberships);
    sums.into_means()
}

/// A parallel version of [`update_centroids`].
///
/// The samples are summed in fixed size chunks that are then merged in order,
/// so the result does not depend on thread scheduling.
/// It may differ from [`update_centroids`] by floating point rounding.
///
/// # Errors
/// Returns [`OrphanCluster`] if any cluster has no samples assigned to it.
#[cfg(feature = "threads")]
pub fn update_centroids_par<Component, const N: usize>(
    samples: &[[Component; N]],
    memberships: &[u16],
    k: usize,
) -> Result<Vec<[f64; N]>, OrphanCluster>
where
    Component: Channel,
{
    let partials = samples
        .par_chunks(CHUNK_SIZE)
        .zip(memberships.par_chunks(CHUNK_SIZE))
        .map(|(samples, memberships)| {
            let mut sums = ClusterSums::new(k);
            sums.add_samples(samples, memberships);
            sums
        })
        .collect::<Vec<_>>();

    let mut sums = ClusterSums::new(k);
    for partial in &partials {
        sums.merge(partial);
    }
    sums.into_means()
}
