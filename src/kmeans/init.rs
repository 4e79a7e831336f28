use crate::Channel;

use rand::{seq::index, Rng};

/// Picks `k` distinct samples uniformly at random to serve as the initial centroids.
///
/// # Panics
/// Panics if `k` is greater than the number of samples.
/// The clustering functions reject such inputs before calling this.
#[must_use]
pub fn initial_centroids<Component, const N: usize, R>(
    samples: &[[Component; N]],
    k: usize,
    rng: &mut R,
) -> Vec<[f64; N]>
where
    Component: Channel,
    R: Rng + ?Sized,
{
    index::sample(rng, samples.len(), k)
        .into_iter()
        .map(|i| samples[i].map(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use palette::cast::AsArrays;
    use rand::SeedableRng;
    use rand_xoshiro::Xoroshiro128PlusPlus;
    use std::collections::HashSet;

    #[test]
    fn picks_distinct_samples() {
        // every sample is unique, so distinct indices imply distinct centroids
        let samples = (0..=255u8).map(|v| [v, 0, 0]).collect::<Vec<_>>();
        let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(3);

        for k in [1, 16, 255, 256] {
            let centroids = initial_centroids(&samples, k, rng);
            assert_eq!(centroids.len(), k);

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let unique = centroids
                .iter()
                .map(|c| c[0] as u8)
                .collect::<HashSet<_>>();
            assert_eq!(unique.len(), k);
        }
    }

    #[test]
    fn centroids_are_samples() {
        let colors = test_data_256();
        let samples: &[[u8; 3]] = colors.as_arrays();
        let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(0);

        let centroids = initial_centroids(samples, 32, rng);
        for centroid in centroids {
            assert!(samples
                .iter()
                .any(|sample| sample.map(f64::from) == centroid));
        }
    }

    #[test]
    fn same_seed_same_centroids() {
        let colors = test_data_1024();
        let samples: &[[u8; 3]] = colors.as_arrays();

        let a = initial_centroids(samples, 8, &mut Xoroshiro128PlusPlus::seed_from_u64(5));
        let b = initial_centroids(samples, 8, &mut Xoroshiro128PlusPlus::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
