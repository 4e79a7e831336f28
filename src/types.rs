//! Contains various types needed across the crate.

use crate::{MAX_CLUSTERS, MAX_PIXELS};
use std::{
    error::Error,
    fmt::{Debug, Display},
    ops::Deref,
};
#[cfg(feature = "image")]
use {
    image::RgbImage,
    palette::{cast::ComponentsAs, Srgb},
};

/// An error type for when the length of an input (e.g., `Vec` or slice)
/// is above the maximum supported value.
///
/// The inner value is the maximum supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AboveMaxLen<T>(pub T);

impl<T: Display> Display for AboveMaxLen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "above the maximum length of {}", self.0)
    }
}

impl<T: Debug + Display> Error for AboveMaxLen<T> {}

/// The errors that clustering can return to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmeansError {
    /// The number of clusters was zero or greater than the number of samples.
    ///
    /// This is checked before any computation is done.
    InvalidArgument {
        /// The requested number of clusters.
        k: u32,
        /// The number of samples provided.
        samples: u32,
    },
    /// Every attempt ended with an empty cluster,
    /// and the configured maximum number of restarts was exceeded.
    ///
    /// This can only be returned if [`KmeansOptions::max_restarts`](crate::KmeansOptions::max_restarts)
    /// was set, as the number of restarts is unbounded by default.
    NoValidClusteringFound {
        /// The number of restarts that were performed.
        restarts: u32,
    },
}

impl Display for KmeansError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KmeansError::InvalidArgument { k: 0, .. } => {
                write!(f, "the number of clusters must be at least 1")
            }
            KmeansError::InvalidArgument { k, samples } => write!(
                f,
                "cannot form {k} clusters from only {samples} samples"
            ),
            KmeansError::NoValidClusteringFound { restarts } => write!(
                f,
                "no clustering without an empty cluster was found after {restarts} restarts"
            ),
        }
    }
}

impl Error for KmeansError {}

/// A simple new type wrapper around `&'a [Color]` with the invariant that the length of the
/// inner slice must not be greater than [`MAX_PIXELS`].
///
/// # Examples
/// Use `try_into` or [`ColorSlice::from_truncated`] to create [`ColorSlice`]s.
///
/// From a raw color slice:
/// ```
/// # use kcolors::{ColorSlice, AboveMaxLen};
/// # use palette::Srgb;
/// # fn main() -> Result<(), AboveMaxLen<u32>> {
/// let srgb = vec![Srgb::new(0, 0, 0)];
/// let colors: ColorSlice<_> = srgb.as_slice().try_into()?;
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use kcolors::ColorSlice;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
/// let colors = ColorSlice::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorSlice<'a, Color>(&'a [Color]);

impl<'a, Color> Clone for ColorSlice<'a, Color> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, Color> Copy for ColorSlice<'a, Color> {}

impl<'a, Color> ColorSlice<'a, Color> {
    /// Creates a new [`ColorSlice`] by truncating the input slice to a max length of [`MAX_PIXELS`].
    pub fn from_truncated(colors: &'a [Color]) -> Self {
        Self(&colors[..colors.len().min(MAX_PIXELS as usize)])
    }

    /// Returns the length of the slice as a `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn num_colors(&self) -> u32 {
        self.0.len() as u32
    }
}

impl<'a, Color> AsRef<[Color]> for ColorSlice<'a, Color> {
    fn as_ref(&self) -> &[Color] {
        self
    }
}

impl<'a, Color> Deref for ColorSlice<'a, Color> {
    type Target = [Color];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<'a, Color> From<ColorSlice<'a, Color>> for &'a [Color] {
    fn from(val: ColorSlice<'a, Color>) -> Self {
        val.0
    }
}

impl<'a, Color> TryFrom<&'a [Color]> for ColorSlice<'a, Color> {
    type Error = AboveMaxLen<u32>;

    fn try_from(slice: &'a [Color]) -> Result<Self, Self::Error> {
        if slice.len() <= MAX_PIXELS as usize {
            Ok(Self(slice))
        } else {
            Err(AboveMaxLen(MAX_PIXELS))
        }
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbImage> for ColorSlice<'a, Srgb<u8>> {
    type Error = AboveMaxLen<u32>;

    fn try_from(image: &'a RgbImage) -> Result<Self, Self::Error> {
        let pixels = image.pixels().len();
        if pixels <= MAX_PIXELS as usize {
            let buf = &image.as_raw()[..(pixels * 3)];
            Ok(Self(buf.components_as()))
        } else {
            Err(AboveMaxLen(MAX_PIXELS))
        }
    }
}

/// The number of clusters (`K`) to partition the samples into.
///
/// This is a simple new type wrapper around `u32` with the invariant that it must be
/// less than or equal to [`MAX_CLUSTERS`].
///
/// A [`ClusterCount`] of `0` can be constructed, but clustering functions will
/// reject it with [`KmeansError::InvalidArgument`].
///
/// # Examples
/// Use `into` to create [`ClusterCount`]s from `u8`s or `u16`s.
/// For `u32`s, use `try_into` or [`ClusterCount::from_clamped`].
///
/// ```
/// # use kcolors::{ClusterCount, AboveMaxLen};
/// # fn main() -> Result<(), AboveMaxLen<u32>> {
/// let k = ClusterCount::from(8u8);
/// let k: ClusterCount = 1024u16.into();
/// let k = ClusterCount::try_from(4096u32)?;
/// let k = ClusterCount::from_clamped(1 << 20);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ClusterCount(u32);

impl ClusterCount {
    /// The maximum supported number of clusters (given by [`MAX_CLUSTERS`]).
    pub const MAX: Self = Self(MAX_CLUSTERS);

    /// Gets the inner `u32` value.
    #[must_use]
    pub const fn into_inner(self) -> u32 {
        self.0
    }

    /// Creates a [`ClusterCount`] by clamping the given `u32` to be less than or equal to [`MAX_CLUSTERS`].
    #[must_use]
    pub const fn from_clamped(value: u32) -> Self {
        if value <= MAX_CLUSTERS {
            Self(value)
        } else {
            Self(MAX_CLUSTERS)
        }
    }
}

impl From<ClusterCount> for u32 {
    fn from(val: ClusterCount) -> Self {
        val.into_inner()
    }
}

impl From<u8> for ClusterCount {
    fn from(value: u8) -> Self {
        Self(value.into())
    }
}

impl From<u16> for ClusterCount {
    fn from(value: u16) -> Self {
        Self(value.into())
    }
}

impl TryFrom<u32> for ClusterCount {
    type Error = AboveMaxLen<u32>;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value <= MAX_CLUSTERS {
            Ok(ClusterCount(value))
        } else {
            Err(AboveMaxLen(MAX_CLUSTERS))
        }
    }
}

impl Display for ClusterCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

/// The output struct returned by the clustering functions.
///
/// Both a converged run and a run that hit the iteration limit produce this same struct;
/// `converged` only tells them apart.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansOutput<Color> {
    /// The `K` cluster centers, converted back into the sample color type.
    ///
    /// Integer components are floored, so each centroid lies within the value range of the samples.
    pub centroids: Vec<Color>,
    /// The index into `centroids` of the cluster each sample was assigned to.
    pub memberships: Vec<u16>,
    /// The number of samples assigned to each centroid.
    ///
    /// Each count is non-zero, unless the maximum number of iterations was set to `0`.
    pub counts: Vec<u32>,
    /// The sum of the Euclidean distances between each sample and its (unfloored) centroid.
    pub error: f64,
    /// The number of iterations run in the final attempt.
    pub iterations: u32,
    /// The number of times clustering was restarted because a cluster became empty.
    pub restarts: u32,
    /// Whether the error stopped changing before the iteration limit was reached.
    pub converged: bool,
}
