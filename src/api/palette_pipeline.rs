use crate::{
    kmeans::{self, KmeansOptions},
    ClusterCount, ColorComponents, ColorSlice, KmeansError, KmeansOutput,
};

#[cfg(feature = "image")]
use {crate::AboveMaxLen, image::RgbImage, palette::Srgb};

/// A builder struct to find the dominant colors of an image or slice of colors.
///
/// # Examples
/// ```no_run
/// # use kcolors::{PalettePipeline, KmeansOptions};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
///
/// let output = PalettePipeline::try_from(&img)?
///     .clusters(8u8.into())
///     .options(KmeansOptions::new().max_iterations(100))
///     .palette()?;
///
/// println!("{:?}", output.centroids);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PalettePipeline<'a, Color, const N: usize>
where
    Color: ColorComponents<u8, N>,
{
    /// The input colors/pixels.
    pub(crate) colors: ColorSlice<'a, Color>,
    /// The number of clusters/dominant colors.
    pub(crate) k: ClusterCount,
    /// The parameters for k-means.
    pub(crate) options: KmeansOptions,
}

impl<'a, Color, const N: usize> PalettePipeline<'a, Color, N>
where
    Color: ColorComponents<u8, N>,
{
    /// Creates a new [`PalettePipeline`] with 8 clusters and the default [`KmeansOptions`].
    #[must_use]
    pub fn new(colors: ColorSlice<'a, Color>) -> Self {
        Self {
            colors,
            k: 8u8.into(),
            options: KmeansOptions::new(),
        }
    }

    /// Sets the number of dominant colors to find.
    ///
    /// The default is `8`.
    #[must_use]
    pub fn clusters(mut self, k: ClusterCount) -> Self {
        self.k = k;
        self
    }

    /// Sets the parameters for k-means.
    #[must_use]
    pub fn options(mut self, options: KmeansOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs k-means on the current thread.
    ///
    /// # Errors
    /// See [`kmeans::cluster`].
    pub fn palette(self) -> Result<KmeansOutput<Color>, KmeansError> {
        let Self { colors, k, options } = self;
        kmeans::cluster(colors, k, &options)
    }
}

#[cfg(feature = "threads")]
impl<'a, Color, const N: usize> PalettePipeline<'a, Color, N>
where
    Color: ColorComponents<u8, N> + Send + Sync,
{
    /// Runs k-means in parallel on the current rayon thread pool.
    ///
    /// # Errors
    /// See [`kmeans::cluster_par`].
    pub fn palette_par(self) -> Result<KmeansOutput<Color>, KmeansError> {
        let Self { colors, k, options } = self;
        kmeans::cluster_par(colors, k, &options)
    }
}

impl<'a, Color, const N: usize> From<ColorSlice<'a, Color>> for PalettePipeline<'a, Color, N>
where
    Color: ColorComponents<u8, N>,
{
    fn from(colors: ColorSlice<'a, Color>) -> Self {
        Self::new(colors)
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbImage> for PalettePipeline<'a, Srgb<u8>, 3> {
    type Error = AboveMaxLen<u32>;

    fn try_from(image: &'a RgbImage) -> Result<Self, Self::Error> {
        Ok(Self::new(image.try_into()?))
    }
}
