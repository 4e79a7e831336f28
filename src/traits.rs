use num_traits::AsPrimitive;
use palette::cast::ArrayCast;

/// A color that can be viewed as an array of `N` components.
///
/// This is automatically implemented for all of [`palette`]'s color types
/// (e.g., [`Srgb<u8>`](palette::Srgb)).
pub trait ColorComponents<Component, const N: usize>:
    ArrayCast<Array = [Component; N]> + Copy + 'static
{
}

impl<Color, Component, const N: usize> ColorComponents<Component, N> for Color where
    Color: ArrayCast<Array = [Component; N]> + Copy + 'static
{
}

/// A color component type that k-means can average over.
///
/// Centroids are computed in `f64` and converted back into the component type
/// once clustering is done.
pub trait Channel: Copy + Into<f64> + Send + Sync + 'static {
    /// Converts a centroid component back into the value domain of the samples.
    ///
    /// Integer components are floored (and saturated to the bounds of the type),
    /// while float components are kept as is.
    fn from_centroid(value: f64) -> Self;
}

impl Channel for u8 {
    fn from_centroid(value: f64) -> Self {
        value.floor().as_()
    }
}

impl Channel for u16 {
    fn from_centroid(value: f64) -> Self {
        value.floor().as_()
    }
}

impl Channel for f32 {
    fn from_centroid(value: f64) -> Self {
        value.as_()
    }
}

impl Channel for f64 {
    fn from_centroid(value: f64) -> Self {
        value
    }
}
