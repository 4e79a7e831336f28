//! A library for extracting the dominant colors of an image through k-means clustering.
//!
//! `kcolors` runs Lloyd's k-means over a flat slice of colors (typically the pixels of a
//! downscaled image) and returns `K` representative centroid colors, the cluster of each pixel,
//! and the total distance of every pixel to its centroid.
//!
//! # Features
//! To reduce dependencies and compile times, `kcolors` has several `cargo` features
//! that can be turned off or on:
//! - `pipelines`: exposes the [`PalettePipeline`] builder struct as a high-level API.
//! - `threads`: exposes parallel versions of the clustering functions via [`rayon`].
//! - `image`: enables integration with the [`image`] crate.
//!
//! # Example
//! ```no_run
//! # use kcolors::{PalettePipeline, KmeansOptions};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgb8();
//!
//! let output = PalettePipeline::try_from(&img)?
//!     .clusters(5u8.into())
//!     .options(KmeansOptions::new().seed(Some(42)))
//!     .palette()?;
//!
//! for (color, count) in output.centroids.iter().zip(&output.counts) {
//!     println!("{color:?}: {count} pixels");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The lower-level functions live in the [`kmeans`] module.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod traits;
mod types;

#[cfg(feature = "pipelines")]
mod api;

pub mod kmeans;

pub use kmeans::KmeansOptions;
pub use traits::*;
pub use types::*;

#[cfg(feature = "pipelines")]
pub use api::*;

/// The maximum supported number of samples/pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The maximum supported number of clusters is `65536`, so that every cluster label fits in a `u16`.
pub const MAX_CLUSTERS: u32 = u16::MAX as u32 + 1;

/// The default bound on the number of k-means iterations per attempt.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;
