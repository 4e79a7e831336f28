#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use image::{imageops::FilterType, RgbImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// The size images are downscaled to before clustering, as done by the `dominant_colors` demo.
pub const RESIZE_TO: (u32, u32) = (100, 100);

pub fn load_images(images: &[PathBuf]) -> Vec<(String, RgbImage)> {
    images
        .iter()
        .map(|path| {
            image::open(path).map(|image| {
                (
                    path.file_name().unwrap().to_owned().into_string().unwrap(),
                    image
                        .resize_exact(RESIZE_TO.0, RESIZE_TO.1, FilterType::Triangle)
                        .into_rgb8(),
                )
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, RgbImage)> {
    let mut paths = std::fs::read_dir(dir)
        .expect("read img directory")
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

/// An image made of `blobs` noisy color regions.
pub fn synthetic_image(name: &str, blobs: usize, seed: u64) -> (String, RgbImage) {
    let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(seed);
    let centers = (0..blobs)
        .map(|_| [rng.gen_range(16..240u8), rng.gen_range(16..240), rng.gen_range(16..240)])
        .collect::<Vec<_>>();

    let (width, height) = RESIZE_TO;
    let image = RgbImage::from_fn(width, height, |x, _| {
        let center = centers[(x as usize * blobs) / width as usize];
        image::Rgb(center.map(|c| c - 16 + rng.gen_range(0..32)))
    });

    (name.to_owned(), image)
}

pub const BENCH_IMAGE_DIR: &str = "img";

static BENCH_IMAGES: OnceLock<Vec<(String, RgbImage)>> = OnceLock::new();

/// Images from [`BENCH_IMAGE_DIR`] if it exists, otherwise a few synthetic images.
pub fn bench_images() -> &'static [(String, RgbImage)] {
    BENCH_IMAGES.get_or_init(|| {
        if Path::new(BENCH_IMAGE_DIR).is_dir() {
            load_image_dir(BENCH_IMAGE_DIR)
        } else {
            vec![
                synthetic_image("blobs4", 4, 0),
                synthetic_image("blobs16", 16, 1),
                synthetic_image("blobs64", 64, 2),
            ]
        }
    })
}
