#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use image::imageops::FilterType;
use kcolors::{ClusterCount, KmeansOptions, PalettePipeline, DEFAULT_MAX_ITERATIONS};

/// Prints the K dominant colors of an image.
#[derive(Parser)]
pub struct Options {
    /// The image to read.
    input: PathBuf,

    /// The number of colors to find.
    #[arg(value_parser = parse_cluster_count)]
    k: ClusterCount,

    /// The width the image is resized to before clustering.
    #[arg(long, default_value_t = 100)]
    width: u32,

    /// The height the image is resized to before clustering.
    #[arg(long, default_value_t = 100)]
    height: u32,

    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    #[arg(long)]
    max_restarts: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Number of threads, `0` to use all cores and `1` to run serially.
    #[arg(short, long, default_value_t = 1)]
    threads: u8,

    #[arg(long)]
    verbose: bool,
}

fn parse_cluster_count(s: &str) -> Result<ClusterCount, String> {
    let value: u32 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

fn main() -> ExitCode {
    let Options {
        input,
        k,
        width,
        height,
        max_iterations,
        max_restarts,
        seed,
        threads,
        verbose,
    } = Options::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    macro_rules! log {
        ($name: literal, $val: expr) => {
            if verbose {
                let time = std::time::Instant::now();
                let value = $val;
                println!("{} took {}ms", $name, time.elapsed().as_millis());
                value
            } else {
                $val
            }
        };
    }

    let image = match log!("read image", image::open(&input)) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("could not read {}: {e}", input.display());
            return ExitCode::FAILURE;
        }
    };

    let image = log!(
        "resize",
        image.resize_exact(width, height, FilterType::Triangle).into_rgb8()
    );

    let options = KmeansOptions::new()
        .max_iterations(max_iterations)
        .max_restarts(max_restarts)
        .seed(seed);

    let pipeline = match PalettePipeline::try_from(&image) {
        Ok(pipeline) => pipeline.clusters(k).options(options),
        Err(e) => {
            eprintln!("image is too large: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = log!(
        "clustering",
        match threads {
            0 => pipeline.palette_par(),
            1 => pipeline.palette(),
            t => match rayon::ThreadPoolBuilder::new().num_threads(t.into()).build() {
                Ok(pool) => pool.install(|| pipeline.palette_par()),
                Err(e) => {
                    eprintln!("could not start thread pool: {e}");
                    return ExitCode::FAILURE;
                }
            },
        }
    );

    match result {
        Ok(output) => {
            for (color, count) in output.centroids.iter().zip(&output.counts) {
                println!(
                    "#{:02x}{:02x}{:02x} {count}",
                    color.red, color.green, color.blue
                );
            }
            if verbose {
                println!(
                    "error: {}, iterations: {}, restarts: {}, converged: {}",
                    output.error, output.iterations, output.restarts, output.converged
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
