use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tile_watermark::{
    default_output_path, is_supported_output, process_file, WatermarkOptions,
    DEFAULT_TILES_PER_ROW,
};

#[derive(Parser)]
#[command(
    name = "tile-watermark",
    about = "Tile a translucent stencil derived from one image across another",
    version,
    after_help = "Example: tile-watermark -o photo.jpg -w logo.png -r marked.png -n 4\n\n\
                  Pixels of the watermark image brighter than mid-gray become transparent;\n\
                  the rest is drawn at half opacity."
)]
struct Cli {
    /// Path to the image the watermark is applied to
    #[arg(short = 'o', long = "image-input")]
    input: PathBuf,

    /// Path to the image the stencil is derived from
    #[arg(short = 'w', long = "watermark-input")]
    watermark: PathBuf,

    /// Output path (default: {name}_watermarked.png)
    #[arg(short = 'r', long = "image-output")]
    output: Option<PathBuf>,

    /// Desired number of watermarks per row
    #[arg(short = 'n', long = "count-per-row", default_value_t = DEFAULT_TILES_PER_ROW)]
    count_per_row: u32,

    /// Keep the watermark's colors instead of grayscaling it
    #[arg(short, long)]
    colored: bool,

    /// Percentage of the stencil's opacity to keep (0-100)
    #[arg(long, default_value_t = 50)]
    attenuation: u8,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if cli.count_per_row == 0 {
        tracing::error!("watermarks per row must be greater than 0");
        process::exit(1);
    }

    if cli.attenuation > 100 {
        tracing::error!(attenuation = cli.attenuation, "attenuation must be between 0 and 100");
        process::exit(1);
    }

    for path in [&cli.input, &cli.watermark] {
        if !path.exists() {
            tracing::error!(path = %path.display(), "input path does not exist");
            process::exit(1);
        }
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    if !is_supported_output(&output) {
        tracing::error!(
            path = %output.display(),
            "output must be a lossless format (png, bmp, tiff, webp)"
        );
        process::exit(1);
    }

    let opts = WatermarkOptions {
        tiles_per_row: cli.count_per_row,
        grayscale: !cli.colored,
        attenuation: cli.attenuation,
    };
    tracing::debug!(?opts, "watermark options");

    if let Err(e) = process_file(&cli.input, &cli.watermark, &output, &opts) {
        tracing::error!("failed to watermark {}: {e}", cli.input.display());
        process::exit(1);
    }
}
