//! Watermark a single image with the default options.
//!
//! Usage:
//! ```sh
//! cargo run --example watermark_file -- photo.jpg logo.png marked.png
//! ```

use std::env;
use std::process;

use tile_watermark::{process_file, WatermarkOptions};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <base> <watermark> <output>", args[0]);
        process::exit(1);
    }

    let opts = WatermarkOptions::default();
    match process_file(args[1].as_ref(), args[2].as_ref(), args[3].as_ref(), &opts) {
        Ok(()) => println!("Done: {}", args[3]),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
