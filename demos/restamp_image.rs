//! Strip the channel watermark from a single image and stamp a logo.
//!
//! Usage:
//! ```sh
//! cargo run --example restamp_image -- input.jpg output.jpg [logo.png]
//! ```

use std::env;
use std::process;

use restamp::{ProcessOptions, RestampEngine};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output> [logo]", args[0]);
        process::exit(1);
    }

    let input = &args[1];
    let output = &args[2];
    let logo = args.get(3).map_or("watermark.png", String::as_str);

    let engine = RestampEngine::new(logo);
    let opts = ProcessOptions::default();
    let result = engine.process_file(input.as_ref(), output.as_ref(), &opts);

    if result.skipped {
        println!("Skipped: {}", result.message);
    } else if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
