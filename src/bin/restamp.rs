use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use image::ImageFormat;

use restamp::{default_output_path, HueTarget, ProcessOptions, ProcessResult, RestampEngine};

#[derive(Parser)]
#[command(
    name = "restamp",
    about = "Strip hue-keyed channel watermarks and stamp a replacement logo",
    version,
    after_help = "Simple usage: restamp <image>  (strip red watermark, stamp watermark.png)\n\n\
                  The stripped intermediate is written to the system temp directory\n\
                  and removed once stamping finishes."
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output file or directory (default: {name}_restamped.{ext})
    #[arg(short, long)]
    output: Option<String>,

    /// Watermark hue to strip
    #[arg(short, long, value_enum, default_value = "red")]
    mode: Mode,

    /// Logo image stamped onto cleaned images
    #[arg(short, long, default_value = "watermark.png")]
    logo: String,

    /// Logo opacity, greater than 0.0 and at most 1.0
    #[arg(long, default_value = "0.35")]
    opacity: f32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Strip red-dominant pixels
    Red,
    /// Strip blue-dominant pixels
    Blue,
}

impl From<Mode> for HueTarget {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Red => HueTarget::Red,
            Mode::Blue => HueTarget::Blue,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if cli.opacity <= 0.0 || cli.opacity > 1.0 {
        eprintln!("Error: Opacity must be greater than 0.0 and at most 1.0");
        process::exit(1);
    }

    let opts = ProcessOptions {
        hue_target: cli.mode.into(),
        opacity: cli.opacity,
        intermediate_format: ImageFormat::Jpeg,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let engine = RestampEngine::new(&cli.logo);

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if !opts.quiet {
        let hue = match cli.mode {
            Mode::Red => "red",
            Mode::Blue => "blue",
        };
        eprintln!(
            "Stripping {hue} watermarks, stamping {} at {:.0}% opacity",
            cli.logo,
            opts.opacity * 100.0
        );
        eprintln!();
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: restamp <input_dir> -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![engine.process_file(input_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.skipped {
        if !opts.quiet {
            eprintln!("[SKIP] {filename}: {}", result.message);
        }
    } else if result.success {
        if !opts.quiet {
            if let Some(report) = result.report {
                eprintln!("[OK] {filename} ({} pixels replaced)", report.replaced);
            } else {
                eprintln!("[OK] {filename}");
            }
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
