//! Strip hue-keyed channel watermarks and stamp a replacement logo.
//!
//! Mirrored channel images arrive with a source watermark drawn in a single
//! saturated hue (usually red). This crate removes it by overwriting every
//! hue-dominant pixel with a background sample taken 10 columns away, then
//! composites a replacement logo across the bottom of the cleaned image at
//! a fixed opacity.
//!
//! # Quick Start
//!
//! ```no_run
//! use restamp::{ProcessOptions, RestampEngine};
//! use std::path::Path;
//!
//! let engine = RestampEngine::new("watermark.png");
//! let result = engine.process_file(
//!     Path::new("photo.jpg"),
//!     Path::new("photo_restamped.jpg"),
//!     &ProcessOptions::default(),
//! );
//! println!("{}", result.message);
//! ```
//!
//! # In-memory pipeline
//!
//! The two passes are plain functions over [`image::RgbaImage`] and can be
//! driven without touching the filesystem:
//!
//! ```no_run
//! use restamp::{stamping, stripping, HueTarget};
//!
//! let mut img = image::open("photo.jpg").unwrap().to_rgba8();
//! let report = stripping::strip_watermark(&mut img, HueTarget::Red);
//! println!("replaced {} pixels", report.replaced);
//!
//! let logo = image::open("logo.png").unwrap().to_rgba8();
//! stamping::stamp_logo(&mut img, &logo, stamping::DEFAULT_OPACITY);
//! ```

#![deny(missing_docs)]

mod engine;
pub mod error;
pub mod stamping;
pub mod stripping;

pub use engine::{
    default_output_path, is_supported_image, save_image, ProcessOptions, ProcessResult,
    RestampEngine,
};
pub use error::{Error, Result};
pub use stripping::{HueTarget, StripReport};
