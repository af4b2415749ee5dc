//! Core restamping engine.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::stamping::{self, DEFAULT_OPACITY};
use crate::stripping::{self, HueTarget, StripReport};

/// Options controlling restamp processing behavior.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Which hue the stripping pass targets.
    pub hue_target: HueTarget,
    /// Logo opacity in `(0.0, 1.0]`.
    pub opacity: f32,
    /// Encoding for the stripped intermediate written between the two
    /// stages.
    pub intermediate_format: ImageFormat,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            hue_target: HueTarget::Red,
            opacity: DEFAULT_OPACITY,
            intermediate_format: ImageFormat::Jpeg,
            verbose: false,
            quiet: false,
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Path of the written output, if one was produced.
    pub output: Option<PathBuf>,
    /// Whether processing succeeded.
    pub success: bool,
    /// Whether stamping was skipped (logo or intermediate went missing).
    pub skipped: bool,
    /// Statistics from the stripping pass, if it ran.
    pub report: Option<StripReport>,
    /// Human-readable status message.
    pub message: String,
}

/// The restamp engine holding the configured logo location.
///
/// Create once with [`RestampEngine::new()`] and reuse for multiple images.
/// The logo is re-read from disk on every stamp, so replacing the file
/// between calls takes effect immediately; a missing logo downgrades the
/// stamp stage to a skip instead of failing the run.
#[derive(Debug, Clone)]
pub struct RestampEngine {
    logo_path: PathBuf,
}

impl RestampEngine {
    /// Create a new engine stamping the logo at `logo_path`.
    ///
    /// No I/O happens here; the path is validated when a stamp runs.
    pub fn new(logo_path: impl Into<PathBuf>) -> Self {
        Self {
            logo_path: logo_path.into(),
        }
    }

    /// Path of the logo this engine stamps.
    #[must_use]
    pub fn logo_path(&self) -> &Path {
        &self.logo_path
    }

    /// Load the configured logo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingImage`] if the file does not exist, or
    /// [`Error::Image`] if it exists but cannot be decoded.
    pub fn load_logo(&self) -> Result<RgbaImage> {
        if !self.logo_path.exists() {
            return Err(Error::MissingImage(self.logo_path.clone()));
        }
        Ok(image::open(&self.logo_path)?.to_rgba8())
    }

    /// Strip the watermark from `input` and write the result to `output`.
    ///
    /// Returns the [`StripReport`] for the pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `input` cannot be opened or decoded;
    /// nothing is written in that case. Encoding or I/O failures while
    /// writing `output` are returned as [`Error::Io`] or [`Error::Image`].
    #[allow(clippy::unused_self)] // method on `self` for API consistency
    pub fn strip_file(
        &self,
        input: &Path,
        output: &Path,
        target: HueTarget,
    ) -> Result<StripReport> {
        let dyn_img = image::open(input).map_err(Error::Decode)?;
        let mut rgba = dyn_img.to_rgba8();
        let report = stripping::strip_watermark(&mut rgba, target);
        save_image(&rgba, output)?;
        Ok(report)
    }

    /// Stamp the configured logo onto the image at `input` and write the
    /// result to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingImage`] if `input` or the logo does not
    /// exist; callers treat that as a recoverable skip. Any other decode,
    /// encode, or I/O failure is returned as-is.
    pub fn stamp_file(&self, input: &Path, output: &Path, opacity: f32) -> Result<()> {
        if !input.exists() {
            return Err(Error::MissingImage(input.to_path_buf()));
        }
        let logo = self.load_logo()?;
        let mut base = image::open(input)?.to_rgba8();

        stamping::stamp_logo(&mut base, &logo, opacity);
        save_image(&base, output)
    }

    /// Process a single image file: strip, write intermediate, stamp, save.
    ///
    /// The stripped bitmap is written to a uniquely named file in the
    /// system temp directory, re-read for the stamp stage, and removed
    /// afterwards on a best-effort basis. A missing logo skips the stamp
    /// stage without producing an output artifact.
    ///
    /// Returns a [`ProcessResult`] indicating success, skip, or failure.
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            output: None,
            success: false,
            skipped: false,
            report: None,
            message: String::new(),
        };

        let intermediate = unique_intermediate_path(input, opts.intermediate_format);

        let report = match self.strip_file(input, &intermediate, opts.hue_target) {
            Ok(report) => report,
            Err(e) => {
                result.message = format!("Failed to strip: {e}");
                remove_intermediate(&intermediate);
                return result;
            }
        };
        result.report = Some(report);
        log::debug!(
            "stripped {}: {} replaced, {} in dead zone, dominant {:?} x{}",
            input.display(),
            report.replaced,
            report.dead_zone,
            report.dominant_color,
            report.dominant_count,
        );

        // Create output directory
        if let Some(parent) = output.parent() {
            if !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    remove_intermediate(&intermediate);
                    return result;
                }
            }
        }

        // Stamp stage runs only if the stripped intermediate landed on disk.
        if intermediate.exists() {
            match self.stamp_file(&intermediate, output, opts.opacity) {
                Ok(()) => {
                    result.success = true;
                    result.output = Some(output.to_path_buf());
                    result.message = format!("Restamped ({} pixels replaced)", report.replaced);
                }
                Err(Error::MissingImage(path)) => {
                    log::warn!("{} not found, stamping skipped", path.display());
                    result.skipped = true;
                    result.success = true;
                    result.message =
                        format!("Image not found: {}, stamping skipped", path.display());
                }
                Err(e) => {
                    result.message = format!("Failed to stamp: {e}");
                }
            }
        } else {
            result.message = format!("Intermediate missing: {}", intermediate.display());
        }

        remove_intermediate(&intermediate);
        result
    }

    /// Process all supported images in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon).
    /// Outputs keep their input filename under `output_dir`. Returns a
    /// [`ProcessResult`] for each image found.
    ///
    /// # Panics
    ///
    /// Panics if any directory entry has no filename (should not happen for
    /// regular files).
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<_> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .filter(|e| is_supported_image(e.path().as_path()))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    output: None,
                    success: false,
                    skipped: false,
                    report: None,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        // Create output directory
        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult {
                    path: output_dir.to_path_buf(),
                    output: None,
                    success: false,
                    skipped: false,
                    report: None,
                    message: format!("Failed to create output directory: {e}"),
                }];
            }
        }

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries
                .par_iter()
                .map(|entry| {
                    let input_path = entry.path();
                    let filename = input_path.file_name().unwrap();
                    let output_path = output_dir.join(filename);
                    self.process_file(&input_path, &output_path, opts)
                })
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries
                .iter()
                .map(|entry| {
                    let input_path = entry.path();
                    let filename = input_path.file_name().unwrap();
                    let output_path = output_dir.join(filename);
                    self.process_file(&input_path, &output_path, opts)
                })
                .collect()
        }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save an RGBA image with format-specific quality settings.
///
/// JPEG output is flattened to RGB (the format has no alpha channel) and
/// encoded at quality 100.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&DynamicImage::ImageRgb8(rgb))?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Generate a default output path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_restamped.jpg"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_restamped.{ext}"))
}

/// Unique path in the system temp directory for a stripped intermediate.
///
/// Every call yields a fresh name, so concurrent runs over the same input
/// never collide.
fn unique_intermediate_path(input: &Path, format: ImageFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = format.extensions_str().first().copied().unwrap_or("img");
    std::env::temp_dir().join(format!("restamp-{stem}-{}.{ext}", Uuid::new_v4()))
}

/// Best-effort removal of a stripped intermediate.
fn remove_intermediate(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::debug!("failed to remove intermediate {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_options_default_matches_documented_values() {
        let opts = ProcessOptions::default();
        assert_eq!(opts.hue_target, HueTarget::Red);
        assert!((opts.opacity - DEFAULT_OPACITY).abs() < f32::EPSILON);
        assert_eq!(opts.intermediate_format, ImageFormat::Jpeg);
    }

    #[test]
    fn default_output_path_appends_restamped_suffix() {
        let p = default_output_path(Path::new("/tmp/photo.jpg"));
        assert_eq!(p, PathBuf::from("/tmp/photo_restamped.jpg"));

        let p = default_output_path(Path::new("image.png"));
        assert_eq!(
            p.file_name().unwrap().to_str().unwrap(),
            "image_restamped.png"
        );
    }

    #[test]
    fn unique_intermediate_path_differs_per_call() {
        let input = Path::new("/data/photo.png");
        let a = unique_intermediate_path(input, ImageFormat::Jpeg);
        let b = unique_intermediate_path(input, ImageFormat::Jpeg);

        assert_ne!(a, b, "two invocations must never share an intermediate");
        assert!(a.starts_with(std::env::temp_dir()));

        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("restamp-photo-"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn is_supported_image_accepts_common_formats() {
        assert!(is_supported_image(Path::new("photo.jpg")));
        assert!(is_supported_image(Path::new("photo.JPEG")));
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("photo.webp")));
        assert!(is_supported_image(Path::new("photo.bmp")));
    }

    #[test]
    fn is_supported_image_rejects_unsupported_formats() {
        assert!(!is_supported_image(Path::new("photo.gif")));
        assert!(!is_supported_image(Path::new("photo.txt")));
        assert!(!is_supported_image(Path::new("photo")));
    }
}
