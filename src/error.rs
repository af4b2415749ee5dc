//! Error types for the restamp crate.

use std::path::PathBuf;

/// Errors that can occur while stripping or stamping watermarks.
///
/// Out-of-bounds pixel sampling is not represented here: sample indices are
/// guarded arithmetically and asserted, so a violation is a programming
/// error that fails loudly rather than an error value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source artifact could not be decoded into a bitmap.
    ///
    /// The stripper aborts the affected artifact without writing any output,
    /// so callers can detect the failure by the absence of the stripped
    /// artifact.
    #[error("failed to decode source image: {0}")]
    Decode(image::ImageError),

    /// An input image was missing when the compositor went to read it.
    ///
    /// This is the recoverable case: the pipeline skips watermarking for
    /// the artifact, logs, and continues. All other I/O failures during
    /// compositing propagate.
    #[error("image not found: {}", .0.display())]
    MissingImage(PathBuf),

    /// An I/O error occurred while reading or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output path asks for a format outside the supported encode set.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Any other image processing failure (compositing decode, encode,
    /// resize).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let missing = Error::MissingImage(PathBuf::from("/tmp/logo.png"));
        assert!(missing.to_string().contains("/tmp/logo.png"));

        let decode = Error::Decode(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "truncated",
        )));
        assert!(decode.to_string().contains("decode"));
    }
}
