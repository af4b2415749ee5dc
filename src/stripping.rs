//! Dominant-color analysis and hue-keyed watermark stripping.
//!
//! Channel watermarks targeted here are drawn in a single saturated hue
//! (red or blue) over ordinary artwork. Stripping runs two full passes over
//! the bitmap:
//!
//! 1. tally every exact (R,G,B) triple and find the most frequent color,
//!    assumed to be the uninterrupted background;
//! 2. overwrite every hue-dominant pixel with the pixel 10 columns away,
//!    preferring the left neighbor and falling back to the right one near
//!    the left edge.
//!
//! The dominant color is reported for diagnostics only; substitution is
//! driven purely by the local neighbor sample. Pass 2 mutates the buffer it
//! is scanning, so a left sample may read a pixel substituted earlier in
//! the same row. That read-after-write propagation is part of the contract
//! and is covered by a regression test.

use image::{Rgb, Rgba, RgbaImage};
use indexmap::IndexMap;

/// Horizontal distance, in pixels, to the substitution sample.
pub const SAMPLE_OFFSET: u32 = 10;

/// Absolute floor the lead channel must exceed to count as hue-dominant.
pub const DOMINANCE_FLOOR: f32 = 50.0;

/// Ratio by which the lead channel must exceed each other channel.
pub const DOMINANCE_RATIO: f32 = 1.25;

/// Dominant color reported for an empty bitmap.
pub const FALLBACK_DOMINANT: [u8; 3] = [255, 255, 255];

/// Which color channel marks a pixel as watermark-like.
///
/// Both modes share one rule; only the lead channel differs:
/// `lead > 50 && lead > other_1 * 1.25 && lead > other_2 * 1.25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HueTarget {
    /// Red-dominant pixels (red and pinkish watermarks).
    Red,
    /// Blue-dominant pixels.
    Blue,
}

impl HueTarget {
    /// Whether `pixel` is dominated by this target's channel.
    ///
    /// Comparisons are strict: a lead channel of exactly 50, or exactly
    /// 1.25 times another channel, does not qualify.
    #[must_use]
    pub fn is_dominant(self, pixel: Rgba<u8>) -> bool {
        let r = f32::from(pixel[0]);
        let g = f32::from(pixel[1]);
        let b = f32::from(pixel[2]);

        let (lead, other_1, other_2) = match self {
            HueTarget::Red => (r, g, b),
            HueTarget::Blue => (b, r, g),
        };

        lead > DOMINANCE_FLOOR
            && lead > other_1 * DOMINANCE_RATIO
            && lead > other_2 * DOMINANCE_RATIO
    }
}

/// Statistics from one stripping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripReport {
    /// Most frequent exact (R,G,B) triple, white for an empty bitmap.
    pub dominant_color: Rgb<u8>,
    /// Number of pixels carrying the dominant color.
    pub dominant_count: u64,
    /// Number of hue-dominant pixels overwritten with a neighbor sample.
    pub replaced: u64,
    /// Number of hue-dominant pixels with no valid sample on either side
    /// (only possible on bitmaps narrower than 21px).
    pub dead_zone: u64,
}

/// Find the most frequent exact (R,G,B) triple in `image`.
///
/// Alpha is ignored. Colors are counted at full 24-bit resolution with no
/// quantization. Ties resolve to the color encountered first in row-major
/// scan order; an empty bitmap reports white with a count of zero.
#[must_use]
pub fn dominant_color(image: &RgbaImage) -> (Rgb<u8>, u64) {
    let mut frequencies: IndexMap<[u8; 3], u64> = IndexMap::new();
    for pixel in image.pixels() {
        *frequencies
            .entry([pixel[0], pixel[1], pixel[2]])
            .or_insert(0) += 1;
    }

    // Insertion order is scan order, so a strict comparison keeps the
    // first color seen when counts tie.
    let mut dominant = FALLBACK_DOMINANT;
    let mut max_count = 0u64;
    for (&color, &count) in &frequencies {
        if count > max_count {
            dominant = color;
            max_count = count;
        }
    }

    (Rgb(dominant), max_count)
}

/// Strip a hue-keyed watermark from `image` in place.
///
/// Scans row-major, top-to-bottom, left-to-right. Every pixel matching the
/// [`HueTarget`] predicate has its RGB channels overwritten with the pixel
/// [`SAMPLE_OFFSET`] columns to the left, or to the right when the pixel
/// sits within [`SAMPLE_OFFSET`] of the left edge. Alpha is never touched.
/// Pixels with no valid sample on either side (bitmaps narrower than
/// `2 * SAMPLE_OFFSET + 1`) are left unmodified.
///
/// Substitution reads the buffer being mutated: a left sample taken from a
/// watermark run wider than [`SAMPLE_OFFSET`] observes the substituted
/// value, not the original one.
pub fn strip_watermark(image: &mut RgbaImage, target: HueTarget) -> StripReport {
    let (dominant, dominant_count) = dominant_color(image);

    let width = image.width();
    let height = image.height();
    let mut replaced = 0u64;
    let mut dead_zone = 0u64;

    for y in 0..height {
        for x in 0..width {
            if !target.is_dominant(*image.get_pixel(x, y)) {
                continue;
            }

            let sample_x = if x >= SAMPLE_OFFSET {
                x - SAMPLE_OFFSET
            } else if x + SAMPLE_OFFSET < width {
                x + SAMPLE_OFFSET
            } else {
                dead_zone += 1;
                continue;
            };
            debug_assert!(
                sample_x < width,
                "sample column {sample_x} out of bounds for width {width}"
            );

            let sample = *image.get_pixel(sample_x, y);
            let pixel = image.get_pixel_mut(x, y);
            pixel[0] = sample[0];
            pixel[1] = sample[1];
            pixel[2] = sample[2];
            replaced += 1;
        }
    }

    StripReport {
        dominant_color: dominant,
        dominant_count,
        replaced,
        dead_zone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn predicate_requires_strict_floor_and_ratio() {
        // Floor is strict: exactly 50 does not qualify.
        assert!(!HueTarget::Red.is_dominant(Rgba([50, 0, 0, 255])));
        assert!(HueTarget::Red.is_dominant(Rgba([51, 40, 40, 255])));

        // Ratio is strict: 100 vs 80 gives exactly 80 * 1.25 == 100.
        assert!(!HueTarget::Red.is_dominant(Rgba([100, 80, 80, 255])));
        assert!(HueTarget::Red.is_dominant(Rgba([101, 80, 80, 255])));

        // One channel below ratio is enough to reject.
        assert!(!HueTarget::Red.is_dominant(Rgba([120, 40, 100, 255])));
    }

    #[test]
    fn predicate_blue_mode_mirrors_red_mode() {
        assert!(HueTarget::Blue.is_dominant(Rgba([40, 40, 51, 255])));
        assert!(!HueTarget::Blue.is_dominant(Rgba([51, 40, 40, 255])));
        assert!(!HueTarget::Red.is_dominant(Rgba([40, 40, 51, 255])));
    }

    #[test]
    fn dominant_color_counts_exact_triples_ignoring_alpha() {
        let mut img = filled(2, 2, [10, 20, 30, 255]);
        img.put_pixel(1, 1, Rgba([200, 200, 200, 255]));
        // Same triple, different alpha, still counted together.
        img.put_pixel(0, 1, Rgba([10, 20, 30, 7]));

        let (color, count) = dominant_color(&img);
        assert_eq!(color, Rgb([10, 20, 30]));
        assert_eq!(count, 3);
    }

    #[test]
    fn dominant_color_tie_keeps_first_in_scan_order() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([1, 1, 1, 255]));
        img.put_pixel(1, 0, Rgba([2, 2, 2, 255]));
        img.put_pixel(0, 1, Rgba([1, 1, 1, 255]));
        img.put_pixel(1, 1, Rgba([2, 2, 2, 255]));

        let (color, count) = dominant_color(&img);
        assert_eq!(color, Rgb([1, 1, 1]), "tie must resolve to first color seen");
        assert_eq!(count, 2);
    }

    #[test]
    fn dominant_color_of_empty_bitmap_is_white() {
        let img = RgbaImage::new(0, 0);
        let (color, count) = dominant_color(&img);
        assert_eq!(color, Rgb(FALLBACK_DOMINANT));
        assert_eq!(count, 0);
    }

    #[test]
    fn uniform_non_dominant_bitmap_is_unchanged() {
        let mut img = filled(30, 8, [100, 100, 100, 255]);
        let before = img.clone();

        let report = strip_watermark(&mut img, HueTarget::Red);

        assert_eq!(img, before);
        assert_eq!(report.dominant_color, Rgb([100, 100, 100]));
        assert_eq!(report.dominant_count, 30 * 8);
        assert_eq!(report.replaced, 0);
        assert_eq!(report.dead_zone, 0);
    }

    #[test]
    fn uniform_hue_dominant_bitmap_substitutes_every_pixel() {
        // Every pixel matches, every sample is the same red, so values are
        // preserved while the whole bitmap counts as replaced.
        let mut img = filled(30, 4, [200, 30, 30, 255]);
        let before = img.clone();

        let report = strip_watermark(&mut img, HueTarget::Red);

        assert_eq!(img, before);
        assert_eq!(report.replaced, 30 * 4);
        assert_eq!(report.dead_zone, 0);
    }

    #[test]
    fn dead_zone_pixel_is_left_unmodified() {
        // Width 15: left samples need x >= 10, right samples need x <= 4,
        // so x in 5..=9 has no valid sample.
        let mut img = filled(15, 3, [240, 240, 240, 255]);
        img.put_pixel(7, 1, Rgba([220, 40, 40, 255]));

        let report = strip_watermark(&mut img, HueTarget::Red);

        assert_eq!(*img.get_pixel(7, 1), Rgba([220, 40, 40, 255]));
        assert_eq!(report.replaced, 0);
        assert_eq!(report.dead_zone, 1);
    }

    #[test]
    fn right_sample_used_near_left_edge() {
        let mut img = filled(30, 1, [240, 240, 240, 255]);
        img.put_pixel(3, 0, Rgba([220, 40, 40, 255]));

        let report = strip_watermark(&mut img, HueTarget::Red);

        assert_eq!(*img.get_pixel(3, 0), Rgba([240, 240, 240, 255]));
        assert_eq!(report.replaced, 1);
        assert_eq!(report.dead_zone, 0);
    }

    #[test]
    fn left_sample_propagates_already_substituted_values() {
        // A run of hue-dominant pixels wider than the sample offset: the
        // pixel at x=20 samples x=10, which was itself substituted moments
        // earlier in the same row. A double-buffered implementation would
        // leave the original red at x=20 instead of the background.
        let background = Rgba([40, 40, 200, 255]);
        let mut img = RgbaImage::from_pixel(32, 1, background);
        for x in 10..=20 {
            img.put_pixel(x, 0, Rgba([200, 30, 30, 255]));
        }

        let report = strip_watermark(&mut img, HueTarget::Red);

        for x in 10..=20 {
            assert_eq!(
                *img.get_pixel(x, 0),
                background,
                "pixel at x={x} must reflect the substituted run"
            );
        }
        assert_eq!(report.replaced, 11);
    }

    #[test]
    fn alpha_is_preserved_through_substitution() {
        let mut img = filled(30, 1, [240, 240, 240, 255]);
        img.put_pixel(12, 0, Rgba([220, 40, 40, 7]));

        strip_watermark(&mut img, HueTarget::Red);

        assert_eq!(*img.get_pixel(12, 0), Rgba([240, 240, 240, 7]));
    }

    #[test]
    fn blue_mode_replaces_only_blue_dominant_pixels() {
        let mut img = filled(30, 1, [120, 120, 120, 255]);
        img.put_pixel(15, 0, Rgba([30, 30, 220, 255]));
        img.put_pixel(20, 0, Rgba([220, 30, 30, 255]));

        let report = strip_watermark(&mut img, HueTarget::Blue);

        assert_eq!(*img.get_pixel(15, 0), Rgba([120, 120, 120, 255]));
        assert_eq!(
            *img.get_pixel(20, 0),
            Rgba([220, 30, 30, 255]),
            "red pixel must survive blue mode"
        );
        assert_eq!(report.replaced, 1);
    }
}
