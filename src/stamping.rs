//! Logo preparation and bottom-right stamping.
//!
//! A stamp pass takes the cleaned base image and a logo bitmap, scales the
//! logo to 90% of the base width and the full base height (the logo's own
//! aspect ratio is deliberately ignored), forces a uniform opacity onto it,
//! and composites it 10px in from the base's bottom-right corner with
//! Porter-Duff source-over:
//!
//! `out = fg * fg_a + bg * bg_a * (1 - fg_a)`, renormalized by the output
//! alpha `fg_a + bg_a * (1 - fg_a)`.
//!
//! Because the scaled logo is as tall as the base, the stamp position's y
//! component is negative and the top of the logo hangs off-canvas; the
//! blend step clips it.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Fraction of the base width the scaled logo occupies.
pub const LOGO_WIDTH_FRACTION: f32 = 0.90;

/// Gap, in pixels, between the logo and the base's right and bottom edges.
pub const STAMP_MARGIN: i64 = 10;

/// Opacity applied to the logo when none is configured.
pub const DEFAULT_OPACITY: f32 = 0.35;

/// Replace the alpha channel of every pixel with `round(opacity * 255)`.
///
/// Existing alpha is discarded rather than scaled: a fully transparent
/// source pixel ends up as opaque as every other pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn set_opacity(image: &mut RgbaImage, opacity: f32) {
    debug_assert!(
        (0.0..=1.0).contains(&opacity),
        "opacity {opacity} outside [0, 1]"
    );
    let alpha = (opacity * 255.0).round() as u8;
    for pixel in image.pixels_mut() {
        pixel[3] = alpha;
    }
}

/// Target dimensions for a logo stamped onto a base of the given size.
///
/// Width is `round(0.90 * base_width)`, height is the full base height.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn scaled_logo_size(base_width: u32, base_height: u32) -> (u32, u32) {
    let width = (LOGO_WIDTH_FRACTION * base_width as f32).round() as u32;
    (width, base_height)
}

/// Top-left corner for a logo placed [`STAMP_MARGIN`] pixels in from the
/// base's bottom-right corner.
///
/// Coordinates are signed: a logo taller or wider than the remaining space
/// yields negative components and the blend step clips the overhang. With
/// [`scaled_logo_size`] the y component is always `-STAMP_MARGIN`.
#[must_use]
pub fn stamp_position(
    base_width: u32,
    base_height: u32,
    logo_width: u32,
    logo_height: u32,
) -> (i64, i64) {
    let x = i64::from(base_width) - i64::from(logo_width) - STAMP_MARGIN;
    let y = i64::from(base_height) - i64::from(logo_height) - STAMP_MARGIN;
    (x, y)
}

/// Composite `overlay` onto `base` with its top-left corner at the signed
/// position (`x`, `y`), using Porter-Duff source-over per pixel.
///
/// Overlay regions falling outside the base are clipped; a fully
/// off-canvas overlay leaves `base` untouched.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_over(base: &mut RgbaImage, overlay: &RgbaImage, x: i64, y: i64) {
    let base_width = i64::from(base.width());
    let base_height = i64::from(base.height());

    for (ox, oy, overlay_pixel) in overlay.enumerate_pixels() {
        let bx = x + i64::from(ox);
        let by = y + i64::from(oy);
        if bx < 0 || by < 0 || bx >= base_width || by >= base_height {
            continue;
        }

        let (bx, by) = (bx as u32, by as u32);
        let blended = blend_pixel(*base.get_pixel(bx, by), *overlay_pixel);
        base.put_pixel(bx, by, blended);
    }
}

/// Source-over blend of a single foreground pixel onto a background pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_pixel(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_a = f32::from(foreground[3]) / 255.0;
    let bg_a = f32::from(background[3]) / 255.0;
    let out_a = fg_a + bg_a * (1.0 - fg_a);

    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let fg = f32::from(foreground[channel]);
        let bg = f32::from(background[channel]);
        out[channel] = ((fg * fg_a + bg * bg_a * (1.0 - fg_a)) / out_a).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;

    Rgba(out)
}

/// Stamp `logo` onto `base` in place.
///
/// The logo is resized to [`scaled_logo_size`] with bilinear filtering,
/// its alpha is replaced with `opacity`, and the result is blended at the
/// bottom-right [`stamp_position`]. Zero-sized bases and logos are left
/// untouched.
pub fn stamp_logo(base: &mut RgbaImage, logo: &RgbaImage, opacity: f32) {
    if base.width() == 0 || base.height() == 0 || logo.width() == 0 || logo.height() == 0 {
        return;
    }

    let (target_width, target_height) = scaled_logo_size(base.width(), base.height());
    if target_width == 0 || target_height == 0 {
        return;
    }

    let mut prepared = imageops::resize(logo, target_width, target_height, FilterType::Triangle);
    set_opacity(&mut prepared, opacity);

    let (x, y) = stamp_position(base.width(), base.height(), prepared.width(), prepared.height());
    blend_over(base, &prepared, x, y);
}
