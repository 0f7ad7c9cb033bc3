//! Seam feathering around swapped face regions.
//!
//! Model output replaces a rectangular patch of the frame; pasting it back
//! verbatim leaves visible seams. This blends the altered region into the
//! original frame with a soft alpha ramp derived from where the two frames
//! actually differ.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::box_filter;
use tracing::warn;

use vmorph_models::BoundingBox;

/// Working region margin, as a fraction of the box's larger dimension.
const MARGIN_FRACTION: f32 = 0.25;
/// Mean absolute channel difference above which a pixel counts as changed.
const DIFF_THRESHOLD: f32 = 5.0;
/// Minimum changed pixels for blending to be worth doing.
const MIN_CHANGED_PIXELS: usize = 10;
/// Smallest blur kernel applied to the mask.
const MIN_KERNEL: u32 = 7;

/// Default feather fraction used by the swap pipeline.
pub const DEFAULT_FEATHER_FRACTION: f32 = 0.1;

/// Blend a swapped frame into its original around `altered_box`.
///
/// Only pixels inside the expanded working region are touched; fully
/// changed interior pixels keep the swapped value exactly. When the frames
/// barely differ the swapped frame is returned as-is.
pub fn blend_swapped_region(
    original: &RgbImage,
    swapped: &RgbImage,
    altered_box: BoundingBox,
    feather_fraction: f32,
) -> RgbImage {
    if original.dimensions() != swapped.dimensions() {
        warn!(
            "Frame size mismatch in feathering: {:?} vs {:?}",
            original.dimensions(),
            swapped.dimensions()
        );
        return swapped.clone();
    }
    let (frame_w, frame_h) = original.dimensions();

    let region = match altered_box
        .expand(MARGIN_FRACTION)
        .to_pixel_rect(frame_w, frame_h)
    {
        Some(r) => r,
        None => return swapped.clone(),
    };

    // Binary mask of pixels the swap actually changed
    let mut mask = GrayImage::new(region.width, region.height);
    let mut changed = 0usize;
    for dy in 0..region.height {
        for dx in 0..region.width {
            let o = original.get_pixel(region.x + dx, region.y + dy);
            let s = swapped.get_pixel(region.x + dx, region.y + dy);
            let diff = (o[0].abs_diff(s[0]) as f32
                + o[1].abs_diff(s[1]) as f32
                + o[2].abs_diff(s[2]) as f32)
                / 3.0;
            if diff > DIFF_THRESHOLD {
                mask.put_pixel(dx, dy, Luma([255]));
                changed += 1;
            }
        }
    }

    if changed < MIN_CHANGED_PIXELS {
        return swapped.clone();
    }

    let mut kernel = MIN_KERNEL.max(
        (region.width.min(region.height) as f32 * feather_fraction).round() as u32,
    );
    if kernel % 2 == 0 {
        kernel += 1;
    }
    let radius = kernel / 2;
    let blurred = box_filter(&mask, radius, radius);

    let mut out = swapped.clone();
    for dy in 0..region.height {
        for dx in 0..region.width {
            let hard = mask.get_pixel(dx, dy)[0];
            let soft = blurred.get_pixel(dx, dy)[0];
            // Interior stays at full opacity; only the ramp outside the
            // changed area blends back toward the original.
            let alpha = f32::from(hard.max(soft)) / 255.0;
            if alpha >= 1.0 {
                continue;
            }
            let x = region.x + dx;
            let y = region.y + dy;
            let o = original.get_pixel(x, y);
            let s = swapped.get_pixel(x, y);
            let mut px = [0u8; 3];
            for c in 0..3 {
                let blended = alpha * f32::from(s[c]) + (1.0 - alpha) * f32::from(o[c]);
                px[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
            out.put_pixel(x, y, Rgb(px));
        }
    }

    out
}
