//! CPU unsharp-mask sharpening used by the local enhancement backend.

use image::{Rgb, RgbImage};
use imageproc::filter::gaussian_blur_f32;

/// Gaussian sigma for the blur pass.
const UNSHARP_SIGMA: f32 = 1.1;

/// Sharpen a frame with a classic unsharp mask.
///
/// Each channel becomes `(1 + strength) * px - strength * blurred`, clamped
/// to the valid range. Flat regions are unchanged; edges gain contrast.
pub fn unsharp_mask(frame: &RgbImage, strength: f32) -> RgbImage {
    let blurred = gaussian_blur_f32(frame, UNSHARP_SIGMA);
    let (width, height) = frame.dimensions();
    let mut out = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let px = frame.get_pixel(x, y);
            let bl = blurred.get_pixel(x, y);
            let mut sharpened = [0u8; 3];
            for c in 0..3 {
                let value = (1.0 + strength) * f32::from(px[c]) - strength * f32::from(bl[c]);
                sharpened[c] = value.round().clamp(0.0, 255.0) as u8;
            }
            out.put_pixel(x, y, Rgb(sharpened));
        }
    }
    out
}
