use serde::{Deserialize, Serialize};

/// Epsilon added to IoU denominators so degenerate boxes never divide by zero.
const AREA_EPSILON: f32 = 1e-6;

/// An axis-aligned bounding box in pixel coordinates.
///
/// Serialized on the wire as a `[x1, y1, x2, y2]` array, matching the
/// detector payloads and the preview response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f32; 4]", from = "[f32; 4]")]
pub struct BoundingBox {
    /// Left edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
    /// Right edge
    pub x2: f32,
    /// Bottom edge
    pub y2: f32,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width, clamped to zero for inverted boxes.
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Height, clamped to zero for inverted boxes.
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Area in square pixels.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Center point `(cx, cy)`.
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// True when the box has no positive area.
    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }

    /// Intersection-over-union with another box.
    ///
    /// Disjoint boxes score 0.0. A box against itself scores ~1.0 (the
    /// denominator carries a small epsilon).
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        if ix2 <= ix1 || iy2 <= iy1 {
            return 0.0;
        }
        let inter = (ix2 - ix1) * (iy2 - iy1);
        inter / (self.area() + other.area() - inter + AREA_EPSILON)
    }

    /// Ratio of the smaller area to the larger area, in `[0, 1]`.
    ///
    /// Returns 0.0 when either box is empty.
    pub fn size_ratio(&self, other: &BoundingBox) -> f32 {
        let a = self.area();
        let b = other.area();
        if a <= 0.0 || b <= 0.0 {
            return 0.0;
        }
        a.min(b) / a.max(b)
    }

    /// Grow the box by `fraction` of its larger dimension on each side.
    pub fn expand(&self, fraction: f32) -> BoundingBox {
        let margin = fraction * self.width().max(self.height());
        BoundingBox::new(
            self.x1 - margin,
            self.y1 - margin,
            self.x2 + margin,
            self.y2 + margin,
        )
    }

    /// Clip the box to a `width x height` frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> BoundingBox {
        let w = width as f32;
        let h = height as f32;
        BoundingBox::new(
            self.x1.clamp(0.0, w),
            self.y1.clamp(0.0, h),
            self.x2.clamp(0.0, w),
            self.y2.clamp(0.0, h),
        )
    }

    /// Convert to an integer pixel rectangle clipped to the frame, or `None`
    /// when nothing of the box lies inside it.
    pub fn to_pixel_rect(&self, frame_width: u32, frame_height: u32) -> Option<PixelRect> {
        let clamped = self.clamp_to(frame_width, frame_height);
        let x = clamped.x1.floor() as u32;
        let y = clamped.y1.floor() as u32;
        let x2 = (clamped.x2.ceil() as u32).min(frame_width);
        let y2 = (clamped.y2.ceil() as u32).min(frame_height);
        if x2 <= x || y2 <= y {
            return None;
        }
        Some(PixelRect {
            x,
            y,
            width: x2 - x,
            height: y2 - y,
        })
    }

    /// Corners rounded to integers, for wire payloads.
    pub fn to_int_array(&self) -> [i32; 4] {
        [
            self.x1.round() as i32,
            self.y1.round() as i32,
            self.x2.round() as i32,
            self.y2.round() as i32,
        ]
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        BoundingBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// An integer rectangle fully inside a frame, half-open on the far edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_with_self_is_one() {
        let b = BoundingBox::new(10.0, 20.0, 110.0, 220.0);
        assert!((b.iou(&b) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_iou_disjoint_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(50.0, 50.0, 60.0, 60.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_symmetric() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(1.0, 1.0, 11.0, 11.0);
        assert!((a.iou(&b) - b.iou(&a)).abs() < 1e-6);
        // 9x9 overlap over a union of 119
        assert!((a.iou(&b) - 81.0 / 119.0).abs() < 1e-4);
    }

    #[test]
    fn test_size_ratio() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(0.0, 0.0, 20.0, 10.0);
        assert!((a.size_ratio(&b) - 0.5).abs() < 1e-6);
        assert!((b.size_ratio(&a) - 0.5).abs() < 1e-6);

        let empty = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
        assert_eq!(a.size_ratio(&empty), 0.0);
    }

    #[test]
    fn test_expand_and_clamp() {
        let b = BoundingBox::new(10.0, 10.0, 30.0, 50.0);
        // larger dimension is 40, margin 10 per side
        let e = b.expand(0.25);
        assert_eq!(e.x1, 0.0);
        assert_eq!(e.y1, 0.0);
        assert_eq!(e.x2, 40.0);
        assert_eq!(e.y2, 60.0);

        let clamped = e.clamp_to(35, 55);
        assert_eq!(clamped.x2, 35.0);
        assert_eq!(clamped.y2, 55.0);
    }

    #[test]
    fn test_pixel_rect_outside_frame() {
        let b = BoundingBox::new(-20.0, -20.0, -5.0, -5.0);
        assert!(b.to_pixel_rect(100, 100).is_none());

        let inside = BoundingBox::new(2.4, 3.6, 7.2, 9.1);
        let r = inside.to_pixel_rect(100, 100).unwrap();
        assert_eq!((r.x, r.y, r.width, r.height), (2, 3, 6, 7));
    }

    #[test]
    fn test_serde_round_trip_as_array() {
        let b = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
