//! Overlay-to-source coordinate mapping
//!
//! The preview fills the viewport, so each axis is scaled independently
//! with no aspect-ratio correction.

use super::geometry::{CropRegion, SelectionRect, Viewport};

/// Map an overlay-space selection onto a `source_width` x `source_height` image.
///
/// The result always lies within the source bounds. A degenerate overlay or
/// source produces an empty region; callers fall back to the full image.
pub fn to_source_pixels(
    rect: &SelectionRect,
    overlay: Viewport,
    source_width: u32,
    source_height: u32,
) -> CropRegion {
    if overlay.width <= 0.0 || overlay.height <= 0.0 || source_width == 0 || source_height == 0 {
        return CropRegion::default();
    }

    let scale_x = f64::from(source_width) / f64::from(overlay.width);
    let scale_y = f64::from(source_height) / f64::from(overlay.height);

    let (origin_x, width) = scale_span(rect.x, rect.width, scale_x, source_width);
    let (origin_y, height) = scale_span(rect.y, rect.height, scale_y, source_height);

    CropRegion {
        origin_x,
        origin_y,
        width,
        height,
    }
}

fn scale_span(start: f32, length: f32, scale: f64, limit: u32) -> (u32, u32) {
    let limit = i64::from(limit);
    let origin = round_scaled(start, scale).clamp(0, limit);
    let length = round_scaled(length, scale).clamp(0, limit - origin);
    // Both values are within [0, limit] and limit came from a u32
    (origin as u32, length as u32)
}

fn round_scaled(value: f32, scale: f64) -> i64 {
    let scaled = (f64::from(value) * scale).round();
    if scaled.is_nan() {
        0
    } else {
        scaled as i64
    }
}
