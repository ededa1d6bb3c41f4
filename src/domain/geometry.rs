//! Geometric types for the overlay and for captured images

/// A point in overlay (screen) coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset the point by a gesture delta
    pub fn offset(self, delta: Vector) -> Point {
        Point {
            x: self.x + delta.dx,
            y: self.y + delta.dy,
        }
    }
}

/// Gesture translation between two pointer events
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector {
    pub dx: f32,
    pub dy: f32,
}

impl Vector {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Size of the rendered camera viewport
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center of the viewport
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Rectangle in overlay coordinates (top-left origin plus size)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SelectionRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of `size` centered on `center`
    pub fn centered_square(center: Point, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if this rectangle contains a point
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Crop rectangle in source-image pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CropRegion {
    pub origin_x: u32,
    pub origin_y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Region covering a whole image
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip the region so it lies within a `width` x `height` image
    pub fn clipped_to(self, width: u32, height: u32) -> Self {
        let origin_x = self.origin_x.min(width);
        let origin_y = self.origin_y.min(height);
        Self {
            origin_x,
            origin_y,
            width: self.width.min(width - origin_x),
            height: self.height.min(height - origin_y),
        }
    }
}

/// Rectangle normalized to the [0, 1] range on both axes
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedBox {
    /// Build a box, clamping every edge into the unit square
    pub fn clamped(x: f32, y: f32, width: f32, height: f32) -> Self {
        let left = sanitize_unit(x);
        let top = sanitize_unit(y);
        let right = sanitize_unit(x + width).max(left);
        let bottom = sanitize_unit(y + height).max(top);
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Map into overlay space for drawing on top of the viewport
    pub fn to_overlay(&self, viewport: Viewport) -> SelectionRect {
        SelectionRect::new(
            self.x * viewport.width,
            self.y * viewport.height,
            self.width * viewport.width,
            self.height * viewport.height,
        )
    }
}

fn sanitize_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_region_clipped_to_bounds() {
        let region = CropRegion {
            origin_x: 90,
            origin_y: 10,
            width: 50,
            height: 500,
        };
        assert_eq!(
            region.clipped_to(100, 100),
            CropRegion {
                origin_x: 90,
                origin_y: 10,
                width: 10,
                height: 90,
            }
        );

        let outside = CropRegion {
            origin_x: 200,
            origin_y: 0,
            width: 10,
            height: 10,
        };
        assert!(outside.clipped_to(100, 100).is_empty());
    }

    #[test]
    fn test_normalized_box_clamps_and_maps_to_overlay() {
        let bbox = NormalizedBox::clamped(-0.1, 0.5, 0.6, 0.8);
        assert_eq!(bbox.x, 0.0);
        assert!((bbox.width - 0.5).abs() < 1e-6);
        assert!((bbox.height - 0.5).abs() < 1e-6);

        let rect = bbox.to_overlay(Viewport::new(200.0, 400.0));
        assert!((rect.x - 0.0).abs() < 1e-4);
        assert!((rect.y - 200.0).abs() < 1e-4);
        assert!((rect.width - 100.0).abs() < 1e-4);
        assert!((rect.height - 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_contains_point_excludes_far_edges() {
        let rect = SelectionRect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains_point(Point::new(10.0, 10.0)));
        assert!(!rect.contains_point(Point::new(30.0, 15.0)));
    }
}
