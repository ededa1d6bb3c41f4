//! Selection box state: placement, panning and corner resizing
//!
//! All gesture input is clamped, never rejected. The rectangle always
//! satisfies the viewport invariants after every operation.

use super::geometry::{Point, SelectionRect, Vector, Viewport};

/// Smallest width or height a selection can be resized to
pub const MIN_SIZE: f32 = 50.0;
/// Side length of a freshly placed selection
pub const DEFAULT_SIZE: f32 = 140.0;
/// Side length of the touch target around each corner
pub const HANDLE_HIT_SIZE: f32 = 44.0;
/// Side length of the visible handle glyph
pub const HANDLE_GLYPH_SIZE: f32 = 20.0;

/// Corner handles of the selection box
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    /// North-West corner
    NW,
    /// North-East corner
    NE,
    /// South-East corner
    SE,
    /// South-West corner
    SW,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::NW, Corner::NE, Corner::SE, Corner::SW];

    /// Corner diagonally across, which stays fixed while this one is dragged
    pub fn opposite(self) -> Corner {
        match self {
            Corner::NW => Corner::SE,
            Corner::NE => Corner::SW,
            Corner::SE => Corner::NW,
            Corner::SW => Corner::NE,
        }
    }

    /// Position of this corner on `rect`
    pub fn position(self, rect: &SelectionRect) -> Point {
        match self {
            Corner::NW => Point::new(rect.x, rect.y),
            Corner::NE => Point::new(rect.right(), rect.y),
            Corner::SE => Point::new(rect.right(), rect.bottom()),
            Corner::SW => Point::new(rect.x, rect.bottom()),
        }
    }

    fn on_left_edge(self) -> bool {
        matches!(self, Corner::NW | Corner::SW)
    }

    fn on_top_edge(self) -> bool {
        matches!(self, Corner::NW | Corner::NE)
    }
}

/// What an in-progress drag gesture is doing to the selection
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    #[default]
    None,
    /// Moving the whole box
    Pan,
    /// Resizing from one corner
    Resize(Corner),
}

/// Touch target for one corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub corner: Corner,
    /// Hit region, centered on the corner
    pub hit_rect: SelectionRect,
}

/// Selection box owned by the capture session
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEngine {
    viewport: Viewport,
    rect: SelectionRect,
    drag_state: DragState,
}

impl SelectionEngine {
    /// Place a default-size selection centered on `point`
    pub fn placed_at(viewport: Viewport, point: Point) -> Self {
        let mut engine = Self {
            viewport,
            rect: SelectionRect::default(),
            drag_state: DragState::None,
        };
        engine.place_at(point);
        engine
    }

    /// Restore a previously known rectangle, normalized to the viewport
    pub fn with_rect(viewport: Viewport, rect: SelectionRect) -> Self {
        let mut engine = Self {
            viewport,
            rect,
            drag_state: DragState::None,
        };
        engine.refit();
        engine
    }

    pub fn rect(&self) -> SelectionRect {
        self.rect
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    /// Center a default-size selection on `point`, kept fully inside the viewport
    pub fn place_at(&mut self, point: Point) {
        let width = DEFAULT_SIZE.min(self.viewport.width.max(0.0));
        let height = DEFAULT_SIZE.min(self.viewport.height.max(0.0));
        let x = clamp_start(point.x - width / 2.0, self.viewport.width - width);
        let y = clamp_start(point.y - height / 2.0, self.viewport.height - height);
        self.rect = SelectionRect::new(x, y, width, height);
        self.drag_state = DragState::None;
    }

    /// Translate the selection without changing its size
    pub fn pan(&mut self, delta: Vector) {
        if !is_finite(delta) {
            return;
        }
        self.rect.x = clamp_start(self.rect.x + delta.dx, self.viewport.width - self.rect.width);
        self.rect.y = clamp_start(self.rect.y + delta.dy, self.viewport.height - self.rect.height);
    }

    /// Move `corner` by `delta` while the opposite corner stays anchored
    pub fn resize_corner(&mut self, corner: Corner, delta: Vector) {
        if !is_finite(delta) {
            return;
        }
        let dragged = corner.position(&self.rect).offset(delta);
        let anchor = corner.opposite().position(&self.rect);

        let (x, width) = resize_span(
            anchor.x,
            dragged.x,
            corner.on_left_edge(),
            self.viewport.width,
        );
        let (y, height) = resize_span(
            anchor.y,
            dragged.y,
            corner.on_top_edge(),
            self.viewport.height,
        );
        self.rect = SelectionRect::new(x, y, width, height);
    }

    /// Hit regions for the four corner handles
    pub fn handles(&self) -> [Handle; 4] {
        Corner::ALL.map(|corner| Handle {
            corner,
            hit_rect: SelectionRect::centered_square(corner.position(&self.rect), HANDLE_HIT_SIZE),
        })
    }

    /// Corner whose handle contains `point`, if any
    pub fn handle_at(&self, point: Point) -> Option<Corner> {
        self.handles()
            .into_iter()
            .find(|handle| handle.hit_rect.contains_point(point))
            .map(|handle| handle.corner)
    }

    /// Start a drag gesture at `point`; handles take priority over the box body
    pub fn begin_drag(&mut self, point: Point) -> DragState {
        self.drag_state = if let Some(corner) = self.handle_at(point) {
            DragState::Resize(corner)
        } else if self.rect.contains_point(point) {
            DragState::Pan
        } else {
            DragState::None
        };
        self.drag_state
    }

    /// Apply a gesture delta according to the current drag state
    pub fn drag(&mut self, delta: Vector) {
        match self.drag_state {
            DragState::None => {}
            DragState::Pan => self.pan(delta),
            DragState::Resize(corner) => self.resize_corner(corner, delta),
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_state = DragState::None;
    }

    /// Update the viewport (rotation, layout change) and re-clamp the selection
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.refit();
    }

    fn refit(&mut self) {
        let min_width = MIN_SIZE.min(self.viewport.width.max(0.0));
        let min_height = MIN_SIZE.min(self.viewport.height.max(0.0));
        self.rect.width = self.rect.width.max(min_width).min(self.viewport.width.max(0.0));
        self.rect.height = self.rect.height.max(min_height).min(self.viewport.height.max(0.0));
        self.rect.x = clamp_start(self.rect.x, self.viewport.width - self.rect.width);
        self.rect.y = clamp_start(self.rect.y, self.viewport.height - self.rect.height);
    }
}

fn is_finite(delta: Vector) -> bool {
    delta.dx.is_finite() && delta.dy.is_finite()
}

/// Clamp a start coordinate into `[0, max]`
fn clamp_start(value: f32, max: f32) -> f32 {
    value.min(max).max(0.0)
}

/// Recompute one axis of a corner resize.
///
/// `before_anchor` is true when the dragged edge lies on the origin side of
/// the anchor. Returns the new start coordinate and length.
fn resize_span(anchor: f32, dragged: f32, before_anchor: bool, extent: f32) -> (f32, f32) {
    let min = MIN_SIZE.min(extent.max(0.0));
    if before_anchor {
        let length = (anchor - dragged).max(min).min(anchor);
        (anchor - length, length)
    } else {
        let length = (dragged - anchor).max(min).min(extent - anchor);
        (anchor, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn phone() -> Viewport {
        Viewport::new(390.0, 844.0)
    }

    fn centered(viewport: Viewport) -> SelectionEngine {
        SelectionEngine::placed_at(viewport, viewport.center())
    }

    fn assert_inside(rect: SelectionRect, viewport: Viewport) {
        assert!(rect.x >= 0.0, "x out of bounds: {rect:?}");
        assert!(rect.y >= 0.0, "y out of bounds: {rect:?}");
        assert!(rect.right() <= viewport.width + EPS, "right out of bounds: {rect:?}");
        assert!(rect.bottom() <= viewport.height + EPS, "bottom out of bounds: {rect:?}");
        assert!(rect.width >= MIN_SIZE - EPS, "too narrow: {rect:?}");
        assert!(rect.height >= MIN_SIZE - EPS, "too short: {rect:?}");
    }

    #[test]
    fn test_place_at_centers_default_size() {
        let engine = centered(phone());
        assert_eq!(engine.rect(), SelectionRect::new(125.0, 352.0, 140.0, 140.0));
    }

    #[test]
    fn test_place_at_near_edge_stays_inside() {
        let mut engine = centered(phone());
        engine.place_at(Point::new(5.0, 840.0));
        assert_eq!(engine.rect(), SelectionRect::new(0.0, 704.0, 140.0, 140.0));

        engine.place_at(Point::new(1000.0, -50.0));
        assert_eq!(engine.rect(), SelectionRect::new(250.0, 0.0, 140.0, 140.0));
    }

    #[test]
    fn test_pan_clamps_to_viewport_and_keeps_size() {
        let viewport = phone();
        let mut engine = centered(viewport);
        for delta in [
            Vector::new(10_000.0, 10_000.0),
            Vector::new(-10_000.0, 3.0),
            Vector::new(42.5, -10_000.0),
            Vector::new(-1.0, 1.0),
        ] {
            engine.pan(delta);
            let rect = engine.rect();
            assert_inside(rect, viewport);
            assert_eq!(rect.width, 140.0);
            assert_eq!(rect.height, 140.0);
        }

        engine.pan(Vector::new(10_000.0, 10_000.0));
        assert_eq!(engine.rect().x, 250.0);
        assert_eq!(engine.rect().y, 704.0);
    }

    #[test]
    fn test_resize_keeps_anchor_fixed_for_every_corner() {
        let viewport = phone();
        let deltas = [
            Vector::new(-200.0, -200.0),
            Vector::new(300.0, 900.0),
            Vector::new(-130.0, 70.0),
            Vector::new(2.0, -1.0),
            Vector::new(-5000.0, 5000.0),
        ];
        for corner in Corner::ALL {
            for delta in deltas {
                let mut engine = centered(viewport);
                let anchor = corner.opposite().position(&engine.rect());
                engine.resize_corner(corner, delta);
                let after = corner.opposite().position(&engine.rect());
                assert!(
                    (after.x - anchor.x).abs() < EPS && (after.y - anchor.y).abs() < EPS,
                    "{corner:?} by {delta:?} moved anchor {anchor:?} -> {after:?}"
                );
                assert_inside(engine.rect(), viewport);
            }
        }
    }

    #[test]
    fn test_resize_never_shrinks_below_min_size() {
        let mut engine = centered(phone());
        engine.resize_corner(Corner::SE, Vector::new(-500.0, -500.0));
        let rect = engine.rect();
        assert_eq!(rect.x, 125.0);
        assert_eq!(rect.y, 352.0);
        assert_eq!(rect.width, MIN_SIZE);
        assert_eq!(rect.height, MIN_SIZE);

        // Dragging past the anchor does not flip the box
        engine.resize_corner(Corner::NW, Vector::new(400.0, 400.0));
        let rect = engine.rect();
        assert_eq!(rect.right(), 175.0);
        assert_eq!(rect.bottom(), 402.0);
        assert_eq!(rect.width, MIN_SIZE);
    }

    #[test]
    fn test_top_left_drag_clamps_to_viewport_edges() {
        let mut engine = centered(phone());
        engine.resize_corner(Corner::NW, Vector::new(-200.0, -200.0));
        assert_eq!(engine.rect(), SelectionRect::new(0.0, 152.0, 265.0, 340.0));

        engine.resize_corner(Corner::NW, Vector::new(0.0, -400.0));
        assert_eq!(engine.rect(), SelectionRect::new(0.0, 0.0, 265.0, 492.0));
    }

    #[test]
    fn test_begin_drag_prefers_handles_over_body() {
        let mut engine = centered(phone());
        assert_eq!(
            engine.begin_drag(Point::new(126.0, 353.0)),
            DragState::Resize(Corner::NW)
        );
        assert_eq!(engine.begin_drag(Point::new(195.0, 422.0)), DragState::Pan);
        assert_eq!(engine.begin_drag(Point::new(10.0, 10.0)), DragState::None);

        engine.begin_drag(Point::new(264.0, 491.0));
        engine.drag(Vector::new(20.0, 30.0));
        engine.end_drag();
        assert_eq!(engine.rect(), SelectionRect::new(125.0, 352.0, 160.0, 170.0));
        assert_eq!(engine.drag_state(), DragState::None);
    }

    #[test]
    fn test_handle_hit_regions_are_larger_than_glyph() {
        let engine = centered(phone());
        for handle in engine.handles() {
            assert!(handle.hit_rect.width > HANDLE_GLYPH_SIZE);
            let corner = handle.corner.position(&engine.rect());
            assert!(handle.hit_rect.contains_point(corner));
        }
    }

    #[test]
    fn test_set_viewport_reclamps_selection() {
        let mut engine = centered(phone());
        engine.resize_corner(Corner::SE, Vector::new(1000.0, 1000.0));
        engine.set_viewport(Viewport::new(200.0, 300.0));
        assert_inside(engine.rect(), engine.viewport());
        assert_eq!(engine.rect().width, 200.0);
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let mut engine = centered(phone());
        let before = engine.rect();
        engine.pan(Vector::new(f32::NAN, 4.0));
        engine.resize_corner(Corner::NE, Vector::new(f32::INFINITY, 0.0));
        assert_eq!(engine.rect(), before);
    }
}
