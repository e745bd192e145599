//! Pan/zoom viewport state and screen ↔ world mapping

use crate::geometry::Point;
use crate::graph::CommitGraph;
use crate::model::CommitNode;

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;
/// Wheel step toward the scene (scroll up / negative delta).
pub const WHEEL_ZOOM_IN: f32 = 1.1;
/// Wheel step away from the scene (scroll down / positive delta).
pub const WHEEL_ZOOM_OUT: f32 = 0.9;
/// Pick distance around a node centre, in world units.
pub const PICK_RADIUS: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    /// Pointer position minus offset, captured when the drag began.
    origin: Point,
}

/// Camera over world space: a translation applied after a uniform scale.
///
/// `screen = world * scale + offset`. The scale is clamped to
/// [`MIN_SCALE`, `MAX_SCALE`]; zooming is anchored at the canvas origin and
/// leaves the offset untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    offset: Point,
    scale: f32,
    drag: Option<DragState>,
}

impl Viewport {
    pub fn new() -> Self {
        Viewport {
            offset: Point::ZERO,
            scale: 1.0,
            drag: None,
        }
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        (p - self.offset) / self.scale
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        p * self.scale + self.offset
    }

    /// Start a pan at the given screen position.
    ///
    /// A drag already in progress is restarted from the new position.
    pub fn begin_drag(&mut self, p: Point) {
        self.drag = Some(DragState {
            origin: p - self.offset,
        });
    }

    /// Move the pan to a new screen position.
    ///
    /// Returns whether the viewport changed. Without an active drag this is
    /// a no-op, so stray pointer-move events cannot shift the camera.
    pub fn continue_drag(&mut self, p: Point) -> bool {
        match self.drag {
            Some(drag) => {
                self.offset = p - drag.origin;
                true
            }
            None => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Multiply the scale by `factor`, clamped to the legal range.
    pub fn zoom_by(&mut self, factor: f32) {
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Apply one wheel notch. Positive `delta_y` (scroll down) zooms out;
    /// everything else, zero included, zooms in.
    pub fn wheel(&mut self, delta_y: f32) {
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        self.zoom_by(factor);
    }

    /// Restore the identity camera. An active drag is cancelled.
    pub fn reset(&mut self) {
        self.offset = Point::ZERO;
        self.scale = 1.0;
        self.drag = None;
    }

    /// Find the node under a screen position.
    ///
    /// The position is mapped to world space and compared against node
    /// centres within [`PICK_RADIUS`] world units. The nearest node wins;
    /// exact ties go to the earlier node in input order.
    pub fn hit_test<'g>(&self, graph: &'g CommitGraph, p: Point) -> Option<&'g CommitNode> {
        let world = self.screen_to_world(p);
        let mut best: Option<(&CommitNode, f32)> = None;
        for node in graph.nodes() {
            let dist = node.position.distance(world);
            if dist > PICK_RADIUS {
                continue;
            }
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((node, dist)),
            }
        }
        best.map(|(node, _)| node)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
