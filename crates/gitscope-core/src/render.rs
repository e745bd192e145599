//! Frame production: walks the graph and emits draw calls onto a surface

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, Size};
use crate::graph::CommitGraph;
use crate::model::CommitNode;
use crate::viewport::Viewport;

pub const NODE_RADIUS: f32 = 10.0;
pub const EDGE_WIDTH: f32 = 2.0;
/// Max characters of a commit summary shown next to its node.
pub const SUMMARY_MAX: usize = 30;

const LABEL_FONT: &str = "12px Courier New";
const ID_FONT: &str = "10px Courier New";
const LABEL_DX: f32 = 20.0;
const LABEL_DY: f32 = 5.0;
const ID_DY: f32 = 18.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("draw failed: {0}")]
    Draw(String),
    #[error("transform pop without matching push")]
    TransformUnderflow,
}

/// Drawing backend for one frame.
///
/// Implementations may rasterize immediately or record the calls for later
/// replay. Coordinates passed between [`Surface::push_transform`] and
/// [`Surface::pop_transform`] are world coordinates; the transform maps them
/// to device pixels.
pub trait Surface {
    fn fill_rect(&mut self, origin: Point, size: Size, color: &str) -> Result<(), RenderError>;
    fn push_transform(&mut self, offset: Point, scale: f32) -> Result<(), RenderError>;
    fn pop_transform(&mut self) -> Result<(), RenderError>;
    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: &str,
        width: f32,
    ) -> Result<(), RenderError>;
    fn fill_circle(&mut self, center: Point, radius: f32, color: &str) -> Result<(), RenderError>;
    fn fill_text(&mut self, text: &str, at: Point, color: &str, font: &str)
    -> Result<(), RenderError>;
}

/// One recorded draw call, shaped for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: String,
    },
    PushTransform {
        x: f32,
        y: f32,
        scale: f32,
    },
    PopTransform,
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: String,
        width: f32,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: String,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        color: String,
        font: String,
    },
}

/// A [`Surface`] that records draw calls instead of rasterizing them.
///
/// The recorded ops go over the WebSocket to the canvas client, which
/// replays them verbatim. Transform stack balance is enforced here since no
/// real canvas context will catch it later.
#[derive(Debug, Default, Clone)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
    depth: usize,
}

impl DisplayList {
    pub fn new() -> Self {
        DisplayList::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Surface for DisplayList {
    fn fill_rect(&mut self, origin: Point, size: Size, color: &str) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Rect {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
            color: color.to_string(),
        });
        Ok(())
    }

    fn push_transform(&mut self, offset: Point, scale: f32) -> Result<(), RenderError> {
        self.depth += 1;
        self.ops.push(DrawOp::PushTransform {
            x: offset.x,
            y: offset.y,
            scale,
        });
        Ok(())
    }

    fn pop_transform(&mut self) -> Result<(), RenderError> {
        if self.depth == 0 {
            return Err(RenderError::TransformUnderflow);
        }
        self.depth -= 1;
        self.ops.push(DrawOp::PopTransform);
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: &str,
        width: f32,
    ) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Line {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            color: color.to_string(),
            width,
        });
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: &str) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Circle {
            x: center.x,
            y: center.y,
            radius,
            color: color.to_string(),
        });
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        at: Point,
        color: &str,
        font: &str,
    ) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x: at.x,
            y: at.y,
            color: color.to_string(),
            font: font.to_string(),
        });
        Ok(())
    }
}

/// Colors used by the graph view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub edge: String,
    pub node: String,
    pub highlight: String,
    pub label: String,
    pub id_label: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: "#1a1a1a".to_string(),
            edge: "#666".to_string(),
            node: "#fff".to_string(),
            highlight: "#00ff00".to_string(),
            label: "#fff".to_string(),
            id_label: "#666".to_string(),
        }
    }
}

/// Produce one frame of the graph view.
///
/// Clears the canvas, applies the viewport transform, then draws in fixed
/// z-order: edges beneath node circles beneath labels. A failure on a single
/// edge or node is traced and that element skipped; the rest of the frame
/// still renders. Clear and transform failures abort the frame. Stateless
/// between calls.
pub fn render(
    surface: &mut impl Surface,
    canvas: Size,
    graph: &CommitGraph,
    viewport: &Viewport,
    theme: &Theme,
) -> Result<(), RenderError> {
    surface.fill_rect(Point::ZERO, canvas, &theme.background)?;
    surface.push_transform(viewport.offset(), viewport.scale())?;

    for (child, parent) in graph.edges() {
        if let Err(error) = surface.stroke_line(
            child.position,
            parent.position,
            &theme.edge,
            EDGE_WIDTH,
        ) {
            tracing::warn!(commit = %child.id, %error, "skipping edge after draw failure");
        }
    }

    for node in graph.nodes() {
        let fill = if node.highlight {
            &theme.highlight
        } else {
            &theme.node
        };
        if let Err(error) = surface.fill_circle(node.position, NODE_RADIUS, fill) {
            tracing::warn!(commit = %node.id, %error, "skipping node after draw failure");
        }
    }

    for node in graph.nodes() {
        if let Err(error) = draw_labels(surface, node, theme) {
            tracing::warn!(commit = %node.id, %error, "skipping labels after draw failure");
        }
    }

    surface.pop_transform()
}

fn draw_labels(
    surface: &mut impl Surface,
    node: &CommitNode,
    theme: &Theme,
) -> Result<(), RenderError> {
    surface.fill_text(
        truncate(&node.summary, SUMMARY_MAX),
        node.position + Point::new(LABEL_DX, LABEL_DY),
        &theme.label,
        LABEL_FONT,
    )?;
    surface.fill_text(
        node.id.short(),
        node.position + Point::new(LABEL_DX, ID_DY),
        &theme.id_label,
        ID_FONT,
    )?;
    Ok(())
}

/// Cut a string to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
