//! The studio session: one loaded repository and the state driving its UI

use std::sync::Arc;

use crate::geometry::{Point, Size};
use crate::graph::CommitGraph;
use crate::model::{RepoSnapshot, Selection, Status};
use crate::render::{self, DisplayList, RenderError, Theme};
use crate::view::{View, ViewState};
use crate::viewport::Viewport;

/// Zoom step for the toolbar + button.
pub const BUTTON_ZOOM_IN: f32 = 1.2;
/// Zoom step for the toolbar - button.
pub const BUTTON_ZOOM_OUT: f32 = 0.8;

const DEFAULT_CANVAS: Size = Size {
    width: 800.0,
    height: 600.0,
};

/// Everything one connected client sees: the loaded snapshot, its positioned
/// graph, the camera, the active view, the current selection and the status
/// line.
///
/// All state is owned here; nothing global. Methods are synchronous and run
/// strictly in event arrival order.
#[derive(Debug, Clone)]
pub struct Studio {
    snapshot: Option<Arc<RepoSnapshot>>,
    graph: CommitGraph,
    viewport: Viewport,
    view: ViewState,
    selection: Option<Selection>,
    canvas: Size,
    status: Status,
    theme: Theme,
}

impl Studio {
    pub fn new() -> Self {
        Studio {
            snapshot: None,
            graph: CommitGraph::new(),
            viewport: Viewport::new(),
            view: ViewState::new(),
            selection: None,
            canvas: DEFAULT_CANVAS,
            status: Status::default(),
            theme: Theme::default(),
        }
    }

    pub fn snapshot(&self) -> Option<&Arc<RepoSnapshot>> {
        self.snapshot.as_ref()
    }

    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Install a freshly loaded snapshot.
    ///
    /// The graph is rebuilt wholesale, the selection cleared and the Graph
    /// view activated. The viewport is left where the user put it, so a
    /// refresh does not yank the camera.
    pub fn load_snapshot(&mut self, snapshot: Arc<RepoSnapshot>) {
        self.graph = CommitGraph::build(&snapshot.commits);
        self.snapshot = Some(snapshot);
        self.selection = None;
        self.view.switch(View::Graph);
        self.status = Status::success("REPO LOADED");
    }

    /// Record a failed load. Only the status line changes; a previously
    /// loaded graph stays fully usable.
    pub fn load_failed(&mut self, message: &str) {
        self.status = Status::error(format!("ERROR: {message}"));
    }

    /// Pointer pressed on the canvas.
    ///
    /// A hit on a node selects that commit; a miss starts a pan. The two
    /// outcomes are mutually exclusive.
    pub fn pointer_down(&mut self, p: Point) -> Option<Selection> {
        let hit = self
            .viewport
            .hit_test(&self.graph, p)
            .map(|node| node.id.clone());
        match hit {
            Some(id) => self.select_commit(id.as_str()),
            None => {
                self.viewport.begin_drag(p);
                None
            }
        }
    }

    /// Pointer moved. Returns whether the camera changed.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        self.viewport.continue_drag(p)
    }

    pub fn pointer_up(&mut self) {
        self.viewport.end_drag();
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.viewport.wheel(delta_y);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_by(BUTTON_ZOOM_IN);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_by(BUTTON_ZOOM_OUT);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn switch_view(&mut self, view: View) {
        self.view.switch(view);
    }

    pub fn open_diff(&mut self) {
        self.view.open_diff();
    }

    pub fn close_diff(&mut self) {
        self.view.close_diff();
    }

    /// Select a commit by id, as the history list does on click.
    ///
    /// Unknown ids leave the current selection untouched.
    pub fn select_commit(&mut self, id: &str) -> Option<Selection> {
        let record = self.snapshot.as_ref()?.find(id)?;
        let selection = Selection {
            id: record.id.clone(),
            short_id: record.id.short8().to_string(),
            summary: record.summary().to_string(),
            author: record.author.name.clone(),
            message: record.message.clone(),
        };
        self.selection = Some(selection.clone());
        Some(selection)
    }

    pub fn resize(&mut self, size: Size) {
        self.canvas = size;
    }

    /// Produce the display list for the current frame.
    pub fn render(&self) -> Result<DisplayList, RenderError> {
        let mut list = DisplayList::new();
        render::render(&mut list, self.canvas, &self.graph, &self.viewport, &self.theme)?;
        Ok(list)
    }
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}
