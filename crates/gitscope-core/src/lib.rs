//! Gitscope Core — Commit graph model, viewport controller, and render driver

pub mod geometry;
pub mod graph;
pub mod model;
pub mod render;
pub mod stats;
pub mod studio;
pub mod view;
pub mod viewport;


pub use geometry::{Point, Size};
pub use graph::{CommitGraph, FIRST_ROW_Y, NODE_X, ROW_STEP};
pub use model::{CommitId, CommitNode, CommitRecord, RepoSnapshot, Selection, Signature, Status, StatusKind};
pub use render::{DisplayList, DrawOp, RenderError, Surface, Theme, render, EDGE_WIDTH, NODE_RADIUS, SUMMARY_MAX};
pub use stats::RepoStats;
pub use studio::{Studio, BUTTON_ZOOM_IN, BUTTON_ZOOM_OUT};
pub use view::{View, ViewState};
pub use viewport::{Viewport, MAX_SCALE, MIN_SCALE, PICK_RADIUS, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};
