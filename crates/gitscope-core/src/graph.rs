//! Commit-DAG construction and layout over petgraph::StableDiGraph

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::geometry::Point;
use crate::model::{CommitId, CommitNode, CommitRecord};

/// Horizontal lane shared by every node (single-column layout).
pub const NODE_X: f32 = 50.0;
/// Vertical distance between consecutive commits.
pub const ROW_STEP: f32 = 60.0;
/// Offset of the first (newest) commit from the top of world space.
pub const FIRST_ROW_Y: f32 = 50.0;

/// The positioned commit DAG.
///
/// Nodes keep provider order (newest first); edges point child → parent and
/// exist only where the parent survived the history depth limit. A parent
/// id that resolves to nothing is not an error — the edge is simply absent.
#[derive(Clone)]
pub struct CommitGraph {
    inner: StableDiGraph<CommitNode, ()>,
    by_id: HashMap<CommitId, NodeIndex>,
}

impl std::fmt::Debug for CommitGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl CommitGraph {
    pub fn new() -> Self {
        CommitGraph {
            inner: StableDiGraph::new(),
            by_id: HashMap::new(),
        }
    }

    /// Build a positioned graph from a commit log.
    ///
    /// Each commit lands in a fixed column at a row matching its input
    /// index, so the vertical order is deterministic and collision-free and
    /// mirrors the log. The first (newest) commit is highlighted. Duplicate
    /// ids leave edge resolution undefined but never fault.
    pub fn build(records: &[CommitRecord]) -> Self {
        let mut inner = StableDiGraph::with_capacity(records.len(), records.len());
        let mut by_id = HashMap::with_capacity(records.len());
        let mut indices = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            let node = CommitNode {
                id: record.id.clone(),
                summary: record.summary().to_string(),
                author: record.author.name.clone(),
                parents: record.parents.clone(),
                position: Point::new(NODE_X, FIRST_ROW_Y + row as f32 * ROW_STEP),
                highlight: row == 0,
            };
            let idx = inner.add_node(node);
            by_id.insert(record.id.clone(), idx);
            indices.push(idx);
        }

        // Parents outside the loaded window are skipped, not reported.
        for (row, record) in records.iter().enumerate() {
            for parent in &record.parents {
                if let Some(&parent_idx) = by_id.get(parent.as_str()) {
                    inner.add_edge(indices[row], parent_idx, ());
                }
            }
        }

        CommitGraph { inner, by_id }
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate nodes in input (newest-first) order.
    pub fn nodes(&self) -> impl Iterator<Item = &CommitNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate resolved child → parent node pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&CommitNode, &CommitNode)> {
        self.inner.edge_references().filter_map(move |edge| {
            let child = self.inner.node_weight(edge.source())?;
            let parent = self.inner.node_weight(edge.target())?;
            Some((child, parent))
        })
    }

    pub fn node_by_id(&self, id: &str) -> Option<&CommitNode> {
        self.by_id
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    /// The newest commit, if any.
    pub fn head(&self) -> Option<&CommitNode> {
        self.nodes().next()
    }
}

impl Default for CommitGraph {
    fn default() -> Self {
        Self::new()
    }
}
