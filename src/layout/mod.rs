//! Flex layout collaborator.
//!
//! Keeps one Taffy node per registered list child under a per-container
//! column root. The registry notifies it when children are inserted and,
//! critically, when index sets are removed, so layout never operates on
//! nodes whose backing views are gone.
//!
//! This is a collaborator seam: scrolling physics and final geometry stay
//! with the native toolkit.

use std::collections::HashMap;

use taffy::{AvailableSpace, Dimension, FlexDirection, NodeId, Size as TaffySize, Style, TaffyTree};
use tracing::trace;

use crate::engine::surface::ViewId;

fn item_style(width: f64, height: f64) -> Style {
    Style {
        size: TaffySize {
            width: Dimension::Length(width as f32),
            height: Dimension::Length(height as f32),
        },
        ..Default::default()
    }
}

fn root_style() -> Style {
    Style {
        flex_direction: FlexDirection::Column,
        ..Default::default()
    }
}

/// Taffy-backed layout state for virtualized containers.
pub struct FlexLayout {
    tree: TaffyTree<()>,
    roots: HashMap<ViewId, NodeId>,
    /// Ordered child nodes per container, mirroring the registry's model
    /// indices.
    children: HashMap<ViewId, Vec<NodeId>>,
}

impl Default for FlexLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl FlexLayout {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            roots: HashMap::new(),
            children: HashMap::new(),
        }
    }

    fn ensure_root(&mut self, container: ViewId) -> NodeId {
        if let Some(&root) = self.roots.get(&container) {
            return root;
        }
        let root = self.tree.new_leaf(root_style()).unwrap();
        self.roots.insert(container, root);
        self.children.entry(container).or_default();
        root
    }

    /// Insert a child node at `position` under a container. Positions past
    /// the end are clamped.
    pub fn insert_child(&mut self, container: ViewId, position: usize, width: f64, height: f64) {
        let root = self.ensure_root(container);
        let node = self.tree.new_leaf(item_style(width, height)).unwrap();
        let nodes = self.children.get_mut(&container).expect("root ensured");
        let position = position.min(nodes.len());
        let _ = self.tree.insert_child_at_index(root, position, node);
        nodes.insert(position, node);
    }

    /// Append a child node under a container.
    pub fn append_child(&mut self, container: ViewId, width: f64, height: f64) {
        let len = self.child_count(container);
        self.insert_child(container, len, width, height);
    }

    /// Drop the nodes at the given indices.
    ///
    /// Indices must be deduplicated and descending (the registry's removal
    /// contract); each one is applied against the then-current child list.
    /// Unknown containers are tolerated: not every container has layout
    /// state.
    pub fn remove_children(&mut self, container: ViewId, indices: &[usize]) {
        let Some(nodes) = self.children.get_mut(&container) else {
            return;
        };
        for &index in indices {
            if index < nodes.len() {
                let node = nodes.remove(index);
                let _ = self.tree.remove(node);
            }
        }
        trace!(?container, removed = indices.len(), "layout children removed");
    }

    pub fn child_count(&self, container: ViewId) -> usize {
        self.children.get(&container).map_or(0, Vec::len)
    }

    /// Stacked content height of a container's children.
    pub fn content_height(&mut self, container: ViewId) -> f64 {
        let Some(&root) = self.roots.get(&container) else {
            return 0.0;
        };
        let available = TaffySize {
            width: AvailableSpace::MaxContent,
            height: AvailableSpace::MaxContent,
        };
        let _ = self.tree.compute_layout(root, available);
        self.tree.layout(root).map_or(0.0, |l| l.size.height as f64)
    }

    /// Forget all layout state for a destroyed container.
    pub fn forget(&mut self, container: ViewId) {
        if let Some(nodes) = self.children.remove(&container) {
            for node in nodes {
                let _ = self.tree.remove(node);
            }
        }
        if let Some(root) = self.roots.remove(&container) {
            let _ = self.tree.remove(root);
        }
    }
}
