//! Child Registry - virtualized child models for scroll surfaces.
//!
//! Maps a virtualization container to its owning scroll surface, and a
//! scroll surface to its ordered child model. Every mutation ends with a
//! full-model republish to the surface; the published list is never allowed
//! to drift from the in-memory one.
//!
//! Index contract for batch removal: indices are normalized to a
//! deduplicated descending order and validated against the pre-removal
//! model length, then each removal is applied against the then-current
//! list. Callers may pass indices in any order.
//!
//! Out-of-range indices and lookups of unregistered containers are caller
//! contract violations and panic; the empty removal set is the single
//! permitted no-op.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::layout::FlexLayout;

use super::surface::{SurfaceStore, ViewId};

/// Registry of array-optimized scroll surfaces and their child models.
///
/// Holds non-owning handles only: the surface store owns the views, and
/// model entries become owning exactly once, when a removal carries
/// "unregister and delete" semantics and hands the child to the deferred
/// deletion queue.
#[derive(Default)]
pub struct ChildRegistry {
    surface_by_container: HashMap<ViewId, ViewId>,
    model_by_surface: HashMap<ViewId, Vec<ViewId>>,
}

impl ChildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `container` was registered through an array-optimized
    /// attachment.
    pub fn is_optimized(&self, container: ViewId) -> bool {
        self.surface_by_container.contains_key(&container)
    }

    /// Scroll surface owning a registered container.
    ///
    /// Panics if the container was never registered.
    pub fn owning_surface(&self, container: ViewId) -> ViewId {
        match self.surface_by_container.get(&container) {
            Some(&surface) => surface,
            None => panic!("container {container:?} is not registered with any scroll surface"),
        }
    }

    /// Number of model items held for a surface, if it has a model.
    pub fn model_len(&self, surface: ViewId) -> Option<usize> {
        self.model_by_surface.get(&surface).map(Vec::len)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Insert `child` into the owning surface's model at `position`.
    ///
    /// Positions past the end are clamped to the current length. The full
    /// model is republished afterwards.
    pub fn insert(
        &mut self,
        store: &mut SurfaceStore,
        layout: &mut FlexLayout,
        container: ViewId,
        child: ViewId,
        position: usize,
    ) {
        let surface = self.owning_surface(container);
        let model = self.model_by_surface.entry(surface).or_default();
        let position = position.min(model.len());
        model.insert(position, child);

        let item = store.get(child);
        layout.insert_child(container, position, item.width, item.height);

        trace!(?container, ?child, position, "model item inserted");
        self.publish(store, surface);
    }

    /// Remove the model items at `indices`.
    ///
    /// Empty index sets are a no-op: nothing is mutated and nothing is
    /// republished. Each removed child is detached from its visual parent;
    /// with `unregister_and_delete` it is also handed to the deferred
    /// deletion queue, at which point the queue holds the sole remaining
    /// reference. The layout collaborator is notified with the normalized
    /// index set.
    pub fn remove_many(
        &mut self,
        store: &mut SurfaceStore,
        layout: &mut FlexLayout,
        container: ViewId,
        indices: &[usize],
        unregister_and_delete: bool,
    ) {
        if indices.is_empty() {
            return;
        }

        let surface = self.owning_surface(container);
        let model = self.model_by_surface.entry(surface).or_default();
        let normalized = normalize_indices(indices, model.len());

        for &index in &normalized {
            let child = model.remove(index);
            store.detach_from_parent(child);
            if unregister_and_delete {
                store.delete_later(child);
            }
        }

        layout.remove_children(container, &normalized);

        debug!(
            ?container,
            removed = normalized.len(),
            unregister_and_delete,
            "model items removed"
        );
        self.publish(store, surface);
    }

    /// Remove and return the model item at `position` without destroying
    /// it. Used for virtualization-driven detachment.
    ///
    /// Panics if `position` is out of range.
    pub fn extract_at(
        &mut self,
        store: &mut SurfaceStore,
        container: ViewId,
        position: usize,
    ) -> ViewId {
        let surface = self.owning_surface(container);
        let model = self.model_by_surface.entry(surface).or_default();
        assert!(
            position < model.len(),
            "extract position {position} out of range for model of length {}",
            model.len()
        );
        let child = model.remove(position);

        trace!(?container, ?child, position, "model item extracted");
        self.publish(store, surface);
        child
    }

    /// Attach `child` to a scroll surface using the surface's strategy.
    ///
    /// Array-optimized: all of the child's current children are flattened
    /// into the model (appended in order), the child itself is registered
    /// as a container key for the surface, and the model is republished.
    /// Direct mode: the child is reparented into the surface's content
    /// container at `position` and the registry stays untouched.
    pub fn attach_child(
        &mut self,
        store: &mut SurfaceStore,
        layout: &mut FlexLayout,
        surface: ViewId,
        child: ViewId,
        position: usize,
    ) {
        if store.get(surface).array_scrolling {
            let grandchildren: Vec<ViewId> = store.children_of(child).to_vec();
            let model = self.model_by_surface.entry(surface).or_default();
            for &item in &grandchildren {
                model.push(item);
            }
            for &item in &grandchildren {
                let node = store.get(item);
                layout.append_child(child, node.width, node.height);
            }
            self.surface_by_container.insert(child, surface);

            debug!(
                ?surface,
                container = ?child,
                appended = grandchildren.len(),
                "container registered"
            );
            self.publish(store, surface);
        } else {
            let content_item = store
                .get(surface)
                .content_item
                .expect("direct-mode scroll surface has a content container");
            store.insert_child_at(content_item, child, position);
            trace!(?surface, ?child, position, "child reparented into content item");
        }
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Drop all registry state owned by a destroyed surface.
    pub fn forget_surface(&mut self, surface: ViewId) {
        self.model_by_surface.remove(&surface);
        self.surface_by_container.retain(|_, s| *s != surface);
    }

    /// Drop a destroyed container's key.
    pub fn forget_container(&mut self, container: ViewId) {
        self.surface_by_container.remove(&container);
    }

    /// Republish the full ordered model to the surface.
    fn publish(&self, store: &mut SurfaceStore, surface: ViewId) {
        let model = self
            .model_by_surface
            .get(&surface)
            .cloned()
            .unwrap_or_default();
        store.set_model(surface, model);
    }
}

/// Deduplicated, descending index order, validated against `len`.
fn normalize_indices(indices: &[usize], len: usize) -> Vec<usize> {
    let mut normalized = indices.to_vec();
    normalized.sort_unstable_by(|a, b| b.cmp(a));
    normalized.dedup();
    if let Some(&max) = normalized.first() {
        assert!(
            max < len,
            "remove index {max} out of range for model of length {len}"
        );
    }
    normalized
}
