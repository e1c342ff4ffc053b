//! Surface Store - native view nodes behind generational handles.
//!
//! Owns the native-side state this manager operates on:
//! - View nodes (scroll geometry, list-view state, per-view flags)
//! - Tag ↔ handle binding for bridge lookups
//! - Per-view signal subscriber lists (explicit registration, sender
//!   passed as a parameter)
//! - The deferred-deletion queue drained by the event loop
//!
//! Handles are generational slotmap keys, so a key for a destroyed view
//! never aliases a later one.

use std::collections::HashMap;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use tracing::trace;

use crate::types::{SurfaceTemplate, Tag};

new_key_type! {
    /// Generational handle to a native view node.
    pub struct ViewId;
}

// =============================================================================
// Signals
// =============================================================================

/// Native interaction signals a scroll surface can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceSignal {
    MovementStarted,
    MovementEnded,
    MovingChanged,
    FlickStarted,
    FlickEnded,
}

/// Handler invoked when a surface raises a signal.
///
/// The raising view is passed explicitly; handlers never recover the
/// sender from ambient state.
pub type SignalHandler = Rc<dyn Fn(ViewId)>;

// =============================================================================
// View Node
// =============================================================================

/// A native view node.
///
/// Scroll geometry mirrors the flickable property set: content offset and
/// size, viewport size, and the origin offset that content coordinates are
/// reported against. List-view state (`model`, `count`, `current_index`)
/// only carries meaning for `ScrollListView` surfaces.
#[derive(Default)]
pub struct ViewNode {
    pub tag: Option<Tag>,
    pub template: SurfaceTemplate,
    pub parent: Option<ViewId>,
    pub children: Vec<ViewId>,

    // Scroll geometry
    pub content_x: f64,
    pub content_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub content_width: f64,
    pub content_height: f64,
    pub width: f64,
    pub height: f64,

    // List-view state
    pub model: Vec<ViewId>,
    pub count: usize,
    pub current_index: i32,
    /// Bumped on every model publish; lets callers observe that no write
    /// happened.
    pub model_revision: u64,

    // Per-view flags
    pub report_scroll: bool,
    pub array_scrolling: bool,
    pub configured: bool,
    /// Content container children are reparented into (direct mode only).
    pub content_item: Option<ViewId>,
    /// Manager back-reference for dispatch routing.
    pub manager: Option<&'static str>,
}

// =============================================================================
// Surface Store
// =============================================================================

/// Store of live native view nodes.
///
/// Single-threaded by design: all access happens on the toolkit's event
/// loop, shared between the manager and signal closures via
/// `Rc<RefCell<SurfaceStore>>`.
#[derive(Default)]
pub struct SurfaceStore {
    views: SlotMap<ViewId, ViewNode>,
    by_tag: HashMap<Tag, ViewId>,
    handlers: HashMap<ViewId, Vec<(SurfaceSignal, SignalHandler)>>,
    deferred: Vec<ViewId>,
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Creation / lookup
    // -------------------------------------------------------------------------

    /// Insert a view node and bind its tag, if it carries one.
    ///
    /// Panics if the tag is already bound to a live view.
    pub fn create_view(&mut self, node: ViewNode) -> ViewId {
        let tag = node.tag;
        let id = self.views.insert(node);
        if let Some(tag) = tag {
            let previous = self.by_tag.insert(tag, id);
            assert!(
                previous.is_none(),
                "tag {tag} is already bound to a live view"
            );
        }
        trace!(?id, ?tag, "view created");
        id
    }

    /// Resolve a bridge tag to a live view handle.
    ///
    /// A miss is a bridge-contract violation and panics.
    pub fn view_for_tag(&self, tag: Tag) -> ViewId {
        match self.by_tag.get(&tag) {
            Some(&id) => id,
            None => panic!("no live view is bound to tag {tag}"),
        }
    }

    /// Non-panicking tag lookup, for collaborators that tolerate misses.
    pub fn try_view_for_tag(&self, tag: Tag) -> Option<ViewId> {
        self.by_tag.get(&tag).copied()
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(id)
    }

    /// Borrow a view node. Panics on a stale handle.
    pub fn get(&self, id: ViewId) -> &ViewNode {
        self.views.get(id).expect("stale view handle")
    }

    /// Mutably borrow a view node. Panics on a stale handle.
    pub fn get_mut(&mut self, id: ViewId) -> &mut ViewNode {
        self.views.get_mut(id).expect("stale view handle")
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    // -------------------------------------------------------------------------
    // Visual parent/child tree
    // -------------------------------------------------------------------------

    /// Reparent `child` under `parent`, inserting at `position` among the
    /// existing children. Positions past the end are clamped.
    pub fn insert_child_at(&mut self, parent: ViewId, child: ViewId, position: usize) {
        self.detach_from_parent(child);
        let node = self.get_mut(parent);
        let position = position.min(node.children.len());
        node.children.insert(position, child);
        self.get_mut(child).parent = Some(parent);
    }

    /// Detach `child` from its current visual parent, if any.
    ///
    /// Tolerates a dead parent: during recursive teardown the parent node
    /// is removed before its children are.
    pub fn detach_from_parent(&mut self, child: ViewId) {
        let Some(parent) = self.get(child).parent else {
            return;
        };
        if let Some(parent_node) = self.views.get_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
        self.get_mut(child).parent = None;
    }

    pub fn children_of(&self, id: ViewId) -> &[ViewId] {
        &self.get(id).children
    }

    // -------------------------------------------------------------------------
    // Model publishing
    // -------------------------------------------------------------------------

    /// Publish the full ordered child model to a surface.
    ///
    /// Always whole-list: `count` tracks the new length and the revision
    /// counter is bumped so callers can observe writes.
    pub fn set_model(&mut self, surface: ViewId, model: Vec<ViewId>) {
        let node = self.get_mut(surface);
        node.count = model.len();
        node.model = model;
        node.model_revision += 1;
        trace!(?surface, count = node.count, "model published");
    }

    pub fn model(&self, surface: ViewId) -> &[ViewId] {
        &self.get(surface).model
    }

    pub fn model_revision(&self, surface: ViewId) -> u64 {
        self.get(surface).model_revision
    }

    /// List-view "position at end": settle the viewport on the last item.
    pub fn position_view_at_end(&mut self, surface: ViewId) {
        let node = self.get_mut(surface);
        node.content_y = (node.content_height - node.height).max(0.0);
    }

    // -------------------------------------------------------------------------
    // Signal wiring
    // -------------------------------------------------------------------------

    /// Register a handler for a signal raised by `view`.
    pub fn connect<F>(&mut self, view: ViewId, signal: SurfaceSignal, handler: F)
    where
        F: Fn(ViewId) + 'static,
    {
        self.handlers
            .entry(view)
            .or_default()
            .push((signal, Rc::new(handler)));
    }

    /// Handlers registered for a given view/signal pair.
    ///
    /// Returns clones so callers can invoke them without holding a borrow
    /// of the store.
    pub fn handlers_for(&self, view: ViewId, signal: SurfaceSignal) -> Vec<SignalHandler> {
        self.handlers
            .get(&view)
            .map(|list| {
                list.iter()
                    .filter(|(s, _)| *s == signal)
                    .map(|(_, h)| Rc::clone(h))
                    .collect()
            })
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Deferred destruction
    // -------------------------------------------------------------------------

    /// Schedule a view for destruction at the next event-loop drain.
    ///
    /// Never destroys synchronously: callers may be mid-iteration or
    /// mid-layout over the same tree.
    pub fn delete_later(&mut self, view: ViewId) {
        trace!(?view, "deferred deletion scheduled");
        self.deferred.push(view);
    }

    /// Take the pending deletion set, leaving the queue empty.
    pub fn take_deferred(&mut self) -> Vec<ViewId> {
        std::mem::take(&mut self.deferred)
    }

    /// Destroy a view and, recursively, its visual children.
    ///
    /// Model references are non-owning and are not followed. Safe to call
    /// on an already-dead handle (deferred deletions may race a parent's
    /// recursive teardown).
    pub fn destroy(&mut self, view: ViewId) {
        if !self.views.contains_key(view) {
            return;
        }
        self.detach_from_parent(view);
        let node = self.views.remove(view).expect("checked above");
        if let Some(tag) = node.tag {
            self.by_tag.remove(&tag);
        }
        self.handlers.remove(&view);
        for child in node.children {
            self.destroy(child);
        }
        trace!(?view, "view destroyed");
    }
}

// =============================================================================
// Signal delivery
// =============================================================================

/// Deliver a signal from `view` to its registered handlers.
///
/// Handlers are collected first and invoked without any store borrow held,
/// so they are free to re-borrow the store.
pub fn fire_signal(
    store: &Rc<std::cell::RefCell<SurfaceStore>>,
    view: ViewId,
    signal: SurfaceSignal,
) {
    let handlers = store.borrow().handlers_for(view, signal);
    for handler in handlers {
        handler(view);
    }
}
