//! Scroll View Manager - lifecycle and command entry points.
//!
//! The surface the logical-tree bridge talks to:
//! - `create_view` parses the creation property map, selects the native
//!   template and binds the surface to its bridge tag
//! - `scroll_to` / `scroll_to_end` commands
//! - `configure_view` wires the five native signals to the event
//!   normalizer
//! - child attachment, model mutation and the deferred-deletion drain
//!
//! Registered with the bridge under the fixed module name
//! `RCTScrollViewManager`.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::engine::geometry;
use crate::engine::registry::ChildRegistry;
use crate::engine::surface::{SurfaceSignal, SurfaceStore, ViewId, ViewNode};
use crate::events::{EventNormalizer, EventSink};
use crate::layout::FlexLayout;
use crate::types::{DirectEvents, ScrollViewProps, SurfaceTemplate, Tag};

/// Module name used for bridge registration and dispatch routing.
pub const MODULE_NAME: &str = "RCTScrollViewManager";

// =============================================================================
// Base capability
// =============================================================================

/// Base view-configuration capability every component manager extends.
pub trait ViewManager {
    /// Fixed name this manager registers under.
    fn module_name(&self) -> &'static str;

    /// Direct event types declared to the bridge.
    fn direct_event_types(&self) -> DirectEvents {
        DirectEvents::empty()
    }

    /// Configuration common to every managed view kind.
    fn configure_base(&self, store: &mut SurfaceStore, view: ViewId) {
        store.get_mut(view).configured = true;
    }
}

// =============================================================================
// Scroll View Manager
// =============================================================================

/// Native-side manager for remotely-described scroll surfaces.
pub struct ScrollViewManager {
    store: Rc<RefCell<SurfaceStore>>,
    registry: ChildRegistry,
    layout: FlexLayout,
    normalizer: EventNormalizer,
}

impl ViewManager for ScrollViewManager {
    fn module_name(&self) -> &'static str {
        MODULE_NAME
    }

    fn direct_event_types(&self) -> DirectEvents {
        DirectEvents::all()
    }
}

impl ScrollViewManager {
    pub fn new(store: Rc<RefCell<SurfaceStore>>, sink: EventSink) -> Self {
        Self {
            normalizer: EventNormalizer::new(Rc::clone(&store), sink),
            store,
            registry: ChildRegistry::new(),
            layout: FlexLayout::new(),
        }
    }

    pub fn store(&self) -> &Rc<RefCell<SurfaceStore>> {
        &self.store
    }

    // -------------------------------------------------------------------------
    // View creation
    // -------------------------------------------------------------------------

    /// Create a scroll surface for `tag` from the bridge's property map.
    ///
    /// `enableArrayScrollingOptimization` selects the template here, once;
    /// the choice is immutable for the surface's lifetime. Direct-mode
    /// surfaces get their content container up front.
    pub fn create_view(&mut self, tag: Tag, properties: &Value) -> ViewId {
        let props: ScrollViewProps =
            serde_json::from_value(properties.clone()).unwrap_or_else(|err| {
                trace!(%err, "malformed creation properties, using defaults");
                ScrollViewProps::default()
            });
        let template = SurfaceTemplate::for_props(&props);

        let mut store = self.store.borrow_mut();
        let surface = store.create_view(ViewNode {
            tag: Some(tag),
            template,
            array_scrolling: props.enable_array_scrolling_optimization,
            report_scroll: props.on_scroll,
            ..Default::default()
        });
        if template == SurfaceTemplate::ScrollView {
            let content = store.create_view(ViewNode::default());
            store.insert_child_at(surface, content, 0);
            store.get_mut(surface).content_item = Some(content);
        }

        debug!(tag, ?template, "scroll view created");
        surface
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Scroll the tagged surface to an absolute content offset.
    ///
    /// `animated` is accepted for interface compatibility but does not
    /// alter behavior.
    pub fn scroll_to(&self, tag: Tag, offset_x: f64, offset_y: f64, animated: bool) {
        let mut store = self.store.borrow_mut();
        let view = store.view_for_tag(tag);
        if animated {
            trace!(tag, "animated scrollTo requested; animation is not modeled");
        }
        geometry::set_content_offset(&mut store, view, offset_x, offset_y);
    }

    /// Scroll the tagged surface to the end of its content.
    ///
    /// Array-optimized surfaces position at the last model item; direct
    /// surfaces write the largest non-negative Y offset.
    pub fn scroll_to_end(&self, tag: Tag, animated: bool) {
        let mut store = self.store.borrow_mut();
        let view = store.view_for_tag(tag);
        if animated {
            trace!(tag, "animated scrollToEnd requested; animation is not modeled");
        }

        if store.get(view).array_scrolling {
            let count = geometry::item_count(&store, view);
            store.position_view_at_end(view);
            geometry::set_current_index(&mut store, view, count as i32 - 1);
            // The index write can move the viewport; position again to
            // settle on the last item.
            store.position_view_at_end(view);
        } else {
            let content = geometry::content_size(&store, view);
            let viewport = geometry::viewport_size(&store, view);
            let current = geometry::content_offset(&store, view);
            let new_y = (content.height - viewport.height).max(0.0);
            geometry::set_content_offset(&mut store, view, current.x, new_y);
        }
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Configure a freshly created surface.
    ///
    /// Applies the base configuration, attaches the manager back-reference
    /// for dispatch routing, and wires the five native signals to the
    /// normalizer handlers.
    pub fn configure_view(&self, view: ViewId) {
        let mut store = self.store.borrow_mut();
        self.configure_base(&mut store, view);
        store.get_mut(view).manager = Some(self.module_name());

        let wiring: [(SurfaceSignal, fn(&EventNormalizer, ViewId)); 5] = [
            (SurfaceSignal::MovementStarted, EventNormalizer::scroll_begin_drag),
            (SurfaceSignal::MovementEnded, EventNormalizer::scroll_end_drag),
            (SurfaceSignal::MovingChanged, EventNormalizer::scroll),
            (SurfaceSignal::FlickStarted, EventNormalizer::momentum_scroll_begin),
            (SurfaceSignal::FlickEnded, EventNormalizer::momentum_scroll_end),
        ];
        for (signal, handler) in wiring {
            let normalizer = self.normalizer.clone();
            store.connect(view, signal, move |sender| handler(&normalizer, sender));
        }
    }

    // -------------------------------------------------------------------------
    // Child management
    // -------------------------------------------------------------------------

    /// Attach a child to a surface using the surface's strategy.
    pub fn add_child_item(&mut self, surface: ViewId, child: ViewId, position: usize) {
        let mut store = self.store.borrow_mut();
        self.registry
            .attach_child(&mut store, &mut self.layout, surface, child, position);
    }

    /// Insert an item into a registered container's model.
    pub fn insert_list_item(&mut self, container: ViewId, child: ViewId, position: usize) {
        let mut store = self.store.borrow_mut();
        self.registry
            .insert(&mut store, &mut self.layout, container, child, position);
    }

    /// Remove the model items at `indices` from a registered container.
    pub fn remove_list_items(
        &mut self,
        container: ViewId,
        indices: &[usize],
        unregister_and_delete: bool,
    ) {
        let mut store = self.store.borrow_mut();
        self.registry.remove_many(
            &mut store,
            &mut self.layout,
            container,
            indices,
            unregister_and_delete,
        );
    }

    /// Remove and return the model item at `position` without destroying
    /// it.
    pub fn extract_list_item(&mut self, container: ViewId, position: usize) -> ViewId {
        let mut store = self.store.borrow_mut();
        self.registry.extract_at(&mut store, container, position)
    }

    /// Whether `container` routes children through the model list.
    pub fn is_array_optimized_container(&self, container: ViewId) -> bool {
        self.registry.is_optimized(container)
    }

    // -------------------------------------------------------------------------
    // Event loop
    // -------------------------------------------------------------------------

    /// Drain the deferred-deletion queue.
    ///
    /// Called by the event loop at a quiescent point. Dead surfaces and
    /// containers are deregistered here, so the registry never holds keys
    /// for destroyed views.
    pub fn run_deferred_deletions(&mut self) {
        let doomed = self.store.borrow_mut().take_deferred();
        for view in doomed {
            self.registry.forget_container(view);
            self.registry.forget_surface(view);
            self.layout.forget(view);
            self.store.borrow_mut().destroy(view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::surface::fire_signal;
    use serde_json::json;

    type Recorded = Rc<RefCell<Vec<(Tag, &'static str, Value)>>>;

    fn setup() -> (ScrollViewManager, Recorded) {
        let store = Rc::new(RefCell::new(SurfaceStore::new()));
        let recorded: Recorded = Rc::default();
        let sink: EventSink = {
            let recorded = Rc::clone(&recorded);
            Rc::new(move |tag, event, payload| {
                recorded.borrow_mut().push((tag, event, payload));
            })
        };
        (ScrollViewManager::new(store, sink), recorded)
    }

    fn child_with_height(manager: &ScrollViewManager, height: f64) -> ViewId {
        manager.store().borrow_mut().create_view(ViewNode {
            height,
            ..Default::default()
        })
    }

    /// Array-optimized surface with a registered container of `n` items.
    fn optimized_surface(
        manager: &mut ScrollViewManager,
        tag: Tag,
        n: usize,
    ) -> (ViewId, ViewId, Vec<ViewId>) {
        let surface = manager.create_view(
            tag,
            &json!({ "enableArrayScrollingOptimization": true }),
        );
        let container = manager
            .store()
            .borrow_mut()
            .create_view(ViewNode::default());
        let mut items = Vec::new();
        for i in 0..n {
            let item = child_with_height(manager, 10.0);
            manager.store().borrow_mut().insert_child_at(container, item, i);
            items.push(item);
        }
        manager.add_child_item(surface, container, 0);
        (surface, container, items)
    }

    #[test]
    fn test_module_identity() {
        let (manager, _) = setup();
        assert_eq!(manager.module_name(), "RCTScrollViewManager");
        assert_eq!(manager.direct_event_types(), DirectEvents::all());
    }

    #[test]
    fn test_create_view_selects_template() {
        let (mut manager, _) = setup();

        let direct = manager.create_view(1, &json!({}));
        let optimized =
            manager.create_view(2, &json!({ "enableArrayScrollingOptimization": true }));

        let store = manager.store().borrow();
        assert_eq!(store.get(direct).template, SurfaceTemplate::ScrollView);
        assert!(store.get(direct).content_item.is_some());
        assert_eq!(
            store.get(optimized).template,
            SurfaceTemplate::ScrollListView
        );
        assert!(store.get(optimized).content_item.is_none());
        assert_eq!(store.view_for_tag(1), direct);
        assert_eq!(store.view_for_tag(2), optimized);
    }

    #[test]
    fn test_scroll_to_writes_both_components() {
        let (mut manager, _) = setup();
        let view = manager.create_view(1, &json!({}));

        manager.scroll_to(1, 120.0, 340.0, true);

        let store = manager.store().borrow();
        assert_eq!(store.get(view).content_x, 120.0);
        assert_eq!(store.get(view).content_y, 340.0);
    }

    #[test]
    #[should_panic(expected = "no live view is bound to tag")]
    fn test_scroll_to_unknown_tag_panics() {
        let (manager, _) = setup();
        manager.scroll_to(99, 0.0, 0.0, false);
    }

    #[test]
    fn test_scroll_to_end_direct_mode() {
        let (mut manager, _) = setup();
        let view = manager.create_view(1, &json!({}));
        {
            let mut store = manager.store().borrow_mut();
            store.get_mut(view).content_height = 1000.0;
            store.get_mut(view).height = 300.0;
            store.get_mut(view).content_x = 40.0;
        }

        manager.scroll_to_end(1, false);

        let store = manager.store().borrow();
        assert_eq!(store.get(view).content_y, 700.0);
        assert_eq!(store.get(view).content_x, 40.0, "X untouched");
    }

    #[test]
    fn test_scroll_to_end_direct_mode_never_negative() {
        let (mut manager, _) = setup();
        let view = manager.create_view(1, &json!({}));
        {
            let mut store = manager.store().borrow_mut();
            store.get_mut(view).content_height = 100.0;
            store.get_mut(view).height = 300.0;
            store.get_mut(view).content_y = 50.0;
        }

        manager.scroll_to_end(1, false);
        assert_eq!(manager.store().borrow().get(view).content_y, 0.0);
    }

    #[test]
    fn test_scroll_to_end_array_mode_sets_current_index() {
        let (mut manager, _) = setup();
        let (surface, _, _) = optimized_surface(&mut manager, 1, 4);

        manager.scroll_to_end(1, false);
        assert_eq!(manager.store().borrow().get(surface).current_index, 3);
    }

    #[test]
    fn test_scroll_to_end_array_mode_single_item() {
        let (mut manager, _) = setup();
        let (surface, _, _) = optimized_surface(&mut manager, 1, 1);

        manager.scroll_to_end(1, false);
        assert_eq!(manager.store().borrow().get(surface).current_index, 0);
    }

    #[test]
    fn test_configure_view_wires_signals() {
        let (mut manager, recorded) = setup();
        let view = manager.create_view(7, &json!({ "onScroll": true }));
        {
            let mut store = manager.store().borrow_mut();
            store.get_mut(view).content_x = 150.0;
            store.get_mut(view).content_y = 30.0;
            store.get_mut(view).origin_x = 50.0;
            store.get_mut(view).origin_y = 10.0;
            store.get_mut(view).content_width = 800.0;
            store.get_mut(view).content_height = 2000.0;
            store.get_mut(view).width = 400.0;
            store.get_mut(view).height = 600.0;
        }

        manager.configure_view(view);
        {
            let store = manager.store().borrow();
            assert!(store.get(view).configured, "base configuration applied");
            assert_eq!(store.get(view).manager, Some(MODULE_NAME));
        }

        let store = Rc::clone(manager.store());
        fire_signal(&store, view, SurfaceSignal::MovementStarted);
        fire_signal(&store, view, SurfaceSignal::MovingChanged);
        fire_signal(&store, view, SurfaceSignal::MovementEnded);
        fire_signal(&store, view, SurfaceSignal::FlickStarted);
        fire_signal(&store, view, SurfaceSignal::FlickEnded);

        let events = recorded.borrow();
        let names: Vec<&str> = events.iter().map(|(_, name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "scrollBeginDrag",
                "onScroll",
                "scrollEndDrag",
                "momentumScrollBegin",
                "momentumScrollEnd",
            ]
        );
        assert_eq!(events[1].2["contentOffset"], json!({ "x": 100.0, "y": 20.0 }));
        assert_eq!(events[1].0, 7);
    }

    #[test]
    fn test_on_scroll_gated_after_wiring() {
        let (mut manager, recorded) = setup();
        let view = manager.create_view(7, &json!({}));
        manager.configure_view(view);

        let store = Rc::clone(manager.store());
        fire_signal(&store, view, SurfaceSignal::MovingChanged);
        assert!(recorded.borrow().is_empty(), "report flag defaults to unset");
    }

    #[test]
    fn test_attachment_strategy_routing() {
        let (mut manager, _) = setup();

        // Direct surface: children land in the content container.
        let direct = manager.create_view(1, &json!({}));
        let child = child_with_height(&manager, 10.0);
        manager.add_child_item(direct, child, 0);
        {
            let store = manager.store().borrow();
            let content = store.get(direct).content_item.unwrap();
            assert_eq!(store.children_of(content), &[child]);
            assert!(store.model(direct).is_empty(), "registry untouched");
        }
        assert!(!manager.is_array_optimized_container(child));

        // Optimized surface: children land in the published model.
        let (optimized, container, items) = optimized_surface(&mut manager, 2, 2);
        {
            let store = manager.store().borrow();
            assert_eq!(store.model(optimized), items.as_slice());
        }
        assert!(manager.is_array_optimized_container(container));
    }

    #[test]
    fn test_model_mutations_via_manager() {
        let (mut manager, _) = setup();
        let (surface, container, items) = optimized_surface(&mut manager, 1, 3);

        let newcomer = child_with_height(&manager, 10.0);
        manager.insert_list_item(container, newcomer, 3);
        assert_eq!(
            manager.store().borrow().model(surface),
            &[items[0], items[1], items[2], newcomer]
        );

        manager.remove_list_items(container, &[0, 2], false);
        assert_eq!(
            manager.store().borrow().model(surface),
            &[items[1], newcomer]
        );

        let extracted = manager.extract_list_item(container, 0);
        assert_eq!(extracted, items[1]);
        assert_eq!(manager.store().borrow().model(surface), &[newcomer]);
    }

    #[test]
    fn test_deferred_deletion_drain_deregisters() {
        let (mut manager, _) = setup();
        let (surface, container, items) = optimized_surface(&mut manager, 1, 2);

        manager.remove_list_items(container, &[1], true);
        assert!(manager.store().borrow().contains(items[1]));

        manager.run_deferred_deletions();
        assert!(!manager.store().borrow().contains(items[1]));

        // A dying registered surface drops its registry entries too.
        manager.store().borrow_mut().delete_later(surface);
        manager.run_deferred_deletions();
        assert!(!manager.store().borrow().contains(surface));
        assert!(!manager.is_array_optimized_container(container));
    }
}
