//! Event Normalizer - native interaction signals to bridge events.
//!
//! Converts the five native signals into the normalized event schema the
//! logical-tree bridge expects:
//!
//! - movement-started → `scrollBeginDrag` (empty payload)
//! - movement-ended → `scrollEndDrag` (empty payload)
//! - moving-changed → `onScroll` (content-geometry payload, gated by the
//!   per-view report flag; suppressed ticks are dropped, never queued)
//! - flick-started → `momentumScrollBegin` (content-geometry payload)
//! - flick-ended → `momentumScrollEnd` (content-geometry payload)
//!
//! The raising surface is passed to every handler explicitly.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use tracing::trace;

use crate::engine::geometry;
use crate::engine::surface::{SurfaceStore, ViewId};
use crate::types::{Point, ScrollEventData, Tag};

/// Outbound event channel to the logical-tree bridge.
///
/// Receives `(tag, event name, payload)` triples.
pub type EventSink = Rc<dyn Fn(Tag, &'static str, Value)>;

/// Normalizes native scroll interaction signals for one manager.
#[derive(Clone)]
pub struct EventNormalizer {
    store: Rc<RefCell<SurfaceStore>>,
    sink: EventSink,
}

impl EventNormalizer {
    pub fn new(store: Rc<RefCell<SurfaceStore>>, sink: EventSink) -> Self {
        Self { store, sink }
    }

    /// movement-started: the user grabbed the surface.
    pub fn scroll_begin_drag(&self, view: ViewId) {
        self.notify(view, "scrollBeginDrag", json!({}));
    }

    /// movement-ended: the user let go.
    pub fn scroll_end_drag(&self, view: ViewId) {
        self.notify(view, "scrollEndDrag", json!({}));
    }

    /// moving-changed: a scroll-position tick.
    ///
    /// The report flag is read at emit time; while unset the tick is
    /// suppressed entirely.
    pub fn scroll(&self, view: ViewId) {
        let payload = {
            let store = self.store.borrow();
            if !store.get(view).report_scroll {
                trace!(?view, "onScroll suppressed: report flag unset");
                return;
            }
            geometry_payload(&store, view)
        };
        self.notify(view, "onScroll", payload);
    }

    /// flick-started: momentum scrolling began.
    pub fn momentum_scroll_begin(&self, view: ViewId) {
        let payload = geometry_payload(&self.store.borrow(), view);
        self.notify(view, "momentumScrollBegin", payload);
    }

    /// flick-ended: momentum scrolling came to rest.
    pub fn momentum_scroll_end(&self, view: ViewId) {
        let payload = geometry_payload(&self.store.borrow(), view);
        self.notify(view, "momentumScrollEnd", payload);
    }

    fn notify(&self, view: ViewId, event: &'static str, payload: Value) {
        let tag = {
            let store = self.store.borrow();
            store
                .get(view)
                .tag
                .expect("surface is not bound to a bridge tag")
        };
        trace!(tag, event, "event emitted");
        (self.sink)(tag, event, payload);
    }
}

/// Build the normalized content-geometry payload for a surface.
pub fn build_event_data(store: &SurfaceStore, view: ViewId) -> ScrollEventData {
    let offset = geometry::content_offset(store, view);
    let origin = geometry::origin_offset(store, view);
    ScrollEventData {
        content_offset: Point::new(offset.x - origin.x, offset.y - origin.y),
        content_size: geometry::content_size(store, view),
        layout_measurement: geometry::viewport_size(store, view),
        zoom_scale: 1.0,
    }
}

fn geometry_payload(store: &SurfaceStore, view: ViewId) -> Value {
    serde_json::to_value(build_event_data(store, view)).expect("payload serializes")
}
