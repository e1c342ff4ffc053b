//! Geometry/Property Accessor - scalar properties on a native view handle.
//!
//! Pure adapter over the surface store; holds no state of its own. The
//! registry, the commands and the event normalizer all read and write
//! surface geometry through these functions.

use crate::types::{Point, Size};

use super::surface::{SurfaceStore, ViewId};

/// Raw content offset (not origin-relative).
pub fn content_offset(store: &SurfaceStore, view: ViewId) -> Point {
    let node = store.get(view);
    Point::new(node.content_x, node.content_y)
}

/// Write both content offset components.
pub fn set_content_offset(store: &mut SurfaceStore, view: ViewId, x: f64, y: f64) {
    let node = store.get_mut(view);
    node.content_x = x;
    node.content_y = y;
}

/// Origin offset that reported content coordinates are relative to.
pub fn origin_offset(store: &SurfaceStore, view: ViewId) -> Point {
    let node = store.get(view);
    Point::new(node.origin_x, node.origin_y)
}

pub fn set_origin_offset(store: &mut SurfaceStore, view: ViewId, x: f64, y: f64) {
    let node = store.get_mut(view);
    node.origin_x = x;
    node.origin_y = y;
}

pub fn content_size(store: &SurfaceStore, view: ViewId) -> Size {
    let node = store.get(view);
    Size::new(node.content_width, node.content_height)
}

pub fn set_content_size(store: &mut SurfaceStore, view: ViewId, width: f64, height: f64) {
    let node = store.get_mut(view);
    node.content_width = width;
    node.content_height = height;
}

pub fn viewport_size(store: &SurfaceStore, view: ViewId) -> Size {
    let node = store.get(view);
    Size::new(node.width, node.height)
}

pub fn set_viewport_size(store: &mut SurfaceStore, view: ViewId, width: f64, height: f64) {
    let node = store.get_mut(view);
    node.width = width;
    node.height = height;
}

/// Published model item count (list-view surfaces).
pub fn item_count(store: &SurfaceStore, view: ViewId) -> usize {
    store.get(view).count
}

pub fn current_index(store: &SurfaceStore, view: ViewId) -> i32 {
    store.get(view).current_index
}

pub fn set_current_index(store: &mut SurfaceStore, view: ViewId, index: i32) {
    store.get_mut(view).current_index = index;
}
