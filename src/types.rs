//! Core types for scrollview-bridge.
//!
//! These types define the vocabulary shared between the command entry
//! points, the child registry and the event normalizer: geometry values,
//! creation-time properties, and the normalized payload sent to the
//! logical-tree bridge.

use serde::{Deserialize, Serialize};

/// Remote identifier assigned to a view by the logical-tree bridge.
pub type Tag = i32;

// =============================================================================
// Geometry
// =============================================================================

/// A 2D point in device-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0);
}

/// A 2D extent in device-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0);
}

// =============================================================================
// Creation Properties
// =============================================================================

/// Creation-time properties accepted from the logical-tree bridge.
///
/// Both flags default to `false` when absent from the property map.
/// `enable_array_scrolling_optimization` is read exactly once, at view
/// creation, and fixes the surface's template and attachment strategy for
/// its whole lifetime. `on_scroll` gates `onScroll` emission and may be
/// rewritten later through the surface store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollViewProps {
    pub enable_array_scrolling_optimization: bool,
    pub on_scroll: bool,
}

/// Native template backing a scroll surface.
///
/// Selected once from the creation properties, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceTemplate {
    /// Plain flickable surface; children are reparented into its content
    /// container.
    #[default]
    ScrollView,
    /// Array-backed list view; children live in the published model.
    ScrollListView,
}

impl SurfaceTemplate {
    /// Template for a given set of creation properties.
    pub fn for_props(props: &ScrollViewProps) -> Self {
        if props.enable_array_scrolling_optimization {
            Self::ScrollListView
        } else {
            Self::ScrollView
        }
    }
}

// =============================================================================
// Normalized Event Payload
// =============================================================================

/// Content-geometry payload carried by `onScroll` and the momentum events.
///
/// `content_offset` is reported relative to the surface's origin offset.
/// `zoom_scale` is fixed at 1: zooming is not modeled by this manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollEventData {
    pub content_offset: Point,
    pub content_size: Size,
    pub layout_measurement: Size,
    pub zoom_scale: f64,
}

// =============================================================================
// Direct Event Types
// =============================================================================

bitflags::bitflags! {
    /// Direct event types this manager declares to the bridge.
    ///
    /// `SCROLL_ANIMATION_END` is declared for dispatch routing but never
    /// emitted by this core; an external collaborator emits it if needed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirectEvents: u8 {
        const SCROLL_BEGIN_DRAG     = 1 << 0;
        const ON_SCROLL             = 1 << 1;
        const SCROLL_END_DRAG       = 1 << 2;
        const SCROLL_ANIMATION_END  = 1 << 3;
        const MOMENTUM_SCROLL_BEGIN = 1 << 4;
        const MOMENTUM_SCROLL_END   = 1 << 5;
    }
}

impl DirectEvents {
    /// Wire names for the contained event types, in declaration order.
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::SCROLL_BEGIN_DRAG) {
            names.push("scrollBeginDrag");
        }
        if self.contains(Self::ON_SCROLL) {
            names.push("onScroll");
        }
        if self.contains(Self::SCROLL_END_DRAG) {
            names.push("scrollEndDrag");
        }
        if self.contains(Self::SCROLL_ANIMATION_END) {
            names.push("scrollAnimationEnd");
        }
        if self.contains(Self::MOMENTUM_SCROLL_BEGIN) {
            names.push("momentumScrollBegin");
        }
        if self.contains(Self::MOMENTUM_SCROLL_END) {
            names.push("momentumScrollEnd");
        }
        names
    }
}
