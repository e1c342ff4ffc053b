//! # scrollview-bridge
//!
//! Native-side management for a scrollable container described by a remote
//! logical (JS-side) tree.
//!
//! ## Architecture
//!
//! The logical-tree bridge issues commands and child mutations; the native
//! surface raises interaction signals; normalized events flow back up:
//!
//! ```text
//! logical tree → commands / child registry → surface store
//! surface store → signals → event normalizer → logical tree
//! ```
//!
//! Everything runs on the toolkit's single event-loop thread. Views live in
//! a generational-handle store; the child registry keeps an ordered model
//! per array-optimized surface and republishes the full list after every
//! mutation; the event normalizer converts the five native interaction
//! signals into the bridge's event schema.
//!
//! ## Modules
//!
//! - [`types`] - Geometry values, creation properties, event payloads
//! - [`engine`] - Surface store, property accessors, child registry
//! - [`layout`] - Flex layout collaborator (notified on removal)
//! - [`events`] - Event normalizer
//! - [`manager`] - Lifecycle and command entry points

pub mod engine;
pub mod events;
pub mod layout;
pub mod manager;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use engine::{
    ChildRegistry, SignalHandler, SurfaceSignal, SurfaceStore, ViewId, ViewNode, fire_signal,
};

pub use layout::FlexLayout;

pub use events::{EventNormalizer, EventSink, build_event_data};

pub use manager::{MODULE_NAME, ScrollViewManager, ViewManager};
