//! Engine - surface store, property accessors and the child registry.

pub mod geometry;
pub mod registry;
pub mod surface;

pub use registry::ChildRegistry;
pub use surface::{
    SignalHandler, SurfaceSignal, SurfaceStore, ViewId, ViewNode, fire_signal,
};
