//! Cairn API - Shared value, geometry and event types for the cairn layout engine.

mod event;
mod geometry;
mod value;

pub use event::*;
pub use geometry::*;
pub use value::*;
