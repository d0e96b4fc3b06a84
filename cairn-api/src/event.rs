//! Events exchanged between the layout engine, its host and the views it places.

use serde::{Deserialize, Serialize};

/// Events emitted by the layout engine to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutEvent {
    /// Total content height after a committed draw (0 after a reset).
    ContainerHeight(f64),
}

/// Lifecycle notifications delivered to a host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewEvent {
    /// The view's target was attached to the render tree.
    Created,
    /// New presentation attributes were applied to the view's target.
    Rendered,
}

/// Requests a container view can raise against its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewSignal {
    /// Reveal the container's sub-views.
    Expand,
    /// Hide the container's sub-views.
    Close,
}

impl ViewSignal {
    pub fn name(self) -> &'static str {
        match self {
            ViewSignal::Expand => "expand",
            ViewSignal::Close => "close",
        }
    }
}
