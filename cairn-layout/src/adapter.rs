//! Host rendering adapter.
//!
//! The engine never touches a render tree directly. Everything it needs
//! from the host goes through `ViewAdapter`: resolving a view's render
//! target, applying presentation attributes, measuring, and routing view
//! notifications. Capabilities a host does not have keep their default,
//! which does nothing.

use cairn_api::{AttrMap, EntryId, Origin, Size, ViewEvent, ViewSignal};

/// The capability set a host implements once for its view system.
pub trait ViewAdapter {
    /// Host view handle supplied to `append`/`insert`/`append_container`.
    type View: Clone;
    /// Render-target handle (the element a view or block is drawn into).
    type Target: Clone;

    /// Resolve the render target of a host view.
    fn target(&self, view: &Self::View) -> Self::Target;

    /// Synthesize a target from rendered block markup.
    fn create_block(&self, markup: &str) -> Self::Target;

    /// Create the root target every entry target is attached to.
    fn create_root(&self, origin: Origin) -> Self::Target;

    /// Apply presentation attributes to a target.
    ///
    /// Turning the mapping (including the `transition` sub-mapping of
    /// per-property durations in seconds) into host styling, units and
    /// prefixes included, is the host's job.
    fn apply_presentation(&self, target: &Self::Target, properties: &AttrMap);

    /// Attach the root to the container: before existing content for
    /// `Origin::Top`, after it for `Origin::Bottom`.
    fn mount_root(&self, _container: Option<&Self::Target>, _root: &Self::Target, _origin: Origin) {}

    /// Attach newly materialized targets to the root in one batch.
    fn attach(&self, _root: &Self::Target, _targets: &[Self::Target]) {}

    /// Remove all content from the root.
    fn clear(&self, _root: &Self::Target) {}

    /// A size declared up front on the target, bypassing measurement.
    fn dimension_hint(&self, _target: &Self::Target) -> Option<Size> {
        None
    }

    /// The target's natural box, if it can be measured.
    fn measure(&self, _target: &Self::Target) -> Option<Size> {
        None
    }

    /// Resolve a container selector into its target and current width.
    fn resolve_container(&self, _selector: &str) -> Option<(Self::Target, f64)> {
        None
    }

    /// Current vertical scroll offset of the viewport.
    fn scroll_offset(&self) -> f64 {
        0.0
    }

    /// Scroll the viewport to a vertical offset.
    fn scroll_to(&self, _offset: f64) {}

    /// Deliver a lifecycle notification to a view.
    fn emit(&self, _view: &Self::View, _event: ViewEvent) {}

    /// Route `signal` raised by `view` to the engine as
    /// `handle_signal(entry, signal)`.
    fn subscribe(&self, _view: &Self::View, _signal: ViewSignal, _entry: EntryId) {}

    /// Stop routing `signal` for `view`.
    fn unsubscribe(&self, _view: &Self::View, _signal: ViewSignal, _entry: EntryId) {}

    /// Make activating `target` (a click on a close bracket) call
    /// `handle_signal(container, ViewSignal::Close)`.
    fn bind_collapse(&self, _target: &Self::Target, _container: EntryId) {}
}
