//! The layout engine.
//!
//! `LayoutEngine` owns the entries and their stash order. `compose`
//! attaches new targets under the root and queues a measurement read;
//! `draw` queues a scroll-offset read and a position write. The host runs
//! the queued work once per paint with [`LayoutEngine::run_frame`].

mod expand;

use std::collections::HashMap;

use cairn_api::{AttrMap, EntryId, LayoutEvent, Origin, Size, Value, ViewEvent, ViewSignal, attr, attrs};
use tokio::sync::broadcast;

use crate::adapter::ViewAdapter;
use crate::config::{LayoutConfig, LayoutOptions};
use crate::entry::{BlockAttr, Entry, EntryFactory, Operation};
use crate::error::{LayoutError, Result};
use crate::model::SetOptions;
use crate::pack::{ColumnGeometry, ColumnPacker};
use crate::scheduler::{FrameScheduler, PendingSlot, Phase, TaskHandle};
use crate::stash::{IncrementalStash, Traversal};

/// Transition duration (seconds) once an entry has a position.
const MOVE_DURATION: f64 = 0.5;
/// Fade duration (seconds), also used for the first placement.
const FADE_DURATION: f64 = 0.5;

/// Deferred work queued on the engine's scheduler.
#[derive(Debug, Clone, Copy)]
enum FrameTask {
    Measure,
    ReadScroll,
    Commit(CommitPlan),
}

/// Parameters captured when `draw` is called, used by the commit.
#[derive(Debug, Clone, Copy)]
struct CommitPlan {
    geometry: ColumnGeometry,
    origin: Origin,
    expand_space: f64,
}

/// Incremental masonry layout over host views.
pub struct LayoutEngine<A: ViewAdapter> {
    adapter: A,
    config: LayoutConfig,
    container: Option<A::Target>,
    container_width: f64,
    root: Option<A::Target>,
    entries: HashMap<EntryId, Entry<A>>,
    stash: IncrementalStash<EntryId>,
    factory: EntryFactory,
    scheduler: FrameScheduler<FrameTask>,
    measure_task: PendingSlot,
    scroll_task: PendingSlot,
    commit_task: PendingSlot,
    container_height: f64,
    /// Viewport offset captured by the last scroll read.
    scroll_offset: f64,
    event_tx: broadcast::Sender<LayoutEvent>,
}

impl<A: ViewAdapter> LayoutEngine<A> {
    /// Create an engine. A configured `container` selector is resolved
    /// through the adapter right away.
    pub fn new(adapter: A, config: LayoutConfig) -> Result<(Self, broadcast::Receiver<LayoutEvent>)> {
        let (event_tx, event_rx) = broadcast::channel(64);

        let mut engine = Self {
            adapter,
            config: LayoutConfig::default(),
            container: None,
            container_width: 0.0,
            root: None,
            entries: HashMap::new(),
            stash: IncrementalStash::new(),
            factory: EntryFactory::new(),
            scheduler: FrameScheduler::new(),
            measure_task: PendingSlot::default(),
            scroll_task: PendingSlot::default(),
            commit_task: PendingSlot::default(),
            container_height: 0.0,
            scroll_offset: 0.0,
            event_tx,
        };

        if let Some(selector) = &config.container {
            engine.resolve_container(selector)?;
        }
        engine.config = config;

        Ok((engine, event_rx))
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<LayoutEvent> {
        self.event_tx.subscribe()
    }

    /// Merge option overrides into the configuration. A `container`
    /// selector is resolved first; if it cannot be resolved nothing is
    /// applied.
    pub fn set_options(&mut self, options: LayoutOptions) -> Result<&mut Self> {
        if let Some(selector) = &options.container {
            self.resolve_container(selector)?;
        }
        if let Some(width) = options.container_width {
            self.container_width = width;
        }
        self.config.apply(&options);
        Ok(self)
    }

    fn resolve_container(&mut self, selector: &str) -> Result<()> {
        let (target, width) = self
            .adapter
            .resolve_container(selector)
            .ok_or_else(|| LayoutError::ContainerNotFound(selector.to_string()))?;
        tracing::debug!("resolved container {} with width {}", selector, width);
        self.container = Some(target);
        self.container_width = width;
        Ok(())
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Insert views directly after the entry at `index`.
    pub fn insert<I>(&mut self, views: I, index: usize) -> &mut Self
    where
        I: IntoIterator<Item = A::View>,
    {
        let ids: Vec<EntryId> = views
            .into_iter()
            .map(|view| {
                let entry = self.factory.item(&self.adapter, view, Operation::Insert);
                let id = entry.id();
                self.entries.insert(id, entry);
                id
            })
            .collect();
        self.insert_entries(ids, index);
        self
    }

    /// Splice existing entries in after `index`, clamped to the end.
    fn insert_entries(&mut self, ids: Vec<EntryId>, index: usize) {
        let at = (index + 1).min(self.stash.len());
        tracing::debug!("inserting {} entries at {}", ids.len(), at);
        self.stash.insert_at(ids, at);
    }

    /// Append views to the end of the layout.
    pub fn append<I>(&mut self, views: I) -> &mut Self
    where
        I: IntoIterator<Item = A::View>,
    {
        for view in views {
            let entry = self.factory.item(&self.adapter, view, Operation::Append);
            self.push_entry(entry);
        }
        self
    }

    /// Append an expandable container. Its opening bracket uses the
    /// template named by `attr.template` (`title` when unset).
    pub fn append_container(
        &mut self,
        view: A::View,
        sub_views: Vec<A::View>,
        attr: BlockAttr,
    ) -> Result<&mut Self> {
        let template = self.template_for(&attr)?.to_string();
        let entry = self
            .factory
            .container(&self.adapter, view, sub_views, attr, template, Operation::Append);
        self.push_entry(entry);
        Ok(self)
    }

    /// Append a full-row block rendered from the template named by
    /// `attr.template` (`title` when unset).
    pub fn append_block(&mut self, attr: BlockAttr) -> Result<&mut Self> {
        let template = self.template_for(&attr)?.to_string();
        let entry = self.factory.block(&self.adapter, &template, &attr, Operation::Append)?;
        self.push_entry(entry);
        Ok(self)
    }

    fn template_for(&self, attr: &BlockAttr) -> Result<&str> {
        let name = attr.template_name();
        self.config
            .template(name)
            .ok_or_else(|| LayoutError::MissingTemplate(name.to_string()))
    }

    fn push_entry(&mut self, entry: Entry<A>) {
        let id = entry.id();
        self.entries.insert(id, entry);
        self.stash.append(id);
    }

    /// Route a view signal or bracket click to the container `entry`.
    pub fn handle_signal(&mut self, entry: EntryId, signal: ViewSignal) -> Result<()> {
        let result = match signal {
            ViewSignal::Expand => self.expand_sub_views(entry, None),
            ViewSignal::Close => self.close_sub_views(entry),
        };
        if let Err(LayoutError::UnknownEntry(id)) = &result {
            tracing::warn!("{} signal for unknown container {}", signal.name(), id);
        }
        result
    }

    /// Drop every entry and clear the root, then optionally lay out a
    /// fresh list of views.
    pub fn reset(&mut self, views: Option<Vec<A::View>>) -> &mut Self {
        if let Some(root) = &self.root {
            self.adapter.clear(root);
            self.adapter.apply_presentation(root, &root_style(0.0));
        }
        self.emit(LayoutEvent::ContainerHeight(0.0));
        self.container_height = 0.0;

        for entry in self.entries.values() {
            if let Some(container) = entry.container() {
                self.adapter.unsubscribe(&container.view, ViewSignal::Expand, entry.id());
                self.adapter.unsubscribe(&container.view, ViewSignal::Close, entry.id());
            }
        }
        tracing::debug!("reset: dropping {} entries", self.entries.len());
        self.entries.clear();
        self.stash.clear();

        self.measure_task.cancel(&mut self.scheduler);
        self.scroll_task.cancel(&mut self.scheduler);
        self.commit_task.cancel(&mut self.scheduler);

        if let Some(views) = views {
            self.append(views).compose(true);
        }
        self
    }

    // =========================================================================
    // Compose & draw
    // =========================================================================

    /// Attach new targets under the root and queue a measurement of the
    /// unsettled tail. With `draw`, also queue a draw.
    pub fn compose(&mut self, draw: bool) -> &mut Self {
        let origin = self.config.origin;
        if self.root.is_none() {
            let root = self.adapter.create_root(origin);
            self.adapter
                .apply_presentation(&root, &attrs([(attr::POSITION, Value::from("relative"))]));
            self.adapter.mount_root(self.container.as_ref(), &root, origin);
            self.root = Some(root);
        }

        let Self {
            adapter,
            stash,
            entries,
            root,
            ..
        } = self;
        let adapter = &*adapter;

        let mut fragment = Vec::new();
        stash.for_each(Traversal::TAIL_KEEP, |id, _| {
            let Some(entry) = entries.get_mut(id) else {
                return;
            };
            if entry.model.flag(attr::DOM) {
                return;
            }
            fragment.push(entry.target().clone());
            entry.model.set([(attr::DOM, Value::from(true))], SetOptions::SILENT);
            if let Some(view) = entry.view() {
                adapter.emit(view, ViewEvent::Created);
            }
        });

        if let Some(root) = root.as_ref() {
            if !fragment.is_empty() {
                adapter.attach(root, &fragment);
            }
        }
        tracing::debug!("compose: attached {} targets", fragment.len());

        if self.measure_task.replace(&mut self.scheduler, Phase::Read, FrameTask::Measure) {
            tracing::trace!("replaced pending measurement");
        }

        if draw {
            self.schedule_draw();
        }
        self
    }

    /// Apply option overrides, then queue a full layout pass.
    pub fn draw(&mut self, options: Option<LayoutOptions>) -> Result<&mut Self> {
        if let Some(options) = options {
            self.set_options(options)?;
        }
        self.schedule_draw();
        Ok(self)
    }

    fn schedule_draw(&mut self) {
        let plan = CommitPlan {
            geometry: ColumnGeometry::new(
                self.container_width,
                self.config.column_width,
                self.config.gutter,
            ),
            origin: self.config.origin,
            expand_space: self.config.expand_space,
        };
        tracing::debug!(
            "draw: {} columns of {} at width {}",
            plan.geometry.columns,
            plan.geometry.column_width,
            self.container_width
        );

        self.scroll_task
            .replace(&mut self.scheduler, Phase::Read, FrameTask::ReadScroll);
        if self
            .commit_task
            .replace(&mut self.scheduler, Phase::Write, FrameTask::Commit(plan))
        {
            tracing::trace!("replaced pending commit");
        }
    }

    /// Run everything queued so far: all reads, then all writes. Returns
    /// the number of tasks run.
    pub fn run_frame(&mut self) -> usize {
        let frame = self.scheduler.take_frame();
        let count = frame.reads.len() + frame.writes.len();
        for (handle, task) in frame.reads.into_iter().chain(frame.writes) {
            self.run_task(handle, task);
        }
        count
    }

    /// Whether `run_frame` has anything to do.
    pub fn has_pending_work(&self) -> bool {
        !self.scheduler.is_idle()
    }

    fn run_task(&mut self, handle: TaskHandle, task: FrameTask) {
        match task {
            FrameTask::Measure => {
                self.measure_task.settle(handle);
                self.measure();
            }
            FrameTask::ReadScroll => {
                self.scroll_task.settle(handle);
                self.scroll_offset = self.adapter.scroll_offset();
            }
            FrameTask::Commit(plan) => {
                self.commit_task.settle(handle);
                self.commit(plan);
            }
        }
    }

    /// Store width and height for every entry in the unsettled tail.
    fn measure(&mut self) {
        let Self {
            adapter,
            stash,
            entries,
            config,
            ..
        } = self;
        let adapter = &*adapter;
        let column_width = config.column_width;

        let mut measured = 0;
        let mut unmeasured = 0;
        stash.for_each(Traversal::TAIL_KEEP, |id, _| {
            let Some(entry) = entries.get_mut(id) else {
                return;
            };
            let size = adapter.dimension_hint(entry.target()).unwrap_or_else(|| {
                let natural = adapter.measure(entry.target());
                let width = nonzero(entry.model.get_f64(attr::WIDTH))
                    .or_else(|| nonzero(natural.map(|s| s.width)))
                    .unwrap_or(column_width);
                let height = nonzero(entry.model.get_f64(attr::HEIGHT))
                    .or(natural.map(|s| s.height))
                    .unwrap_or(f64::NAN);
                Size::new(width, height)
            });
            if size.height.is_nan() {
                unmeasured += 1;
            }
            entry.model.set(
                [
                    (attr::WIDTH, Value::from(size.width)),
                    (attr::HEIGHT, Value::from(size.height)),
                ],
                SetOptions::SILENT,
            );
            measured += 1;
        });

        if unmeasured > 0 {
            tracing::warn!("{} entries could not be measured; their height is NaN", unmeasured);
        }
        tracing::debug!("measured {} entries", measured);
    }

    /// Pack the whole stash and write every entry's position.
    fn commit(&mut self, plan: CommitPlan) {
        let CommitPlan {
            geometry,
            origin,
            expand_space,
        } = plan;
        let mut packer = ColumnPacker::new(geometry, origin, expand_space);

        let Self {
            adapter,
            stash,
            entries,
            ..
        } = self;
        let adapter = &*adapter;
        let anchor = match origin {
            Origin::Top => attr::BOTTOM,
            Origin::Bottom => attr::TOP,
        };

        let mut placed = 0;
        stash.for_each(Traversal::ALL, |id, _| {
            let Some(entry) = entries.get_mut(id) else {
                return;
            };
            let width = entry.model.get_f64(attr::WIDTH).unwrap_or(geometry.column_width);
            let height = entry.model.get_f64(attr::HEIGHT).unwrap_or(f64::NAN);

            let placement = packer.place(width, height, entry.is_block());
            if entry.is_expanded() {
                let embedded = entry
                    .container()
                    .and_then(|c| c.sub_entries())
                    .map_or(0, <[EntryId]>::len);
                packer.open_region(embedded);
            }

            let moving = if entry.has_position { MOVE_DURATION } else { 0.0 };
            let transition = attrs([
                (attr::OPACITY, Value::from(FADE_DURATION)),
                (attr::TRANSFORM, Value::from(moving)),
                (attr::TOP, Value::from(moving)),
                (attr::LEFT, Value::from(moving)),
                (attr::BOTTOM, Value::from(moving)),
            ]);

            tracing::trace!(
                "place {} at column {} span {} baseline {}",
                id,
                placement.column,
                placement.span,
                placement.baseline
            );
            entry.update(
                adapter,
                origin,
                [
                    (attr::LEFT, Value::from(geometry.left(placement.column))),
                    (attr::WIDTH, Value::from(width)),
                    (attr::HEIGHT, Value::from(height)),
                    (attr::OPACITY, Value::from(1)),
                    (attr::Z_INDEX, Value::from(1)),
                    (attr::TRANSITION, Value::from(transition)),
                    (anchor, Value::from(placement.baseline)),
                ],
                SetOptions::NOTIFY,
            );
            entry.has_position = true;
            placed += 1;
        });

        let container_height = packer.content_height();
        tracing::debug!(
            "commit: placed {} entries in {} columns, height {}",
            placed,
            geometry.columns,
            container_height
        );

        if let Some(root) = &self.root {
            self.adapter.apply_presentation(root, &root_style(container_height));
        }
        self.emit(LayoutEvent::ContainerHeight(container_height));
        if origin == Origin::Top {
            self.adapter
                .scroll_to(self.scroll_offset + container_height - self.container_height);
        }
        self.container_height = container_height;
    }

    fn emit(&self, event: LayoutEvent) {
        // No receivers is fine.
        let _ = self.event_tx.send(event);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn len(&self) -> usize {
        self.stash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stash.is_empty()
    }

    /// Look up an entry, placed or cached.
    pub fn entry(&self, id: EntryId) -> Option<&Entry<A>> {
        self.entries.get(&id)
    }

    /// Mutable entry access, e.g. to register model listeners.
    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut Entry<A>> {
        self.entries.get_mut(&id)
    }

    /// Placed entries in layout order.
    pub fn entry_ids(&self) -> &[EntryId] {
        self.stash.as_slice()
    }

    /// Height reported by the last committed draw.
    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Column count the next draw would use.
    pub fn columns(&self) -> usize {
        ColumnGeometry::new(self.container_width, self.config.column_width, self.config.gutter).columns
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn root(&self) -> Option<&A::Target> {
        self.root.as_ref()
    }
}

impl<A: ViewAdapter> std::fmt::Debug for LayoutEngine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("config", &self.config)
            .field("container_width", &self.container_width)
            .field("entries", &self.stash.len())
            .field("container_height", &self.container_height)
            .field("pending", &self.scheduler.len())
            .finish()
    }
}

fn root_style(height: f64) -> AttrMap {
    attrs([
        (attr::POSITION, Value::from("relative")),
        (attr::HEIGHT, Value::from(height)),
    ])
}

/// Zero and NaN count as "not provided".
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}
