//! Layout entries.
//!
//! An entry is one placed unit: an `Item` wrapping a host view, a `Block`
//! rendered from a template, or a `Container` wrapping a host view that can
//! reveal a run of sub-entries directly after itself. All three share the
//! same model and render path; only a container carries expansion state.

use std::fmt;

use cairn_api::{AttrMap, EntryId, Origin, Value, ViewEvent, ViewSignal, attr, attrs};
use serde::{Deserialize, Serialize};

use crate::adapter::ViewAdapter;
use crate::config::TITLE_TEMPLATE;
use crate::error::Result;
use crate::model::{AttributeModel, SetOptions};

/// How an entry entered the layout. Recorded on the model, never acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Append,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Append => "append",
        }
    }
}

/// Template selection and data for a block (or a container's brackets).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockAttr {
    /// Template name; `title` when unset.
    pub template: Option<String>,
    /// Values substituted into the template.
    #[serde(default)]
    pub data: AttrMap,
}

impl BlockAttr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.template = Some(name.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or(TITLE_TEMPLATE)
    }
}

/// Expansion state owned by a container entry.
#[derive(Debug, Clone)]
pub struct ContainerState<V> {
    pub(crate) view: V,
    pub(crate) attr: BlockAttr,
    /// Markup of the opening bracket.
    pub(crate) template: String,
    pub(crate) sub_views: Vec<V>,
    /// Built on first expansion and kept for the container's lifetime.
    pub(crate) sub_entries: Option<Vec<EntryId>>,
}

impl<V> ContainerState<V> {
    pub fn attr(&self) -> &BlockAttr {
        &self.attr
    }

    pub fn sub_views(&self) -> &[V] {
        &self.sub_views
    }

    /// Cached sub-entries (brackets included), if ever expanded.
    pub fn sub_entries(&self) -> Option<&[EntryId]> {
        self.sub_entries.as_deref()
    }
}

/// Variant-specific part of an entry.
#[derive(Debug, Clone)]
pub enum EntryKind<V> {
    Item { view: V },
    Block,
    Container(ContainerState<V>),
}

/// One placed unit in the layout.
pub struct Entry<A: ViewAdapter> {
    id: EntryId,
    pub(crate) model: AttributeModel,
    /// Set once the entry has been committed to a position.
    pub(crate) has_position: bool,
    target: A::Target,
    pub(crate) kind: EntryKind<A::View>,
}

impl<A: ViewAdapter> Entry<A> {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn model(&self) -> &AttributeModel {
        &self.model
    }

    /// Mutable model access (listener registration, host attributes).
    pub fn model_mut(&mut self) -> &mut AttributeModel {
        &mut self.model
    }

    pub fn target(&self) -> &A::Target {
        &self.target
    }

    pub fn kind(&self) -> &EntryKind<A::View> {
        &self.kind
    }

    pub fn has_position(&self) -> bool {
        self.has_position
    }

    /// The wrapped host view (items and containers).
    pub fn view(&self) -> Option<&A::View> {
        match &self.kind {
            EntryKind::Item { view } => Some(view),
            EntryKind::Container(container) => Some(&container.view),
            EntryKind::Block => None,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, EntryKind::Block)
    }

    pub fn container(&self) -> Option<&ContainerState<A::View>> {
        match &self.kind {
            EntryKind::Container(container) => Some(container),
            _ => None,
        }
    }

    pub(crate) fn container_mut(&mut self) -> Option<&mut ContainerState<A::View>> {
        match &mut self.kind {
            EntryKind::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.model.flag(attr::EXPANDED)
    }

    pub fn operation(&self) -> Option<Operation> {
        match self.model.get(attr::OPERATION).and_then(Value::as_str) {
            Some("insert") => Some(Operation::Insert),
            Some("append") => Some(Operation::Append),
            _ => None,
        }
    }

    /// Write attributes to the model and, for a notifying write that
    /// changed something, render the changed subset.
    pub fn update<K, I>(&mut self, adapter: &A, origin: Origin, attributes: I, options: SetOptions) -> AttrMap
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let changed = self.model.set(attributes, options);
        if !options.silent && !changed.is_empty() {
            self.render(adapter, origin, Some(&changed));
        }
        changed
    }

    /// Push the model's presentation state to the target.
    ///
    /// `overrides` win over the model-derived values. Entries anchored to
    /// the top edge never emit `top`; they are placed by `bottom`.
    pub fn render(&self, adapter: &A, origin: Origin, overrides: Option<&AttrMap>) {
        let mut properties = AttrMap::new();
        properties.insert(attr::POSITION.to_string(), Value::from("absolute"));
        for key in [attr::TOP, attr::LEFT, attr::BOTTOM] {
            if let Some(value) = self.model.get(key) {
                properties.insert(key.to_string(), value.clone());
            }
        }
        properties.insert(attr::OPACITY.to_string(), self.number_or_zero(attr::OPACITY));
        properties.insert(attr::Z_INDEX.to_string(), self.number_or_zero(attr::Z_INDEX));
        if let Some(transition) = self.model.get(attr::TRANSITION) {
            properties.insert(attr::TRANSITION.to_string(), transition.clone());
        }

        if let Some(overrides) = overrides {
            properties.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if origin == Origin::Top {
            properties.shift_remove(attr::TOP);
        }

        adapter.apply_presentation(&self.target, &properties);
        if let Some(view) = self.view() {
            adapter.emit(view, ViewEvent::Rendered);
        }
    }

    fn number_or_zero(&self, key: &str) -> Value {
        match self.model.get(key) {
            Some(value) if value.is_truthy() => value.clone(),
            _ => Value::from(0),
        }
    }
}

impl<A: ViewAdapter> fmt::Debug for Entry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            EntryKind::Item { .. } => "Item",
            EntryKind::Block => "Block",
            EntryKind::Container(_) => "Container",
        };
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("kind", &kind)
            .field("has_position", &self.has_position)
            .field("model", &self.model)
            .finish()
    }
}

// =========================================================================
// EntryFactory
// =========================================================================

/// Builds entries and hands out their ids.
#[derive(Debug)]
pub struct EntryFactory {
    next_id: u64,
}

impl EntryFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// An entry wrapping a host view.
    pub fn item<A: ViewAdapter>(&mut self, adapter: &A, view: A::View, operation: Operation) -> Entry<A> {
        let target = adapter.target(&view);
        self.build(adapter, target, EntryKind::Item { view }, provenance(operation))
    }

    /// An entry whose target is synthesized from `template` and `attr.data`.
    pub fn block<A: ViewAdapter>(
        &mut self,
        adapter: &A,
        template: &str,
        attr: &BlockAttr,
        operation: Operation,
    ) -> Result<Entry<A>> {
        let markup = render_markup(template, &attr.data)?;
        let target = adapter.create_block(&markup);
        Ok(self.build(adapter, target, EntryKind::Block, provenance(operation)))
    }

    /// An expandable entry wrapping a host view. Subscribes the view's
    /// expand and close signals to the new entry.
    pub fn container<A: ViewAdapter>(
        &mut self,
        adapter: &A,
        view: A::View,
        sub_views: Vec<A::View>,
        attr: BlockAttr,
        template: String,
        operation: Operation,
    ) -> Entry<A> {
        let target = adapter.target(&view);
        let mut seed = provenance(operation);
        seed.insert(attr::EXPANDED.to_string(), Value::from(false));
        let kind = EntryKind::Container(ContainerState {
            view,
            attr,
            template,
            sub_views,
            sub_entries: None,
        });
        let entry = self.build(adapter, target, kind, seed);
        if let Some(view) = entry.view() {
            adapter.subscribe(view, ViewSignal::Expand, entry.id);
            adapter.subscribe(view, ViewSignal::Close, entry.id);
        }
        entry
    }

    fn build<A: ViewAdapter>(
        &mut self,
        adapter: &A,
        target: A::Target,
        kind: EntryKind<A::View>,
        seed: AttrMap,
    ) -> Entry<A> {
        let id = EntryId(self.next_id);
        self.next_id += 1;

        // Hidden until the first committed placement fades it in.
        adapter.apply_presentation(
            &target,
            &attrs([(attr::OPACITY, Value::from(0)), (attr::POSITION, Value::from("absolute"))]),
        );

        Entry {
            id,
            model: AttributeModel::with_attributes(seed),
            has_position: false,
            target,
            kind,
        }
    }
}

impl Default for EntryFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn provenance(operation: Operation) -> AttrMap {
    attrs([(attr::OPERATION, Value::from(operation.as_str()))])
}

/// Render block markup from a mustache template.
pub fn render_markup(template: &str, data: &AttrMap) -> Result<String> {
    let template = mustache::compile_str(template)?;
    Ok(template.render_to_string(data)?)
}

// =========================================================================
// Tests
// =========================================================================
