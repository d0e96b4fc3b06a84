//! Observable attribute model.
//!
//! Every entry owns one `AttributeModel` holding its placement and
//! presentation attributes. Non-silent writes notify registered listeners
//! with the subset of attributes whose value actually changed.

use std::fmt;

use cairn_api::{AttrMap, Value};

/// Options for [`AttributeModel::set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Store the attributes without notifying listeners.
    pub silent: bool,
}

impl SetOptions {
    pub const NOTIFY: Self = Self { silent: false };
    pub const SILENT: Self = Self { silent: true };
}

/// Handle returned by [`AttributeModel::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ChangeListener = Box<dyn FnMut(&AttrMap)>;

/// A mutable, observable key/value store.
#[derive(Default)]
pub struct AttributeModel {
    attributes: AttrMap,
    /// Snapshot taken at the start of the last non-empty `set`.
    previous: AttrMap,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener: u64,
}

impl AttributeModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model seeded with attributes (no notification).
    pub fn with_attributes(attributes: AttrMap) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    /// Merge attributes into the model.
    ///
    /// Each new value is compared against the value held when the call
    /// started, so a key written twice in one call is judged by its final
    /// value. Returns the changed subset; listeners receive it exactly once
    /// unless the write is silent or nothing changed. An empty input is a
    /// no-op and leaves `previous_attributes` untouched.
    pub fn set<K, I>(&mut self, attributes: I, options: SetOptions) -> AttrMap
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut incoming = attributes.into_iter().peekable();
        if incoming.peek().is_none() {
            return AttrMap::new();
        }

        self.previous = self.attributes.clone();
        let mut changed = AttrMap::new();

        for (key, value) in incoming {
            let key = key.into();
            if self.previous.get(&key) != Some(&value) {
                changed.insert(key.clone(), value.clone());
            } else {
                changed.shift_remove(&key);
            }
            self.attributes.insert(key, value);
        }

        if !options.silent && !changed.is_empty() {
            for (_, listener) in &mut self.listeners {
                listener(&changed);
            }
        }
        changed
    }

    /// Get the current value of an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Numeric attribute, `None` if absent or not a number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Boolean attribute; absent or non-boolean reads as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// All current attributes.
    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    /// Attributes as they were before the last non-empty `set`.
    pub fn previous_attributes(&self) -> &AttrMap {
        &self.previous
    }

    /// Register a change listener.
    pub fn on_change(&mut self, listener: impl FnMut(&AttrMap) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a change listener. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }
}

impl fmt::Debug for AttributeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeModel")
            .field("attributes", &self.attributes)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
