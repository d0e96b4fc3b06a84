//! Incremental ordered collection.
//!
//! `IncrementalStash` is an ordered sequence plus a `marker`: everything
//! before the marker was fully processed by the last non-preserving
//! traversal. Tail traversals start at the marker, full traversals at 0.
//! Structural edits rewind the marker to just before the edit point so
//! the next tail pass re-sees everything downstream of it.

/// How a [`IncrementalStash::for_each`] pass walks the sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Start at index 0 instead of the marker.
    pub all: bool,
    /// Leave the marker where it is afterwards.
    pub keep: bool,
}

impl Traversal {
    /// Unprocessed tail, then advance the marker.
    pub const TAIL: Self = Self { all: false, keep: false };
    /// Unprocessed tail, marker untouched.
    pub const TAIL_KEEP: Self = Self { all: false, keep: true };
    /// Whole sequence, then advance the marker.
    pub const ALL: Self = Self { all: true, keep: false };
    /// Whole sequence, marker untouched.
    pub const ALL_KEEP: Self = Self { all: true, keep: true };
}

/// Ordered sequence with a processed/unprocessed boundary.
///
/// Indices are not validated: out-of-range `insert_at`/`remove_at`
/// arguments are a caller bug and panic like the equivalent `Vec` calls.
#[derive(Debug, Clone)]
pub struct IncrementalStash<T> {
    items: Vec<T>,
    marker: usize,
}

impl<T> IncrementalStash<T> {
    /// Create an empty stash.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            marker: 0,
        }
    }

    /// Push an item and return its index. The marker does not move.
    pub fn append(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Splice `items` in at `index` and rewind the marker to `index - 1`.
    ///
    /// # Panics
    /// If `index > len`.
    pub fn insert_at<I>(&mut self, items: I, index: usize)
    where
        I: IntoIterator<Item = T>,
    {
        self.items.splice(index..index, items);
        self.marker = index.saturating_sub(1);
    }

    /// Remove `amount` items starting at `index` and rewind the marker to
    /// `index - 1`. Returns the removed items in order.
    ///
    /// # Panics
    /// If `index + amount > len`.
    pub fn remove_at(&mut self, amount: usize, index: usize) -> Vec<T> {
        let removed = self.items.drain(index..index + amount).collect();
        self.marker = index.saturating_sub(1);
        removed
    }

    /// Visit items in order, starting at the marker (or 0 for `all`).
    ///
    /// Unless `keep` is set, the marker advances to `len - 1` afterwards,
    /// but only when the sequence holds more than one item.
    pub fn for_each(&mut self, traversal: Traversal, mut visit: impl FnMut(&T, usize)) {
        let start = if traversal.all { 0 } else { self.marker };
        for (index, item) in self.items.iter().enumerate().skip(start) {
            visit(item, index);
        }

        if !traversal.keep && self.items.len() > 1 {
            self.marker = self.items.len() - 1;
        }
    }

    /// Empty the sequence and reset the marker.
    pub fn clear(&mut self) {
        self.items.clear();
        self.marker = 0;
    }

    /// Current processed/unprocessed boundary.
    pub fn marker(&self) -> usize {
        self.marker
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: PartialEq> IncrementalStash<T> {
    /// Index of the first item equal to `item`, by linear scan.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|candidate| candidate == item)
    }
}

impl<T> Default for IncrementalStash<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
