//! Cairn Layout - Incremental masonry layout engine.
//!
//! This crate contains the layout core, including:
//! - Observable attribute models
//! - The incremental stash (ordered entries with a processed marker)
//! - Entries: items, template blocks and expandable containers
//! - Column packing with multi-column spans and expand regions
//! - Deferred read/write frame scheduling
//!
//! The host plugs its view system in through [`ViewAdapter`].

pub mod adapter;
pub mod config;
pub mod entry;
pub mod model;
pub mod pack;
pub mod scheduler;
pub mod stash;

mod engine;
mod error;

pub use adapter::ViewAdapter;
pub use config::{LayoutConfig, LayoutOptions};
pub use engine::LayoutEngine;
pub use entry::{BlockAttr, ContainerState, Entry, EntryFactory, EntryKind, Operation};
pub use error::{LayoutError, Result};
pub use model::{AttributeModel, ListenerId, SetOptions};
pub use stash::{IncrementalStash, Traversal};
