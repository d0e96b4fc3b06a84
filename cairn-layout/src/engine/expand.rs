//! Container expansion.
//!
//! Expanding a container splices its sub-entries (an opening bracket, one
//! item per sub-view, a closing bracket) into the stash right after it.
//! The sub-entries are built once and reused on every later expansion.

use std::iter;

use cairn_api::{EntryId, Origin, Value, attr};

use super::LayoutEngine;
use crate::adapter::ViewAdapter;
use crate::config::CLOSE_TEMPLATE;
use crate::entry::{Entry, Operation};
use crate::error::{LayoutError, Result};
use crate::model::SetOptions;

impl<A: ViewAdapter> LayoutEngine<A> {
    /// Reveal a container's sub-views and queue a compose and draw.
    ///
    /// `sub_views` is only used when the container was built without any.
    /// Expanding an already expanded container does nothing.
    pub fn expand_sub_views(&mut self, id: EntryId, sub_views: Option<Vec<A::View>>) -> Result<()> {
        let entry = self.entries.get_mut(&id).ok_or(LayoutError::UnknownEntry(id))?;
        let expanded = entry.is_expanded();
        let container = entry.container_mut().ok_or(LayoutError::UnknownEntry(id))?;
        if container.sub_views.is_empty() {
            if let Some(views) = sub_views {
                container.sub_views = views;
            }
        }
        if expanded {
            tracing::debug!("container {} already expanded", id);
            return Ok(());
        }
        let cached = container.sub_entries.clone();
        let index = self.stash.index_of(&id).ok_or(LayoutError::UnknownEntry(id))?;

        let sub_entries = match cached {
            Some(ids) => ids,
            None => self.build_sub_entries(id)?,
        };

        if let Some(entry) = self.entries.get_mut(&id) {
            entry.model.set([(attr::EXPANDED, Value::from(true))], SetOptions::SILENT);
        }
        tracing::debug!("expanding container {} with {} sub-entries", id, sub_entries.len());
        self.insert_entries(sub_entries, index);
        self.compose(true);
        Ok(())
    }

    /// Hide a container's sub-views and queue a draw. Collapsing a
    /// container that is not expanded does nothing.
    pub fn close_sub_views(&mut self, id: EntryId) -> Result<()> {
        let origin = self.config.origin;
        let entry = self.entries.get_mut(&id).ok_or(LayoutError::UnknownEntry(id))?;
        let Some(container) = entry.container() else {
            return Err(LayoutError::UnknownEntry(id));
        };
        if !entry.is_expanded() {
            return Ok(());
        }
        let sub_entries = container.sub_entries.clone().unwrap_or_default();
        let index = self.stash.index_of(&id).ok_or(LayoutError::UnknownEntry(id))?;

        entry.model.set([(attr::EXPANDED, Value::from(false))], SetOptions::SILENT);
        for sub in &sub_entries {
            if let Some(sub) = self.entries.get_mut(sub) {
                sub.update(
                    &self.adapter,
                    origin,
                    [(attr::OPACITY, Value::from(0)), (attr::Z_INDEX, Value::from(0))],
                    SetOptions::NOTIFY,
                );
            }
        }

        let start = index + 1;
        let amount = sub_entries.len().min(self.stash.len() - start);
        tracing::debug!("closing container {}: removing {} entries", id, amount);
        self.stash.remove_at(amount, start);
        self.schedule_draw();
        Ok(())
    }

    /// Build and cache the bracketed sub-entries of container `id`.
    fn build_sub_entries(&mut self, id: EntryId) -> Result<Vec<EntryId>> {
        let Self {
            adapter,
            config,
            factory,
            entries,
            ..
        } = self;
        let adapter = &*adapter;

        let container = entries
            .get(&id)
            .and_then(Entry::container)
            .ok_or(LayoutError::UnknownEntry(id))?;
        let close = config
            .template(CLOSE_TEMPLATE)
            .ok_or_else(|| LayoutError::MissingTemplate(CLOSE_TEMPLATE.to_string()))?;

        let opening: Entry<A> = factory.block(adapter, &container.template, &container.attr, Operation::Insert)?;
        let closing: Entry<A> = factory.block(adapter, close, &container.attr, Operation::Insert)?;
        adapter.bind_collapse(closing.target(), id);

        let items: Vec<Entry<A>> = container
            .sub_views
            .iter()
            .map(|view| factory.item(adapter, view.clone(), Operation::Insert))
            .collect();

        let (first, last) = match config.origin {
            Origin::Top => (closing, opening),
            Origin::Bottom => (opening, closing),
        };

        let mut ids = Vec::with_capacity(items.len() + 2);
        for entry in iter::once(first).chain(items).chain(iter::once(last)) {
            ids.push(entry.id());
            entries.insert(entry.id(), entry);
        }

        if let Some(container) = entries.get_mut(&id).and_then(|e| e.container_mut()) {
            container.sub_entries = Some(ids.clone());
        }
        Ok(ids)
    }
}
