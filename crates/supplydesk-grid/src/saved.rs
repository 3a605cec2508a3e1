// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{SortDirection, SortState};
use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};

/// Named set of visible columns plus a sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub id: String,
    pub name: String,
    pub visible_columns: Vec<String>,
    pub sort_field: String,
    pub sort_direction: SortDirection,
}

impl SavedView {
    pub fn new<I, S>(id: &str, name: &str, columns: I, sort: SortState) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            visible_columns: columns.into_iter().map(Into::into).collect(),
            sort_field: sort.field,
            sort_direction: sort.direction,
        }
    }

    pub fn sort(&self) -> SortState {
        SortState::new(self.sort_field.clone(), self.sort_direction)
    }
}

/// Result of deleting a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// Removed a view that was not current.
    Removed(SavedView),
    /// Removed the current view; the default is current now.
    FellBack { removed: SavedView, current: SavedView },
}

/// Session-scoped list of saved views. The first preset is the default view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewRegistry {
    views: Vec<SavedView>,
    default_id: Option<String>,
    current_id: Option<String>,
    next_custom: u64,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets(presets: Vec<SavedView>) -> Self {
        let default_id = presets.first().map(|view| view.id.clone());
        Self {
            current_id: default_id.clone(),
            default_id,
            views: presets,
            next_custom: 1,
        }
    }

    /// Add a preset after construction, replacing one with the same id.
    pub fn add_preset(&mut self, view: SavedView) {
        if self.default_id.is_none() {
            self.default_id = Some(view.id.clone());
            self.current_id = Some(view.id.clone());
        }
        match self.views.iter_mut().find(|existing| existing.id == view.id) {
            Some(existing) => *existing = view,
            None => self.views.push(view),
        }
    }

    pub fn views(&self) -> &[SavedView] {
        &self.views
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SavedView> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn current(&self) -> Option<&SavedView> {
        self.current_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn default_view(&self) -> Option<&SavedView> {
        self.default_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn is_default(&self, id: &str) -> bool {
        self.default_id.as_deref() == Some(id)
    }

    /// Store the given columns and sort under `name` and make it current.
    pub fn save(
        &mut self,
        name: &str,
        visible_columns: Vec<String>,
        sort: SortState,
    ) -> Result<&SavedView> {
        let name = name.trim();
        if name.is_empty() {
            bail!("view name is required");
        }

        let id = loop {
            let candidate = format!("custom-{}", self.next_custom.max(1));
            self.next_custom = self.next_custom.max(1) + 1;
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };

        self.views
            .push(SavedView::new(&id, name, visible_columns, sort));
        if self.default_id.is_none() {
            self.default_id = Some(id.clone());
        }
        self.current_id = Some(id);
        self.views
            .last()
            .ok_or_else(|| anyhow!("saved view vanished after insert"))
    }

    pub fn select(&mut self, id: &str) -> Result<&SavedView> {
        let Some(index) = self.views.iter().position(|view| view.id == id) else {
            bail!("no saved view with id {id:?}");
        };
        self.current_id = Some(id.to_owned());
        Ok(&self.views[index])
    }

    /// Id of the view `delta` steps from the current one, wrapping around.
    pub fn cycle_id(&self, delta: isize) -> Option<String> {
        if self.views.is_empty() {
            return None;
        }
        let len = self.views.len() as isize;
        let current = self
            .current_id
            .as_deref()
            .and_then(|id| self.views.iter().position(|view| view.id == id))
            .map_or(-1, |index| index as isize);
        let next = (current + delta).rem_euclid(len) as usize;
        Some(self.views[next].id.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<Deletion> {
        if self.is_default(id) {
            bail!("the default view cannot be deleted");
        }
        let Some(index) = self.views.iter().position(|view| view.id == id) else {
            bail!("no saved view with id {id:?}");
        };

        let removed = self.views.remove(index);
        if self.current_id.as_deref() != Some(id) {
            return Ok(Deletion::Removed(removed));
        }

        self.current_id = self.default_id.clone();
        match self.default_view() {
            Some(current) => Ok(Deletion::FellBack {
                removed,
                current: current.clone(),
            }),
            None => Ok(Deletion::Removed(removed)),
        }
    }
}
