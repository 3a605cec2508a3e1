// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{CellValue, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const ASSIGNED: &str = "assigned";
pub const UNASSIGNED: &str = "unassigned";

/// Names taken by the serialized state's own fields. Selections sit beside
/// them in the same flat object, so no filter key may use them.
pub const RESERVED_KEYS: [&str; 2] = ["query", "ranges"];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// User-chosen filter values. Serialized as `{ <key>: [values], query }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(flatten)]
    selections: BTreeMap<String, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    ranges: BTreeMap<String, RangeFilter>,
    #[serde(default)]
    query: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selections(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.selections
    }

    pub fn selected(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.selections.get(key).filter(|values| !values.is_empty())
    }

    pub fn ranges(&self) -> &BTreeMap<String, RangeFilter> {
        &self.ranges
    }

    pub fn range(&self, key: &str) -> Option<RangeFilter> {
        self.ranges.get(key).copied()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Add or remove one accepted value. Returns whether it is now accepted.
    /// Reserved keys are never stored.
    pub fn toggle(&mut self, key: &str, value: &str) -> bool {
        if is_reserved_key(key) {
            return false;
        }
        let value = normalize(value);
        let values = self.selections.entry(key.to_owned()).or_default();
        let accepted = if values.remove(&value) {
            false
        } else {
            values.insert(value);
            true
        };
        if values.is_empty() {
            self.selections.remove(key);
        }
        accepted
    }

    pub fn select<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if is_reserved_key(key) {
            return;
        }
        let values = values
            .into_iter()
            .map(|value| normalize(value.as_ref()))
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>();
        if values.is_empty() {
            self.selections.remove(key);
        } else {
            self.selections.insert(key.to_owned(), values);
        }
    }

    pub fn set_range(&mut self, key: &str, range: RangeFilter) {
        if is_reserved_key(key) {
            return;
        }
        self.ranges.insert(key.to_owned(), range);
    }

    pub fn clear_range(&mut self, key: &str) {
        self.ranges.remove(key);
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of active stages: one per non-empty key, one per range, one for the query.
    pub fn active_count(&self) -> usize {
        let selections = self
            .selections
            .values()
            .filter(|values| !values.is_empty())
            .count();
        let query = usize::from(!self.query.trim().is_empty());
        selections + self.ranges.len() + query
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Predicate {
    /// Field's filter key must be one of the accepted values.
    #[default]
    Membership,
    /// `assigned`/`unassigned` test the field for null; other values are membership.
    Presence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterKey {
    pub field: String,
    pub label: String,
    pub predicate: Predicate,
}

/// Which fields each filter key reads and which fields the query searches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    keys: BTreeMap<String, FilterKey>,
    search_fields: Vec<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: &str, field: &str, label: &str) -> Self {
        self.keys.insert(
            key.to_owned(),
            FilterKey {
                field: field.to_owned(),
                label: label.to_owned(),
                predicate: Predicate::Membership,
            },
        );
        self
    }

    pub fn presence_key(mut self, key: &str, field: &str, label: &str) -> Self {
        self.keys.insert(
            key.to_owned(),
            FilterKey {
                field: field.to_owned(),
                label: label.to_owned(),
                predicate: Predicate::Presence,
            },
        );
        self
    }

    pub fn search<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = (&str, &FilterKey)> {
        self.keys.iter().map(|(key, spec)| (key.as_str(), spec))
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Unregistered keys read the field of the same name.
    pub fn resolve(&self, key: &str) -> (String, Predicate) {
        match self.keys.get(key) {
            Some(spec) => (spec.field.clone(), spec.predicate),
            None => (key.to_owned(), Predicate::Membership),
        }
    }

    /// Filter key a column's field is filtered under, if any.
    pub fn key_for_field(&self, field: &str) -> String {
        self.keys
            .iter()
            .find(|(_, spec)| spec.field == field)
            .map(|(key, _)| key.clone())
            .unwrap_or_else(|| field.to_owned())
    }
}

/// Records that pass every active stage, in input order.
pub fn apply<'a, R, I>(records: I, spec: &FilterSpec, state: &FilterState) -> Vec<&'a R>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let needle = normalize(state.query());
    records
        .into_iter()
        .filter(|record| matches_record(*record, spec, state, &needle))
        .collect()
}

fn matches_record<R: Record>(
    record: &R,
    spec: &FilterSpec,
    state: &FilterState,
    needle: &str,
) -> bool {
    for (key, accepted) in &state.selections {
        if accepted.is_empty() {
            continue;
        }
        let (field, predicate) = spec.resolve(key);
        if !value_accepted(&record.field(&field), accepted, predicate) {
            return false;
        }
    }

    for (key, range) in &state.ranges {
        let (field, _) = spec.resolve(key);
        match record.field(&field).numeric() {
            Some(number) if range.contains(number) => {}
            _ => return false,
        }
    }

    if needle.is_empty() {
        return true;
    }
    query_matches(record, spec, needle)
}

fn value_accepted(value: &CellValue, accepted: &BTreeSet<String>, predicate: Predicate) -> bool {
    if predicate == Predicate::Presence {
        if value.is_null() {
            return accepted.contains(UNASSIGNED);
        }
        if accepted.contains(ASSIGNED) {
            return true;
        }
    }

    match value {
        CellValue::List(items) => items.iter().any(|item| {
            item.filter_key()
                .is_some_and(|key| accepted.contains(&key))
        }),
        other => other
            .filter_key()
            .is_some_and(|key| accepted.contains(&key)),
    }
}

fn query_matches<R: Record>(record: &R, spec: &FilterSpec, needle: &str) -> bool {
    let haystack = |field: &str| {
        record
            .field(field)
            .search_text()
            .is_some_and(|text| text.to_lowercase().contains(needle))
    };

    if spec.search_fields.is_empty() {
        R::fields().iter().any(|field| haystack(field))
    } else {
        spec.search_fields.iter().any(|field| haystack(field))
    }
}
