// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{CellValue, Formatter, Record};
use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// What the comparator reads from a field before ordering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "arg")]
pub enum SortKey {
    #[default]
    Value,
    /// Named subfield of a nested value.
    Subfield(String),
    /// Length of a list value.
    Count,
    /// Position of the value's filter key in a declared order, for categories
    /// whose names do not sort meaningfully. Unlisted values sort with nulls.
    Rank(Vec<String>),
}

impl SortKey {
    pub fn extract(&self, value: CellValue) -> CellValue {
        match self {
            Self::Value => value,
            Self::Subfield(name) => value.subfield(name),
            Self::Count => match value.count() {
                Some(count) => CellValue::Integer(count as i64),
                None => CellValue::Null,
            },
            Self::Rank(order) => value
                .filter_key()
                .and_then(|key| order.iter().position(|candidate| *candidate == key))
                .map_or(CellValue::Null, |position| CellValue::Integer(position as i64)),
        }
    }

    /// Rank by the given keys, first key lowest.
    pub fn rank<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Rank(order.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Field,
    /// Synthetic column with no backing field (row actions).
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub field: String,
    pub label: String,
    #[serde(default)]
    pub formatter: Formatter,
    #[serde(default = "default_sortable")]
    pub sortable: bool,
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub align: Align,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub kind: ColumnKind,
}

const fn default_sortable() -> bool {
    true
}

const fn default_visible() -> bool {
    true
}

impl ColumnDescriptor {
    pub fn field(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            formatter: Formatter::Plain,
            sortable: true,
            sort_key: SortKey::Value,
            align: Align::Left,
            visible: true,
            kind: ColumnKind::Field,
        }
    }

    pub fn action(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            sortable: false,
            kind: ColumnKind::Action,
            align: Align::Center,
            ..Self::field(field, label)
        }
    }

    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_action(&self) -> bool {
        self.kind == ColumnKind::Action
    }

    /// Raw value the column displays for `record`.
    pub fn value<R: Record + ?Sized>(&self, record: &R) -> CellValue {
        if self.is_action() {
            return CellValue::Null;
        }
        record.field(&self.field)
    }

    /// Value the comparator orders by, after the sort key is applied.
    pub fn sort_value<R: Record + ?Sized>(&self, record: &R) -> CellValue {
        self.sort_key.extract(self.value(record))
    }
}

/// Outcome of a visibility change, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityChange {
    Hidden(String),
    AlreadyHidden(String),
    Shown(String),
    AlreadyShown(String),
    AllShown,
    KeepOneVisible,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Check every descriptor against the attribute names a record exposes.
    pub fn validate(&self, fields: &[&str]) -> Result<()> {
        if self.columns.is_empty() {
            bail!("column set is empty; declare at least one column");
        }

        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if column.field.trim().is_empty() {
                bail!("column {:?} has an empty field name", column.label);
            }
            if !seen.insert(column.field.as_str()) {
                bail!("column field {:?} is declared twice", column.field);
            }
            if column.is_action() {
                if column.sortable {
                    bail!("action column {:?} cannot be sortable", column.field);
                }
                continue;
            }
            if !fields.contains(&column.field.as_str()) {
                return Err(anyhow!(
                    "column {:?} names unknown field {:?}; known fields: {}",
                    column.label,
                    column.field,
                    fields.join(", ")
                ));
            }
        }

        if !self.columns.iter().any(|column| column.visible) {
            bail!("no visible columns; leave at least one column visible");
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn all(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn get(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.field == field)
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.field == field)
    }

    pub fn at(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.visible)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn visible(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|column| column.visible)
    }

    pub fn visible_fields(&self) -> Vec<String> {
        self.visible().map(|column| column.field.clone()).collect()
    }

    /// Nearest visible column at or after `index`, else the last visible one.
    pub fn coerce_visible(&self, index: usize) -> Option<usize> {
        let visible = self.visible_indices();
        if visible.is_empty() {
            return None;
        }

        match visible.binary_search(&index) {
            Ok(found) => Some(visible[found]),
            Err(found) if found >= visible.len() => visible.last().copied(),
            Err(found) => Some(visible[found]),
        }
    }

    pub fn hide(&mut self, field: &str) -> VisibilityChange {
        let visible_count = self.visible().count();
        let Some(column) = self.columns.iter_mut().find(|column| column.field == field) else {
            return VisibilityChange::Unknown(field.to_owned());
        };
        if !column.visible {
            return VisibilityChange::AlreadyHidden(column.label.clone());
        }
        if visible_count <= 1 {
            return VisibilityChange::KeepOneVisible;
        }
        column.visible = false;
        VisibilityChange::Hidden(column.label.clone())
    }

    pub fn show(&mut self, field: &str) -> VisibilityChange {
        let Some(column) = self.columns.iter_mut().find(|column| column.field == field) else {
            return VisibilityChange::Unknown(field.to_owned());
        };
        if column.visible {
            return VisibilityChange::AlreadyShown(column.label.clone());
        }
        column.visible = true;
        VisibilityChange::Shown(column.label.clone())
    }

    pub fn show_all(&mut self) -> VisibilityChange {
        for column in &mut self.columns {
            column.visible = true;
        }
        VisibilityChange::AllShown
    }

    /// Make exactly the named columns visible. Returns the names that matched
    /// no column. When nothing matches, visibility is left as it was.
    pub fn set_visible(&mut self, fields: &[String]) -> Vec<String> {
        let unknown = fields
            .iter()
            .filter(|field| self.get(field).is_none())
            .cloned()
            .collect::<Vec<_>>();
        if unknown.len() == fields.len() {
            return unknown;
        }

        for column in &mut self.columns {
            column.visible = fields.iter().any(|field| field == &column.field);
        }
        unknown
    }
}

#[cfg(test)]
mod tests {
    use super::{Align, ColumnDescriptor, ColumnSet, SortKey, VisibilityChange};
    use crate::{CellValue, Formatter};

    const FIELDS: &[&str] = &["id", "name", "spend", "orders"];

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDescriptor::field("name", "Name"),
            ColumnDescriptor::field("spend", "Spend")
                .formatter(Formatter::Money)
                .right(),
            ColumnDescriptor::field("orders", "Orders").sort_key(SortKey::Subfield("value".into())),
            ColumnDescriptor::action("actions", "Actions"),
        ])
    }

    #[test]
    fn valid_columns_pass_validation() -> anyhow::Result<()> {
        columns().validate(FIELDS)?;
        Ok(())
    }

    #[test]
    fn unknown_field_is_rejected() {
        let set = ColumnSet::new(vec![ColumnDescriptor::field("nmae", "Name")]);
        let error = set.validate(FIELDS).expect_err("typo should fail");
        assert!(error.to_string().contains("unknown field \"nmae\""));
    }

    #[test]
    fn duplicate_and_hidden_sets_are_rejected() {
        let duplicate = ColumnSet::new(vec![
            ColumnDescriptor::field("name", "Name"),
            ColumnDescriptor::field("name", "Again"),
        ]);
        assert!(duplicate.validate(FIELDS).is_err());

        let all_hidden = ColumnSet::new(vec![ColumnDescriptor::field("name", "Name").hidden()]);
        assert!(all_hidden.validate(FIELDS).is_err());
        assert!(ColumnSet::default().validate(FIELDS).is_err());
    }

    #[test]
    fn action_columns_need_no_backing_field() {
        let column = ColumnDescriptor::action("actions", "Actions");
        assert!(column.is_action());
        assert!(!column.sortable);
        assert_eq!(column.align, Align::Center);
    }

    #[test]
    fn sort_key_extracts_subfield_and_count() {
        let nested = CellValue::nested([("value", CellValue::Money(500))]);
        assert_eq!(
            SortKey::Subfield("value".into()).extract(nested),
            CellValue::Money(500)
        );
        let list = CellValue::List(vec![CellValue::text("a"), CellValue::text("b")]);
        assert_eq!(SortKey::Count.extract(list), CellValue::Integer(2));
        assert_eq!(SortKey::Count.extract(CellValue::Null), CellValue::Null);
    }

    #[test]
    fn rank_sort_key_follows_declared_order() {
        let severity = SortKey::rank(["critical", "warning", "info"]);
        assert_eq!(
            severity.extract(CellValue::Category("critical")),
            CellValue::Integer(0)
        );
        assert_eq!(
            severity.extract(CellValue::Category("info")),
            CellValue::Integer(2)
        );
        assert_eq!(severity.extract(CellValue::Category("bogus")), CellValue::Null);
        assert_eq!(severity.extract(CellValue::Null), CellValue::Null);
    }

    #[test]
    fn hide_keeps_one_column_visible() {
        let mut set = ColumnSet::new(vec![
            ColumnDescriptor::field("name", "Name"),
            ColumnDescriptor::field("spend", "Spend"),
        ]);
        assert_eq!(set.hide("spend"), VisibilityChange::Hidden("Spend".into()));
        assert_eq!(set.hide("spend"), VisibilityChange::AlreadyHidden("Spend".into()));
        assert_eq!(set.hide("name"), VisibilityChange::KeepOneVisible);
        assert_eq!(set.hide("nope"), VisibilityChange::Unknown("nope".into()));
        assert_eq!(set.visible_fields(), vec!["name".to_owned()]);
        assert_eq!(set.show("spend"), VisibilityChange::Shown("Spend".into()));
    }

    #[test]
    fn coerce_visible_skips_hidden_columns() {
        let mut set = columns();
        set.hide("spend");
        assert_eq!(set.coerce_visible(1), Some(2));
        assert_eq!(set.coerce_visible(9), Some(3));
        assert_eq!(set.coerce_visible(0), Some(0));
    }

    #[test]
    fn set_visible_ignores_unknown_names() {
        let mut set = columns();
        let unknown = set.set_visible(&["spend".into(), "ghost".into()]);
        assert_eq!(unknown, vec!["ghost".to_owned()]);
        assert_eq!(set.visible_fields(), vec!["spend".to_owned()]);

        let unknown = set.set_visible(&["ghost".into()]);
        assert_eq!(unknown, vec!["ghost".to_owned()]);
        assert_eq!(set.visible_fields(), vec!["spend".to_owned()]);
    }

    #[test]
    fn descriptors_serialize_as_plain_data() -> anyhow::Result<()> {
        let json = serde_json::to_value(columns())?;
        assert_eq!(json[1]["formatter"]["kind"], "money");
        assert_eq!(json[2]["sort_key"]["arg"], "value");
        assert_eq!(json[3]["kind"], "action");

        let parsed: ColumnSet = serde_json::from_value(json)?;
        assert_eq!(parsed, columns());
        Ok(())
    }
}
