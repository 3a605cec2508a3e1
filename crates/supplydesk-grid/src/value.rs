// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::collections::BTreeMap;
use time::{Date, OffsetDateTime};

/// A typed attribute value read from a [`crate::Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    /// Whole cents.
    Money(i64),
    /// 0..=100 scale.
    Percent(f64),
    Timestamp(OffsetDateTime),
    Date(Date),
    Category(&'static str),
    Flag(bool),
    List(Vec<CellValue>),
    Nested(BTreeMap<&'static str, CellValue>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        match value {
            Some(value) => Self::Text(value.to_owned()),
            None => Self::Null,
        }
    }

    pub fn nested<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, CellValue)>,
    {
        Self::Nested(entries.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Lowercase key used for set-membership filters.
    pub fn filter_key(&self) -> Option<String> {
        match self {
            Self::Null | Self::List(_) | Self::Nested(_) => None,
            Self::Text(value) => Some(value.trim().to_lowercase()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Decimal(value) | Self::Percent(value) => Some(value.to_string()),
            Self::Money(cents) => Some(cents.to_string()),
            Self::Timestamp(value) => Some(value.date().to_string()),
            Self::Date(value) => Some(value.to_string()),
            Self::Category(label) => Some(label.to_lowercase()),
            Self::Flag(value) => Some(value.to_string()),
        }
    }

    /// Numeric view for range filters. Money is expressed in whole currency units.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Decimal(value) | Self::Percent(value) => Some(*value),
            Self::Money(cents) => Some(*cents as f64 / 100.0),
            Self::Timestamp(value) => Some(value.unix_timestamp() as f64),
            _ => None,
        }
    }

    /// Raw text searched by the free-text query stage.
    pub fn search_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(value) => Some(value.clone()),
            Self::Category(label) => Some((*label).to_owned()),
            Self::List(items) => {
                let parts = items
                    .iter()
                    .filter_map(Self::search_text)
                    .collect::<Vec<_>>();
                (!parts.is_empty()).then(|| parts.join(" "))
            }
            Self::Nested(entries) => {
                let parts = entries
                    .values()
                    .filter_map(Self::search_text)
                    .collect::<Vec<_>>();
                (!parts.is_empty()).then(|| parts.join(" "))
            }
            other => other.filter_key(),
        }
    }

    pub fn subfield(&self, name: &str) -> CellValue {
        match self {
            Self::Nested(entries) => entries.get(name).cloned().unwrap_or(Self::Null),
            _ => Self::Null,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            Self::List(items) => Some(items.len()),
            Self::Null => None,
            _ => Some(1),
        }
    }

    /// Ordering between two non-null values.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => compare_text(left, right),
            (Self::Integer(left), Self::Integer(right)) => left.cmp(right),
            (Self::Money(left), Self::Money(right)) => left.cmp(right),
            (Self::Decimal(left), Self::Decimal(right))
            | (Self::Percent(left), Self::Percent(right)) => left.total_cmp(right),
            (Self::Timestamp(left), Self::Timestamp(right)) => left.cmp(right),
            (Self::Date(left), Self::Date(right)) => left.cmp(right),
            (Self::Category(left), Self::Category(right)) => compare_text(left, right),
            (Self::Flag(left), Self::Flag(right)) => left.cmp(right),
            (Self::List(left), Self::List(right)) => {
                for (left, right) in left.iter().zip(right) {
                    let order = left.cmp_value(right);
                    if order != Ordering::Equal {
                        return order;
                    }
                }
                left.len().cmp(&right.len())
            }
            // nested values have no intrinsic order; columns name a subfield instead
            (Self::Nested(_), Self::Nested(_)) => Ordering::Equal,
            _ => match (self.numeric(), other.numeric()) {
                (Some(left), Some(right)) => left.total_cmp(&right),
                _ => compare_text(
                    &self.search_text().unwrap_or_default(),
                    &other.search_text().unwrap_or_default(),
                ),
            },
        }
    }
}

/// Case-insensitive ordering with a case-sensitive tiebreak so distinct strings never tie.
pub fn compare_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}
