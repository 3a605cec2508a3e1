// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ColumnDescriptor, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Same field flips direction; a new field starts ascending.
    pub fn select(&mut self, field: &str) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            self.field = field.to_owned();
            self.direction = SortDirection::Asc;
        }
    }
}

/// Total order over records for one column.
///
/// Nulls sort last in both directions. The direction flips only the value
/// comparison; equal values fall back to ascending record id.
pub fn resolve<R: Record + ?Sized>(
    column: &ColumnDescriptor,
    direction: SortDirection,
) -> impl Fn(&R, &R) -> Ordering + '_ {
    move |left, right| {
        let left_value = column.sort_value(left);
        let right_value = column.sort_value(right);

        let order = match (left_value.is_null(), right_value.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match direction {
                SortDirection::Asc => left_value.cmp_value(&right_value),
                SortDirection::Desc => left_value.cmp_value(&right_value).reverse(),
            },
        };

        order.then_with(|| left.id().cmp(right.id()))
    }
}

pub fn sort_records<R: Record>(
    records: &mut [&R],
    column: &ColumnDescriptor,
    direction: SortDirection,
) {
    let compare = resolve::<R>(column, direction);
    records.sort_by(|left, right| compare(*left, *right));
}
