// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::CellValue;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

/// Display rule declared on a column. Resolved when the column is built,
/// never inferred from the value's shape at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "arg")]
pub enum Formatter {
    #[default]
    Plain,
    Money,
    CompactMoney,
    Percent,
    Date,
    Timestamp,
    /// "3h ago" relative to [`FormatContext::now`].
    Relative,
    /// `in_progress` → `In Progress`.
    Title,
    /// Format one subfield of a nested value with its own formatter.
    Subfield(String, Box<Formatter>),
    /// Number of items in a list.
    Count,
    /// List items joined with ", ".
    Join,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatContext {
    pub now: OffsetDateTime,
}

impl FormatContext {
    pub fn new(now: OffsetDateTime) -> Self {
        Self { now }
    }
}

impl Formatter {
    pub fn format(&self, value: &CellValue, ctx: &FormatContext) -> String {
        if value.is_null() {
            return String::new();
        }

        match self {
            Self::Plain => plain(value),
            Self::Money => match value {
                CellValue::Money(cents) => format_money(*cents),
                other => plain(other),
            },
            Self::CompactMoney => match value {
                CellValue::Money(cents) => format_compact_money(*cents),
                other => plain(other),
            },
            Self::Percent => match value.numeric() {
                Some(number) => format!("{number:.0}%"),
                None => plain(value),
            },
            Self::Date => match value {
                CellValue::Timestamp(at) => at.date().to_string(),
                other => plain(other),
            },
            Self::Timestamp => match value {
                CellValue::Timestamp(at) => format_timestamp(*at),
                other => plain(other),
            },
            Self::Relative => match value {
                CellValue::Timestamp(at) => format_relative(*at, ctx.now),
                other => plain(other),
            },
            Self::Title => title_case(&plain(value)),
            Self::Subfield(name, inner) => inner.format(&value.subfield(name), ctx),
            Self::Count => value.count().map(|n| n.to_string()).unwrap_or_default(),
            Self::Join => match value {
                CellValue::List(items) => items
                    .iter()
                    .map(plain)
                    .filter(|item| !item.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
                other => plain(other),
            },
        }
    }
}

fn plain(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Integer(number) => number.to_string(),
        CellValue::Decimal(number) => format!("{number:.1}"),
        CellValue::Money(cents) => format_money(*cents),
        CellValue::Percent(number) => format!("{number:.0}%"),
        CellValue::Timestamp(at) => format_timestamp(*at),
        CellValue::Date(date) => date.to_string(),
        CellValue::Category(label) => (*label).to_owned(),
        CellValue::Flag(true) => "yes".to_owned(),
        CellValue::Flag(false) => "no".to_owned(),
        CellValue::List(items) => items.iter().map(plain).collect::<Vec<_>>().join(", "),
        CellValue::Nested(entries) => entries
            .iter()
            .map(|(key, value)| format!("{key}={}", plain(value)))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = abs / 100;
    let rem = abs % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{rem:02}")
}

pub fn format_compact_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let dollars = cents.unsigned_abs() as f64 / 100.0;
    if dollars >= 1_000_000_000.0 {
        format!("{sign}${:.1}B", dollars / 1_000_000_000.0)
    } else if dollars >= 1_000_000.0 {
        format!("{sign}${:.1}M", dollars / 1_000_000.0)
    } else if dollars >= 1_000.0 {
        format!("{sign}${:.1}k", dollars / 1_000.0)
    } else {
        format!("{sign}${dollars:.2}")
    }
}

fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| at.date().to_string())
}

pub fn format_relative(at: OffsetDateTime, now: OffsetDateTime) -> String {
    let delta = now - at;
    let future = delta.is_negative();
    let seconds = delta.whole_seconds().unsigned_abs();

    let amount = if seconds < 60 {
        return "just now".to_owned();
    } else if seconds < 3_600 {
        format!("{}m", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h", seconds / 3_600)
    } else if seconds < 86_400 * 30 {
        format!("{}d", seconds / 86_400)
    } else {
        return at.date().to_string();
    };

    if future {
        format!("in {amount}")
    } else {
        format!("{amount} ago")
    }
}

fn title_case(raw: &str) -> String {
    raw.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
