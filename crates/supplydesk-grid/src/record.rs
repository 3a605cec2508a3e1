// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::CellValue;

/// One row's underlying data.
///
/// `id` must be unique within a collection and must not change while the
/// record is displayed. `field` returns [`CellValue::Null`] for names the
/// record does not expose.
pub trait Record {
    fn id(&self) -> &str;

    fn field(&self, name: &str) -> CellValue;

    /// Every attribute name `field` resolves.
    fn fields() -> &'static [&'static str]
    where
        Self: Sized;
}
