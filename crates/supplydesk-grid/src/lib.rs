// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Generic record table: filter, sort, paginate, select, expand, and saved
//! views over any type implementing [`Record`].

pub mod column;
pub mod filter;
pub mod format;
pub mod page;
pub mod record;
pub mod saved;
pub mod sort;
pub mod value;
pub mod view;

pub use column::*;
pub use filter::{FilterKey, FilterSpec, FilterState, Predicate, RangeFilter};
pub use format::*;
pub use page::*;
pub use record::*;
pub use saved::*;
pub use sort::{SortDirection, SortState, resolve, sort_records};
pub use value::*;
pub use view::*;
