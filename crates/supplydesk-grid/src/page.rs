// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub const PAGE_SIZES: [usize; 4] = [5, 10, 25, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Slice of `items` for one page. A start past the end yields an empty slice;
/// callers clamp the page index first.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page.saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

pub fn validate_page_size(page_size: usize) -> Result<usize> {
    if !PAGE_SIZES.contains(&page_size) {
        bail!(
            "page size {page_size} is not allowed; choose one of {}",
            PAGE_SIZES
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(page_size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageState {
    pub fn new(page_size: usize) -> Result<Self> {
        Ok(Self {
            page: 0,
            page_size: validate_page_size(page_size)?,
        })
    }

    /// Changes the size and resets to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        self.page_size = validate_page_size(page_size)?;
        self.page = 0;
        Ok(())
    }

    /// Next (or previous) allowed size, clamped at the ends of the list.
    pub fn stepped_size(&self, delta: isize) -> usize {
        let index = PAGE_SIZES
            .iter()
            .position(|size| *size == self.page_size)
            .unwrap_or(1);
        let next = index
            .saturating_add_signed(delta)
            .min(PAGE_SIZES.len() - 1);
        PAGE_SIZES[next]
    }

    pub fn page_count(&self, total: usize) -> usize {
        page_count(total, self.page_size)
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    /// Pull the page index back so its first item exists (page 0 when empty).
    pub fn clamp(&mut self, total: usize) -> bool {
        let last = self.page_count(total).saturating_sub(1);
        if self.page > last {
            self.page = last;
            return true;
        }
        false
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::{PageState, page_count, paginate};

    #[test]
    fn paginate_clips_last_page_and_empties_past_end() {
        let items = (0..24).collect::<Vec<_>>();
        assert_eq!(paginate(&items, 0, 10).len(), 10);
        assert_eq!(paginate(&items, 2, 10), &[20, 21, 22, 23]);
        assert!(paginate(&items, 3, 10).is_empty());
        assert!(paginate(&items, 0, 0).is_empty());
        assert!(paginate(&items, usize::MAX, 10).is_empty());
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(24, 10), 3);
        assert_eq!(page_count(20, 10), 2);
        assert_eq!(page_count(0, 10), 0);
    }

    #[test]
    fn only_allowed_sizes_are_accepted() {
        assert!(PageState::new(25).is_ok());
        let error = PageState::new(7).expect_err("7 is not an allowed size");
        assert!(error.to_string().contains("choose one of 5, 10, 25, 50"));
    }

    #[test]
    fn changing_size_resets_page() -> anyhow::Result<()> {
        let mut state = PageState { page: 3, page_size: 5 };
        state.set_page_size(25)?;
        assert_eq!(state, PageState { page: 0, page_size: 25 });
        Ok(())
    }

    #[test]
    fn stepped_size_stops_at_ends() {
        let state = PageState { page: 0, page_size: 5 };
        assert_eq!(state.stepped_size(-1), 5);
        assert_eq!(state.stepped_size(1), 10);
        let state = PageState { page: 0, page_size: 50 };
        assert_eq!(state.stepped_size(1), 50);
    }

    #[test]
    fn clamp_pulls_page_back_into_range() {
        let mut state = PageState { page: 4, page_size: 10 };
        assert!(state.clamp(24));
        assert_eq!(state.page, 2);
        assert!(!state.clamp(24));
        assert!(state.clamp(0));
        assert_eq!(state.page, 0);
    }

    #[test]
    fn serializes_camel_case() -> anyhow::Result<()> {
        let json = serde_json::to_value(PageState::default())?;
        assert_eq!(json, serde_json::json!({ "page": 0, "pageSize": 10 }));
        Ok(())
    }
}
