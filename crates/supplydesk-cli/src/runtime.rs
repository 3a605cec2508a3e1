// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use supplydesk_app::{Desk, ScreenKind, ScreenOptions};
use supplydesk_testkit::{ProcurementFaker, RecordCounts};
use time::OffsetDateTime;
use tracing::info;

/// Runtime backed by seeded mock data. The same seed and clock always
/// produce the same desk.
pub struct MockRuntime {
    seed: u64,
    counts: RecordCounts,
    options: ScreenOptions,
    now: OffsetDateTime,
}

impl MockRuntime {
    pub fn new(seed: u64, counts: RecordCounts, options: ScreenOptions) -> Self {
        Self::with_now(seed, counts, options, OffsetDateTime::now_utc())
    }

    pub fn with_now(
        seed: u64,
        counts: RecordCounts,
        options: ScreenOptions,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            seed,
            counts,
            options,
            now,
        }
    }

    pub fn build_desk(&self) -> Result<Desk> {
        let data = ProcurementFaker::anchored(self.seed, self.now).desk_data(self.counts);
        Desk::new(data, &self.options, self.now.date())
            .with_context(|| format!("build desk from seed {}", self.seed))
    }
}

impl supplydesk_tui::AppRuntime for MockRuntime {
    fn load_desk(&mut self) -> Result<Desk> {
        self.build_desk()
    }

    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn activate(&mut self, screen: ScreenKind, id: &str) -> Result<String> {
        info!(screen = screen.as_str(), id, "row activated");
        Ok(format!("{} {id}: no detail screen in demo mode", screen.label()))
    }
}
