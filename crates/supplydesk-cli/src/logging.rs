// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter override, same directive syntax as `RUST_LOG`.
pub const LOG_ENV: &str = "SUPPLYDESK_LOG";

/// Install the global subscriber. Output goes to a file so the TUI owns the
/// terminal. Returns the log path.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_file()?;
    let filter = resolve_filter(std::env::var(LOG_ENV).ok(), config.log_level())?;
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;

    tracing::debug!(path = %path.display(), "logging initialized");
    Ok(path)
}

fn resolve_filter(env_value: Option<String>, level: &str) -> Result<EnvFilter> {
    match env_value.filter(|value| !value.trim().is_empty()) {
        Some(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {LOG_ENV} filter {directives:?}")),
        None => EnvFilter::try_new(level).with_context(|| {
            format!("invalid log.level {level:?}; use a level like \"info\" or \"debug\"")
        }),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{open_log_file, resolve_filter};
    use anyhow::Result;
    use std::io::Write;

    #[test]
    fn config_level_is_used_without_env_override() -> Result<()> {
        let rendered = resolve_filter(None, "debug")?.to_string();
        assert!(rendered.contains("debug"), "{rendered}");
        Ok(())
    }

    #[test]
    fn env_override_wins_over_config_level() -> Result<()> {
        let filter = resolve_filter(Some("warn,supplydesk_grid=trace".to_owned()), "info")?;
        let rendered = filter.to_string();
        assert!(rendered.contains("warn"), "{rendered}");
        assert!(rendered.contains("supplydesk_grid=trace"), "{rendered}");
        Ok(())
    }

    #[test]
    fn blank_env_override_falls_back_to_config_level() -> Result<()> {
        let rendered = resolve_filter(Some("  ".to_owned()), "error")?.to_string();
        assert!(rendered.contains("error"), "{rendered}");
        Ok(())
    }

    #[test]
    fn invalid_directives_are_reported() {
        let error = resolve_filter(None, "supplydesk=loud").expect_err("bad level should fail");
        assert!(format!("{error:#}").contains("log.level"));

        let error = resolve_filter(Some("supplydesk=loud".to_owned()), "info")
            .expect_err("bad env filter should fail");
        assert!(format!("{error:#}").contains("SUPPLYDESK_LOG"));
    }

    #[test]
    fn log_file_parent_directories_are_created_and_appended() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("logs").join("supplydesk.log");
        writeln!(open_log_file(&path)?, "first")?;
        writeln!(open_log_file(&path)?, "second")?;
        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }
}
