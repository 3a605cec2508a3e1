// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use supplydesk_app::{ScreenKind, ScreenOptions, screen_columns};
use supplydesk_grid::{
    DEFAULT_PAGE_SIZE, ExpansionMode, SavedView, SortDirection, SortState, validate_page_size,
};
use supplydesk_testkit::RecordCounts;
use supplydesk_tui::{Theme, parse_color};

pub const APP_NAME: &str = "supplydesk";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_RECORDS: usize = 10_000;
const MAX_COLUMN_SPACING: u16 = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub views: Vec<ViewPreset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            theme: ThemeConfig::default(),
            data: Data::default(),
            log: Log::default(),
            views: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub start_screen: Option<String>,
    pub page_size: Option<usize>,
    pub expansion: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeConfig {
    pub accent: Option<String>,
    pub header: Option<String>,
    pub selected: Option<String>,
    pub muted: Option<String>,
    pub empty: Option<String>,
    pub column_spacing: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub seed: Option<u64>,
    pub alerts: Option<usize>,
    pub suppliers: Option<usize>,
    pub payments: Option<usize>,
    pub inventory: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// Extra saved view listed after a screen's built-in presets.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewPreset {
    pub screen: String,
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub sort: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("SUPPLYDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set SUPPLYDESK_CONFIG_PATH to the config file"
            )
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` at the top",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.start_screen()?;
        self.screen_options()?;
        self.theme()?;

        if let Some(spacing) = self.theme.column_spacing
            && spacing > MAX_COLUMN_SPACING
        {
            bail!("theme.column_spacing must be at most {MAX_COLUMN_SPACING}, got {spacing}");
        }

        let counts = self.record_counts();
        for (name, count) in [
            ("alerts", counts.alerts),
            ("suppliers", counts.suppliers),
            ("payments", counts.payments),
            ("inventory", counts.inventory),
        ] {
            if count > MAX_RECORDS {
                bail!("data.{name} must be at most {MAX_RECORDS}, got {count}");
            }
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!("log.level must not be empty; use a level like \"info\" or \"debug\"");
        }

        Ok(())
    }

    pub fn start_screen(&self) -> Result<ScreenKind> {
        match &self.ui.start_screen {
            Some(raw) => parse_screen(raw).context("ui.start_screen"),
            None => Ok(ScreenKind::Alerts),
        }
    }

    pub fn page_size(&self) -> usize {
        self.ui.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn expansion(&self) -> Result<ExpansionMode> {
        match &self.ui.expansion {
            Some(raw) => ExpansionMode::parse(raw).ok_or_else(|| {
                anyhow!("ui.expansion must be \"single\" or \"multi\", got {raw:?}")
            }),
            None => Ok(ExpansionMode::Single),
        }
    }

    pub fn screen_options(&self) -> Result<ScreenOptions> {
        let page_size = validate_page_size(self.page_size()).context("ui.page_size")?;
        let mut extra_views: BTreeMap<ScreenKind, Vec<SavedView>> = BTreeMap::new();
        for (index, preset) in self.views.iter().enumerate() {
            let (screen, view) = preset
                .to_saved_view()
                .with_context(|| format!("views[{index}]"))?;
            extra_views.entry(screen).or_default().push(view);
        }
        Ok(ScreenOptions {
            page_size,
            expansion: self.expansion()?,
            extra_views,
        })
    }

    pub fn theme(&self) -> Result<Theme> {
        let defaults = Theme::default();
        let color = |raw: &Option<String>, name: &str, fallback| match raw {
            Some(value) => parse_color(value).with_context(|| format!("theme.{name}")),
            None => Ok(fallback),
        };
        Ok(Theme {
            accent: color(&self.theme.accent, "accent", defaults.accent)?,
            header: color(&self.theme.header, "header", defaults.header)?,
            selected: color(&self.theme.selected, "selected", defaults.selected)?,
            muted: color(&self.theme.muted, "muted", defaults.muted)?,
            empty: color(&self.theme.empty, "empty", defaults.empty)?,
            column_spacing: self
                .theme
                .column_spacing
                .unwrap_or(defaults.column_spacing),
        })
    }

    pub fn seed(&self) -> u64 {
        self.data.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn record_counts(&self) -> RecordCounts {
        let defaults = RecordCounts::default();
        RecordCounts {
            alerts: self.data.alerts.unwrap_or(defaults.alerts),
            suppliers: self.data.suppliers.unwrap_or(defaults.suppliers),
            payments: self.data.payments.unwrap_or(defaults.payments),
            inventory: self.data.inventory.unwrap_or(defaults.inventory),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log
            .level
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [log].file to a writable path")
        })?;
        Ok(cache_root.join(APP_NAME).join("supplydesk.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# supplydesk config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\n# alerts, suppliers, payments, or inventory\nstart_screen = \"alerts\"\n# one of 5, 10, 25, 50\npage_size = {}\n# single or multi\nexpansion = \"single\"\n\n[theme]\n# color names or hex values like \"#00aaff\"\naccent = \"cyan\"\nheader = \"white\"\nselected = \"darkgray\"\nmuted = \"gray\"\nempty = \"yellow\"\ncolumn_spacing = 1\n\n[data]\nseed = {}\nalerts = 24\nsuppliers = 18\npayments = 30\ninventory = 40\n\n[log]\n# SUPPLYDESK_LOG overrides this filter\nlevel = \"{}\"\n# Optional. Default is the platform cache dir (for example ~/.cache/supplydesk/supplydesk.log)\n# file = \"/absolute/path/to/supplydesk.log\"\n\n# Extra saved views, listed after each screen's presets.\n[[views]]\nscreen = \"payments\"\nid = \"large-open\"\nname = \"Large Payments\"\ncolumns = [\"supplier\", \"amount\", \"due_date\", \"status\"]\nsort = \"amount:desc\"\n",
            path.display(),
            DEFAULT_PAGE_SIZE,
            DEFAULT_SEED,
            DEFAULT_LOG_LEVEL,
        )
    }
}

impl ViewPreset {
    fn to_saved_view(&self) -> Result<(ScreenKind, SavedView)> {
        let screen = parse_screen(&self.screen)?;
        let id = self.id.trim();
        if id.is_empty() {
            bail!("view id must not be empty");
        }
        let name = self.name.trim();
        if name.is_empty() {
            bail!("view {id:?} needs a name");
        }
        if self.columns.is_empty() {
            bail!("view {id:?} must list at least one column");
        }

        let columns = screen_columns(screen);
        for field in &self.columns {
            if columns.get(field).is_none() {
                bail!(
                    "view {id:?} names unknown {} column {field:?}",
                    screen.as_str()
                );
            }
        }

        let sort = match &self.sort {
            Some(raw) => parse_sort_arg(raw)?,
            None => SortState::new(self.columns[0].clone(), SortDirection::Asc),
        };
        match columns.get(&sort.field) {
            Some(column) if column.sortable => {}
            Some(_) => bail!("view {id:?} cannot sort by {:?}", sort.field),
            None => bail!("view {id:?} sorts by unknown column {:?}", sort.field),
        }

        Ok((screen, SavedView::new(id, name, self.columns.clone(), sort)))
    }
}

pub fn parse_screen(raw: &str) -> Result<ScreenKind> {
    ScreenKind::parse(raw).ok_or_else(|| {
        anyhow!("unknown screen {raw:?}; expected one of alerts, suppliers, payments, inventory")
    })
}

/// `field` or `field:asc|desc`.
pub fn parse_sort_arg(raw: &str) -> Result<SortState> {
    let (field, direction) = match raw.split_once(':') {
        Some((field, direction)) => {
            let direction = SortDirection::parse(direction).ok_or_else(|| {
                anyhow!("sort direction must be asc or desc, got {direction:?}")
            })?;
            (field, direction)
        }
        None => (raw, SortDirection::Asc),
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("sort needs a column name, for example due_date:desc");
    }
    Ok(SortState::new(field, direction))
}
