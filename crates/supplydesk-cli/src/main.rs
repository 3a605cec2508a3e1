// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::{Config, parse_screen, parse_sort_arg};
use runtime::MockRuntime;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use supplydesk_app::{AppState, ScreenKind};
use supplydesk_grid::{
    ColumnKind, DynTable, FormatContext, RangeFilter, SortState, TableCommand, TableEvent,
};
use supplydesk_tui::AppRuntime;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `supplydesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let log_path = logging::init(&config)?;
    tracing::info!(
        config = %options.config_path.display(),
        log = %log_path.display(),
        "supplydesk starting"
    );

    let seed = options.seed.unwrap_or_else(|| config.seed());
    let theme = config.theme()?;
    let mut runtime = MockRuntime::new(seed, config.record_counts(), config.screen_options()?);

    if options.check_only {
        runtime.build_desk()?;
        return Ok(());
    }

    if let Some(screen) = options.print_screen {
        let mut desk = runtime.build_desk()?;
        let table = desk.table_mut(screen);
        apply_print_options(table, &options)
            .with_context(|| format!("print {} table", screen.as_str()))?;
        let projection = table.project(&FormatContext::new(runtime.now()));
        print!(
            "{}",
            supplydesk_tui::plain_table_text(&projection, theme.column_spacing)
        );
        return Ok(());
    }

    let mut state = AppState::new(config.start_screen()?);
    supplydesk_tui::run_app(&mut state, &mut runtime, theme)
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    seed: Option<u64>,
    print_screen: Option<ScreenKind>,
    view: Option<String>,
    filters: Vec<(String, String)>,
    ranges: Vec<(String, RangeFilter)>,
    query: Option<String>,
    sort: Option<SortState>,
    /// One-based.
    page: Option<usize>,
    page_size: Option<usize>,
}

impl CliOptions {
    fn has_table_options(&self) -> bool {
        self.view.is_some()
            || !self.filters.is_empty()
            || !self.ranges.is_empty()
            || self.query.is_some()
            || self.sort.is_some()
            || self.page.is_some()
            || self.page_size.is_some()
    }
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        seed: None,
        print_screen: None,
        view: None,
        filters: Vec::new(),
        ranges: Vec::new(),
        query: None,
        sort: None,
        page: None,
        page_size: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str, what: &str| next_value(&mut iter, flag, what);
        match arg.as_ref() {
            "--config" => {
                options.config_path = PathBuf::from(value_for("--config", "a file path")?);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--seed" => {
                let raw = value_for("--seed", "a number")?;
                options.seed = Some(
                    raw.parse()
                        .map_err(|_| anyhow!("--seed must be a non-negative integer, got {raw:?}"))?,
                );
            }
            "--print" => {
                options.print_screen = Some(parse_screen(&value_for("--print", "a screen name")?)?);
            }
            "--view" => {
                options.view = Some(value_for("--view", "a view id")?);
            }
            "--filter" => {
                options
                    .filters
                    .push(parse_filter_arg(&value_for("--filter", "key=value")?)?);
            }
            "--range" => {
                options
                    .ranges
                    .push(parse_range_arg(&value_for("--range", "key=min..max")?)?);
            }
            "--query" => {
                options.query = Some(value_for("--query", "search text")?);
            }
            "--sort" => {
                options.sort = Some(parse_sort_arg(&value_for("--sort", "a column name")?)?);
            }
            "--page" => {
                let raw = value_for("--page", "a page number")?;
                match raw.parse::<usize>() {
                    Ok(page) if page >= 1 => options.page = Some(page),
                    _ => bail!("--page counts from 1, got {raw:?}"),
                }
            }
            "--page-size" => {
                let raw = value_for("--page-size", "a number")?;
                options.page_size = Some(
                    raw.parse()
                        .map_err(|_| anyhow!("--page-size must be a number, got {raw:?}"))?,
                );
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.print_screen.is_none() && options.has_table_options() {
        bail!("table options need --print <screen>; run with --help to see supported options");
    }

    Ok(options)
}

fn next_value<I, S>(iter: &mut I, flag: &str, what: &str) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn parse_filter_arg(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        _ => bail!("--filter expects key=value, got {raw:?}"),
    }
}

fn parse_range_arg(raw: &str) -> Result<(String, RangeFilter)> {
    let parsed = raw.split_once('=').and_then(|(key, bounds)| {
        let (min, max) = bounds.split_once("..")?;
        let min = min.trim().parse::<f64>().ok()?;
        let max = max.trim().parse::<f64>().ok()?;
        let key = key.trim();
        (!key.is_empty() && min.is_finite() && max.is_finite())
            .then(|| (key.to_owned(), RangeFilter::new(min, max)))
    });
    parsed.ok_or_else(|| anyhow!("--range expects key=min..max, got {raw:?}"))
}

/// Drive the table the way the TUI would, failing on the first rejected command.
fn apply_print_options(table: &mut dyn DynTable, options: &CliOptions) -> Result<()> {
    let mut commands = Vec::new();
    if let Some(view) = &options.view {
        commands.push(TableCommand::ApplyView(view.clone()));
    }

    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (key, value) in &options.filters {
        ensure_filter_key(table, key)?;
        grouped.entry(key).or_default().push(value.clone());
    }
    for (key, values) in grouped {
        commands.push(TableCommand::SetFilter {
            key: key.to_owned(),
            values,
        });
    }

    for (key, range) in &options.ranges {
        match table.columns().get(key) {
            Some(column) if column.kind == ColumnKind::Field => {}
            Some(_) => bail!("cannot range-filter by {key:?}; it is not a data column"),
            None => bail!("cannot range-filter by {key:?}; no such column"),
        }
        commands.push(TableCommand::SetRange {
            key: key.clone(),
            range: *range,
        });
    }

    if let Some(query) = &options.query {
        commands.push(TableCommand::SetQuery(query.clone()));
    }
    if let Some(sort) = &options.sort {
        commands.push(TableCommand::SetSort(sort.clone()));
    }
    if let Some(size) = options.page_size {
        commands.push(TableCommand::SetPageSize(size));
    }
    if let Some(page) = options.page {
        commands.push(TableCommand::GoToPage(page - 1));
    }

    for command in commands {
        for event in table.dispatch(command) {
            if let TableEvent::Notice(notice) = event {
                bail!("{}", notice.message());
            }
        }
    }
    Ok(())
}

fn ensure_filter_key(table: &dyn DynTable, key: &str) -> Result<()> {
    let registered = table.filter_spec().keys().any(|(name, _)| name == key);
    if registered || table.columns().get(key).is_some() {
        return Ok(());
    }
    let known = table
        .filter_spec()
        .keys()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join(", ");
    bail!("unknown filter {key:?}; try one of: {known}")
}

fn print_help() {
    println!("supplydesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and build the mock desk");
    println!("  --seed <n>               Override the mock data seed");
    println!("  --print <screen>         Print alerts, suppliers, payments, or inventory and exit");
    println!("    --view <id>            Apply a saved view first");
    println!("    --filter <key=value>   Keep rows matching value (repeatable)");
    println!("    --range <key=min..max> Keep rows whose numeric field is in range (repeatable)");
    println!("    --query <text>         Free-text search");
    println!("    --sort <field[:dir]>   Sort by a column, dir is asc or desc");
    println!("    --page <n>             Page to print, counting from 1");
    println!("    --page-size <n>        One of 5, 10, 25, 50");
    println!("  --help                   Show this help");
}
