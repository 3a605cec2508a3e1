// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use supplydesk_grid::filter::apply;
use supplydesk_grid::{
    CellValue, ColumnDescriptor, ColumnSet, FilterSpec, FilterState, Formatter, RangeFilter,
    Record, SortDirection, SortKey, TableCommand, TableEvent, TableView, page_count, paginate,
    sort_records,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, PartialEq)]
struct Alert {
    id: String,
    severity: &'static str,
    description: String,
    owner: Option<String>,
    created: OffsetDateTime,
    impact: Option<i64>,
    orders: (i64, i64),
}

impl Record for Alert {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::text(self.id.clone()),
            "severity" => CellValue::Category(self.severity),
            "description" => CellValue::text(self.description.clone()),
            "owner" => CellValue::optional_text(self.owner.as_deref()),
            "created" => CellValue::Timestamp(self.created),
            "impact" => self.impact.map(CellValue::Money).unwrap_or(CellValue::Null),
            "orders" => CellValue::nested([
                ("count", CellValue::Integer(self.orders.0)),
                ("value", CellValue::Money(self.orders.1)),
            ]),
            _ => CellValue::Null,
        }
    }

    fn fields() -> &'static [&'static str] {
        &["id", "severity", "description", "owner", "created", "impact", "orders"]
    }
}

const SEVERITIES: [&str; 4] = ["critical", "high", "medium", "low"];
const WORDS: [&str; 6] = ["port", "delay", "shortage", "invoice", "customs", "quality"];

/// Small LCG so collections vary without pulling in a property-test crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn generate(seed: u64, count: usize) -> Vec<Alert> {
    let mut rng = Lcg(seed);
    let base = datetime!(2026-02-01 00:00 UTC);
    (0..count)
        .map(|index| Alert {
            id: format!("ALT-{index:03}"),
            severity: SEVERITIES[rng.below(4) as usize],
            description: format!(
                "{} {}",
                WORDS[rng.below(6) as usize],
                WORDS[rng.below(6) as usize]
            ),
            owner: (rng.below(3) != 0).then(|| format!("Owner {}", rng.below(4))),
            // duplicates on purpose so ties exercise the id tiebreak
            created: base + Duration::hours(rng.below(20) as i64),
            impact: (rng.below(5) != 0).then(|| rng.below(10) as i64 * 10_000),
            orders: (rng.below(9) as i64, rng.below(7) as i64 * 1_000),
        })
        .collect()
}

fn columns() -> ColumnSet {
    ColumnSet::new(vec![
        ColumnDescriptor::field("id", "ID"),
        ColumnDescriptor::field("severity", "Severity").formatter(Formatter::Title),
        ColumnDescriptor::field("description", "Description"),
        ColumnDescriptor::field("owner", "Owner"),
        ColumnDescriptor::field("created", "Created").formatter(Formatter::Relative),
        ColumnDescriptor::field("impact", "Impact")
            .formatter(Formatter::Money)
            .right(),
        ColumnDescriptor::field("orders", "Orders")
            .formatter(Formatter::Subfield("count".into(), Box::new(Formatter::Plain)))
            .sort_key(SortKey::Subfield("value".into())),
    ])
}

fn spec() -> FilterSpec {
    FilterSpec::new()
        .presence_key("assignment", "owner", "Assignment")
        .search(["description", "id", "owner"])
}

fn sample_states() -> Vec<FilterState> {
    let mut states = vec![FilterState::new()];

    let mut state = FilterState::new();
    state.select("severity", ["critical", "high"]);
    states.push(state);

    let mut state = FilterState::new();
    state.set_query("port");
    states.push(state);

    let mut state = FilterState::new();
    state.select("assignment", ["unassigned"]);
    state.set_range("impact", RangeFilter::new(10_00.0, 600_00.0));
    states.push(state);

    let mut state = FilterState::new();
    state.select("severity", ["low"]);
    state.select("assignment", ["assigned"]);
    state.set_query("e");
    states.push(state);

    states
}

fn ids(rows: &[&Alert]) -> Vec<String> {
    rows.iter().map(|row| row.id.clone()).collect()
}

#[test]
fn empty_filter_is_identity() {
    for seed in 1..20 {
        let records = generate(seed, 40);
        let out = apply(&records, &spec(), &FilterState::new());
        let all = records.iter().collect::<Vec<_>>();
        assert_eq!(out, all, "seed {seed}");
    }
}

#[test]
fn filtering_is_idempotent() {
    for seed in 1..20 {
        let records = generate(seed, 40);
        for state in sample_states() {
            let once = apply(&records, &spec(), &state);
            let twice = apply(once.iter().copied(), &spec(), &state);
            assert_eq!(ids(&once), ids(&twice), "seed {seed} state {state:?}");
        }
    }
}

#[test]
fn sorting_is_idempotent_and_total() {
    let columns = columns();
    for seed in 1..15 {
        let records = generate(seed, 35);
        for column in columns.all() {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let mut once = records.iter().collect::<Vec<_>>();
                sort_records(&mut once, column, direction);
                let mut twice = once.clone();
                sort_records(&mut twice, column, direction);
                assert_eq!(ids(&once), ids(&twice), "{} {direction:?}", column.field);

                // shuffled input lands on the same order
                let mut reversed = records.iter().rev().collect::<Vec<_>>();
                sort_records(&mut reversed, column, direction);
                assert_eq!(ids(&once), ids(&reversed), "{} {direction:?}", column.field);
            }
        }
    }
}

#[test]
fn reversing_direction_reverses_non_tied_elements() {
    let columns = columns();
    for seed in 1..15 {
        let records = generate(seed, 35);
        for column in columns.all() {
            let mut asc = records.iter().collect::<Vec<_>>();
            sort_records(&mut asc, column, SortDirection::Asc);
            let mut desc = records.iter().collect::<Vec<_>>();
            sort_records(&mut desc, column, SortDirection::Desc);

            // distinct non-null sort values: their relative order must flip
            let keyed = |rows: &[&Alert]| {
                rows.iter()
                    .map(|row| column.sort_value(*row))
                    .filter(|value| !value.is_null())
                    .fold(Vec::<CellValue>::new(), |mut acc, value| {
                        if acc.last() != Some(&value) && !acc.contains(&value) {
                            acc.push(value);
                        }
                        acc
                    })
            };
            let mut asc_keys = keyed(&asc);
            asc_keys.reverse();
            assert_eq!(asc_keys, keyed(&desc), "seed {seed} column {}", column.field);

            // nulls stay at the end in both directions
            let null_tail = |rows: &[&Alert]| {
                rows.iter()
                    .skip_while(|row| !column.sort_value(**row).is_null())
                    .all(|row| column.sort_value(*row).is_null())
            };
            assert!(null_tail(&asc) && null_tail(&desc), "column {}", column.field);
        }
    }
}

#[test]
fn pages_never_exceed_size_and_reconstruct_order() {
    for seed in 1..10 {
        let records = generate(seed, 37);
        let ordered = records.iter().collect::<Vec<_>>();
        for size in [1, 5, 10, 25, 50] {
            let pages = page_count(ordered.len(), size);
            let mut rebuilt = Vec::new();
            for page in 0..pages {
                let window = paginate(&ordered, page, size);
                assert!(window.len() <= size);
                rebuilt.extend_from_slice(window);
            }
            assert!(paginate(&ordered, pages, size).is_empty());
            assert_eq!(ids(&rebuilt), ids(&ordered), "size {size}");
        }
    }
}

#[test]
fn select_all_after_narrowing_is_subset_of_filtered() {
    for seed in 1..10 {
        let mut view = TableView::new(generate(seed, 40), columns())
            .expect("columns are valid")
            .with_filter_spec(spec());
        view.dispatch(TableCommand::SetFilter {
            key: "severity".into(),
            values: vec!["critical".into()],
        });
        view.dispatch(TableCommand::SelectAll);

        let filtered = view
            .filtered()
            .iter()
            .map(|row| row.id.clone())
            .collect::<BTreeSet<_>>();
        let selected = view.selected_ids().into_iter().collect::<BTreeSet<_>>();
        assert_eq!(selected, filtered);
        assert!(
            view.records()
                .iter()
                .filter(|row| row.severity != "critical")
                .all(|row| !selected.contains(&row.id))
        );
    }
}

fn seven_alerts() -> Vec<Alert> {
    let at = datetime!(2026-03-01 09:00 UTC);
    let make = |id: &str, severity: &'static str, description: &str, hours: i64| Alert {
        id: id.to_owned(),
        severity,
        description: description.to_owned(),
        owner: None,
        created: at + Duration::hours(hours),
        impact: None,
        orders: (0, 0),
    };
    vec![
        make("ALT-1", "critical", "Port congestion in Shenzhen", 1),
        make("ALT-2", "high", "Invoice mismatch", 2),
        make("ALT-3", "critical", "Supplier insolvency risk", 3),
        make("ALT-4", "low", "Port fee update", 4),
        make("ALT-5", "critical", "Quality hold on capacitors", 5),
        make("ALT-6", "medium", "Customs paperwork missing", 6),
        make("ALT-7", "high", "Carrier delay", 7),
    ]
}

#[test]
fn severity_then_query_narrows_to_one() {
    let records = seven_alerts();
    let mut state = FilterState::new();
    state.toggle("severity", "critical");
    assert_eq!(apply(&records, &spec(), &state).len(), 3);

    state.set_query("port");
    let out = apply(&records, &spec(), &state);
    assert_eq!(ids(&out), vec!["ALT-1".to_owned()]);
}

#[test]
fn created_desc_is_strictly_decreasing_and_double_toggle_is_asc() {
    let records = seven_alerts().into_iter().take(5).collect::<Vec<_>>();
    let mut view = TableView::new(records, columns()).expect("columns are valid");

    view.dispatch(TableCommand::SetSort(supplydesk_grid::SortState::new(
        "created",
        SortDirection::Desc,
    )));
    let desc = view
        .filtered()
        .iter()
        .map(|row| row.created)
        .collect::<Vec<_>>();
    assert!(desc.windows(2).all(|pair| pair[0] > pair[1]));

    // desc -> asc, then toggled twice
    view.dispatch(TableCommand::SortBy("created".into()));
    view.dispatch(TableCommand::SortBy("created".into()));
    view.dispatch(TableCommand::SortBy("created".into()));
    let toggled = ids(&view.filtered());

    let mut direct = view.records().iter().collect::<Vec<_>>();
    let column = view.columns().get("created").expect("created column").clone();
    sort_records(&mut direct, &column, SortDirection::Asc);
    assert_eq!(toggled, ids(&direct));
    assert_eq!(view.sort_state().direction, SortDirection::Asc);
}

#[test]
fn twenty_four_rows_paginate_ten_four_zero() -> anyhow::Result<()> {
    let mut view = TableView::new(generate(7, 24), columns())?.with_page_size(10)?;
    assert_eq!(view.page_rows().len(), 10);

    view.dispatch(TableCommand::GoToPage(2));
    assert_eq!(view.page_rows().len(), 4);

    let ordered = view.filtered();
    assert!(paginate(&ordered, 3, 10).is_empty());
    Ok(())
}

#[test]
fn expanding_b_collapses_a() -> anyhow::Result<()> {
    let mut view = TableView::new(seven_alerts(), columns())?;
    view.dispatch(TableCommand::ToggleExpand("ALT-1".into()));
    let events = view.dispatch(TableCommand::ToggleExpand("ALT-2".into()));
    assert!(events.contains(&TableEvent::RowCollapsed("ALT-1".into())));
    assert!(!view.is_expanded("ALT-1"));
    assert!(view.is_expanded("ALT-2"));
    Ok(())
}

#[test]
fn page_resets_when_filtered_size_changes() -> anyhow::Result<()> {
    let mut view = TableView::new(generate(3, 60), columns())?
        .with_page_size(5)?
        .with_filter_spec(spec());
    view.dispatch(TableCommand::GoToPage(4));
    assert_eq!(view.page_state().page, 4);

    view.dispatch(TableCommand::SetQuery("ALT-00".into()));
    assert_eq!(view.page_state().page, 0);
    assert!(view.page_state().offset() <= view.matching());
    Ok(())
}
