// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::filter::{
    self, FilterSpec, FilterState, Predicate, RangeFilter, UNASSIGNED, is_reserved_key,
};
use crate::page::{PageState, validate_page_size};
use crate::saved::{Deletion, SavedView, ViewRegistry};
use crate::sort::{self, SortDirection, SortState};
use crate::{
    Align, CellValue, ColumnDescriptor, ColumnSet, FormatContext, Record, VisibilityChange,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

pub const DEFAULT_EMPTY_MESSAGE: &str = "No data available";
const ACTION_CELL: &str = "⋯";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionMode {
    /// Expanding a row collapses every other row.
    #[default]
    Single,
    Multi,
}

impl ExpansionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "single" => Some(Self::Single),
            "multi" => Some(Self::Multi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCommand {
    MoveRow(isize),
    MoveColumn(isize),
    JumpFirstRow,
    JumpLastRow,
    SortBy(String),
    SortCurrentColumn,
    SetSort(SortState),
    NextPage,
    PrevPage,
    GoToPage(usize),
    SetPageSize(usize),
    StepPageSize(isize),
    ToggleSelect(String),
    ToggleSelectCurrent,
    SelectAll,
    ClearSelection,
    Activate(String),
    ActivateCurrent,
    ToggleExpand(String),
    ToggleExpandCurrent,
    ToggleFilter { key: String, value: String },
    SetFilter { key: String, values: Vec<String> },
    FilterCurrentCell,
    SetRange { key: String, range: RangeFilter },
    ClearRange(String),
    SetQuery(String),
    ClearFilters,
    HideColumn(String),
    HideCurrentColumn,
    ShowColumn(String),
    ShowAllColumns,
    SaveView(String),
    ApplyView(String),
    CycleView(isize),
    DeleteView(String),
    DeleteCurrentView,
}

/// Feedback that changes no state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableNotice {
    SortUnavailable(String),
    UnknownRow(String),
    NoRowUnderCursor,
    FirstPage,
    LastPage,
    PageOutOfRange(usize),
    InvalidPageSize(usize),
    KeepOneColumnVisible,
    ColumnAlreadyHidden(String),
    ColumnAlreadyShown(String),
    UnknownColumn(String),
    FilterUnavailable(String),
    ReservedFilterKey(String),
    RangeUnavailable(String),
    ViewRejected(String),
}

impl TableNotice {
    pub fn message(&self) -> String {
        match self {
            Self::SortUnavailable(label) => format!("{label} is not sortable"),
            Self::UnknownRow(id) => format!("no row {id}"),
            Self::NoRowUnderCursor => "no row selected".to_owned(),
            Self::FirstPage => "already on the first page".to_owned(),
            Self::LastPage => "already on the last page".to_owned(),
            Self::PageOutOfRange(page) => format!("page {} does not exist", page + 1),
            Self::InvalidPageSize(size) => format!("page size {size} is not allowed"),
            Self::KeepOneColumnVisible => "keep one column visible".to_owned(),
            Self::ColumnAlreadyHidden(label) => format!("column already hidden: {label}"),
            Self::ColumnAlreadyShown(label) => format!("column already shown: {label}"),
            Self::UnknownColumn(field) => format!("no column {field}"),
            Self::FilterUnavailable(label) => format!("cannot filter on {label} here"),
            Self::ReservedFilterKey(key) => format!("{key:?} is reserved and cannot name a filter"),
            Self::RangeUnavailable(key) => {
                format!("cannot range-filter by {key:?}; it has no numeric values")
            }
            Self::ViewRejected(reason) => reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    CursorMoved,
    RowSelected(String),
    RowExpanded(String),
    RowCollapsed(String),
    SortChanged {
        field: String,
        direction: SortDirection,
    },
    PageChanged(usize),
    PageSizeChanged(usize),
    SelectionChanged(Vec<String>),
    FiltersChanged {
        matching: usize,
    },
    ColumnsChanged(Vec<String>),
    ViewApplied(String),
    ViewSaved(String),
    ViewDeleted(String),
    Notice(TableNotice),
}

impl TableEvent {
    /// Status-line text, if the event is worth showing.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::CursorMoved | Self::RowSelected(_) => None,
            Self::RowExpanded(id) => Some(format!("expanded {id}")),
            Self::RowCollapsed(id) => Some(format!("collapsed {id}")),
            Self::SortChanged { field, direction } => {
                Some(format!("sort {field} {}", direction.as_str()))
            }
            Self::PageChanged(page) => Some(format!("page {}", page + 1)),
            Self::PageSizeChanged(size) => Some(format!("{size} per page")),
            Self::SelectionChanged(ids) => Some(format!("{} selected", ids.len())),
            Self::FiltersChanged { matching } => Some(format!("{matching} matching")),
            Self::ColumnsChanged(fields) => Some(format!("{} columns shown", fields.len())),
            Self::ViewApplied(id) => Some(format!("view {id}")),
            Self::ViewSaved(id) => Some(format!("saved view {id}")),
            Self::ViewDeleted(id) => Some(format!("deleted view {id}")),
            Self::Notice(notice) => Some(notice.message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub field: String,
    pub label: String,
    pub align: Align,
    pub sortable: bool,
    pub sorted: Option<SortDirection>,
    pub action: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    pub id: String,
    pub cells: Vec<String>,
    pub selected: bool,
    pub expanded: bool,
    /// Label/value pairs for every field column, shown under an expanded row.
    pub detail: Vec<(String, String)>,
}

/// One rendered page: visible headers, formatted rows, and the counters a
/// front end shows around them.
#[derive(Debug, Clone, PartialEq)]
pub struct TableProjection {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<ProjectedRow>,
    pub empty_message: Option<String>,
    pub total: usize,
    pub matching: usize,
    pub page: PageState,
    pub page_count: usize,
    pub cursor_row: usize,
    pub cursor_column: usize,
    pub selected: usize,
    pub active_filters: usize,
    pub query: String,
    pub view_name: Option<String>,
}

impl TableProjection {
    /// "11-20 of 24" style window label.
    pub fn range_label(&self) -> String {
        if self.matching == 0 {
            return "0 of 0".to_owned();
        }
        let first = self.page.offset() + 1;
        let last = self.page.offset() + self.rows.len();
        format!("{first}-{last} of {}", self.matching)
    }
}

/// Filtered, sorted, paginated view over owned records.
#[derive(Debug, Clone)]
pub struct TableView<R> {
    records: Vec<R>,
    columns: ColumnSet,
    filter_spec: FilterSpec,
    filters: FilterState,
    sort: SortState,
    page: PageState,
    selected: BTreeSet<String>,
    expanded: BTreeSet<String>,
    expansion: ExpansionMode,
    empty_message: String,
    views: ViewRegistry,
    cursor_row: usize,
    cursor_col: usize,
    matching: usize,
}

impl<R: Record> TableView<R> {
    pub fn new(records: Vec<R>, columns: ColumnSet) -> Result<Self> {
        columns
            .validate(R::fields())
            .context("invalid column configuration")?;

        let sort = columns
            .visible()
            .find(|column| column.sortable)
            .map(|column| SortState::new(column.field.clone(), SortDirection::Asc))
            .unwrap_or_else(|| SortState::new(String::new(), SortDirection::Asc));
        let matching = records.len();
        let cursor_col = columns.coerce_visible(0).unwrap_or(0);

        Ok(Self {
            records,
            columns,
            filter_spec: FilterSpec::default(),
            filters: FilterState::default(),
            sort,
            page: PageState::default(),
            selected: BTreeSet::new(),
            expanded: BTreeSet::new(),
            expansion: ExpansionMode::Single,
            empty_message: DEFAULT_EMPTY_MESSAGE.to_owned(),
            views: ViewRegistry::default(),
            cursor_row: 0,
            cursor_col,
            matching,
        })
    }

    pub fn with_filter_spec(mut self, spec: FilterSpec) -> Self {
        self.filter_spec = spec;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        self.page = PageState::new(page_size)?;
        Ok(self)
    }

    pub fn with_expansion(mut self, mode: ExpansionMode) -> Self {
        self.expansion = mode;
        self
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    /// Install saved views and apply the current one.
    pub fn with_views(mut self, views: ViewRegistry) -> Self {
        self.views = views;
        if let Some(view) = self.views.current().cloned() {
            let mut events = Vec::new();
            self.apply_view(view, &mut events);
        }
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter_spec
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    pub fn matching(&self) -> usize {
        self.matching
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn expanded_ids(&self) -> Vec<String> {
        self.expanded.iter().cloned().collect()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// All records passing the filters, in sort order.
    pub fn filtered(&self) -> Vec<&R> {
        let mut rows = filter::apply(&self.records, &self.filter_spec, &self.filters);
        if let Some(column) = self.columns.get(&self.sort.field)
            && column.sortable
        {
            sort::sort_records(&mut rows, column, self.sort.direction);
        }
        rows
    }

    /// Records on the current page.
    pub fn page_rows(&self) -> Vec<&R> {
        self.page.window(&self.filtered()).to_vec()
    }

    pub fn cursor_record(&self) -> Option<&R> {
        self.page_rows().get(self.cursor_row).copied()
    }

    /// Replace the records, dropping selection and expansion for ids that vanished.
    pub fn set_records(&mut self, records: Vec<R>) -> Vec<TableEvent> {
        self.records = records;
        let ids = self
            .records
            .iter()
            .map(|record| record.id().to_owned())
            .collect::<BTreeSet<_>>();

        let mut events = Vec::new();
        let selected_before = self.selected.len();
        self.selected.retain(|id| ids.contains(id));
        if self.selected.len() != selected_before {
            events.push(TableEvent::SelectionChanged(self.selected_ids()));
        }
        let collapsed = self
            .expanded
            .iter()
            .filter(|id| !ids.contains(*id))
            .cloned()
            .collect::<Vec<_>>();
        for id in collapsed {
            self.expanded.remove(&id);
            events.push(TableEvent::RowCollapsed(id));
        }

        self.refilter(&mut events);
        events
    }

    pub fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        trace!(?command, "table dispatch");
        let mut events = Vec::new();

        match command {
            TableCommand::MoveRow(delta) => {
                let rows = self.page_rows().len();
                self.cursor_row = self
                    .cursor_row
                    .saturating_add_signed(delta)
                    .min(rows.saturating_sub(1));
                events.push(TableEvent::CursorMoved);
            }
            TableCommand::MoveColumn(delta) => {
                self.move_column(delta);
                events.push(TableEvent::CursorMoved);
            }
            TableCommand::JumpFirstRow => {
                self.cursor_row = 0;
                events.push(TableEvent::CursorMoved);
            }
            TableCommand::JumpLastRow => {
                let rows = self.page_rows().len();
                self.cursor_row = rows.saturating_sub(1);
                events.push(TableEvent::CursorMoved);
            }
            TableCommand::SortBy(field) => self.sort_by(&field, None, &mut events),
            TableCommand::SortCurrentColumn => {
                match self.cursor_column().map(|column| column.field.clone()) {
                    Some(field) => self.sort_by(&field, None, &mut events),
                    None => events.push(TableEvent::Notice(TableNotice::SortUnavailable(
                        "column".to_owned(),
                    ))),
                }
            }
            TableCommand::SetSort(state) => {
                self.sort_by(&state.field, Some(state.direction), &mut events);
            }
            TableCommand::NextPage => {
                if self.page.page + 1 < self.page.page_count(self.matching) {
                    self.go_to_page(self.page.page + 1, &mut events);
                } else {
                    events.push(TableEvent::Notice(TableNotice::LastPage));
                }
            }
            TableCommand::PrevPage => {
                if self.page.page > 0 {
                    self.go_to_page(self.page.page - 1, &mut events);
                } else {
                    events.push(TableEvent::Notice(TableNotice::FirstPage));
                }
            }
            TableCommand::GoToPage(page) => {
                if page == 0 || page < self.page.page_count(self.matching) {
                    self.go_to_page(page, &mut events);
                } else {
                    events.push(TableEvent::Notice(TableNotice::PageOutOfRange(page)));
                }
            }
            TableCommand::SetPageSize(size) => self.set_page_size(size, &mut events),
            TableCommand::StepPageSize(delta) => {
                let size = self.page.stepped_size(delta);
                if size != self.page.page_size {
                    self.set_page_size(size, &mut events);
                }
            }
            TableCommand::ToggleSelect(id) => self.toggle_select(&id, &mut events),
            TableCommand::ToggleSelectCurrent => match self.cursor_id() {
                Some(id) => self.toggle_select(&id, &mut events),
                None => events.push(TableEvent::Notice(TableNotice::NoRowUnderCursor)),
            },
            TableCommand::SelectAll => {
                let ids = self
                    .filtered()
                    .iter()
                    .map(|record| record.id().to_owned())
                    .collect::<BTreeSet<_>>();
                self.selected = ids;
                events.push(TableEvent::SelectionChanged(self.selected_ids()));
            }
            TableCommand::ClearSelection => {
                self.selected.clear();
                events.push(TableEvent::SelectionChanged(Vec::new()));
            }
            TableCommand::Activate(id) => {
                if self.contains(&id) {
                    events.push(TableEvent::RowSelected(id));
                } else {
                    events.push(TableEvent::Notice(TableNotice::UnknownRow(id)));
                }
            }
            TableCommand::ActivateCurrent => match self.cursor_id() {
                Some(id) => events.push(TableEvent::RowSelected(id)),
                None => events.push(TableEvent::Notice(TableNotice::NoRowUnderCursor)),
            },
            TableCommand::ToggleExpand(id) => self.toggle_expand(id, &mut events),
            TableCommand::ToggleExpandCurrent => match self.cursor_id() {
                Some(id) => self.toggle_expand(id, &mut events),
                None => events.push(TableEvent::Notice(TableNotice::NoRowUnderCursor)),
            },
            TableCommand::ToggleFilter { key, .. } | TableCommand::SetFilter { key, .. }
                if is_reserved_key(&key) =>
            {
                events.push(TableEvent::Notice(TableNotice::ReservedFilterKey(key)));
            }
            TableCommand::ToggleFilter { key, value } => {
                self.filters.toggle(&key, &value);
                self.refilter(&mut events);
            }
            TableCommand::SetFilter { key, values } => {
                self.filters.select(&key, values);
                self.refilter(&mut events);
            }
            TableCommand::FilterCurrentCell => self.filter_current_cell(&mut events),
            TableCommand::SetRange { key, range } => {
                if is_reserved_key(&key) {
                    events.push(TableEvent::Notice(TableNotice::ReservedFilterKey(key)));
                } else if !self.has_numeric_values(&key) {
                    events.push(TableEvent::Notice(TableNotice::RangeUnavailable(key)));
                } else {
                    self.filters.set_range(&key, range);
                    self.refilter(&mut events);
                }
            }
            TableCommand::ClearRange(key) => {
                self.filters.clear_range(&key);
                self.refilter(&mut events);
            }
            TableCommand::SetQuery(query) => {
                self.filters.set_query(query);
                self.refilter(&mut events);
            }
            TableCommand::ClearFilters => {
                self.filters.clear();
                self.refilter(&mut events);
            }
            TableCommand::HideColumn(field) => {
                let change = self.columns.hide(&field);
                self.visibility_changed(change, &mut events);
            }
            TableCommand::HideCurrentColumn => {
                match self.cursor_column().map(|column| column.field.clone()) {
                    Some(field) => {
                        let change = self.columns.hide(&field);
                        self.visibility_changed(change, &mut events);
                    }
                    None => events.push(TableEvent::Notice(TableNotice::KeepOneColumnVisible)),
                }
            }
            TableCommand::ShowColumn(field) => {
                let change = self.columns.show(&field);
                self.visibility_changed(change, &mut events);
            }
            TableCommand::ShowAllColumns => {
                let change = self.columns.show_all();
                self.visibility_changed(change, &mut events);
            }
            TableCommand::SaveView(name) => {
                let visible = self.columns.visible_fields();
                match self.views.save(&name, visible, self.sort.clone()) {
                    Ok(view) => events.push(TableEvent::ViewSaved(view.id.clone())),
                    Err(error) => events.push(TableEvent::Notice(TableNotice::ViewRejected(
                        format!("{error:#}"),
                    ))),
                }
            }
            TableCommand::ApplyView(id) => match self.views.select(&id).cloned() {
                Ok(view) => self.apply_view(view, &mut events),
                Err(error) => events.push(TableEvent::Notice(TableNotice::ViewRejected(
                    format!("{error:#}"),
                ))),
            },
            TableCommand::CycleView(delta) => match self.views.cycle_id(delta) {
                Some(id) => return self.dispatch(TableCommand::ApplyView(id)),
                None => events.push(TableEvent::Notice(TableNotice::ViewRejected(
                    "no saved views".to_owned(),
                ))),
            },
            TableCommand::DeleteView(id) => self.delete_view(&id, &mut events),
            TableCommand::DeleteCurrentView => {
                match self.views.current().map(|view| view.id.clone()) {
                    Some(id) => self.delete_view(&id, &mut events),
                    None => events.push(TableEvent::Notice(TableNotice::ViewRejected(
                        "no saved views".to_owned(),
                    ))),
                }
            }
        }

        self.clamp();
        events
    }

    pub fn project(&self, ctx: &FormatContext) -> TableProjection {
        let visible = self.columns.visible_indices();
        let headers = visible
            .iter()
            .filter_map(|index| self.columns.at(*index))
            .map(|column| HeaderCell {
                field: column.field.clone(),
                label: column.label.clone(),
                align: column.align,
                sortable: column.sortable,
                sorted: (column.field == self.sort.field && column.sortable)
                    .then_some(self.sort.direction),
                action: column.is_action(),
            })
            .collect::<Vec<_>>();

        let rows = self
            .page_rows()
            .into_iter()
            .map(|record| {
                let cells = visible
                    .iter()
                    .filter_map(|index| self.columns.at(*index))
                    .map(|column| {
                        if column.is_action() {
                            ACTION_CELL.to_owned()
                        } else {
                            column.formatter.format(&column.value(record), ctx)
                        }
                    })
                    .collect();
                let expanded = self.expanded.contains(record.id());
                let detail = if expanded {
                    self.columns
                        .all()
                        .iter()
                        .filter(|column| !column.is_action())
                        .map(|column| {
                            (
                                column.label.clone(),
                                column.formatter.format(&column.value(record), ctx),
                            )
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                ProjectedRow {
                    id: record.id().to_owned(),
                    cells,
                    selected: self.selected.contains(record.id()),
                    expanded,
                    detail,
                }
            })
            .collect::<Vec<_>>();

        let empty_message = rows.is_empty().then(|| self.empty_message.clone());
        let cursor_column = self
            .columns
            .coerce_visible(self.cursor_col)
            .and_then(|index| visible.iter().position(|candidate| *candidate == index))
            .unwrap_or(0);

        TableProjection {
            headers,
            rows,
            empty_message,
            total: self.records.len(),
            matching: self.matching,
            page: self.page,
            page_count: self.page.page_count(self.matching),
            cursor_row: self.cursor_row,
            cursor_column,
            selected: self.selected.len(),
            active_filters: self.filters.active_count(),
            query: self.filters.query().to_owned(),
            view_name: self.views.current().map(|view| view.name.clone()),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|record| record.id() == id)
    }

    /// An empty table accepts any range; otherwise some record must have a number there.
    fn has_numeric_values(&self, key: &str) -> bool {
        let (field, _) = self.filter_spec.resolve(key);
        self.records.is_empty()
            || self
                .records
                .iter()
                .any(|record| record.field(&field).numeric().is_some())
    }

    fn cursor_id(&self) -> Option<String> {
        self.cursor_record().map(|record| record.id().to_owned())
    }

    fn cursor_column(&self) -> Option<&ColumnDescriptor> {
        self.columns
            .coerce_visible(self.cursor_col)
            .and_then(|index| self.columns.at(index))
    }

    fn move_column(&mut self, delta: isize) {
        let visible = self.columns.visible_indices();
        let Some(current) = self.columns.coerce_visible(self.cursor_col) else {
            return;
        };
        let position = visible
            .iter()
            .position(|index| *index == current)
            .unwrap_or(0);
        let next = position
            .saturating_add_signed(delta)
            .min(visible.len().saturating_sub(1));
        self.cursor_col = visible.get(next).copied().unwrap_or(current);
    }

    fn sort_by(
        &mut self,
        field: &str,
        direction: Option<SortDirection>,
        events: &mut Vec<TableEvent>,
    ) {
        let Some(column) = self.columns.get(field) else {
            events.push(TableEvent::Notice(TableNotice::UnknownColumn(
                field.to_owned(),
            )));
            return;
        };
        if !column.sortable {
            events.push(TableEvent::Notice(TableNotice::SortUnavailable(
                column.label.clone(),
            )));
            return;
        }

        match direction {
            Some(direction) => self.sort = SortState::new(field, direction),
            None => self.sort.select(field),
        }
        debug!(field = %self.sort.field, direction = self.sort.direction.as_str(), "sort changed");
        events.push(TableEvent::SortChanged {
            field: self.sort.field.clone(),
            direction: self.sort.direction,
        });
    }

    fn go_to_page(&mut self, page: usize, events: &mut Vec<TableEvent>) {
        self.page.page = page;
        self.cursor_row = 0;
        events.push(TableEvent::PageChanged(page));
    }

    fn set_page_size(&mut self, size: usize, events: &mut Vec<TableEvent>) {
        if validate_page_size(size).is_err() {
            events.push(TableEvent::Notice(TableNotice::InvalidPageSize(size)));
            return;
        }
        let previous_page = self.page.page;
        self.page = PageState { page: 0, page_size: size };
        self.cursor_row = 0;
        events.push(TableEvent::PageSizeChanged(size));
        if previous_page != 0 {
            events.push(TableEvent::PageChanged(0));
        }
    }

    fn toggle_select(&mut self, id: &str, events: &mut Vec<TableEvent>) {
        if !self.contains(id) {
            events.push(TableEvent::Notice(TableNotice::UnknownRow(id.to_owned())));
            return;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_owned());
        }
        events.push(TableEvent::SelectionChanged(self.selected_ids()));
    }

    fn toggle_expand(&mut self, id: String, events: &mut Vec<TableEvent>) {
        if !self.contains(&id) {
            events.push(TableEvent::Notice(TableNotice::UnknownRow(id)));
            return;
        }
        if self.expanded.remove(&id) {
            events.push(TableEvent::RowCollapsed(id));
            return;
        }
        if self.expansion == ExpansionMode::Single {
            for other in std::mem::take(&mut self.expanded) {
                events.push(TableEvent::RowCollapsed(other));
            }
        }
        self.expanded.insert(id.clone());
        events.push(TableEvent::RowExpanded(id));
    }

    fn filter_current_cell(&mut self, events: &mut Vec<TableEvent>) {
        let Some(column) = self.cursor_column().cloned() else {
            events.push(TableEvent::Notice(TableNotice::NoRowUnderCursor));
            return;
        };
        let Some(value) = self.cursor_record().map(|record| column.value(record)) else {
            events.push(TableEvent::Notice(TableNotice::NoRowUnderCursor));
            return;
        };
        if column.is_action() {
            events.push(TableEvent::Notice(TableNotice::FilterUnavailable(column.label)));
            return;
        }

        let key = self.filter_spec.key_for_field(&column.field);
        if is_reserved_key(&key) {
            events.push(TableEvent::Notice(TableNotice::ReservedFilterKey(key)));
            return;
        }
        let (_, predicate) = self.filter_spec.resolve(&key);
        let filter_value = match (&value, predicate) {
            (CellValue::Null, Predicate::Presence) => Some(UNASSIGNED.to_owned()),
            (CellValue::List(_), _) => None,
            (other, _) => other.filter_key(),
        };
        let Some(filter_value) = filter_value else {
            events.push(TableEvent::Notice(TableNotice::FilterUnavailable(column.label)));
            return;
        };

        self.filters.toggle(&key, &filter_value);
        self.refilter(events);
    }

    fn visibility_changed(&mut self, change: VisibilityChange, events: &mut Vec<TableEvent>) {
        let event = match change {
            VisibilityChange::Hidden(_) | VisibilityChange::Shown(_) | VisibilityChange::AllShown => {
                TableEvent::ColumnsChanged(self.columns.visible_fields())
            }
            VisibilityChange::AlreadyHidden(label) => {
                TableEvent::Notice(TableNotice::ColumnAlreadyHidden(label))
            }
            VisibilityChange::AlreadyShown(label) => {
                TableEvent::Notice(TableNotice::ColumnAlreadyShown(label))
            }
            VisibilityChange::KeepOneVisible => {
                TableEvent::Notice(TableNotice::KeepOneColumnVisible)
            }
            VisibilityChange::Unknown(field) => {
                TableEvent::Notice(TableNotice::UnknownColumn(field))
            }
        };
        events.push(event);
    }

    fn apply_view(&mut self, view: SavedView, events: &mut Vec<TableEvent>) {
        for column in self.columns.set_visible(&view.visible_columns) {
            warn!(view = %view.id, %column, "saved view names an unknown column; ignoring it");
        }
        events.push(TableEvent::ColumnsChanged(self.columns.visible_fields()));

        match self.columns.get(&view.sort_field) {
            Some(column) if column.sortable => {
                self.sort = view.sort();
                events.push(TableEvent::SortChanged {
                    field: self.sort.field.clone(),
                    direction: self.sort.direction,
                });
            }
            _ => warn!(
                view = %view.id,
                field = %view.sort_field,
                "saved view sorts by an unusable column; keeping the current sort"
            ),
        }
        events.push(TableEvent::ViewApplied(view.id));
    }

    fn delete_view(&mut self, id: &str, events: &mut Vec<TableEvent>) {
        match self.views.delete(id) {
            Ok(Deletion::Removed(removed)) => events.push(TableEvent::ViewDeleted(removed.id)),
            Ok(Deletion::FellBack { removed, current }) => {
                events.push(TableEvent::ViewDeleted(removed.id));
                self.apply_view(current, events);
            }
            Err(error) => events.push(TableEvent::Notice(TableNotice::ViewRejected(format!(
                "{error:#}"
            )))),
        }
    }

    /// Recount matches after a filter change; a new count sends the view to page 0.
    /// Selected rows the filters now hide are deselected.
    fn refilter(&mut self, events: &mut Vec<TableEvent>) {
        let rows = filter::apply(&self.records, &self.filter_spec, &self.filters);
        let matching = rows.len();
        let passing = rows
            .into_iter()
            .map(|record| record.id().to_owned())
            .collect::<BTreeSet<_>>();

        let selected_before = self.selected.len();
        self.selected.retain(|id| passing.contains(id));
        if self.selected.len() != selected_before {
            events.push(TableEvent::SelectionChanged(self.selected_ids()));
        }

        if matching != self.matching {
            self.matching = matching;
            self.cursor_row = 0;
            if self.page.page != 0 {
                self.page.page = 0;
                events.push(TableEvent::PageChanged(0));
            }
        }
        debug!(matching, total = self.records.len(), "filters applied");
        events.push(TableEvent::FiltersChanged { matching });
    }

    fn clamp(&mut self) {
        self.page.clamp(self.matching);
        let rows = self.page_rows().len();
        self.cursor_row = self.cursor_row.min(rows.saturating_sub(1));
        if let Some(column) = self.columns.coerce_visible(self.cursor_col) {
            self.cursor_col = column;
        }
    }
}

/// Object-safe face of [`TableView`] so screens over different record types
/// can sit behind one pointer.
pub trait DynTable {
    fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent>;
    fn project(&self, ctx: &FormatContext) -> TableProjection;
    fn columns(&self) -> &ColumnSet;
    fn filter_spec(&self) -> &FilterSpec;
    fn filters(&self) -> &FilterState;
    fn sort_state(&self) -> &SortState;
    fn page_state(&self) -> PageState;
    fn views(&self) -> &ViewRegistry;
    fn selected_ids(&self) -> Vec<String>;
    fn matching(&self) -> usize;
    fn total(&self) -> usize;
}

impl<R: Record> DynTable for TableView<R> {
    fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        TableView::dispatch(self, command)
    }

    fn project(&self, ctx: &FormatContext) -> TableProjection {
        TableView::project(self, ctx)
    }

    fn columns(&self) -> &ColumnSet {
        TableView::columns(self)
    }

    fn filter_spec(&self) -> &FilterSpec {
        TableView::filter_spec(self)
    }

    fn filters(&self) -> &FilterState {
        TableView::filters(self)
    }

    fn sort_state(&self) -> &SortState {
        TableView::sort_state(self)
    }

    fn page_state(&self) -> PageState {
        TableView::page_state(self)
    }

    fn views(&self) -> &ViewRegistry {
        TableView::views(self)
    }

    fn selected_ids(&self) -> Vec<String> {
        TableView::selected_ids(self)
    }

    fn matching(&self) -> usize {
        TableView::matching(self)
    }

    fn total(&self) -> usize {
        self.records.len()
    }
}
