// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use supplydesk_grid::{
    ColumnDescriptor, ColumnSet, DEFAULT_PAGE_SIZE, DynTable, ExpansionMode, FilterSpec,
    Formatter, Record, SavedView, SortDirection, SortKey, SortState, TableView, ViewRegistry,
};
use time::Date;
use tracing::info;

use crate::insights::{Recommendation, recommendations};
use crate::model::{
    Alert, AlertSeverity, DashboardCounts, ImpactLevel, InventoryItem, Payment, PaymentUrgency,
    RiskLevel, Supplier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Alerts,
    Suppliers,
    Payments,
    Inventory,
}

impl ScreenKind {
    pub const ALL: [Self; 4] = [Self::Alerts, Self::Suppliers, Self::Payments, Self::Inventory];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alerts => "alerts",
            Self::Suppliers => "suppliers",
            Self::Payments => "payments",
            Self::Inventory => "inventory",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "alerts" => Some(Self::Alerts),
            "suppliers" => Some(Self::Suppliers),
            "payments" => Some(Self::Payments),
            "inventory" => Some(Self::Inventory),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Alerts => "alerts",
            Self::Suppliers => "suppliers",
            Self::Payments => "payments",
            Self::Inventory => "inventory",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Alerts => "No alerts match the current filters",
            Self::Suppliers => "No suppliers match the current filters",
            Self::Payments => "No payments match the current filters",
            Self::Inventory => "No inventory items match the current filters",
        }
    }

    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            Self::Alerts => Alert::fields(),
            Self::Suppliers => Supplier::fields(),
            Self::Payments => Payment::fields(),
            Self::Inventory => InventoryItem::fields(),
        }
    }
}

/// Declared columns for a screen.
pub fn screen_columns(kind: ScreenKind) -> ColumnSet {
    match kind {
        ScreenKind::Alerts => alert_columns(),
        ScreenKind::Suppliers => supplier_columns(),
        ScreenKind::Payments => payment_columns(),
        ScreenKind::Inventory => inventory_columns(),
    }
}

/// Table settings shared by every screen, plus extra views per screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenOptions {
    pub page_size: usize,
    pub expansion: ExpansionMode,
    pub extra_views: BTreeMap<ScreenKind, Vec<SavedView>>,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            expansion: ExpansionMode::Single,
            extra_views: BTreeMap::new(),
        }
    }
}

pub fn alert_columns() -> ColumnSet {
    ColumnSet::new(vec![
        ColumnDescriptor::field("id", "ID"),
        ColumnDescriptor::field("severity", "Severity")
            .formatter(Formatter::Title)
            .sort_key(SortKey::rank(AlertSeverity::ALL.iter().map(|level| level.as_str()))),
        ColumnDescriptor::field("type", "Type").formatter(Formatter::Title),
        ColumnDescriptor::field("description", "Description"),
        ColumnDescriptor::field("status", "Status").formatter(Formatter::Title),
        ColumnDescriptor::field("impact", "Impact")
            .formatter(Formatter::Title)
            .sort_key(SortKey::rank(ImpactLevel::ALL.iter().map(|level| level.as_str()))),
        ColumnDescriptor::field("created", "Created")
            .formatter(Formatter::Relative)
            .right(),
        ColumnDescriptor::field("owner", "Owner"),
        ColumnDescriptor::field("source", "Source").hidden(),
        ColumnDescriptor::action("actions", "Actions"),
    ])
}

pub fn alert_filters() -> FilterSpec {
    FilterSpec::new()
        .key("severity", "severity", "Severity")
        .key("status", "status", "Status")
        .key("type", "type", "Type")
        .presence_key("assignment", "owner", "Assignment")
        .search(["description", "id", "source", "owner"])
}

pub fn alert_presets() -> Vec<SavedView> {
    vec![
        SavedView::new(
            "default",
            "Default View",
            [
                "id",
                "severity",
                "type",
                "description",
                "status",
                "impact",
                "created",
                "owner",
                "actions",
            ],
            SortState::new("created", SortDirection::Desc),
        ),
        SavedView::new(
            "triage",
            "Triage View",
            ["severity", "description", "status", "owner", "created"],
            SortState::new("severity", SortDirection::Asc),
        ),
    ]
}

pub fn supplier_columns() -> ColumnSet {
    ColumnSet::new(vec![
        ColumnDescriptor::field("name", "Supplier"),
        ColumnDescriptor::field("performance", "Score")
            .formatter(Formatter::Percent)
            .right(),
        ColumnDescriptor::field("categories", "Categories")
            .formatter(Formatter::Join)
            .sort_key(SortKey::Count),
        ColumnDescriptor::field("annual_spend", "Annual Spend")
            .formatter(Formatter::CompactMoney)
            .right(),
        ColumnDescriptor::field("active_orders", "Active Orders")
            .formatter(Formatter::Subfield(
                "count".to_owned(),
                Box::new(Formatter::Plain),
            ))
            .sort_key(SortKey::Subfield("value".to_owned()))
            .right(),
        ColumnDescriptor::field("payment_terms", "Terms"),
        ColumnDescriptor::field("token_status", "Token")
            .formatter(Formatter::Title)
            .centered(),
        ColumnDescriptor::field("contract_expiration", "Contract Ends").formatter(Formatter::Date),
        ColumnDescriptor::field("verification", "Verification")
            .formatter(Formatter::Title)
            .centered(),
        ColumnDescriptor::field("risk", "Risk")
            .formatter(Formatter::Title)
            .sort_key(SortKey::rank(RiskLevel::ALL.iter().map(|level| level.as_str()))),
        ColumnDescriptor::field("region", "Region").formatter(Formatter::Title),
        ColumnDescriptor::action("actions", "Actions"),
    ])
}

pub fn supplier_filters() -> FilterSpec {
    FilterSpec::new()
        .key("risk", "risk", "Risk")
        .key("region", "region", "Region")
        .key("verification", "verification", "Verification")
        .key("token", "token_status", "Token")
        .key("categories", "categories", "Categories")
        .search(["name", "categories", "region", "payment_terms"])
}

pub fn supplier_presets() -> Vec<SavedView> {
    vec![
        SavedView::new(
            "default",
            "Default View",
            [
                "name",
                "performance",
                "categories",
                "annual_spend",
                "active_orders",
                "payment_terms",
                "token_status",
                "contract_expiration",
                "verification",
                "actions",
            ],
            SortState::new("annual_spend", SortDirection::Desc),
        ),
        SavedView::new(
            "payment-focus",
            "Payment Focus",
            [
                "name",
                "annual_spend",
                "payment_terms",
                "token_status",
                "contract_expiration",
            ],
            SortState::new("annual_spend", SortDirection::Desc),
        ),
        SavedView::new(
            "performance",
            "Performance View",
            ["name", "performance", "contract_expiration", "verification"],
            SortState::new("performance", SortDirection::Desc),
        ),
    ]
}

pub fn payment_columns() -> ColumnSet {
    ColumnSet::new(vec![
        ColumnDescriptor::field("id", "ID"),
        ColumnDescriptor::field("supplier", "Supplier"),
        ColumnDescriptor::field("invoice", "Invoice"),
        ColumnDescriptor::field("amount", "Amount")
            .formatter(Formatter::Money)
            .right(),
        ColumnDescriptor::field("currency", "Cur").centered(),
        ColumnDescriptor::field("due_date", "Due").formatter(Formatter::Date),
        ColumnDescriptor::field("urgency", "Urgency")
            .formatter(Formatter::Title)
            .sort_key(SortKey::rank(PaymentUrgency::ALL.iter().map(|level| level.as_str()))),
        ColumnDescriptor::field("status", "Status").formatter(Formatter::Title),
        ColumnDescriptor::field("method", "Method").formatter(Formatter::Title),
        ColumnDescriptor::action("actions", "Actions"),
    ])
}

pub fn payment_filters() -> FilterSpec {
    FilterSpec::new()
        .key("status", "status", "Status")
        .key("urgency", "urgency", "Urgency")
        .key("method", "method", "Method")
        .search(["id", "supplier", "invoice"])
}

pub fn payment_presets() -> Vec<SavedView> {
    vec![SavedView::new(
        "default",
        "Default View",
        [
            "id", "supplier", "invoice", "amount", "currency", "due_date", "urgency", "status",
            "method", "actions",
        ],
        SortState::new("due_date", SortDirection::Asc),
    )]
}

pub fn inventory_columns() -> ColumnSet {
    ColumnSet::new(vec![
        ColumnDescriptor::field("name", "Name"),
        ColumnDescriptor::field("sku", "SKU"),
        ColumnDescriptor::field("category", "Category"),
        ColumnDescriptor::field("supplier", "Supplier"),
        ColumnDescriptor::field("warehouse", "Warehouse"),
        ColumnDescriptor::field("quantity", "On Hand").right(),
        ColumnDescriptor::field("reorder_point", "Reorder At").right(),
        ColumnDescriptor::field("max_level", "Max Level").right().hidden(),
        ColumnDescriptor::field("lead_time", "Lead Days").right(),
        ColumnDescriptor::field("unit_cost", "Unit Cost")
            .formatter(Formatter::Money)
            .right(),
        ColumnDescriptor::field("total_value", "Value")
            .formatter(Formatter::CompactMoney)
            .right(),
        ColumnDescriptor::field("verified", "Verified").centered(),
        ColumnDescriptor::field("last_received", "Received").formatter(Formatter::Date),
        ColumnDescriptor::field("status", "Status").formatter(Formatter::Title),
        ColumnDescriptor::action("actions", "Actions"),
    ])
}

pub fn inventory_filters() -> FilterSpec {
    FilterSpec::new()
        .key("category", "category", "Category")
        .key("warehouse", "warehouse", "Warehouse")
        .key("status", "status", "Status")
        .search(["name", "sku", "category", "supplier"])
}

pub fn inventory_presets() -> Vec<SavedView> {
    vec![
        SavedView::new(
            "default",
            "Default View",
            ["name", "sku", "quantity", "status", "actions"],
            SortState::new("quantity", SortDirection::Asc),
        ),
        SavedView::new(
            "ordering",
            "Ordering View",
            [
                "name",
                "sku",
                "supplier",
                "quantity",
                "reorder_point",
                "lead_time",
                "actions",
            ],
            SortState::new("quantity", SortDirection::Asc),
        ),
        SavedView::new(
            "warehouse",
            "Warehouse View",
            ["name", "sku", "category", "warehouse", "quantity", "actions"],
            SortState::new("warehouse", SortDirection::Asc),
        ),
        SavedView::new(
            "valuation",
            "Valuation View",
            ["name", "sku", "unit_cost", "total_value", "verified", "last_received"],
            SortState::new("total_value", SortDirection::Desc),
        ),
    ]
}

fn build_table<R: Record>(
    kind: ScreenKind,
    records: Vec<R>,
    columns: ColumnSet,
    filters: FilterSpec,
    presets: Vec<SavedView>,
    options: &ScreenOptions,
) -> Result<TableView<R>> {
    let mut registry = ViewRegistry::with_presets(presets);
    for view in options.extra_views.get(&kind).into_iter().flatten() {
        registry.add_preset(view.clone());
    }

    let table = TableView::new(records, columns)
        .with_context(|| format!("build {} table", kind.as_str()))?
        .with_filter_spec(filters)
        .with_page_size(options.page_size)?
        .with_expansion(options.expansion)
        .with_empty_message(kind.empty_message())
        .with_views(registry);
    Ok(table)
}

/// Records for every screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeskData {
    pub alerts: Vec<Alert>,
    pub suppliers: Vec<Supplier>,
    pub payments: Vec<Payment>,
    pub inventory: Vec<InventoryItem>,
}

impl DeskData {
    pub fn counts(&self, today: Date) -> DashboardCounts {
        DashboardCounts::compute(
            &self.alerts,
            &self.suppliers,
            &self.payments,
            &self.inventory,
            today,
        )
    }
}

/// One table per screen.
pub struct Desk {
    alerts: TableView<Alert>,
    suppliers: TableView<Supplier>,
    payments: TableView<Payment>,
    inventory: TableView<InventoryItem>,
    counts: DashboardCounts,
}

impl Desk {
    pub fn new(data: DeskData, options: &ScreenOptions, today: Date) -> Result<Self> {
        let counts = data.counts(today);
        info!(
            alerts = data.alerts.len(),
            suppliers = data.suppliers.len(),
            payments = data.payments.len(),
            inventory = data.inventory.len(),
            "desk loaded"
        );

        Ok(Self {
            alerts: build_table(
                ScreenKind::Alerts,
                data.alerts,
                alert_columns(),
                alert_filters(),
                alert_presets(),
                options,
            )?,
            suppliers: build_table(
                ScreenKind::Suppliers,
                data.suppliers,
                supplier_columns(),
                supplier_filters(),
                supplier_presets(),
                options,
            )?,
            payments: build_table(
                ScreenKind::Payments,
                data.payments,
                payment_columns(),
                payment_filters(),
                payment_presets(),
                options,
            )?,
            inventory: build_table(
                ScreenKind::Inventory,
                data.inventory,
                inventory_columns(),
                inventory_filters(),
                inventory_presets(),
                options,
            )?,
            counts,
        })
    }

    pub fn counts(&self) -> DashboardCounts {
        self.counts
    }

    pub fn table(&self, kind: ScreenKind) -> &dyn DynTable {
        match kind {
            ScreenKind::Alerts => &self.alerts,
            ScreenKind::Suppliers => &self.suppliers,
            ScreenKind::Payments => &self.payments,
            ScreenKind::Inventory => &self.inventory,
        }
    }

    pub fn table_mut(&mut self, kind: ScreenKind) -> &mut dyn DynTable {
        match kind {
            ScreenKind::Alerts => &mut self.alerts,
            ScreenKind::Suppliers => &mut self.suppliers,
            ScreenKind::Payments => &mut self.payments,
            ScreenKind::Inventory => &mut self.inventory,
        }
    }

    pub fn alerts(&self) -> &TableView<Alert> {
        &self.alerts
    }

    pub fn suppliers(&self) -> &TableView<Supplier> {
        &self.suppliers
    }

    pub fn payments(&self) -> &TableView<Payment> {
        &self.payments
    }

    pub fn inventory(&self) -> &TableView<InventoryItem> {
        &self.inventory
    }

    /// Stock recommendations over every inventory item, filters aside.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        recommendations(self.inventory.records())
    }
}
