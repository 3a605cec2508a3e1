// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::ids::*;

/// Closed set of string-backed values with `as_str`/`parse`/`label`.
macro_rules! choice {
    ($name:ident { $($variant:ident => $value:literal, $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }
    };
}

choice!(AlertSeverity {
    Critical => "critical", "Critical",
    Warning => "warning", "Warning",
    Info => "info", "Info",
});

choice!(AlertType {
    Inventory => "inventory", "Inventory",
    Transfer => "transfer", "Transfer",
    Payment => "payment", "Payment",
    Supplier => "supplier", "Supplier",
    System => "system", "System",
    Quality => "quality", "Quality",
});

choice!(AlertStatus {
    New => "new", "New",
    InProgress => "in_progress", "In progress",
    Pending => "pending", "Pending",
    Resolved => "resolved", "Resolved",
});

choice!(ImpactLevel {
    High => "high", "High",
    Medium => "medium", "Medium",
    Low => "low", "Low",
});

choice!(RiskLevel {
    Low => "low", "Low",
    Medium => "medium", "Medium",
    High => "high", "High",
});

choice!(Region {
    NorthAmerica => "north_america", "North America",
    Europe => "europe", "Europe",
    AsiaPacific => "asia_pacific", "Asia Pacific",
    LatinAmerica => "latin_america", "Latin America",
});

choice!(VerificationStatus {
    Verified => "verified", "Verified",
    Pending => "pending", "Pending",
    Unverified => "unverified", "Unverified",
});

choice!(TokenStatus {
    Enabled => "enabled", "Enabled",
    Pending => "pending", "Pending",
    Disabled => "disabled", "Disabled",
});

choice!(PaymentStatus {
    Draft => "draft", "Draft",
    Scheduled => "scheduled", "Scheduled",
    PendingApproval => "pending_approval", "Pending approval",
    Processing => "processing", "Processing",
    Completed => "completed", "Completed",
    Failed => "failed", "Failed",
});

choice!(PaymentUrgency {
    Critical => "critical", "Critical",
    High => "high", "High",
    Medium => "medium", "Medium",
    Low => "low", "Low",
});

choice!(PaymentMethod {
    Wire => "wire", "Wire",
    Ach => "ach", "ACH",
    Stablecoin => "stablecoin", "Stablecoin",
    Card => "card", "Card",
});

choice!(StockStatus {
    InStock => "in_stock", "In stock",
    LowStock => "low_stock", "Low stock",
    OutOfStock => "out_of_stock", "Out of stock",
    Overstock => "overstock", "Overstock",
});

impl PaymentStatus {
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl StockStatus {
    /// Status implied by the on-hand quantity and reorder point.
    pub const fn from_levels(quantity: i64, reorder_point: i64, max_level: i64) -> Self {
        if quantity <= 0 {
            Self::OutOfStock
        } else if quantity <= reorder_point {
            Self::LowStock
        } else if quantity > max_level {
            Self::Overstock
        } else {
            Self::InStock
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub severity: AlertSeverity,
    pub alert_type: AlertType,
    pub description: String,
    pub status: AlertStatus,
    pub impact: ImpactLevel,
    pub created_at: OffsetDateTime,
    pub owner: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveOrders {
    pub count: u32,
    pub value_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    /// 0..=100.
    pub performance_score: f64,
    pub categories: Vec<String>,
    pub annual_spend_cents: i64,
    pub active_orders: ActiveOrders,
    pub payment_terms: String,
    pub token_status: TokenStatus,
    pub contract_expiration: Date,
    pub verification: VerificationStatus,
    pub risk: RiskLevel,
    pub region: Region,
}

impl Supplier {
    pub fn needs_attention(&self, today: Date) -> bool {
        self.verification == VerificationStatus::Pending
            || self.token_status == TokenStatus::Pending
            || self.risk == RiskLevel::High
            || (self.contract_expiration - today).whole_days() <= 30
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub supplier_name: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub urgency: PaymentUrgency,
    pub due_date: Date,
    pub method: PaymentMethod,
    pub invoice_number: String,
}

impl Payment {
    pub fn is_overdue(&self, today: Date) -> bool {
        !self.status.is_settled() && self.due_date < today
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub supplier_name: String,
    pub warehouse: String,
    pub quantity: i64,
    pub reorder_point: i64,
    /// Stock ceiling for the location; above it the item counts as overstock.
    pub max_level: i64,
    pub lead_time_days: u32,
    pub unit_cost_cents: i64,
    pub status: StockStatus,
    pub verified: bool,
    pub last_received: Date,
}

impl InventoryItem {
    pub fn total_value_cents(&self) -> i64 {
        self.unit_cost_cents.saturating_mul(self.quantity.max(0))
    }

    pub fn needs_reorder(&self) -> bool {
        self.quantity <= self.reorder_point
    }
}

/// Headline numbers shown above the screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub critical_alerts: usize,
    pub overdue_payments: usize,
    pub low_stock_items: usize,
    pub suppliers_needing_attention: usize,
}

impl DashboardCounts {
    pub fn compute(
        alerts: &[Alert],
        suppliers: &[Supplier],
        payments: &[Payment],
        inventory: &[InventoryItem],
        today: Date,
    ) -> Self {
        Self {
            critical_alerts: alerts
                .iter()
                .filter(|alert| {
                    alert.severity == AlertSeverity::Critical
                        && alert.status != AlertStatus::Resolved
                })
                .count(),
            overdue_payments: payments
                .iter()
                .filter(|payment| payment.is_overdue(today))
                .count(),
            low_stock_items: inventory.iter().filter(|item| item.needs_reorder()).count(),
            suppliers_needing_attention: suppliers
                .iter()
                .filter(|supplier| supplier.needs_attention(today))
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AlertStatus, PaymentStatus, Region, StockStatus};

    #[test]
    fn choices_round_trip_through_strings() {
        for status in AlertStatus::ALL {
            assert_eq!(AlertStatus::parse(status.as_str()), Some(*status));
        }
        for region in Region::ALL {
            assert_eq!(Region::parse(region.as_str()), Some(*region));
        }
        assert_eq!(PaymentStatus::parse("PENDING"), None);
    }

    #[test]
    fn choices_serialize_as_snake_case() -> anyhow::Result<()> {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::PendingApproval)?,
            "\"pending_approval\""
        );
        assert_eq!(
            serde_json::to_string(&Region::AsiaPacific)?,
            format!("\"{}\"", Region::AsiaPacific.as_str())
        );
        Ok(())
    }

    #[test]
    fn stock_status_follows_levels() {
        assert_eq!(StockStatus::from_levels(0, 10, 100), StockStatus::OutOfStock);
        assert_eq!(StockStatus::from_levels(10, 10, 100), StockStatus::LowStock);
        assert_eq!(StockStatus::from_levels(50, 10, 100), StockStatus::InStock);
        assert_eq!(StockStatus::from_levels(150, 10, 100), StockStatus::Overstock);
    }
}
