// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use supplydesk_grid::{CellValue, Record};

use crate::model::{Alert, InventoryItem, Payment, Supplier};

impl Record for Alert {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::text(self.id.as_str()),
            "severity" => CellValue::Category(self.severity.as_str()),
            "type" => CellValue::Category(self.alert_type.as_str()),
            "description" => CellValue::text(self.description.clone()),
            "status" => CellValue::Category(self.status.as_str()),
            "impact" => CellValue::Category(self.impact.as_str()),
            "created" => CellValue::Timestamp(self.created_at),
            "owner" => CellValue::optional_text(self.owner.as_deref()),
            "source" => CellValue::text(self.source.clone()),
            _ => CellValue::Null,
        }
    }

    fn fields() -> &'static [&'static str] {
        &[
            "id",
            "severity",
            "type",
            "description",
            "status",
            "impact",
            "created",
            "owner",
            "source",
        ]
    }
}

impl Record for Supplier {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::text(self.id.as_str()),
            "name" => CellValue::text(self.name.clone()),
            "performance" => CellValue::Percent(self.performance_score),
            "categories" => CellValue::List(
                self.categories
                    .iter()
                    .map(|category| CellValue::text(category.clone()))
                    .collect(),
            ),
            "annual_spend" => CellValue::Money(self.annual_spend_cents),
            "active_orders" => CellValue::nested([
                ("count", CellValue::Integer(i64::from(self.active_orders.count))),
                ("value", CellValue::Money(self.active_orders.value_cents)),
            ]),
            "payment_terms" => CellValue::text(self.payment_terms.clone()),
            "token_status" => CellValue::Category(self.token_status.as_str()),
            "contract_expiration" => CellValue::Date(self.contract_expiration),
            "verification" => CellValue::Category(self.verification.as_str()),
            "risk" => CellValue::Category(self.risk.as_str()),
            "region" => CellValue::Category(self.region.as_str()),
            _ => CellValue::Null,
        }
    }

    fn fields() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "performance",
            "categories",
            "annual_spend",
            "active_orders",
            "payment_terms",
            "token_status",
            "contract_expiration",
            "verification",
            "risk",
            "region",
        ]
    }
}

impl Record for Payment {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::text(self.id.as_str()),
            "supplier" => CellValue::text(self.supplier_name.clone()),
            "amount" => CellValue::Money(self.amount_cents),
            "currency" => CellValue::text(self.currency.clone()),
            "status" => CellValue::Category(self.status.as_str()),
            "urgency" => CellValue::Category(self.urgency.as_str()),
            "due_date" => CellValue::Date(self.due_date),
            "method" => CellValue::Category(self.method.as_str()),
            "invoice" => CellValue::text(self.invoice_number.clone()),
            _ => CellValue::Null,
        }
    }

    fn fields() -> &'static [&'static str] {
        &[
            "id", "supplier", "amount", "currency", "status", "urgency", "due_date", "method",
            "invoice",
        ]
    }
}

impl Record for InventoryItem {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::text(self.id.as_str()),
            "sku" => CellValue::text(self.sku.clone()),
            "name" => CellValue::text(self.name.clone()),
            "category" => CellValue::text(self.category.clone()),
            "supplier" => CellValue::text(self.supplier_name.clone()),
            "warehouse" => CellValue::text(self.warehouse.clone()),
            "quantity" => CellValue::Integer(self.quantity),
            "reorder_point" => CellValue::Integer(self.reorder_point),
            "max_level" => CellValue::Integer(self.max_level),
            "lead_time" => CellValue::Integer(i64::from(self.lead_time_days)),
            "unit_cost" => CellValue::Money(self.unit_cost_cents),
            "total_value" => CellValue::Money(self.total_value_cents()),
            "status" => CellValue::Category(self.status.as_str()),
            "verified" => CellValue::Flag(self.verified),
            "last_received" => CellValue::Date(self.last_received),
            _ => CellValue::Null,
        }
    }

    fn fields() -> &'static [&'static str] {
        &[
            "id",
            "sku",
            "name",
            "category",
            "supplier",
            "warehouse",
            "quantity",
            "reorder_point",
            "max_level",
            "lead_time",
            "unit_cost",
            "total_value",
            "status",
            "verified",
            "last_received",
        ]
    }
}

#[cfg(test)]
mod tests {
    use crate::ids::{AlertId, SupplierId};
    use crate::model::{
        ActiveOrders, Alert, AlertSeverity, AlertStatus, AlertType, ImpactLevel, Region, RiskLevel,
        Supplier, TokenStatus, VerificationStatus,
    };
    use supplydesk_grid::{CellValue, Record};
    use time::macros::{date, datetime};

    #[test]
    fn every_declared_alert_field_resolves() {
        let alert = Alert {
            id: AlertId::numbered(1),
            severity: AlertSeverity::Critical,
            alert_type: AlertType::Supplier,
            description: "Port congestion".to_owned(),
            status: AlertStatus::New,
            impact: ImpactLevel::High,
            created_at: datetime!(2026-03-01 09:00 UTC),
            owner: Some("Sarah Kim".to_owned()),
            source: "Logistics feed".to_owned(),
        };
        for field in Alert::fields() {
            assert!(!alert.field(field).is_null(), "{field} resolved to null");
        }
        assert_eq!(alert.field("nope"), CellValue::Null);
    }

    #[test]
    fn supplier_orders_are_nested() {
        let supplier = Supplier {
            id: SupplierId::numbered(1),
            name: "Acme Components".to_owned(),
            performance_score: 91.5,
            categories: vec!["Semiconductors".to_owned()],
            annual_spend_cents: 1_250_000_00,
            active_orders: ActiveOrders {
                count: 4,
                value_cents: 82_000_00,
            },
            payment_terms: "Net 30".to_owned(),
            token_status: TokenStatus::Enabled,
            contract_expiration: date!(2027 - 01 - 31),
            verification: VerificationStatus::Verified,
            risk: RiskLevel::Low,
            region: Region::Europe,
        };
        assert_eq!(
            supplier.field("active_orders").subfield("value"),
            CellValue::Money(82_000_00)
        );
        assert_eq!(supplier.field("categories").count(), Some(1));
    }
}
