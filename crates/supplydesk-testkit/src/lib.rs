// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use supplydesk_app::{
    ActiveOrders, Alert, AlertId, AlertSeverity, AlertStatus, AlertType, DeskData, ImpactLevel,
    InventoryItem, InventoryItemId, Payment, PaymentId, PaymentMethod, PaymentStatus,
    PaymentUrgency, Region, RiskLevel, StockStatus, Supplier, SupplierId, TokenStatus,
    VerificationStatus,
};
use time::{Duration, OffsetDateTime, macros::datetime};

const SUPPLIER_NAMES: [&str; 18] = [
    "Korea Chip Manufacturing",
    "Shenzhen Electronics Ltd",
    "Taiwan Semiconductor Supply",
    "Tokyo Components",
    "Bavaria Precision Parts",
    "Nordic Sensor Works",
    "Austin Board Assembly",
    "Monterrey Cable Co",
    "Penang Passive Devices",
    "Lyon Optics Group",
    "Osaka Power Systems",
    "Sao Paulo Metals",
    "Guadalajara Harness",
    "Eindhoven Microsystems",
    "Seattle Thermal Solutions",
    "Hsinchu RF Labs",
    "Dresden Wafer Services",
    "Ontario Enclosures",
];

const CATEGORIES: [&str; 8] = [
    "Semiconductors",
    "Passives",
    "RF Components",
    "Sensors",
    "Power",
    "Connectors",
    "Optics",
    "Enclosures",
];

const PAYMENT_TERMS: [&str; 5] = ["Net 15", "Net 30", "Net 45", "Net 60", "Due on receipt"];

const WAREHOUSES: [&str; 4] = [
    "Austin Warehouse",
    "San Jose Warehouse",
    "Rotterdam Hub",
    "Singapore DC",
];

const PARTS: [(&str, &str); 16] = [
    ("RF Amplifier IC", "RF Components"),
    ("Schottky Diode", "Passives"),
    ("MEMS Accelerometer", "Sensors"),
    ("Power Regulator", "Power"),
    ("MLCC Capacitor", "Passives"),
    ("Microcontroller", "Semiconductors"),
    ("FPGA Module", "Semiconductors"),
    ("Board Connector", "Connectors"),
    ("Fiber Transceiver", "Optics"),
    ("Temperature Sensor", "Sensors"),
    ("DC-DC Converter", "Power"),
    ("Shielded Enclosure", "Enclosures"),
    ("Crystal Oscillator", "Passives"),
    ("Optical Lens", "Optics"),
    ("USB-C Receptacle", "Connectors"),
    ("Gate Driver", "Semiconductors"),
];

const ALERT_TEMPLATES: [(AlertType, &str); 12] = [
    (AlertType::Inventory, "{part} below critical threshold"),
    (AlertType::Inventory, "{part} approaching minimum threshold"),
    (AlertType::Supplier, "{supplier} lead times increased by {n} days"),
    (AlertType::Supplier, "Quality check pending for {supplier} shipment"),
    (AlertType::Payment, "Invoice #{invoice} payment due tomorrow"),
    (AlertType::Payment, "Payment to {supplier} failed verification"),
    (AlertType::Transfer, "Customs clearance delay on {part} shipment"),
    (AlertType::Transfer, "Blockchain verification required for {warehouse} adjustment"),
    (AlertType::Quality, "Batch J{n} of {part} failed precision test"),
    (AlertType::Quality, "Quality issues with recent shipments from {supplier}"),
    (AlertType::System, "Stock threshold sync failed for {warehouse}"),
    (AlertType::System, "Supplier portal certificate renewal in {n} days"),
];

const SOURCES: [&str; 5] = [
    "Inventory System - Stock Thresholds",
    "Supplier Management System",
    "Payment Processing Gateway",
    "Customs Clearance Status API",
    "Blockchain Verification Service",
];

const OWNERS: [&str; 6] = [
    "Sarah Johnson",
    "Michael Chen",
    "Jennifer Wong",
    "David Lee",
    "Priya Natarajan",
    "Marco Rossi",
];

/// How many records of each kind to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordCounts {
    pub alerts: usize,
    pub suppliers: usize,
    pub payments: usize,
    pub inventory: usize,
}

impl Default for RecordCounts {
    fn default() -> Self {
        Self {
            alerts: 24,
            suppliers: 18,
            payments: 30,
            inventory: 40,
        }
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// Seeded generator for procurement records. The same seed and anchor give
/// the same records.
#[derive(Debug, Clone)]
pub struct ProcurementFaker {
    rng: DeterministicRng,
    seed: u64,
    anchor: OffsetDateTime,
}

impl ProcurementFaker {
    pub fn new(seed: u64) -> Self {
        Self::anchored(seed, reference_now())
    }

    /// Dates are generated around `anchor`.
    pub fn anchored(seed: u64, anchor: OffsetDateTime) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            anchor,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn alert(&mut self, number: u32) -> Alert {
        let (alert_type, template) = ALERT_TEMPLATES[self.rng.int_n(ALERT_TEMPLATES.len())];
        let description = template
            .replace("{part}", self.pick(&PARTS).0)
            .replace("{supplier}", self.pick_str(&SUPPLIER_NAMES))
            .replace("{warehouse}", self.pick_str(&WAREHOUSES))
            .replace("{invoice}", &format!("TCB-{}", self.int_range(1000, 9999)))
            .replace("{n}", &self.int_range(3, 30).to_string());

        let severity = self.pick(AlertSeverity::ALL);
        let status = self.pick(AlertStatus::ALL);
        let owner = if status == AlertStatus::New || self.rng.chance(25) {
            None
        } else {
            Some(self.pick_str(&OWNERS).to_owned())
        };
        let minutes_ago = self.int_range(2, 60 * 24 * 21);

        Alert {
            id: AlertId::numbered(number),
            severity,
            alert_type,
            description,
            status,
            impact: self.pick(ImpactLevel::ALL),
            created_at: self.anchor - Duration::minutes(minutes_ago),
            owner,
            source: self.pick_str(&SOURCES).to_owned(),
        }
    }

    pub fn supplier(&mut self, number: u32) -> Supplier {
        let name = SUPPLIER_NAMES[(number as usize).saturating_sub(1) % SUPPLIER_NAMES.len()];
        let category_count = 1 + self.rng.int_n(3);
        let mut categories = Vec::with_capacity(category_count);
        while categories.len() < category_count {
            let category = self.pick_str(&CATEGORIES).to_owned();
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        let orders = self.int_range(0, 12) as u32;

        Supplier {
            id: SupplierId::numbered(number),
            name: name.to_owned(),
            performance_score: self.int_range(550, 995) as f64 / 10.0,
            categories,
            annual_spend_cents: self.int_range(50_000, 4_000_000) * 100,
            active_orders: ActiveOrders {
                count: orders,
                value_cents: i64::from(orders) * self.int_range(1_500, 60_000) * 100,
            },
            payment_terms: self.pick_str(&PAYMENT_TERMS).to_owned(),
            token_status: self.pick(TokenStatus::ALL),
            contract_expiration: self.anchor.date() + Duration::days(self.int_range(-20, 540)),
            verification: self.pick(VerificationStatus::ALL),
            risk: self.pick(RiskLevel::ALL),
            region: self.pick(Region::ALL),
        }
    }

    pub fn payment(&mut self, number: u32) -> Payment {
        let method = self.pick(PaymentMethod::ALL);
        let currency = match method {
            PaymentMethod::Stablecoin => "USDC",
            _ if self.rng.chance(20) => "EUR",
            _ => "USD",
        };

        Payment {
            id: PaymentId::numbered(number),
            supplier_name: self.pick_str(&SUPPLIER_NAMES).to_owned(),
            amount_cents: self.int_range(25_000, 25_000_000),
            currency: currency.to_owned(),
            status: self.pick(PaymentStatus::ALL),
            urgency: self.pick(PaymentUrgency::ALL),
            due_date: self.anchor.date() + Duration::days(self.int_range(-14, 45)),
            method,
            invoice_number: format!("INV-{}", self.int_range(10_000, 99_999)),
        }
    }

    pub fn inventory_item(&mut self, number: u32) -> InventoryItem {
        let (part, category) = self.pick(&PARTS);
        let reorder_point = self.int_range(20, 400);
        let max_level = reorder_point * 6;
        let quantity = match self.rng.int_n(10) {
            0 => 0,
            1 | 2 => self.int_range(1, reorder_point),
            3 => self.int_range(max_level + 1, max_level * 2),
            _ => self.int_range(reorder_point + 1, max_level),
        };
        let prefix: String = category
            .chars()
            .filter(char::is_ascii_alphabetic)
            .take(3)
            .collect::<String>()
            .to_uppercase();

        InventoryItem {
            id: InventoryItemId::numbered(number),
            sku: format!("{prefix}-{:05}", self.int_range(1, 99_999)),
            name: part.to_owned(),
            category: category.to_owned(),
            supplier_name: self.pick_str(&SUPPLIER_NAMES).to_owned(),
            warehouse: self.pick_str(&WAREHOUSES).to_owned(),
            quantity,
            reorder_point,
            max_level,
            lead_time_days: self.int_range(3, 70) as u32,
            unit_cost_cents: self.int_range(5, 45_000),
            status: StockStatus::from_levels(quantity, reorder_point, max_level),
            verified: self.rng.chance(70),
            last_received: self.anchor.date() - Duration::days(self.int_range(0, 120)),
        }
    }

    /// Records for every screen, numbered from 1.
    pub fn desk_data(&mut self, counts: RecordCounts) -> DeskData {
        DeskData {
            alerts: (1..=counts.alerts as u32).map(|n| self.alert(n)).collect(),
            suppliers: (1..=counts.suppliers as u32)
                .map(|n| self.supplier(n))
                .collect(),
            payments: (1..=counts.payments as u32).map(|n| self.payment(n)).collect(),
            inventory: (1..=counts.inventory as u32)
                .map(|n| self.inventory_item(n))
                .collect(),
        }
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.int_n(items.len())]
    }

    fn pick_str(&mut self, items: &[&'static str]) -> &'static str {
        self.pick(items)
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

pub fn reference_now() -> OffsetDateTime {
    datetime!(2026-03-10 12:00 UTC)
}

#[cfg(test)]
mod tests {
    use super::{ProcurementFaker, RecordCounts, reference_now};
    use std::collections::BTreeSet;
    use supplydesk_app::{AlertStatus, Desk, ScreenOptions, StockStatus};
    use supplydesk_grid::Record;

    #[test]
    fn same_seed_same_records() {
        let mut left = ProcurementFaker::new(42);
        let mut right = ProcurementFaker::new(42);
        assert_eq!(
            left.desk_data(RecordCounts::default()),
            right.desk_data(RecordCounts::default())
        );
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(ProcurementFaker::new(0).seed(), 1);
    }

    #[test]
    fn counts_are_honored_and_ids_are_unique() {
        let counts = RecordCounts {
            alerts: 7,
            suppliers: 3,
            payments: 0,
            inventory: 11,
        };
        let data = ProcurementFaker::new(3).desk_data(counts);
        assert_eq!(data.alerts.len(), 7);
        assert_eq!(data.suppliers.len(), 3);
        assert!(data.payments.is_empty());
        assert_eq!(data.inventory.len(), 11);

        let ids: BTreeSet<&str> = data.inventory.iter().map(Record::id).collect();
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn new_alerts_are_unassigned_and_in_the_past() {
        let mut faker = ProcurementFaker::new(5);
        for n in 1..=50 {
            let alert = faker.alert(n);
            if alert.status == AlertStatus::New {
                assert!(alert.owner.is_none(), "{}", alert.id);
            }
            assert!(alert.created_at < reference_now());
            assert!(!alert.description.contains('{'), "{}", alert.description);
        }
    }

    #[test]
    fn stock_status_agrees_with_levels() {
        let mut faker = ProcurementFaker::new(9);
        for n in 1..=60 {
            let item = faker.inventory_item(n);
            assert!(item.max_level > item.reorder_point);
            assert_eq!(
                item.status,
                StockStatus::from_levels(item.quantity, item.reorder_point, item.max_level)
            );
            match item.status {
                StockStatus::OutOfStock => assert_eq!(item.quantity, 0),
                StockStatus::LowStock => assert!(item.needs_reorder()),
                StockStatus::InStock => assert!(item.quantity <= item.max_level),
                StockStatus::Overstock => assert!(item.quantity > item.max_level),
            }
        }
    }

    #[test]
    fn supplier_categories_are_distinct() {
        let mut faker = ProcurementFaker::new(11);
        for n in 1..=30 {
            let supplier = faker.supplier(n);
            let unique: BTreeSet<&String> = supplier.categories.iter().collect();
            assert_eq!(unique.len(), supplier.categories.len());
            assert!((55.0..=99.5).contains(&supplier.performance_score));
        }
    }

    #[test]
    fn generated_data_builds_a_desk() -> anyhow::Result<()> {
        let data = ProcurementFaker::new(42).desk_data(RecordCounts::default());
        let desk = Desk::new(data, &ScreenOptions::default(), reference_now().date())?;
        assert_eq!(desk.alerts().records().len(), 24);
        Ok(())
    }

    #[test]
    fn variety_across_seeds() {
        let mut descriptions = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            descriptions.insert(ProcurementFaker::new(seed).alert(1).description);
        }
        assert!(descriptions.len() >= 8, "got {}", descriptions.len());
    }
}
