use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Bump on incompatible persisted-shape changes. A mismatch discards the
/// persisted draft (keeping only the vehicle type) instead of migrating.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DraftStatus {
    #[default]
    Idle,
    InProgress,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Idle => "idle",
            DraftStatus::InProgress => "in-progress",
        }
    }
}

/// A selected service or add-on.
///
/// Legacy drafts identify items by title when no id was supplied, so `id`
/// falls back to `title` during normalization. Two catalog entries sharing a
/// display title and no explicit id collide under this rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "money::lenient")]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    pub fn new(id: &str, title: &str, price: f64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            price,
            quantity: 1,
            duration_minutes: None,
        }
    }

    fn normalize(&mut self) {
        if self.id.is_empty() {
            self.id = self.title.clone();
        }
        self.quantity = self.quantity.max(1);
        self.price = money::coerce_f64(self.price);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

impl CustomerInfo {
    /// The fields the booking form marks required.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && !self.email.is_empty()
            && !self.phone.is_empty()
            && !self.address.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub license_plate: String,
}

impl VehicleInfo {
    pub fn is_complete(&self) -> bool {
        !self.make.is_empty() && !self.model.is_empty() && !self.year.is_empty()
    }
}

/// The in-progress booking, one per store slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub status: DraftStatus,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub selected_services: Vec<LineItem>,
    #[serde(default)]
    pub selected_addons: Vec<LineItem>,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub vehicle_info: VehicleInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_date: Option<NaiveDate>,
    #[serde(default)]
    pub selected_time_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingDraft {
    /// A fresh, empty, idle draft.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION,
            status: DraftStatus::Idle,
            vehicle_type: String::new(),
            selected_services: Vec::new(),
            selected_addons: Vec::new(),
            customer_info: CustomerInfo::default(),
            vehicle_info: VehicleInfo::default(),
            selected_date: None,
            selected_time_label: String::new(),
            start_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A fresh draft that keeps only the vehicle type of a stale one.
    pub fn seeded(vehicle_type: &str) -> Self {
        let mut draft = Self::new();
        draft.vehicle_type = vehicle_type.to_string();
        draft
    }

    /// Applied at every entry point (rehydration, mutation, adoption) so no
    /// downstream consumer ever sees an un-normalized item.
    pub fn normalize(&mut self) {
        self.schema_version = SCHEMA_VERSION;
        for item in &mut self.selected_services {
            item.normalize();
        }
        for item in &mut self.selected_addons {
            item.normalize();
        }
    }

    pub fn touch(&mut self) {
        self.status = DraftStatus::InProgress;
        self.updated_at = Utc::now();
    }

    pub fn has_services(&self) -> bool {
        !self.selected_services.is_empty()
    }

    pub fn schedule_complete(&self) -> bool {
        self.start_at.is_some() && !self.selected_time_label.is_empty()
    }

    pub fn toggle_service(&mut self, item: LineItem) {
        toggle_item(&mut self.selected_services, item);
    }

    pub fn toggle_addon(&mut self, item: LineItem) {
        toggle_item(&mut self.selected_addons, item);
    }

    pub fn increment_service(&mut self, id: &str) {
        adjust_quantity(&mut self.selected_services, id, 1);
    }

    pub fn decrement_service(&mut self, id: &str) {
        adjust_quantity(&mut self.selected_services, id, -1);
    }

    pub fn increment_addon(&mut self, id: &str) {
        adjust_quantity(&mut self.selected_addons, id, 1);
    }

    pub fn decrement_addon(&mut self, id: &str) {
        adjust_quantity(&mut self.selected_addons, id, -1);
    }

    /// Σ(price × qty) over services and add-ons, rounded to cents.
    pub fn total_price(&self) -> f64 {
        let sum: f64 = self
            .selected_services
            .iter()
            .chain(self.selected_addons.iter())
            .map(|i| money::coerce_f64(i.price) * i.quantity.max(1) as f64)
            .sum();
        (sum * 100.0).round() / 100.0
    }

    /// Σ(duration × qty); items without an estimate contribute nothing.
    pub fn total_duration_minutes(&self) -> u32 {
        self.selected_services
            .iter()
            .chain(self.selected_addons.iter())
            .map(|i| i.duration_minutes.unwrap_or(0) * i.quantity.max(1))
            .sum()
    }
}

fn toggle_item(list: &mut Vec<LineItem>, mut item: LineItem) {
    item.normalize();
    if let Some(idx) = list.iter().position(|x| x.id == item.id) {
        list.remove(idx);
    } else {
        item.quantity = 1;
        list.push(item);
    }
}

fn adjust_quantity(list: &mut Vec<LineItem>, id: &str, delta: i64) {
    match list.iter().position(|x| x.id == id) {
        Some(idx) => {
            let qty = (list[idx].quantity.max(1) as i64 + delta).max(0);
            if qty == 0 {
                list.remove(idx);
            } else {
                list[idx].quantity = qty as u32;
            }
        }
        None => {
            // Incrementing an unknown id inserts it; decrementing one is a no-op.
            if delta > 0 {
                let mut item = LineItem::new(id, "", 0.0);
                item.normalize();
                list.push(item);
            }
        }
    }
}

pub mod money {
    use serde::{Deserialize, Deserializer};

    /// Clamp to a finite, non-negative amount; anything else is 0.
    pub fn coerce_f64(n: f64) -> f64 {
        if n.is_finite() && n >= 0.0 {
            n
        } else {
            0.0
        }
    }

    pub fn coerce_value(v: &serde_json::Value) -> f64 {
        let n = match v {
            serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
            serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        coerce_f64(n)
    }

    /// Accepts numbers or numeric strings; junk coerces to 0 rather than
    /// failing the whole draft.
    pub fn lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(coerce_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, qty: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: id.to_string(),
            price,
            quantity: qty,
            duration_minutes: None,
        }
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let mut draft = BookingDraft::new();
        draft.toggle_service(item("wash", 50.0, 1));
        assert_eq!(draft.selected_services.len(), 1);
        draft.toggle_service(item("wash", 50.0, 1));
        assert!(draft.selected_services.is_empty());
    }

    #[test]
    fn test_toggle_matches_by_id_not_contents() {
        let mut draft = BookingDraft::new();
        draft.toggle_service(item("wash", 50.0, 1));
        // Different price, same id: still treated as the same selection
        draft.toggle_service(item("wash", 60.0, 3));
        assert!(draft.selected_services.is_empty());
    }

    #[test]
    fn test_id_falls_back_to_title() {
        let mut draft = BookingDraft::new();
        let mut no_id = item("", 25.0, 1);
        no_id.title = "Pet Hair Removal".to_string();
        draft.toggle_addon(no_id);
        assert_eq!(draft.selected_addons[0].id, "Pet Hair Removal");
    }

    #[test]
    fn test_decrement_floors_at_removal() {
        let mut draft = BookingDraft::new();
        draft.toggle_service(item("wash", 50.0, 1));
        draft.decrement_service("wash");
        assert!(draft.selected_services.is_empty());
        // Further decrements stay a no-op
        draft.decrement_service("wash");
        assert!(draft.selected_services.is_empty());
    }

    #[test]
    fn test_increment_unknown_id_inserts() {
        let mut draft = BookingDraft::new();
        draft.increment_service("polish");
        assert_eq!(draft.selected_services.len(), 1);
        assert_eq!(draft.selected_services[0].quantity, 1);

        draft.increment_service("polish");
        assert_eq!(draft.selected_services[0].quantity, 2);
    }

    #[test]
    fn test_total_price() {
        let mut draft = BookingDraft::new();
        draft.selected_services = vec![item("a", 10.0, 2), item("b", 5.0, 1)];
        draft.selected_addons = vec![item("c", 3.0, 1)];
        assert_eq!(draft.total_price(), 25.00);
    }

    #[test]
    fn test_total_price_rounds_to_cents() {
        let mut draft = BookingDraft::new();
        draft.selected_services = vec![item("a", 0.1, 1), item("b", 0.2, 1)];
        assert_eq!(draft.total_price(), 0.30);
    }

    #[test]
    fn test_total_duration() {
        let mut draft = BookingDraft::new();
        let mut a = item("a", 10.0, 2);
        a.duration_minutes = Some(60);
        let b = item("b", 5.0, 1);
        draft.selected_services = vec![a, b];
        assert_eq!(draft.total_duration_minutes(), 120);
    }

    #[test]
    fn test_lenient_price_parsing() {
        let json = r#"{"id":"x","title":"X","price":"79.99","quantity":2}"#;
        let parsed: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.price, 79.99);

        let json = r#"{"id":"x","title":"X","price":{"weird":true}}"#;
        let parsed: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.price, 0.0);
        assert_eq!(parsed.quantity, 1);
    }

    #[test]
    fn test_normalize_clamps_negative_price_and_zero_qty() {
        let mut draft = BookingDraft::new();
        let json = r#"{"id":"x","title":"X","price":-5,"quantity":0}"#;
        draft.selected_services = vec![serde_json::from_str(json).unwrap()];
        draft.normalize();
        assert_eq!(draft.selected_services[0].price, 0.0);
        assert_eq!(draft.selected_services[0].quantity, 1);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let mut draft = BookingDraft::new();
        draft.vehicle_type = "sedan".to_string();
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(value["status"], "idle");
        assert_eq!(value["vehicleType"], "sedan");
        assert!(value["selectedServices"].is_array());
        assert!(value.get("startAt").is_none());
    }
}
