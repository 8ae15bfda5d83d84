use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::draft::{money, BookingDraft, CustomerInfo, LineItem, VehicleInfo};

/// Every bookable slot is one business hour.
pub const BUSINESS_MINUTES_PER_SLOT: u32 = 60;

/// Line item as the booking-creation endpoint expects it (no quantity; the
/// backend prices each entry individually).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLineItem {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub duration_minutes: u32,
}

impl WireLineItem {
    fn from_item(item: &LineItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            price: money::coerce_f64(item.price),
            duration_minutes: item.duration_minutes.unwrap_or(BUSINESS_MINUTES_PER_SLOT),
        }
    }
}

/// Payload for `POST /api/bookings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub customer_info: CustomerInfo,
    pub vehicle_info: VehicleInfo,
    pub selected_services: Vec<WireLineItem>,
    pub selected_addons: Vec<WireLineItem>,
    pub total_price: f64,
    pub start_at: DateTime<Utc>,
    pub notes: String,
    pub address: String,
}

impl BookingRequest {
    /// Shape the draft for the wire. This only coerces structure (duration
    /// defaults, numeric total); business completeness is the wizard's job.
    /// Returns `None` when no concrete slot was ever chosen.
    pub fn from_draft(draft: &BookingDraft) -> Option<Self> {
        let start_at = draft.start_at?;
        Some(Self {
            customer_info: draft.customer_info.clone(),
            vehicle_info: draft.vehicle_info.clone(),
            selected_services: draft
                .selected_services
                .iter()
                .map(WireLineItem::from_item)
                .collect(),
            selected_addons: draft
                .selected_addons
                .iter()
                .map(WireLineItem::from_item)
                .collect(),
            total_price: draft.total_price(),
            start_at,
            notes: draft.customer_info.notes.clone(),
            address: draft.customer_info.address.clone(),
        })
    }
}

/// The backend's booking representation inside a creation response. Every
/// field is optional; whatever is present wins over the local draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAck {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
    #[serde(default)]
    pub vehicle_info: Option<VehicleInfo>,
    #[serde(default)]
    pub selected_services: Option<Vec<LineItem>>,
    #[serde(default)]
    pub selected_addons: Option<Vec<LineItem>>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
}

/// What the user sees after a successful confirmation: the draft overlaid
/// with the backend's canonical fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Option<String>,
    pub status: String,
    pub vehicle_type: String,
    pub customer_info: CustomerInfo,
    pub vehicle_info: VehicleInfo,
    pub selected_services: Vec<LineItem>,
    pub selected_addons: Vec<LineItem>,
    pub total_price: f64,
    pub start_at: Option<DateTime<Utc>>,
    pub notes: String,
    pub address: String,
}

impl Receipt {
    pub fn merge(draft: &BookingDraft, ack: BookingAck) -> Self {
        let customer_info = ack
            .customer_info
            .unwrap_or_else(|| draft.customer_info.clone());
        let address = if customer_info.address.is_empty() {
            draft.customer_info.address.clone()
        } else {
            customer_info.address.clone()
        };
        Self {
            id: ack.id,
            status: ack.status.unwrap_or_else(|| "pending".to_string()),
            vehicle_type: draft.vehicle_type.clone(),
            vehicle_info: ack.vehicle_info.unwrap_or_else(|| draft.vehicle_info.clone()),
            selected_services: ack
                .selected_services
                .unwrap_or_else(|| draft.selected_services.clone()),
            selected_addons: ack
                .selected_addons
                .unwrap_or_else(|| draft.selected_addons.clone()),
            total_price: ack.total_price.unwrap_or_else(|| draft.total_price()),
            start_at: ack.start_at.or(draft.start_at),
            notes: customer_info.notes.clone(),
            customer_info,
            address,
        }
    }
}

/// A booking row as the admin listing endpoint returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBooking {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub vehicle: Option<VehicleInfo>,
    #[serde(default)]
    pub services: Vec<LineItem>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "money::lenient")]
    pub total_price: f64,
}

/// Partial update for `PUT /api/bookings/:id`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<LineItem>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_schedule() -> BookingDraft {
        let mut draft = BookingDraft::new();
        draft.vehicle_type = "sedan".to_string();
        draft.toggle_service(LineItem::new("sedan-detail-full", "Interior + Exterior", 200.0));
        draft.toggle_addon(LineItem::new("sedan-addon-engine", "Engine Bay Wash", 80.0));
        draft.customer_info.name = "Alice".to_string();
        draft.customer_info.address = "12 King St W".to_string();
        draft.customer_info.notes = "gate code 4411".to_string();
        draft.start_at = Some("2025-09-03T18:00:00Z".parse().unwrap());
        draft
    }

    #[test]
    fn test_request_requires_start_at() {
        let draft = BookingDraft::new();
        assert!(BookingRequest::from_draft(&draft).is_none());
    }

    #[test]
    fn test_request_shape() {
        let req = BookingRequest::from_draft(&draft_with_schedule()).unwrap();
        assert_eq!(req.total_price, 280.0);
        assert_eq!(req.notes, "gate code 4411");
        assert_eq!(req.address, "12 King St W");
        assert_eq!(req.selected_services[0].duration_minutes, BUSINESS_MINUTES_PER_SLOT);

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["selectedServices"][0]["durationMinutes"], 60);
        assert_eq!(value["startAt"], "2025-09-03T18:00:00Z");
    }

    #[test]
    fn test_merge_backend_fields_win() {
        let draft = draft_with_schedule();
        let ack = BookingAck {
            id: Some("bk-42".to_string()),
            status: Some("confirmed".to_string()),
            total_price: Some(275.5),
            ..Default::default()
        };
        let receipt = Receipt::merge(&draft, ack);
        assert_eq!(receipt.id.as_deref(), Some("bk-42"));
        assert_eq!(receipt.status, "confirmed");
        assert_eq!(receipt.total_price, 275.5);
        // Fields the backend omitted fall back to the draft
        assert_eq!(receipt.customer_info.name, "Alice");
        assert_eq!(receipt.selected_services.len(), 1);
        assert_eq!(receipt.start_at, draft.start_at);
    }

    #[test]
    fn test_merge_defaults_without_ack_fields() {
        let draft = draft_with_schedule();
        let receipt = Receipt::merge(&draft, BookingAck::default());
        assert_eq!(receipt.status, "pending");
        assert_eq!(receipt.total_price, 280.0);
        assert_eq!(receipt.address, "12 King St W");
    }

    #[test]
    fn test_admin_booking_accepts_mongo_ids_and_string_totals() {
        let json = r#"{
            "_id": "65f0",
            "customerName": "Bob",
            "status": "pending",
            "totalPrice": "150.00",
            "services": [{"title":"Interior Only","price":150}]
        }"#;
        let b: AdminBooking = serde_json::from_str(json).unwrap();
        assert_eq!(b.id, "65f0");
        assert_eq!(b.total_price, 150.0);
        assert_eq!(b.services[0].id, "");
    }
}
