use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use super::BookingApi;
use crate::errors::ApiError;
use crate::models::{AdminBooking, BookingAck, BookingPatch, BookingRequest, SlotDescriptor};

pub struct HttpBookingApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBookingApi {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Read a response body the way the web client did: empty body becomes
    /// `{}`, non-2xx surfaces the backend's `message` when it sent one.
    async fn read_json(resp: reqwest::Response) -> Result<Value, ApiError> {
        let status = resp.status();
        let text = resp.text().await?;
        let value: Value = if text.is_empty() {
            json!({})
        } else {
            serde_json::from_str(&text)?
        };
        if !status.is_success() {
            let message = value
                .get("message")
                .and_then(|m| m.as_str())
                .map(String::from);
            return Err(ApiError::backend(status.as_u16(), message));
        }
        Ok(value)
    }
}

// Creation and update responses nest the booking under `booking` or `data`
// depending on the backend version; older deployments return it bare.
fn unwrap_booking(value: Value) -> Value {
    if let Value::Object(map) = &value {
        if let Some(inner) = map.get("booking").or_else(|| map.get("data")) {
            if !inner.is_null() {
                return inner.clone();
            }
        }
    }
    value
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn availability(&self, date: NaiveDate) -> Result<Vec<SlotDescriptor>, ApiError> {
        let resp = self
            .client
            .get(self.url("/api/bookings/availability"))
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await?;
        let value = Self::read_json(resp).await?;

        let slots = value
            .get("availableSlots")
            .cloned()
            .unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(slots)?)
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingAck, ApiError> {
        let resp = self
            .client
            .post(self.url("/api/bookings"))
            .json(request)
            .send()
            .await?;
        let value = Self::read_json(resp).await?;
        Ok(serde_json::from_value(unwrap_booking(value))?)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let value = Self::read_json(resp).await?;

        value
            .get("token")
            .and_then(|t| t.as_str())
            .map(String::from)
            .ok_or_else(|| ApiError::backend(200, Some("login response had no token".to_string())))
    }

    async fn list_bookings(&self, token: &str) -> Result<Vec<AdminBooking>, ApiError> {
        let resp = self
            .client
            .get(self.url("/api/bookings"))
            .bearer_auth(token)
            .send()
            .await?;
        let value = Self::read_json(resp).await?;

        // Bare array, or wrapped under `bookings`/`data`
        let rows = match &value {
            Value::Array(_) => value.clone(),
            Value::Object(map) => map
                .get("bookings")
                .or_else(|| map.get("data"))
                .cloned()
                .unwrap_or_else(|| json!([])),
            _ => json!([]),
        };
        Ok(serde_json::from_value(rows)?)
    }

    async fn update_booking(
        &self,
        token: &str,
        id: &str,
        patch: &BookingPatch,
    ) -> Result<AdminBooking, ApiError> {
        let resp = self
            .client
            .put(self.url(&format!("/api/bookings/{id}")))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        let value = Self::read_json(resp).await?;
        Ok(serde_json::from_value(unwrap_booking(value))?)
    }

    async fn delete_booking(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/bookings/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(resp).await?;
        Ok(())
    }
}
