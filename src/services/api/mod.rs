pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::ApiError;
use crate::models::{AdminBooking, BookingAck, BookingPatch, BookingRequest, SlotDescriptor};

/// The shop's REST backend, behind a seam so tests can swap in mocks.
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// `GET /api/bookings/availability?date=YYYY-MM-DD`
    async fn availability(&self, date: NaiveDate) -> Result<Vec<SlotDescriptor>, ApiError>;

    /// `POST /api/bookings`
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingAck, ApiError>;

    /// `POST /api/auth/login`, returns the bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;

    /// `GET /api/bookings` (authenticated)
    async fn list_bookings(&self, token: &str) -> Result<Vec<AdminBooking>, ApiError>;

    /// `PUT /api/bookings/:id` (authenticated)
    async fn update_booking(
        &self,
        token: &str,
        id: &str,
        patch: &BookingPatch,
    ) -> Result<AdminBooking, ApiError>;

    /// `DELETE /api/bookings/:id` (authenticated)
    async fn delete_booking(&self, token: &str, id: &str) -> Result<(), ApiError>;
}
