use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::SubmitError;
use crate::models::{BookingAck, BookingRequest, Receipt};

use super::api::BookingApi;
use super::draft::DraftManager;

pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Converts the draft into the backend's shape and performs the booking
/// creation. On success the draft is confirmed (cleared); on any failure it
/// is left intact and in-progress so the user can retry without re-entering
/// anything.
pub struct CheckoutSubmitter {
    api: Arc<dyn BookingApi>,
    timeout: Duration,
    in_flight: AtomicBool,
}

impl CheckoutSubmitter {
    pub fn new(api: Arc<dyn BookingApi>, timeout: Duration) -> Self {
        Self {
            api,
            timeout,
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn submit(&self, manager: &DraftManager) -> Result<Receipt, SubmitError> {
        // One submission at a time; repeated triggers while in flight are
        // ignored by callers.
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SubmitError::InFlight);
        }
        let result = self.submit_inner(manager).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(&self, manager: &DraftManager) -> Result<Receipt, SubmitError> {
        let draft = manager.snapshot();
        let request = BookingRequest::from_draft(&draft).ok_or(SubmitError::NoBookingData)?;

        let ack = match tokio::time::timeout(self.timeout, self.api.create_booking(&request)).await
        {
            Err(_) => {
                tracing::warn!("booking submission timed out, draft left intact");
                return Err(SubmitError::TimedOut);
            }
            Ok(result) => result?,
        };

        if is_empty_ack(&ack) {
            return Err(SubmitError::EmptyResponse);
        }

        // Backend-confirmed fields take precedence over the local draft.
        let receipt = Receipt::merge(&draft, ack);
        manager.confirm();
        tracing::info!(booking_id = ?receipt.id, "booking confirmed");
        Ok(receipt)
    }
}

// A response that names nothing we can show is treated as a failed creation.
fn is_empty_ack(ack: &BookingAck) -> bool {
    ack.id.is_none()
        && ack.status.is_none()
        && ack.start_at.is_none()
        && ack.total_price.is_none()
        && ack.selected_services.is_none()
}
