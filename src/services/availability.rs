use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::ApiError;
use crate::models::Slot;

use super::api::BookingApi;

/// Fetches bookable slots for a calendar date.
///
/// Re-querying for a new date supersedes any request still in flight: the
/// older response (including its error) is dropped silently, so stale slots
/// can never overwrite the list for the currently selected date.
pub struct AvailabilityQuery {
    api: Arc<dyn BookingApi>,
    epoch: AtomicU64,
}

impl AvailabilityQuery {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self {
            api,
            epoch: AtomicU64::new(0),
        }
    }

    /// `Ok(None)` means this call was superseded by a newer one. An empty
    /// slot list is a valid answer ("no slots available"), distinct from an
    /// error.
    pub async fn slots_for(&self, date: NaiveDate) -> Result<Option<Vec<Slot>>, ApiError> {
        let token = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.api.availability(date).await;

        if self.epoch.load(Ordering::SeqCst) != token {
            tracing::debug!(%date, "dropping superseded availability response");
            return Ok(None);
        }

        let descriptors = result?;
        Ok(Some(
            descriptors.into_iter().map(Slot::from_descriptor).collect(),
        ))
    }

    /// Invalidate whatever is in flight (component teardown, date cleared).
    pub fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}
