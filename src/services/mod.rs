pub mod admin;
pub mod api;
pub mod availability;
pub mod checkout;
pub mod draft;
pub mod sync;

pub use availability::AvailabilityQuery;
pub use checkout::CheckoutSubmitter;
pub use draft::DraftManager;
pub use sync::spawn_draft_sync;
