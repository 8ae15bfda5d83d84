pub mod booking;
pub mod catalog;
pub mod draft;
pub mod slot;

pub use booking::{AdminBooking, BookingAck, BookingPatch, BookingRequest, Receipt, WireLineItem};
pub use catalog::{addons_for, services_for, CatalogEntry, VEHICLE_TYPES};
pub use draft::{BookingDraft, CustomerInfo, DraftStatus, LineItem, VehicleInfo, SCHEMA_VERSION};
pub use slot::{Slot, SlotDescriptor};
