use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Wire shape of one availability slot as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDescriptor {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub booked: bool,
}

/// A bookable time interval, labeled for display ("2:00 PM").
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub label: String,
    pub booked: bool,
}

impl Slot {
    /// The label keeps the offset the backend sent, so it renders the shop's
    /// local clock time regardless of where the client runs.
    pub fn from_descriptor(d: SlotDescriptor) -> Self {
        let label = d.start.format("%-I:%M %p").to_string();
        Self {
            start: d.start,
            end: d.end,
            label,
            booked: d.booked,
        }
    }
}
