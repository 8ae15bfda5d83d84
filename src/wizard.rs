use crate::models::BookingDraft;

/// The funnel's steps, in visiting order. The schedule step carries the
/// date/time picker plus the contact and vehicle forms; confirmation is the
/// final review-and-submit screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ChooseVehicle,
    PickServices,
    Addons,
    Summary,
    Schedule,
    Confirmation,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::ChooseVehicle => "Choose Your Vehicle",
            Step::PickServices => "Choose Your Service",
            Step::Addons => "Add-ons",
            Step::Summary => "Summary",
            Step::Schedule => "Book Your Appointment",
            Step::Confirmation => "Review Your Booking",
        }
    }

    /// 1-based position for a progress tracker.
    pub fn position(&self) -> usize {
        match self {
            Step::ChooseVehicle => 1,
            Step::PickServices => 2,
            Step::Addons => 3,
            Step::Summary => 4,
            Step::Schedule => 5,
            Step::Confirmation => 6,
        }
    }

    pub const COUNT: usize = 6;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StepBlocked {
    #[error("Select a vehicle type to continue.")]
    NoVehicleSelected,
    #[error("Select at least one service to continue.")]
    NoServicesSelected,
    #[error("Pick a date and an available time slot to continue.")]
    ScheduleIncomplete,
    #[error("Fill in the required contact and vehicle details to continue.")]
    DetailsIncomplete,
    #[error("Already at the confirmation step.")]
    AtEnd,
}

/// Sequences the funnel. Owns no booking data: every gate is a query against
/// the draft, and transitions only happen on explicit user action.
#[derive(Debug, Default)]
pub struct Wizard {
    current: Step,
}

impl Default for Step {
    fn default() -> Self {
        Step::ChooseVehicle
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Where "Continue" would land, or why it is blocked.
    pub fn next_step(&self, draft: &BookingDraft) -> Result<Step, StepBlocked> {
        match self.current {
            Step::ChooseVehicle => {
                if draft.vehicle_type.is_empty() {
                    Err(StepBlocked::NoVehicleSelected)
                } else {
                    Ok(Step::PickServices)
                }
            }
            Step::PickServices => {
                if draft.has_services() {
                    Ok(Step::Addons)
                } else {
                    Err(StepBlocked::NoServicesSelected)
                }
            }
            Step::Addons => {
                // Add-ons stay optional, but dropping the last service while
                // here re-blocks the path forward.
                if draft.has_services() {
                    Ok(Step::Summary)
                } else {
                    Err(StepBlocked::NoServicesSelected)
                }
            }
            Step::Summary => Ok(Step::Schedule),
            Step::Schedule => {
                if !draft.schedule_complete() {
                    Err(StepBlocked::ScheduleIncomplete)
                } else if !draft.customer_info.is_complete() || !draft.vehicle_info.is_complete() {
                    Err(StepBlocked::DetailsIncomplete)
                } else {
                    Ok(Step::Confirmation)
                }
            }
            Step::Confirmation => Err(StepBlocked::AtEnd),
        }
    }

    pub fn advance(&mut self, draft: &BookingDraft) -> Result<Step, StepBlocked> {
        let next = self.next_step(draft)?;
        self.current = next;
        Ok(next)
    }

    /// Always allowed; never touches the draft.
    pub fn back(&mut self) -> Step {
        self.current = match self.current {
            Step::ChooseVehicle | Step::PickServices => Step::ChooseVehicle,
            Step::Addons => Step::PickServices,
            Step::Summary => Step::Addons,
            Step::Schedule => Step::Summary,
            Step::Confirmation => Step::Schedule,
        };
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerInfo, LineItem, VehicleInfo};

    fn complete_draft() -> BookingDraft {
        let mut draft = BookingDraft::new();
        draft.vehicle_type = "sedan".to_string();
        draft.toggle_service(LineItem::new("sedan-detail-full", "Interior + Exterior", 200.0));
        draft.customer_info = CustomerInfo {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "416-555-0100".to_string(),
            address: "12 King St W".to_string(),
            notes: String::new(),
        };
        draft.vehicle_info = VehicleInfo {
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            year: "2021".to_string(),
            color: String::new(),
            license_plate: String::new(),
        };
        draft.selected_date = Some("2025-09-03".parse().unwrap());
        draft.selected_time_label = "2:00 PM".to_string();
        draft.start_at = Some("2025-09-03T18:00:00Z".parse().unwrap());
        draft
    }

    #[test]
    fn test_full_walk_through() {
        let draft = complete_draft();
        let mut wizard = Wizard::new();
        assert_eq!(wizard.advance(&draft).unwrap(), Step::PickServices);
        assert_eq!(wizard.advance(&draft).unwrap(), Step::Addons);
        assert_eq!(wizard.advance(&draft).unwrap(), Step::Summary);
        assert_eq!(wizard.advance(&draft).unwrap(), Step::Schedule);
        assert_eq!(wizard.advance(&draft).unwrap(), Step::Confirmation);
        assert_eq!(wizard.advance(&draft).unwrap_err(), StepBlocked::AtEnd);
    }

    #[test]
    fn test_vehicle_gate() {
        let mut wizard = Wizard::new();
        let draft = BookingDraft::new();
        assert_eq!(
            wizard.advance(&draft).unwrap_err(),
            StepBlocked::NoVehicleSelected
        );
        assert_eq!(wizard.current(), Step::ChooseVehicle);
    }

    #[test]
    fn test_services_gate() {
        let mut wizard = Wizard::new();
        let mut draft = BookingDraft::new();
        draft.vehicle_type = "suv".to_string();
        wizard.advance(&draft).unwrap();
        assert_eq!(
            wizard.advance(&draft).unwrap_err(),
            StepBlocked::NoServicesSelected
        );
    }

    #[test]
    fn test_schedule_and_details_gates() {
        let mut wizard = Wizard::new();
        let mut draft = complete_draft();
        draft.start_at = None;
        draft.selected_time_label = String::new();

        for _ in 0..4 {
            wizard.advance(&draft).unwrap();
        }
        assert_eq!(wizard.current(), Step::Schedule);
        assert_eq!(
            wizard.advance(&draft).unwrap_err(),
            StepBlocked::ScheduleIncomplete
        );

        draft.selected_time_label = "2:00 PM".to_string();
        draft.start_at = Some("2025-09-03T18:00:00Z".parse().unwrap());
        draft.customer_info.email = String::new();
        assert_eq!(
            wizard.advance(&draft).unwrap_err(),
            StepBlocked::DetailsIncomplete
        );

        draft.customer_info.email = "alice@example.com".to_string();
        assert_eq!(wizard.advance(&draft).unwrap(), Step::Confirmation);
    }

    #[test]
    fn test_back_then_forward_reproduces_state() {
        let draft = complete_draft();
        let before = draft.clone();
        let mut wizard = Wizard::new();
        wizard.advance(&draft).unwrap();
        wizard.advance(&draft).unwrap();
        assert_eq!(wizard.current(), Step::Addons);

        assert_eq!(wizard.back(), Step::PickServices);
        assert_eq!(wizard.back(), Step::ChooseVehicle);
        // Back from the first step stays put
        assert_eq!(wizard.back(), Step::ChooseVehicle);

        // Walking forward again lands on the same step, and navigation never
        // touched the draft
        assert_eq!(wizard.advance(&draft).unwrap(), Step::PickServices);
        assert_eq!(wizard.advance(&draft).unwrap(), Step::Addons);
        assert_eq!(draft, before);
    }

    #[test]
    fn test_dropping_last_service_reblocks_addons() {
        let mut wizard = Wizard::new();
        let mut draft = complete_draft();
        wizard.advance(&draft).unwrap();
        wizard.advance(&draft).unwrap();
        assert_eq!(wizard.current(), Step::Addons);

        draft.toggle_service(LineItem::new("sedan-detail-full", "Interior + Exterior", 200.0));
        assert_eq!(
            wizard.advance(&draft).unwrap_err(),
            StepBlocked::NoServicesSelected
        );
    }
}
