use crate::duration::parse_duration;

use super::draft::LineItem;

/// One offering in the shop's catalog, priced per vehicle type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub category: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub price_cents: u32,
    pub duration: &'static str,
}

impl CatalogEntry {
    pub fn price(&self) -> f64 {
        self.price_cents as f64 / 100.0
    }

    pub fn line_item(&self) -> LineItem {
        let mut item = LineItem::new(self.id, self.title, self.price());
        item.duration_minutes = parse_duration(self.duration).map(|r| r.avg).filter(|&m| m > 0);
        item
    }
}

pub const VEHICLE_TYPES: [&str; 4] = ["sedan", "suv", "truck", "coupe"];

const fn entry(
    id: &'static str,
    category: &'static str,
    title: &'static str,
    description: &'static str,
    price_cents: u32,
    duration: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        id,
        category,
        title,
        description,
        price_cents,
        duration,
    }
}

/// Detailing / paint-correction / coating services for one vehicle type.
pub fn services_for(vehicle_type: &str) -> &'static [CatalogEntry] {
    match vehicle_type {
        "sedan" => &SEDAN_SERVICES,
        "suv" => &SUV_SERVICES,
        "truck" => &TRUCK_SERVICES,
        "coupe" => &COUPE_SERVICES,
        _ => &[],
    }
}

pub fn addons_for(vehicle_type: &str) -> &'static [CatalogEntry] {
    match vehicle_type {
        "sedan" => &SEDAN_ADDONS,
        "suv" => &SUV_ADDONS,
        "truck" => &TRUCK_ADDONS,
        "coupe" => &COUPE_ADDONS,
        _ => &[],
    }
}

static SEDAN_SERVICES: [CatalogEntry; 6] = [
    entry(
        "sedan-detail-interior",
        "Detailing",
        "Interior Only",
        "Vacuum, garbage removal, carpets & seats steam cleaned, plastics conditioned, streak-free glass.",
        150_00,
        "2–3 hrs",
    ),
    entry(
        "sedan-detail-exterior",
        "Detailing",
        "Exterior Only",
        "Rims & tires deep clean, pre-treatment, foam wash, hand dry, sealant, tire shine.",
        150_00,
        "2 hrs",
    ),
    entry(
        "sedan-detail-full",
        "Detailing",
        "Interior + Exterior",
        "Complete detail inside and out.",
        200_00,
        "3–4 hrs",
    ),
    entry(
        "sedan-engine",
        "Detailing",
        "Engine Bay Wash",
        "Degrease & detail engine bay, safe for electronics.",
        80_00,
        "45 mins",
    ),
    entry(
        "sedan-pc-1",
        "Paint Correction",
        "Stage 1 Paint Correction",
        "Single-stage machine polish removing light swirls.",
        399_00,
        "4–5 hrs",
    ),
    entry(
        "sedan-ceramic",
        "Ceramic Coating",
        "Ceramic Coating",
        "Multi-year ceramic protection over corrected paint.",
        800_00,
        "6–8 hrs",
    ),
];

static SUV_SERVICES: [CatalogEntry; 6] = [
    entry(
        "suv-detail-interior",
        "Detailing",
        "Interior Only",
        "Full interior reset for three-row and cargo layouts.",
        165_00,
        "3 hrs",
    ),
    entry(
        "suv-detail-exterior",
        "Detailing",
        "Exterior Only",
        "Foam wash, hand dry, sealant, tire shine on larger panels.",
        165_00,
        "2–3 hrs",
    ),
    entry(
        "suv-detail-full",
        "Detailing",
        "Interior + Exterior",
        "Complete detail inside and out.",
        225_00,
        "4–5 hrs",
    ),
    entry(
        "suv-engine",
        "Detailing",
        "Engine Bay Wash",
        "Degrease & detail engine bay, safe for electronics.",
        90_00,
        "45 mins",
    ),
    entry(
        "suv-pc-1",
        "Paint Correction",
        "Stage 1 Paint Correction",
        "Single-stage machine polish removing light swirls.",
        399_00,
        "5–6 hrs",
    ),
    entry(
        "suv-ceramic",
        "Ceramic Coating",
        "Ceramic Coating",
        "Multi-year ceramic protection over corrected paint.",
        800_00,
        "7–9 hrs",
    ),
];

static TRUCK_SERVICES: [CatalogEntry; 6] = [
    entry(
        "truck-detail-interior",
        "Detailing",
        "Interior Only",
        "Cab deep clean, mats restored, upholstery conditioned.",
        170_00,
        "3 hrs",
    ),
    entry(
        "truck-detail-exterior",
        "Detailing",
        "Exterior Only",
        "Foam wash, hand dry, sealant, bed and rocker degrease.",
        170_00,
        "3 hrs",
    ),
    entry(
        "truck-detail-full",
        "Detailing",
        "Interior + Exterior",
        "Complete detail inside and out.",
        250_00,
        "4–6 hrs",
    ),
    entry(
        "truck-engine",
        "Detailing",
        "Engine Bay Wash",
        "Degrease & detail engine bay, safe for electronics.",
        100_00,
        "1h",
    ),
    entry(
        "truck-pc-1",
        "Paint Correction",
        "Stage 1 Paint Correction",
        "Single-stage machine polish removing light swirls.",
        399_00,
        "5–6 hrs",
    ),
    entry(
        "truck-ceramic",
        "Ceramic Coating",
        "Ceramic Coating",
        "Multi-year ceramic protection over corrected paint.",
        800_00,
        "7–9 hrs",
    ),
];

static COUPE_SERVICES: [CatalogEntry; 6] = [
    entry(
        "coupe-detail-interior",
        "Detailing",
        "Interior Only",
        "Two-door interior reset, carpets and seats steam cleaned.",
        140_00,
        "2 hrs",
    ),
    entry(
        "coupe-detail-exterior",
        "Detailing",
        "Exterior Only",
        "Foam wash, hand dry, sealant, tire shine.",
        140_00,
        "2 hrs",
    ),
    entry(
        "coupe-detail-full",
        "Detailing",
        "Interior + Exterior",
        "Complete detail inside and out.",
        190_00,
        "3–4 hrs",
    ),
    entry(
        "coupe-engine",
        "Detailing",
        "Engine Bay Wash",
        "Degrease & detail engine bay, safe for electronics.",
        75_00,
        "45 mins",
    ),
    entry(
        "coupe-pc-1",
        "Paint Correction",
        "Stage 1 Paint Correction",
        "Single-stage machine polish removing light swirls.",
        380_00,
        "4–5 hrs",
    ),
    entry(
        "coupe-ceramic",
        "Ceramic Coating",
        "Ceramic Coating",
        "Multi-year ceramic protection over corrected paint.",
        750_00,
        "6–8 hrs",
    ),
];

static SEDAN_ADDONS: [CatalogEntry; 2] = [
    entry(
        "sedan-addon-headlight",
        "Add-on",
        "Headlight Restoration",
        "Wet sand, polish and UV-seal both lenses.",
        79_99,
        "45 mins",
    ),
    entry(
        "sedan-addon-engine",
        "Add-on",
        "Engine Bay Wash",
        "Degrease & dress, safe for electronics.",
        80_00,
        "45 mins",
    ),
];

static SUV_ADDONS: [CatalogEntry; 2] = [
    entry(
        "suv-addon-headlight",
        "Add-on",
        "Headlight Restoration",
        "Wet sand, polish and UV-seal both lenses.",
        79_99,
        "45 mins",
    ),
    entry(
        "suv-addon-engine",
        "Add-on",
        "Engine Bay Wash",
        "Degrease & dress, safe for electronics.",
        90_00,
        "45 mins",
    ),
];

static TRUCK_ADDONS: [CatalogEntry; 2] = [
    entry(
        "truck-addon-headlight",
        "Add-on",
        "Headlight Restoration",
        "Wet sand, polish and UV-seal both lenses.",
        79_99,
        "45 mins",
    ),
    entry(
        "truck-addon-engine",
        "Add-on",
        "Engine Bay Wash",
        "Degrease & dress, safe for electronics.",
        100_00,
        "1h",
    ),
];

static COUPE_ADDONS: [CatalogEntry; 2] = [
    entry(
        "coupe-addon-headlight",
        "Add-on",
        "Headlight Restoration",
        "Wet sand, polish and UV-seal both lenses.",
        70_00,
        "45 mins",
    ),
    entry(
        "coupe-addon-engine",
        "Add-on",
        "Engine Bay Wash",
        "Degrease & dress, safe for electronics.",
        75_00,
        "45 mins",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vehicle_type_has_a_catalog() {
        for vt in VEHICLE_TYPES {
            assert!(!services_for(vt).is_empty(), "no services for {vt}");
            assert!(!addons_for(vt).is_empty(), "no addons for {vt}");
        }
        assert!(services_for("spaceship").is_empty());
    }

    #[test]
    fn test_catalog_ids_are_unique_per_vehicle() {
        for vt in VEHICLE_TYPES {
            let mut ids: Vec<&str> = services_for(vt)
                .iter()
                .chain(addons_for(vt))
                .map(|e| e.id)
                .collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), before, "duplicate catalog id for {vt}");
        }
    }

    #[test]
    fn test_line_item_carries_price_and_duration() {
        let full = services_for("sedan")
            .iter()
            .find(|e| e.id == "sedan-detail-full")
            .unwrap();
        let item = full.line_item();
        assert_eq!(item.price, 200.0);
        assert_eq!(item.quantity, 1);
        // "3–4 hrs" averages to 210 minutes
        assert_eq!(item.duration_minutes, Some(210));
    }

    #[test]
    fn test_fractional_prices_survive() {
        let headlight = addons_for("sedan")
            .iter()
            .find(|e| e.id == "sedan-addon-headlight")
            .unwrap();
        assert_eq!(headlight.price(), 79.99);
    }
}
