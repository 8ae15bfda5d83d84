use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use detailbook::config::AppConfig;
use detailbook::db;
use detailbook::duration::display_duration;
use detailbook::errors::SubmitError;
use detailbook::models::{
    addons_for, services_for, CatalogEntry, CustomerInfo, DraftStatus, Slot, VehicleInfo,
    VEHICLE_TYPES,
};
use detailbook::services::api::http::HttpBookingApi;
use detailbook::services::api::BookingApi;
use detailbook::services::{spawn_draft_sync, AvailabilityQuery, CheckoutSubmitter, DraftManager};
use detailbook::store::{DraftStore, StoreEvent};
use detailbook::wizard::{Step, Wizard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let config = AppConfig::from_env();
    let conn = db::init_db(&config.database_url)?;

    let (store_tx, _) = broadcast::channel::<StoreEvent>(32);
    let store = Arc::new(DraftStore::open(
        Arc::new(Mutex::new(conn)),
        store_tx,
        Duration::from_millis(config.persist_debounce_ms),
    ));
    let manager = Arc::new(DraftManager::open(Arc::clone(&store)));
    let _sync = spawn_draft_sync(Arc::clone(&manager), Arc::clone(&store));

    let api: Arc<dyn BookingApi> = Arc::new(HttpBookingApi::new(config.api_base_url.clone()));
    let availability = AvailabilityQuery::new(Arc::clone(&api));
    let submitter = CheckoutSubmitter::new(
        Arc::clone(&api),
        Duration::from_secs(config.submit_timeout_secs),
    );

    println!("Precision Detailing — book your appointment");
    if manager.snapshot().status == DraftStatus::InProgress {
        println!("(picking up your saved draft)");
    }

    let mut wizard = Wizard::new();
    loop {
        let step = wizard.current();
        println!("\n── Step {}/{}: {} ──", step.position(), Step::COUNT, step.title());

        let done = match step {
            Step::ChooseVehicle => choose_vehicle(&manager, &mut wizard),
            Step::PickServices => pick_items(&manager, &mut wizard, ItemKind::Service),
            Step::Addons => pick_items(&manager, &mut wizard, ItemKind::Addon),
            Step::Summary => summary(&manager, &mut wizard),
            Step::Schedule => schedule(&manager, &mut wizard, &availability).await,
            Step::Confirmation => confirmation(&manager, &mut wizard, &submitter).await,
        };
        if done {
            break;
        }
    }

    Ok(())
}

fn prompt(label: &str) -> String {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return String::new();
    }
    line.trim().to_string()
}

fn report_gate(result: Result<Step, detailbook::wizard::StepBlocked>) {
    if let Err(blocked) = result {
        println!("{blocked}");
    }
}

fn choose_vehicle(manager: &DraftManager, wizard: &mut Wizard) -> bool {
    let current = manager.snapshot().vehicle_type;
    for (i, vt) in VEHICLE_TYPES.iter().enumerate() {
        let marker = if *vt == current { "●" } else { " " };
        println!("  {marker} {}. {vt}", i + 1);
    }
    let input = prompt("Vehicle number (or Enter to keep): ");
    if let Ok(n) = input.parse::<usize>() {
        if let Some(vt) = VEHICLE_TYPES.get(n.wrapping_sub(1)) {
            manager.set_vehicle_type(vt);
        }
    }
    report_gate(wizard.advance(&manager.snapshot()));
    false
}

enum ItemKind {
    Service,
    Addon,
}

fn pick_items(manager: &DraftManager, wizard: &mut Wizard, kind: ItemKind) -> bool {
    let draft = manager.snapshot();
    let entries: &[CatalogEntry] = match kind {
        ItemKind::Service => services_for(&draft.vehicle_type),
        ItemKind::Addon => addons_for(&draft.vehicle_type),
    };
    let selected = match kind {
        ItemKind::Service => &draft.selected_services,
        ItemKind::Addon => &draft.selected_addons,
    };

    for (i, entry) in entries.iter().enumerate() {
        let qty = selected
            .iter()
            .find(|s| s.id == entry.id)
            .map(|s| s.quantity)
            .unwrap_or(0);
        let marker = if qty > 0 { format!("×{qty}") } else { "  ".to_string() };
        println!(
            "  {marker} {}. {} — ${:.2} ({})",
            i + 1,
            entry.title,
            entry.price(),
            display_duration(entry.duration)
        );
    }
    println!("  total so far: ${:.2}", manager.total_price());

    let input = prompt("Toggle #, +# / -# for quantity, c = continue, b = back: ");
    match input.as_str() {
        "c" => report_gate(wizard.advance(&manager.snapshot())),
        "b" => {
            wizard.back();
        }
        other => {
            let (op, rest) = match other.as_bytes().first() {
                Some(b'+') => ('+', &other[1..]),
                Some(b'-') => ('-', &other[1..]),
                _ => (' ', other),
            };
            if let Ok(n) = rest.trim().parse::<usize>() {
                if let Some(entry) = entries.get(n.wrapping_sub(1)) {
                    match (op, &kind) {
                        ('+', ItemKind::Service) => manager.increment_service(entry.id),
                        ('-', ItemKind::Service) => manager.decrement_service(entry.id),
                        ('+', ItemKind::Addon) => manager.increment_addon(entry.id),
                        ('-', ItemKind::Addon) => manager.decrement_addon(entry.id),
                        (_, ItemKind::Service) => manager.toggle_service(entry.line_item()),
                        (_, ItemKind::Addon) => manager.toggle_addon(entry.line_item()),
                    }
                }
            }
        }
    }
    false
}

fn summary(manager: &DraftManager, wizard: &mut Wizard) -> bool {
    let draft = manager.snapshot();
    for item in draft.selected_services.iter().chain(&draft.selected_addons) {
        println!("  {} ×{} — ${:.2}", item.title, item.quantity, item.price * item.quantity as f64);
    }
    println!("  estimated time: {}", detailbook::duration::format_duration(draft.total_duration_minutes()));
    println!("  total: ${:.2}", draft.total_price());

    match prompt("c = continue to booking, b = back: ").as_str() {
        "b" => {
            wizard.back();
        }
        _ => report_gate(wizard.advance(&draft)),
    }
    false
}

async fn schedule(
    manager: &DraftManager,
    wizard: &mut Wizard,
    availability: &AvailabilityQuery,
) -> bool {
    let input = prompt("Preferred date (YYYY-MM-DD), b = back: ");
    if input == "b" {
        wizard.back();
        return false;
    }
    let date = match input.parse::<chrono::NaiveDate>() {
        Ok(date) => date,
        Err(_) => {
            println!("Not a valid date.");
            return false;
        }
    };

    // A new date invalidates any previously chosen slot
    manager.clear_schedule();
    println!("Loading slots…");
    let slots: Vec<Slot> = match availability.slots_for(date).await {
        Ok(Some(slots)) => slots,
        Ok(None) => return false,
        Err(err) => {
            println!("{err}");
            println!("Pick the date again to retry.");
            return false;
        }
    };
    if slots.is_empty() {
        println!("No slots available for this date.");
        return false;
    }

    for (i, slot) in slots.iter().enumerate() {
        let suffix = if slot.booked { " (Booked)" } else { "" };
        println!("  {}. {}{suffix}", i + 1, slot.label);
    }
    let chosen = prompt("Slot number: ");
    let slot = match chosen
        .parse::<usize>()
        .ok()
        .and_then(|n| slots.get(n.wrapping_sub(1)))
    {
        Some(slot) if !slot.booked => slot,
        Some(_) => {
            println!("That slot is already booked.");
            return false;
        }
        None => return false,
    };
    manager.set_schedule(
        slot.start.date_naive(),
        &slot.label,
        slot.start.with_timezone(&chrono::Utc),
    );

    let draft = manager.snapshot();
    let ci = draft.customer_info;
    manager.set_customer_info(CustomerInfo {
        name: prompt_default("Full name", &ci.name),
        email: prompt_default("Email", &ci.email),
        phone: prompt_default("Phone", &ci.phone),
        address: prompt_default("Service address", &ci.address),
        notes: prompt_default("Special instructions", &ci.notes),
    });
    let vi = draft.vehicle_info;
    manager.set_vehicle_info(VehicleInfo {
        make: prompt_default("Make", &vi.make),
        model: prompt_default("Model", &vi.model),
        year: prompt_default("Year", &vi.year),
        color: prompt_default("Color", &vi.color),
        license_plate: prompt_default("License plate", &vi.license_plate),
    });

    report_gate(wizard.advance(&manager.snapshot()));
    false
}

fn prompt_default(label: &str, current: &str) -> String {
    let shown = if current.is_empty() {
        format!("{label}: ")
    } else {
        format!("{label} [{current}]: ")
    };
    let input = prompt(&shown);
    if input.is_empty() {
        current.to_string()
    } else {
        input
    }
}

async fn confirmation(
    manager: &DraftManager,
    wizard: &mut Wizard,
    submitter: &CheckoutSubmitter,
) -> bool {
    let draft = manager.snapshot();
    let services: Vec<&str> = draft
        .selected_services
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    println!("  Services: {}", if services.is_empty() { "None".to_string() } else { services.join(", ") });
    if let Some(date) = draft.selected_date {
        println!("  Date: {} at {}", date.format("%B %-d, %Y"), draft.selected_time_label);
    }
    println!("  Customer: {}", draft.customer_info.name);
    println!(
        "  Vehicle: {} {} {}",
        draft.vehicle_info.year, draft.vehicle_info.make, draft.vehicle_info.model
    );
    println!("  Total: ${:.2} (payment due at service completion)", draft.total_price());

    match prompt("y = confirm booking, b = back: ").as_str() {
        "b" => {
            wizard.back();
            false
        }
        "y" => match submitter.submit(manager).await {
            Ok(receipt) => {
                println!("Booking successfully confirmed.");
                if let Some(id) = &receipt.id {
                    println!("  confirmation id: {id}");
                }
                if let Some(start) = receipt.start_at {
                    println!("  scheduled for {}", start.to_rfc3339());
                }
                println!("  total: ${:.2}", receipt.total_price);
                true
            }
            Err(SubmitError::InFlight) => false,
            Err(err) => {
                // Draft is intact; the user can retry or go back
                println!("{err}");
                false
            }
        },
        _ => false,
    }
}
