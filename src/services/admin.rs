use std::sync::Arc;

use crate::errors::ApiError;
use crate::models::{AdminBooking, BookingPatch, LineItem};

use super::api::BookingApi;

/// Authenticated handle on the booking CRUD endpoints.
pub struct AdminSession {
    api: Arc<dyn BookingApi>,
    token: String,
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession").finish_non_exhaustive()
    }
}

impl AdminSession {
    pub async fn login(
        api: Arc<dyn BookingApi>,
        email: &str,
        password: &str,
    ) -> Result<Self, ApiError> {
        let token = api.login(email, password).await?;
        Ok(Self { api, token })
    }

    /// All bookings, deduplicated by id, newest start first.
    pub async fn bookings(&self) -> Result<Vec<AdminBooking>, ApiError> {
        let rows = self.api.list_bookings(&self.token).await?;
        let mut rows = dedupe_by_id(rows);
        rows.sort_by_key(|b| std::cmp::Reverse(start_timestamp(b)));
        Ok(rows)
    }

    pub async fn approve(&self, id: &str) -> Result<AdminBooking, ApiError> {
        let patch = BookingPatch {
            status: Some("confirmed".to_string()),
            ..Default::default()
        };
        self.api.update_booking(&self.token, id, &patch).await
    }

    pub async fn update(&self, id: &str, patch: &BookingPatch) -> Result<AdminBooking, ApiError> {
        self.api.update_booking(&self.token, id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_booking(&self.token, id).await
    }

    /// Best-effort bulk delete; returns the ids that failed.
    pub async fn bulk_delete(&self, ids: &[String]) -> Vec<String> {
        let mut failed = Vec::new();
        for id in ids {
            if let Err(err) = self.delete(id).await {
                tracing::warn!(%id, "bulk delete failed: {err}");
                failed.push(id.clone());
            }
        }
        failed
    }
}

pub fn dedupe_by_id(rows: Vec<AdminBooking>) -> Vec<AdminBooking> {
    let mut seen = std::collections::HashSet::new();
    rows.into_iter()
        .filter(|b| b.id.is_empty() || seen.insert(b.id.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    StartAt,
    TotalPrice,
    Status,
    CustomerName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

/// The dashboard's list controls: free-text search, status filter, sorting
/// and fixed-size pagination, all client-side over the fetched rows.
#[derive(Debug, Clone)]
pub struct BookingFilter {
    pub query: String,
    /// `None` shows every status.
    pub status: Option<String>,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
    pub page: usize,
    pub page_size: usize,
}

impl Default for BookingFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            status: None,
            sort_key: SortKey::default(),
            sort_dir: SortDir::default(),
            page: 1,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<AdminBooking>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_matching: usize,
}

pub fn filter_and_sort(rows: &[AdminBooking], filter: &BookingFilter) -> Vec<AdminBooking> {
    let needle = filter.query.trim().to_lowercase();
    let mut matching: Vec<AdminBooking> = rows
        .iter()
        .filter(|b| {
            if let Some(status) = &filter.status {
                if &b.status != status {
                    return false;
                }
            }
            if needle.is_empty() {
                return true;
            }
            haystack(b).contains(&needle)
        })
        .cloned()
        .collect();

    matching.sort_by(|a, b| {
        let ordering = match filter.sort_key {
            SortKey::StartAt => start_timestamp(a).cmp(&start_timestamp(b)),
            SortKey::TotalPrice => a
                .total_price
                .partial_cmp(&b.total_price)
                .unwrap_or(std::cmp::Ordering::Equal),
            SortKey::Status => a.status.cmp(&b.status),
            SortKey::CustomerName => a.customer_name.cmp(&b.customer_name),
        };
        match filter.sort_dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });

    matching
}

pub fn paginate(rows: Vec<AdminBooking>, filter: &BookingFilter) -> Page {
    let page_size = filter.page_size.max(1);
    let total_matching = rows.len();
    let total_pages = (total_matching.div_ceil(page_size)).max(1);
    let current_page = filter.page.clamp(1, total_pages);
    let start = (current_page - 1) * page_size;
    let items = rows.into_iter().skip(start).take(page_size).collect();
    Page {
        items,
        current_page,
        total_pages,
        total_matching,
    }
}

/// CSV of the visible rows, matching the dashboard's export columns.
pub fn export_csv(rows: &[AdminBooking]) -> String {
    let headers = [
        "ID", "Client", "Phone", "Email", "Vehicle", "Services", "StartAt", "EndAt", "Status",
        "TotalPrice",
    ];

    let mut out = String::new();
    push_row(&mut out, headers.iter().map(|h| h.to_string()));

    for b in rows {
        let vehicle = b
            .vehicle
            .as_ref()
            .map(|v| {
                [v.make.as_str(), v.model.as_str(), v.year.as_str()]
                    .iter()
                    .filter(|s| !s.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        let services = b
            .services
            .iter()
            .map(|s: &LineItem| s.title.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("; ");

        push_row(
            &mut out,
            [
                b.id.clone(),
                b.customer_name.clone(),
                b.phone.clone(),
                b.email.clone(),
                vehicle,
                services,
                b.start_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                b.end_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                b.status.clone(),
                format!("{}", b.total_price),
            ]
            .into_iter(),
        );
    }

    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let row = cells
        .map(|c| format!("\"{}\"", c.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push('\n');
}

fn haystack(b: &AdminBooking) -> String {
    let mut parts: Vec<&str> = vec![&b.customer_name, &b.phone, &b.email, &b.address];
    if let Some(v) = &b.vehicle {
        parts.push(&v.make);
        parts.push(&v.model);
        parts.push(&v.license_plate);
    }
    for s in &b.services {
        parts.push(&s.title);
    }
    parts
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn start_timestamp(b: &AdminBooking) -> i64 {
    b.start_at.map(|t| t.timestamp()).unwrap_or(0)
}
