// Wire types for the biosite platform admin API.
//
// Field names follow the platform's camelCase JSON. These are transport
// shapes only — `biodash-core` converts them into domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Pagination envelope ──────────────────────────────────────────────

/// Paginated response envelope returned by the full-access listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
}

// ── Biosite ──────────────────────────────────────────────────────────

/// A tenant micro-site record as returned by the listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiositeRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    /// Public URL slug; `None` when the site has not claimed one yet.
    #[serde(default)]
    pub slug: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner's public handle (denormalized by the server for display).
    #[serde(default)]
    pub owner_handle: Option<String>,
}

// ── Links ────────────────────────────────────────────────────────────

/// A single link row belonging to a biosite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub id: Uuid,
    pub biosite_id: Uuid,
    pub title: String,
    pub url: String,
    /// Platform key for icon lookup ("instagram", "tiktok", ...).
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    pub active: bool,
}

// ── Analytics ────────────────────────────────────────────────────────

/// Aggregated analytics for one owner over a requested time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub views: u64,
    pub clicks: u64,
    #[serde(default)]
    pub daily_activity: Vec<DailyActivity>,
    #[serde(default)]
    pub click_details: Vec<ClickDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub day: DateTime<Utc>,
    pub views: u64,
    pub clicks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickDetail {
    /// What was clicked (link title or platform key).
    pub label: String,
    pub clicks: u64,
}

// ── Business card ────────────────────────────────────────────────────

/// Digital business card record, including its QR reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessCardRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Hosted QR image for the card, if one has been generated.
    #[serde(default)]
    pub qr_url: Option<String>,
}

// ── Mutations ────────────────────────────────────────────────────────

/// Body for `PATCH /biosites/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiositeUpdate {
    pub active: bool,
}
