// ── Analytics domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregated usage analytics for one biosite owner over a time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub views: u64,
    pub clicks: u64,
    pub daily_activity: Vec<DailyActivity>,
    pub click_details: Vec<ClickDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub day: DateTime<Utc>,
    pub views: u64,
    pub clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickDetail {
    pub label: String,
    pub clicks: u64,
}
