// ── Wire-to-domain conversions ──
//
// All translation from `biodash-api` response shapes into canonical
// domain types lives here, keeping serde quirks out of the rest of
// the crate.

use crate::model::{
    AnalyticsSnapshot, Biosite, BusinessCard, ClickDetail, DailyActivity, Link,
};

impl From<biodash_api::BiositeRecord> for Biosite {
    fn from(r: biodash_api::BiositeRecord) -> Self {
        Self {
            id: r.id.into(),
            owner_id: r.owner_id.into(),
            title: r.title,
            // Normalize an empty slug string to "no slug claimed".
            slug: r.slug.filter(|s| !s.is_empty()),
            active: r.active,
            created_at: r.created_at,
            updated_at: r.updated_at,
            owner_handle: r.owner_handle,
        }
    }
}

impl From<biodash_api::LinkRecord> for Link {
    fn from(r: biodash_api::LinkRecord) -> Self {
        Self {
            id: r.id,
            biosite_id: r.biosite_id.into(),
            title: r.title,
            url: r.url,
            platform: r.platform,
            position: r.position,
            active: r.active,
        }
    }
}

impl From<biodash_api::BusinessCardRecord> for BusinessCard {
    fn from(r: biodash_api::BusinessCardRecord) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id.into(),
            full_name: r.full_name,
            job_title: r.job_title,
            email: r.email,
            phone: r.phone,
            qr_url: r.qr_url,
        }
    }
}

impl From<biodash_api::AnalyticsResponse> for AnalyticsSnapshot {
    fn from(r: biodash_api::AnalyticsResponse) -> Self {
        Self {
            views: r.views,
            clicks: r.clicks,
            daily_activity: r
                .daily_activity
                .into_iter()
                .map(|d| DailyActivity {
                    day: d.day,
                    views: d.views,
                    clicks: d.clicks,
                })
                .collect(),
            click_details: r
                .click_details
                .into_iter()
                .map(|c| ClickDetail {
                    label: c.label,
                    clicks: c.clicks,
                })
                .collect(),
        }
    }
}
