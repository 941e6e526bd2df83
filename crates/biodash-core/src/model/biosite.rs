// ── Biosite domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BiositeId, OwnerId};

/// A tenant's published micro-site as seen by the admin table.
///
/// Read-only from the table controller's perspective; mutation happens
/// only through explicit admin actions (delete / set-active), which
/// invalidate the affected caches and force a page re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biosite {
    pub id: BiositeId,
    pub owner_id: OwnerId,
    pub title: String,
    /// Public URL slug; `None` until the tenant claims one.
    pub slug: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner's public handle, denormalized by the server for display.
    pub owner_handle: Option<String>,
}

impl Biosite {
    pub fn has_slug(&self) -> bool {
        self.slug.as_deref().is_some_and(|s| !s.is_empty())
    }
}
