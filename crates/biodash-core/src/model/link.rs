// ── Link domain type ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::BiositeId;

/// One row in a biosite's link collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub biosite_id: BiositeId,
    pub title: String,
    pub url: String,
    /// Platform key used by the view layer's icon lookup ("instagram", ...).
    pub platform: Option<String>,
    pub position: Option<u32>,
    pub active: bool,
}
