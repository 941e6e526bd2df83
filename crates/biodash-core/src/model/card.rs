// ── Business card domain type ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::OwnerId;

/// Digital business card attached to an owner account.
///
/// QR generation itself is a platform concern; the admin table only
/// displays the hosted reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessCard {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub qr_url: Option<String>,
}
