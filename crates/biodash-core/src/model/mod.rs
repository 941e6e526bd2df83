//! Canonical domain types for the admin table.
//!
//! Wire shapes from `biodash-api` are converted into these via the
//! [`convert`](crate::convert) module and never leak past it.

mod analytics;
mod biosite;
mod card;
mod ids;
mod link;
mod time_range;

pub use analytics::{AnalyticsSnapshot, ClickDetail, DailyActivity};
pub use biosite::Biosite;
pub use card::BusinessCard;
pub use ids::{BiositeId, OwnerId};
pub use link::Link;
pub use time_range::TimeRange;
