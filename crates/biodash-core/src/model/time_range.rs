// ── Analytics time range ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use biodash_api::AnalyticsRange;

/// Aggregation window for analytics snapshots.
///
/// Part of the analytics cache key, so switching ranges never
/// invalidates snapshots cached under other ranges.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[serde(rename_all = "camelCase")]
pub enum TimeRange {
    #[default]
    Last7,
    Last30,
    LastYear,
}

impl From<TimeRange> for AnalyticsRange {
    fn from(range: TimeRange) -> Self {
        match range {
            TimeRange::Last7 => AnalyticsRange::Last7,
            TimeRange::Last30 => AnalyticsRange::Last30,
            TimeRange::LastYear => AnalyticsRange::LastYear,
        }
    }
}
