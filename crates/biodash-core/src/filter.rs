// ── Filter pipeline ──
//
// Normalizes the filter form into either a server query-parameter set
// (full-access scope) or a local predicate/sort pass (scoped access).
// Every field is a closed enum so a new variant fails to compile until
// both the query builder and the local pipeline handle it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::Biosite;

/// How long a search keystroke must stay the latest before it applies.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

// ── Closed filter enums ──────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SlugFilter {
    #[default]
    All,
    With,
    Without,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[serde(rename_all = "camelCase")]
pub enum DateRange {
    #[default]
    All,
    Last7,
    Last30,
    Last90,
}

impl DateRange {
    /// Cutoff timestamp for `created_at >= now - N days`, if bounded.
    fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            Self::All => return None,
            Self::Last7 => 7,
            Self::Last30 => 30,
            Self::Last90 => 90,
        };
        Some(now - ChronoDuration::days(days))
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    CreatedAt,
    Title,
    UpdatedAt,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

// ── Criteria ─────────────────────────────────────────────────────────

/// The complete filter form state.
///
/// `Default` is the single source of truth for "no filters": both
/// [`active_filters_count`](Self::active_filters_count) and the reset
/// action derive from it, so the badge count and reset always agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub search: String,
    /// Slug-specific search. When non-empty it fully overrides
    /// `has_slug` in query construction.
    pub slug_search: String,
    pub status: StatusFilter,
    pub has_slug: SlugFilter,
    pub date_range: DateRange,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl FilterCriteria {
    // ── Query construction (server-side filtering) ───────────────────

    /// Flat query parameters for the server-paginated listing.
    ///
    /// Fields at their default value are omitted, and no parameter is
    /// ever emitted with an empty value. The `slug` key carries either
    /// the slug search text or the presence marker, never both: slug
    /// search has absolute priority.
    pub fn server_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_owned()));
        }

        let slug_search = self.slug_search.trim();
        if !slug_search.is_empty() {
            params.push(("slug", slug_search.to_owned()));
        } else {
            match self.has_slug {
                SlugFilter::All => {}
                SlugFilter::With => params.push(("slug", "with".into())),
                SlugFilter::Without => params.push(("slug", "without".into())),
            }
        }

        match self.status {
            StatusFilter::All => {}
            StatusFilter::Active => params.push(("status", "active".into())),
            StatusFilter::Inactive => params.push(("status", "inactive".into())),
        }

        match self.date_range {
            DateRange::All => {}
            bounded => params.push(("dateRange", bounded.to_string())),
        }

        if self.sort_by != SortKey::default() {
            params.push(("orderBy", self.sort_by.to_string()));
        }
        if self.sort_order != SortOrder::default() {
            params.push(("orderMode", self.sort_order.to_string()));
        }

        params
    }

    // ── Local pipeline (client-side filtering) ───────────────────────

    /// Predicate used by the local pass. `now` is injected so the date
    /// cutoff is deterministic under test.
    fn matches(&self, site: &Biosite, now: DateTime<Utc>) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty() {
            let hit = site.title.to_lowercase().contains(&search)
                || site
                    .slug
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&search))
                || site
                    .owner_handle
                    .as_deref()
                    .is_some_and(|h| h.to_lowercase().contains(&search));
            if !hit {
                return false;
            }
        }

        match self.status {
            StatusFilter::All => {}
            StatusFilter::Active => {
                if !site.active {
                    return false;
                }
            }
            StatusFilter::Inactive => {
                if site.active {
                    return false;
                }
            }
        }

        // Slug search overrides the presence filter locally as well.
        let slug_search = self.slug_search.trim().to_lowercase();
        if !slug_search.is_empty() {
            if !site
                .slug
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&slug_search))
            {
                return false;
            }
        } else {
            match self.has_slug {
                SlugFilter::All => {}
                SlugFilter::With => {
                    if !site.has_slug() {
                        return false;
                    }
                }
                SlugFilter::Without => {
                    if site.has_slug() {
                        return false;
                    }
                }
            }
        }

        if let Some(cutoff) = self.date_range.cutoff(now) {
            if site.created_at < cutoff {
                return false;
            }
        }

        true
    }

    /// Run the full local pipeline: filter, then a single-key stable
    /// sort. Ties keep their original relative order.
    pub fn apply(&self, items: &[Arc<Biosite>]) -> Vec<Arc<Biosite>> {
        self.apply_at(items, Utc::now())
    }

    /// [`apply`](Self::apply) with an explicit clock.
    pub fn apply_at(&self, items: &[Arc<Biosite>], now: DateTime<Utc>) -> Vec<Arc<Biosite>> {
        let mut out: Vec<Arc<Biosite>> = items
            .iter()
            .filter(|s| self.matches(s, now))
            .cloned()
            .collect();

        // `sort_by` on Vec is stable, which the tie-order contract needs.
        out.sort_by(|a, b| {
            let ord = match self.sort_by {
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            };
            match self.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        out
    }

    // ── Derived predicates ───────────────────────────────────────────

    /// Number of documented filter fields differing from their defaults.
    pub fn active_filters_count(&self) -> usize {
        let defaults = Self::default();
        usize::from(self.search != defaults.search)
            + usize::from(self.status != defaults.status)
            + usize::from(self.has_slug != defaults.has_slug)
            + usize::from(self.date_range != defaults.date_range)
            + usize::from(self.sort_by != defaults.sort_by)
            + usize::from(self.sort_order != defaults.sort_order)
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filters_count() > 0
    }
}

// ── Debounce gate ────────────────────────────────────────────────────

/// Last-write-wins debounce discipline for live search.
///
/// Every keystroke arms a new generation; a deferred application runs
/// only if its generation is still the latest. This replaces ad hoc
/// timer-handle juggling with a monotonic counter: stale completions
/// simply observe that they lost the race.
#[derive(Debug, Default)]
pub struct DebounceGate {
    generation: AtomicU64,
}

impl DebounceGate {
    /// Start a new generation, invalidating all earlier ones.
    pub fn arm(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `generation` is still the latest armed one.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

// ── Tests ────────────────────────────────────────────────────────────
