//! Core data layer for the biosite admin dashboard.
//!
//! The entry point is [`AdminTableSession`]: one per signed-in admin,
//! built from a [`SessionConfig`] that fixes the caller's
//! [`AccessScope`] for the session's lifetime. Underneath sit four
//! independent pieces:
//!
//! - [`PaginationController`] — page/size/total bookkeeping, covering
//!   both server-paginated envelopes and locally windowed collections.
//! - [`FilterCriteria`] — the filter form, rendered either as server
//!   query parameters or as a local filter/sort pipeline.
//! - [`ScopeRouter`] — picks the fetch strategy per access scope.
//! - [`ResourceCaches`] — lazy, session-lifetime caches for per-row
//!   resources (business cards, links, analytics snapshots).

pub mod cache;
pub mod config;
mod convert;
pub mod error;
pub mod filter;
pub mod model;
pub mod pagination;
pub mod scope;
pub mod session;

pub use cache::{CacheEntry, LazyCache, ResourceCaches};
pub use config::{SessionConfig, TlsVerification};
pub use error::CoreError;
pub use filter::{
    DateRange, DebounceGate, FilterCriteria, SEARCH_DEBOUNCE, SlugFilter, SortKey, SortOrder,
    StatusFilter,
};
pub use model::{
    AnalyticsSnapshot, Biosite, BiositeId, BusinessCard, ClickDetail, DailyActivity, Link,
    OwnerId, TimeRange,
};
pub use pagination::{DEFAULT_PAGE_SIZE, ELLIPSIS, PageSource, PaginationController};
pub use scope::{AccessScope, ScopeRouter};
pub use session::{AdminTableSession, LoadState, TableView};
