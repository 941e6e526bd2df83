//! Async Rust client for the biosite platform admin API.
//!
//! This crate owns the HTTP surface only: request construction, API-key
//! auth, response decoding, and error classification. Pagination
//! bookkeeping, filtering, and caching live in `biodash-core`.
//!
//! - **[`AdminClient`]** — JSON REST client for the admin endpoints
//!   (biosite listings, link lists, analytics, business cards, admin
//!   mutations).
//! - **[`TransportConfig`]** — shared TLS/timeout settings for building
//!   the underlying `reqwest::Client`.
//! - **[`Error`]** — unified error type covering auth, transport, API,
//!   and decoding failures.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{AdminClient, AnalyticsRange};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    AnalyticsResponse, BiositeRecord, BusinessCardRecord, ClickDetail, DailyActivity, LinkRecord,
    PageEnvelope,
};
